pub mod constraints;
pub mod flex;
pub mod stack;
pub mod wrap;

pub use constraints::{BoxConstraints, Size};
pub use flex::Flex;
pub use stack::{Stack, StackPosition};
pub use wrap::Wrap;

/// Direction for flex and wrap layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    #[default]
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn flip(self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }
}

/// Main axis alignment for flex layouts; also used for wrap runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainAxisAlignment {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl MainAxisAlignment {
    /// `(leading, between)` space for `child_count` items sharing `free_space`.
    ///
    /// `spacing` is always added to the between-space, even when the
    /// alignment distributes nothing.
    pub fn distribute(self, free_space: f32, child_count: usize, spacing: f32) -> (f32, f32) {
        match self {
            MainAxisAlignment::Start => (0.0, spacing),
            MainAxisAlignment::Center => (free_space / 2.0, spacing),
            MainAxisAlignment::End => (free_space, spacing),
            MainAxisAlignment::SpaceBetween => {
                if child_count > 1 {
                    (0.0, free_space / (child_count - 1) as f32 + spacing)
                } else {
                    (0.0, spacing)
                }
            }
            MainAxisAlignment::SpaceAround => {
                if child_count == 0 {
                    return (0.0, spacing);
                }
                let space = free_space / child_count as f32;
                (space / 2.0, space + spacing)
            }
            MainAxisAlignment::SpaceEvenly => {
                let space = free_space / (child_count + 1) as f32;
                (space, space + spacing)
            }
        }
    }
}

/// Cross axis alignment for flex layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossAxisAlignment {
    Start,
    #[default]
    Center,
    End,
    Stretch,
    /// Align children's top edges; without a baseline source this behaves
    /// like `Start`.
    Baseline,
}

/// Whether a flex fills its main axis or shrinks to its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MainAxisSize {
    Min,
    #[default]
    Max,
}

/// How a flexible child uses the space allocated to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexFit {
    /// The child is forced to fill its share.
    #[default]
    Tight,
    /// The child may be smaller than its share.
    Loose,
}

/// Placement of runs in the cross axis, or children within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapAlignment {
    #[default]
    Start,
    End,
    Center,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

impl From<WrapAlignment> for MainAxisAlignment {
    fn from(value: WrapAlignment) -> Self {
        match value {
            WrapAlignment::Start => MainAxisAlignment::Start,
            WrapAlignment::End => MainAxisAlignment::End,
            WrapAlignment::Center => MainAxisAlignment::Center,
            WrapAlignment::SpaceBetween => MainAxisAlignment::SpaceBetween,
            WrapAlignment::SpaceAround => MainAxisAlignment::SpaceAround,
            WrapAlignment::SpaceEvenly => MainAxisAlignment::SpaceEvenly,
        }
    }
}

/// Placement of a child within its run's cross extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapCrossAlignment {
    #[default]
    Start,
    End,
    Center,
}

impl WrapCrossAlignment {
    pub fn offset(self, run_cross: f32, child_cross: f32) -> f32 {
        match self {
            WrapCrossAlignment::Start => 0.0,
            WrapCrossAlignment::End => run_cross - child_cross,
            WrapCrossAlignment::Center => (run_cross - child_cross) / 2.0,
        }
    }
}

/// How non-positioned stack children are constrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackFit {
    /// Children may be anywhere between zero and the stack's max size.
    #[default]
    Loose,
    /// Children are forced to the stack's biggest size.
    Expand,
    /// The stack's constraints are handed down unchanged.
    Passthrough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribute_start_center_end() {
        assert_eq!(MainAxisAlignment::Start.distribute(30.0, 3, 5.0), (0.0, 5.0));
        assert_eq!(MainAxisAlignment::Center.distribute(30.0, 3, 5.0), (15.0, 5.0));
        assert_eq!(MainAxisAlignment::End.distribute(30.0, 3, 5.0), (30.0, 5.0));
    }

    #[test]
    fn test_distribute_space_variants() {
        assert_eq!(
            MainAxisAlignment::SpaceBetween.distribute(30.0, 4, 0.0),
            (0.0, 10.0)
        );
        assert_eq!(
            MainAxisAlignment::SpaceAround.distribute(30.0, 3, 0.0),
            (5.0, 10.0)
        );
        assert_eq!(
            MainAxisAlignment::SpaceEvenly.distribute(30.0, 2, 0.0),
            (10.0, 10.0)
        );
    }

    #[test]
    fn test_space_between_single_child_has_no_gap() {
        assert_eq!(
            MainAxisAlignment::SpaceBetween.distribute(50.0, 1, 4.0),
            (0.0, 4.0)
        );
    }

    #[test]
    fn test_space_between_without_free_space_uses_only_spacing() {
        assert_eq!(
            MainAxisAlignment::SpaceBetween.distribute(0.0, 3, 6.0),
            (0.0, 6.0)
        );
    }

    #[test]
    fn test_wrap_cross_offset() {
        assert_eq!(WrapCrossAlignment::Start.offset(20.0, 10.0), 0.0);
        assert_eq!(WrapCrossAlignment::End.offset(20.0, 10.0), 10.0);
        assert_eq!(WrapCrossAlignment::Center.offset(20.0, 10.0), 5.0);
    }
}
