use crate::geometry::Offset;
use crate::layout::{FlexFit, StackPosition};

use super::child_list::Siblings;

/// Layout metadata a container keeps on each of its children.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParentData {
    /// Position of the child in its parent's coordinate space.
    pub offset: Offset,
    pub kind: ParentDataKind,
    pub(crate) siblings: Siblings,
}

impl ParentData {
    pub fn flex(&self) -> u32 {
        match self.kind {
            ParentDataKind::Flex { flex, .. } => flex,
            _ => 0,
        }
    }

    pub fn fit(&self) -> FlexFit {
        match self.kind {
            ParentDataKind::Flex { fit, .. } => fit,
            _ => FlexFit::Tight,
        }
    }

    pub fn stack_position(&self) -> StackPosition {
        match self.kind {
            ParentDataKind::Stack(position) => position,
            _ => StackPosition::default(),
        }
    }

    pub fn run_index(&self) -> Option<usize> {
        match self.kind {
            ParentDataKind::Wrap { run_index } => Some(run_index),
            _ => None,
        }
    }

    pub fn previous_sibling(&self) -> Option<super::NodeId> {
        self.siblings.previous
    }

    pub fn next_sibling(&self) -> Option<super::NodeId> {
        self.siblings.next
    }
}

/// Container-specific part of [`ParentData`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParentDataKind {
    /// Offset only.
    #[default]
    Box,
    /// Child of a flex; `flex == 0` means the child is not flexible.
    Flex { flex: u32, fit: FlexFit },
    /// Child of a stack, with optional anchors.
    Stack(StackPosition),
    /// Child of a wrap, tagged with the run it landed in.
    Wrap { run_index: usize },
}

impl ParentDataKind {
    pub fn flexible(flex: u32) -> Self {
        ParentDataKind::Flex {
            flex,
            fit: FlexFit::Tight,
        }
    }

    pub fn loose(flex: u32) -> Self {
        ParentDataKind::Flex {
            flex,
            fit: FlexFit::Loose,
        }
    }

    pub fn is_flex(&self) -> bool {
        matches!(self, ParentDataKind::Flex { .. })
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, ParentDataKind::Stack(_))
    }

    pub fn is_wrap(&self) -> bool {
        matches!(self, ParentDataKind::Wrap { .. })
    }
}

impl From<StackPosition> for ParentDataKind {
    fn from(position: StackPosition) -> Self {
        ParentDataKind::Stack(position)
    }
}
