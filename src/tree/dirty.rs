//! Two-flag dirty state for render nodes.
//!
//! Layout and paint dirtiness are tracked independently. The transitions are
//! the only way the flags change, so the rules below hold everywhere:
//!
//! - marking is idempotent and reports whether it changed anything,
//! - completing layout clears `NEEDS_LAYOUT` and sets `NEEDS_PAINT`,
//! - completing paint clears only `NEEDS_PAINT`.

use bitflags::bitflags;

bitflags! {
    /// Flags indicating what a node needs before the next frame
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        /// Size or position may change
        const NEEDS_LAYOUT = 0b01;
        /// Visual appearance changed
        const NEEDS_PAINT  = 0b10;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyState(DirtyFlags);

impl DirtyState {
    /// A freshly created node has never been laid out or painted.
    pub fn new() -> Self {
        Self(DirtyFlags::all())
    }

    pub fn clean() -> Self {
        Self(DirtyFlags::empty())
    }

    pub fn flags(&self) -> DirtyFlags {
        self.0
    }

    pub fn needs_layout(&self) -> bool {
        self.0.contains(DirtyFlags::NEEDS_LAYOUT)
    }

    pub fn needs_paint(&self) -> bool {
        self.0.contains(DirtyFlags::NEEDS_PAINT)
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the node was layout-clean before.
    pub fn mark_needs_layout(&mut self) -> bool {
        let was_clean = !self.needs_layout();
        self.0.insert(DirtyFlags::NEEDS_LAYOUT);
        was_clean
    }

    /// Returns `true` if the node was paint-clean before.
    pub fn mark_needs_paint(&mut self) -> bool {
        let was_clean = !self.needs_paint();
        self.0.insert(DirtyFlags::NEEDS_PAINT);
        was_clean
    }

    pub fn complete_layout(&mut self) {
        self.0.remove(DirtyFlags::NEEDS_LAYOUT);
        self.0.insert(DirtyFlags::NEEDS_PAINT);
    }

    pub fn complete_paint(&mut self) {
        self.0.remove(DirtyFlags::NEEDS_PAINT);
    }
}

impl Default for DirtyState {
    fn default() -> Self {
        Self::new()
    }
}
