use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::Result;
use crate::layout::{BoxConstraints, Size};
use crate::tree::{NodeId, Tree};

/// Plain proxy: sizes to its child, or to the smallest allowed size when it
/// has none. Usually the root, where the viewport makes that the full view.
#[derive(Debug, Clone, Default)]
pub struct View;

impl View {
    pub fn new() -> Self {
        Self
    }
}

impl RenderBox for View {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }
}
