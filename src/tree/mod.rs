//! Arena-based render-node storage.
//!
//! The Tree owns every render node in a dense Vec with a sparse map of
//! generational indices, so handles to removed nodes are detected instead
//! of aliasing new ones.
//!
//! ## Key Features
//!
//! - **Generational Indices**: `NodeId` contains index + generation; a stale
//!   id resolves to [`Error::UnknownNode`].
//!
//! - **Swap-Remove**: O(1) removal without holes in dense storage.
//!
//! - **Sibling Lists**: children of a node form a doubly linked list whose
//!   links live in each child's [`ParentData`].
//!
//! - **Partial Layout**: marking a node dirty bubbles up to the nearest
//!   relayout boundary, which is queued. Only queued subtrees are laid out
//!   by [`Tree::flush_layout`].

pub mod child_list;
pub mod dirty;
pub mod parent_data;

use std::cell::RefCell;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::events::PointerEvent;
use crate::geometry::Offset;
use crate::hit_test::HitTestResult;
use crate::image::{ImageEvent, ImageRequest, ImageTicket};
use crate::layout::{BoxConstraints, Size};
use crate::objects::{ChildPolicy, ObjectKind, RenderObject};
use crate::painting::PaintingContext;
use crate::stats::FrameStats;
use crate::text::{CosmicTextMeasurer, TextMeasurer, TextStyle};

pub use child_list::{ChildList, Siblings};
use child_list::SiblingStore;
pub use dirty::{DirtyFlags, DirtyState};
pub use parent_data::{ParentData, ParentDataKind};

/// Handle to a render node in a [`Tree`].
///
/// Uses a generational index design:
/// - `index`: Position in the sparse array (reusable after removal)
/// - `generation`: Version counter that increments when a slot is reused
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Combines generation (high bits) with index (low bits).
    pub fn as_u64(self) -> u64 {
        ((self.generation as u64) << 32) | (self.index as u64)
    }
}

/// Value returned by a property setter describing what it invalidated.
pub trait Invalidation {
    fn into_flags(self) -> Result<DirtyFlags>;
}

impl Invalidation for DirtyFlags {
    fn into_flags(self) -> Result<DirtyFlags> {
        Ok(self)
    }
}

impl Invalidation for Result<DirtyFlags> {
    fn into_flags(self) -> Result<DirtyFlags> {
        self
    }
}

struct SparseEntry {
    dense_index: usize,
    generation: u32,
}

struct Node {
    /// `None` only while the object is running its own layout.
    object: Option<RenderObject>,
    kind: &'static str,
    parent: Option<NodeId>,
    parent_data: ParentData,
    children: ChildList,
    dirty: DirtyState,
    constraints: Option<BoxConstraints>,
    size: Option<Size>,
    is_relayout_boundary: bool,
    attached: bool,
    /// Back-pointer to sparse array index (for swap-remove fixup)
    sparse_index: u32,
}

/// Owner of all render nodes and of the layout queue.
pub struct Tree {
    dense: Vec<Node>,
    sparse: Vec<Option<SparseEntry>>,
    free_indices: Vec<u32>,
    root: Option<NodeId>,
    /// Relayout boundaries that need layout (the layout queue)
    layout_roots: HashSet<NodeId>,
    stats: FrameStats,
    text_measurer: RefCell<Option<Box<dyn TextMeasurer>>>,
    image_requests: Vec<ImageRequest>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dense: Vec::new(),
            sparse: Vec::new(),
            free_indices: Vec::new(),
            root: None,
            layout_roots: HashSet::new(),
            stats: FrameStats::default(),
            text_measurer: RefCell::new(None),
            image_requests: Vec::new(),
        }
    }

    /// Store a render object and return its handle. The node starts
    /// detached, parentless and fully dirty.
    pub fn insert_node(&mut self, object: impl Into<RenderObject>) -> NodeId {
        let object = object.into();

        let (sparse_index, generation) = if let Some(idx) = self.free_indices.pop() {
            let old_gen = self.sparse[idx as usize]
                .as_ref()
                .map(|e| e.generation)
                .unwrap_or(0);
            (idx, old_gen.wrapping_add(1))
        } else {
            let idx = self.sparse.len() as u32;
            self.sparse.push(None);
            (idx, 0)
        };

        let dense_index = self.dense.len();
        self.dense.push(Node {
            kind: object.kind_name(),
            object: Some(object),
            parent: None,
            parent_data: ParentData::default(),
            children: ChildList::default(),
            dirty: DirtyState::new(),
            constraints: None,
            size: None,
            is_relayout_boundary: false,
            attached: false,
            sparse_index,
        });
        self.sparse[sparse_index as usize] = Some(SparseEntry {
            dense_index,
            generation,
        });

        NodeId::new(sparse_index, generation)
    }

    /// Destroy `id` and its whole subtree, detaching it from its parent first.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let idx = self.dense_index(id)?;
        if let Some(parent) = self.dense[idx].parent {
            self.remove_child(parent, id)?;
        }
        if self.root == Some(id) {
            self.detach_subtree(id);
            self.root = None;
        }

        let mut doomed = Vec::new();
        self.collect_subtree(id, &mut doomed);
        for node in doomed {
            self.unregister(node);
        }
        Ok(())
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.children(id) {
            self.collect_subtree(child, out);
        }
    }

    fn unregister(&mut self, id: NodeId) {
        let Ok(dense_index) = self.dense_index(id) else {
            return;
        };

        let last_dense_index = self.dense.len() - 1;
        self.dense.swap_remove(dense_index);

        if dense_index != last_dense_index {
            let moved_sparse_idx = self.dense[dense_index].sparse_index;
            if let Some(ref mut entry) = self.sparse[moved_sparse_idx as usize] {
                entry.dense_index = dense_index;
            }
        }

        // Keep the generation so the next allocation of this slot bumps it
        self.sparse[id.index as usize] = Some(SparseEntry {
            dense_index: usize::MAX,
            generation: id.generation,
        });
        self.free_indices.push(id.index);
        self.layout_roots.remove(&id);
    }

    fn dense_index(&self, id: NodeId) -> Result<usize> {
        self.sparse
            .get(id.index as usize)
            .and_then(|e| e.as_ref())
            .filter(|e| e.generation == id.generation && e.dense_index != usize::MAX)
            .map(|e| e.dense_index)
            .ok_or(Error::UnknownNode(id))
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        let idx = self.dense_index(id)?;
        Ok(&self.dense[idx])
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        let idx = self.dense_index(id)?;
        Ok(&mut self.dense[idx])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.dense_index(id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn object(&self, id: NodeId) -> Result<&RenderObject> {
        self.node(id)?.object.as_ref().ok_or(Error::UnknownNode(id))
    }

    /// Borrow the node's object as a concrete kind.
    pub fn get<T: ObjectKind>(&self, id: NodeId) -> Result<&T> {
        let node = self.node(id)?;
        node.object
            .as_ref()
            .and_then(T::downcast_ref)
            .ok_or_else(|| wrong_kind::<T>(id, node.kind))
    }

    /// Mutate a node's object through one of its setters and apply the
    /// invalidation the setter reports.
    pub fn update<T, R>(&mut self, id: NodeId, f: impl FnOnce(&mut T) -> R) -> Result<()>
    where
        T: ObjectKind,
        R: Invalidation,
    {
        let node = self.node_mut(id)?;
        let kind = node.kind;
        let target = node
            .object
            .as_mut()
            .and_then(T::downcast_mut)
            .ok_or_else(|| wrong_kind::<T>(id, kind))?;
        let flags = f(target).into_flags()?;

        if flags.contains(DirtyFlags::NEEDS_LAYOUT) {
            self.mark_needs_layout(id);
        }
        if flags.contains(DirtyFlags::NEEDS_PAINT) {
            self.mark_needs_paint(id);
        }
        Ok(())
    }

    /// Run `f` with the object temporarily taken out of the tree, so it can
    /// lay out or otherwise mutate its children.
    pub(crate) fn with_object_mut<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut RenderObject, &mut Tree) -> R,
    ) -> Result<R> {
        let idx = self.dense_index(id)?;
        let mut object = self.dense[idx].object.take().ok_or(Error::UnknownNode(id))?;

        let result = f(&mut object, self);

        if let Ok(idx) = self.dense_index(id) {
            self.dense[idx].object = Some(object);
        }
        Ok(result)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Make `id` the attached root. The previous root, if any, is detached
    /// but stays in the arena.
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if let Some(parent) = node.parent {
            return Err(Error::AlreadyAdopted { child: id, parent });
        }
        if let Some(old) = self.root.take() {
            self.detach_subtree(old);
        }
        self.root = Some(id);
        self.attach_subtree(id);
        self.layout_roots.insert(id);
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn parent_data(&self, id: NodeId) -> Result<&ParentData> {
        Ok(&self.node(id)?.parent_data)
    }

    pub fn offset(&self, id: NodeId) -> Result<Offset> {
        Ok(self.node(id)?.parent_data.offset)
    }

    pub(crate) fn set_offset(&mut self, id: NodeId, offset: Offset) -> Result<()> {
        self.node_mut(id)?.parent_data.offset = offset;
        Ok(())
    }

    pub(crate) fn set_run_index(&mut self, id: NodeId, run_index: usize) -> Result<()> {
        self.node_mut(id)?.parent_data.kind = ParentDataKind::Wrap { run_index };
        Ok(())
    }

    /// Replace the container-specific parent data of `child`; its parent, if
    /// any, is marked for layout.
    pub fn set_parent_data(&mut self, child: NodeId, kind: impl Into<ParentDataKind>) -> Result<()> {
        let kind = kind.into();
        let node = self.node_mut(child)?;
        if node.parent_data.kind == kind {
            return Ok(());
        }
        node.parent_data.kind = kind;
        let parent = node.parent;
        if let Some(parent) = parent {
            self.mark_needs_layout(parent);
        }
        Ok(())
    }

    pub fn first_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.children.first)
    }

    pub fn last_child(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.children.last)
    }

    pub fn child_count(&self, id: NodeId) -> Result<usize> {
        Ok(self.node(id)?.children.count)
    }

    pub fn next_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent_data.siblings.next)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent_data.siblings.previous)
    }

    /// Children in paint order (first to last). Empty for unknown ids.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match self.node(id) {
            Ok(node) => node.children.forward(self).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Children in hit-test order (last to first). Empty for unknown ids.
    pub fn children_rev(&self, id: NodeId) -> Vec<NodeId> {
        match self.node(id) {
            Ok(node) => node.children.backward(self).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of ancestors of `id`; the root has depth 0.
    pub fn depth(&self, id: NodeId) -> Result<usize> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.node(parent)?.parent;
        }
        Ok(depth)
    }

    /// Kind names from the outermost ancestor down to `id`.
    pub fn ancestor_trace(&self, id: NodeId) -> String {
        let mut kinds = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            match self.node(node_id) {
                Ok(node) => {
                    kinds.push(node.kind);
                    current = node.parent;
                }
                Err(_) => break,
            }
        }
        kinds.reverse();
        kinds.join(" → ")
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(node_id) = current {
            if node_id == candidate {
                return true;
            }
            current = self.node(node_id).ok().and_then(|n| n.parent);
        }
        false
    }

    /// Adopt `child` under `parent`, right after `after` (or first when
    /// `after` is `None`).
    pub fn insert_child(&mut self, parent: NodeId, child: NodeId, after: Option<NodeId>) -> Result<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if let Some(existing) = child_node.parent {
            return Err(Error::AlreadyAdopted {
                child,
                parent: existing,
            });
        }
        if self.root == Some(child) || self.is_ancestor_or_self(child, parent) {
            return Err(Error::WouldCreateCycle { parent, child });
        }

        let object = parent_node.object.as_ref().ok_or(Error::UnknownNode(parent))?;
        let accepts = match object.child_policy() {
            ChildPolicy::None => false,
            ChildPolicy::Single => parent_node.children.is_empty(),
            ChildPolicy::Multiple => true,
        };
        if !accepts {
            return Err(Error::TooManyChildren {
                parent,
                kind: parent_node.kind,
            });
        }

        if let Some(after) = after {
            if self.node(after)?.parent != Some(parent) {
                return Err(Error::NotAChild {
                    parent,
                    child: after,
                });
            }
        }

        let mut kind = child_node.parent_data.kind;
        object.setup_parent_data(&mut kind);
        let parent_attached = parent_node.attached;

        let mut children = parent_node.children;
        children.insert(self, child, after);

        {
            let child_node = self.node_mut(child)?;
            child_node.parent = Some(parent);
            child_node.parent_data.kind = kind;
            child_node.parent_data.offset = Offset::ZERO;
        }
        self.node_mut(parent)?.children = children;

        if parent_attached {
            self.attach_subtree(child);
        }
        self.mark_needs_layout(parent);
        Ok(())
    }

    /// Adopt `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let after = self.node(parent)?.children.last;
        self.insert_child(parent, child, after)
    }

    /// Drop `child` from `parent`'s list. The child stays in the arena,
    /// detached, and can be adopted again.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child)?.parent != Some(parent) {
            return Err(Error::NotAChild { parent, child });
        }

        let mut children = self.node(parent)?.children;
        children.remove(self, child);
        self.node_mut(parent)?.children = children;

        {
            let child_node = self.node_mut(child)?;
            child_node.parent = None;
            child_node.parent_data.offset = Offset::ZERO;
            child_node.is_relayout_boundary = false;
        }
        self.detach_subtree(child);
        self.mark_needs_layout(parent);
        Ok(())
    }

    /// Replace the single child of `parent`, returning the previous one.
    pub fn set_child(&mut self, parent: NodeId, child: Option<NodeId>) -> Result<Option<NodeId>> {
        let previous = self.node(parent)?.children.first;
        if previous == child {
            return Ok(previous);
        }
        if let Some(old) = previous {
            self.remove_child(parent, old)?;
        }
        if let Some(new) = child {
            self.insert_child(parent, new, None)?;
        }
        Ok(previous)
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.attached).unwrap_or(false)
    }

    fn attach_subtree(&mut self, id: NodeId) {
        let mut nodes = Vec::new();
        self.collect_subtree(id, &mut nodes);
        for node_id in nodes {
            if let Ok(node) = self.node_mut(node_id) {
                node.attached = true;
                node.is_relayout_boundary = false;
                node.dirty.mark_needs_layout();
                node.dirty.mark_needs_paint();
            }
        }
    }

    fn detach_subtree(&mut self, id: NodeId) {
        let mut nodes = Vec::new();
        self.collect_subtree(id, &mut nodes);
        for node_id in nodes {
            if let Ok(node) = self.node_mut(node_id) {
                node.attached = false;
                if let Some(RenderObject::Image(image)) = node.object.as_mut() {
                    image.rearm();
                }
            }
            self.layout_roots.remove(&node_id);
        }
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Mark a node as needing layout.
    ///
    /// The flag bubbles up to the nearest relayout boundary, which is queued.
    /// A node that is already dirty stops the walk: its boundary is already
    /// queued.
    pub fn mark_needs_layout(&mut self, id: NodeId) {
        let mut current = id;

        loop {
            let Ok(idx) = self.dense_index(current) else {
                return;
            };
            let node = &mut self.dense[idx];

            if !node.dirty.mark_needs_layout() {
                return;
            }

            if node.is_relayout_boundary {
                if node.attached {
                    self.layout_roots.insert(current);
                }
                return;
            }

            match node.parent {
                Some(parent) => current = parent,
                None => {
                    if node.attached {
                        self.layout_roots.insert(current);
                    }
                    return;
                }
            }
        }
    }

    /// Mark a node as needing paint; ancestors are flagged up to the first
    /// one that already is.
    pub fn mark_needs_paint(&mut self, id: NodeId) {
        let mut current = Some(id);
        let mut first = true;

        while let Some(node_id) = current {
            let Ok(idx) = self.dense_index(node_id) else {
                return;
            };
            let node = &mut self.dense[idx];
            if !node.dirty.mark_needs_paint() && !first {
                return;
            }
            first = false;
            current = node.parent;
        }
    }

    pub fn dirty_flags(&self, id: NodeId) -> Result<DirtyFlags> {
        Ok(self.node(id)?.dirty.flags())
    }

    pub fn needs_layout(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.dirty.needs_layout()).unwrap_or(false)
    }

    pub fn needs_paint(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.dirty.needs_paint()).unwrap_or(false)
    }

    pub fn is_relayout_boundary(&self, id: NodeId) -> bool {
        self.node(id).map(|n| n.is_relayout_boundary).unwrap_or(false)
    }

    /// Relayout boundaries currently queued.
    pub fn pending_layout_roots(&self) -> usize {
        self.layout_roots.len()
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Last committed size.
    pub fn size(&self, id: NodeId) -> Result<Size> {
        self.node(id)?.size.ok_or(Error::NotLaidOut(id))
    }

    /// Constraints of the last layout, if any.
    pub fn constraints(&self, id: NodeId) -> Result<Option<BoxConstraints>> {
        Ok(self.node(id)?.constraints)
    }

    /// Lay out `id` under `constraints`.
    ///
    /// The node recomputes when it is dirty, when `parent_uses_size` is set,
    /// or when the constraints differ from its last layout; otherwise the
    /// committed size is returned unchanged.
    pub fn layout(
        &mut self,
        id: NodeId,
        constraints: BoxConstraints,
        parent_uses_size: bool,
    ) -> Result<Size> {
        let idx = self.dense_index(id)?;
        if !constraints.is_normalized() {
            let error = Error::InvalidConstraints {
                constraints,
                trace: self.ancestor_trace(id),
            };
            log::error!("{error}");
            return Err(error);
        }

        let node = &mut self.dense[idx];
        let boundary = node.parent.is_none() || constraints.is_tight() || !parent_uses_size;

        if !node.dirty.needs_layout() && !parent_uses_size && node.constraints == Some(constraints) {
            if let Some(size) = node.size {
                node.is_relayout_boundary = boundary;
                self.stats.layouts_skipped += 1;
                return Ok(size);
            }
        }
        node.is_relayout_boundary = boundary;

        let result = self.with_object_mut(id, |object, tree| {
            object.perform_layout(tree, id, constraints)
        })?;
        let size = result.map_err(|error| self.attach_trace(error, id))?;

        let kind = self.node(id)?.kind;
        if !size.is_finite() {
            let error = Error::UnboundedConstraints {
                context: format!("{kind} reported an infinite size"),
                constraints,
                trace: self.ancestor_trace(id),
            };
            log::error!("{error}");
            return Err(error);
        }
        if !constraints.is_satisfied_by(size) {
            let error = Error::SizeOutOfBounds {
                size,
                constraints,
                trace: self.ancestor_trace(id),
            };
            log::error!("{error}");
            return Err(error);
        }

        let node = self.node_mut(id)?;
        node.size = Some(size);
        node.constraints = Some(constraints);
        node.dirty.complete_layout();
        self.layout_roots.remove(&id);
        self.stats.layouts_executed += 1;
        self.mark_needs_paint(id);

        Ok(size)
    }

    /// Fill in the ancestor trace of a layout error raised by `id` itself.
    fn attach_trace(&self, error: Error, id: NodeId) -> Error {
        let error = match error {
            Error::UnboundedConstraints {
                context,
                constraints,
                trace,
            } if trace.is_empty() => Error::UnboundedConstraints {
                context,
                constraints,
                trace: self.ancestor_trace(id),
            },
            other => return other,
        };
        log::error!("{error}");
        error
    }

    /// Size `id` would report under `constraints`, without touching any
    /// committed layout state.
    pub fn dry_layout(&self, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        if !constraints.is_normalized() {
            return Err(Error::InvalidConstraints {
                constraints,
                trace: self.ancestor_trace(id),
            });
        }
        self.object(id)?
            .dry_layout(self, id, constraints)
            .map_err(|error| self.attach_trace(error, id))
    }

    /// Lay out every queued relayout boundary, shallowest first. The root is
    /// laid out under `root_constraints`; other boundaries reuse their last
    /// constraints.
    pub fn flush_layout(&mut self, root_constraints: BoxConstraints) -> Result<()> {
        let root = self.root.ok_or(Error::NoRoot)?;
        if self.node(root)?.constraints != Some(root_constraints) {
            self.layout_roots.insert(root);
        }

        let mut queue: Vec<(usize, NodeId)> = self
            .layout_roots
            .iter()
            .filter_map(|&id| self.depth(id).ok().map(|depth| (depth, id)))
            .collect();
        queue.sort_by_key(|&(depth, _)| depth);

        for (_, id) in queue {
            let Ok(node) = self.node(id) else {
                continue;
            };
            if !node.attached {
                continue;
            }
            let constraints = if id == root {
                root_constraints
            } else if node.dirty.needs_layout() {
                match node.constraints {
                    Some(constraints) => constraints,
                    None => continue,
                }
            } else {
                continue;
            };

            log::trace!("relayout boundary {:?} ({})", id, node.kind);
            self.layout(id, constraints, false)?;
        }

        self.layout_roots.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Paint
    // ------------------------------------------------------------------

    /// Paint `id` at `offset` (its top-left corner in surface coordinates).
    pub fn paint_node(&self, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let node = self.node(id)?;
        if node.dirty.needs_layout() {
            return Err(Error::NotLaidOut(id));
        }
        let size = node.size.ok_or(Error::NotLaidOut(id))?;
        let object = node.object.as_ref().ok_or(Error::UnknownNode(id))?;

        ctx.record_painted(id);
        object.paint(self, id, ctx, offset)?;
        ctx.debug_boundary(offset, size);
        Ok(())
    }

    /// Paint every child of `id` in list order, each at `offset` plus the
    /// child's own parent-data offset.
    pub fn paint_children(&self, id: NodeId, ctx: &mut PaintingContext<'_>, offset: Offset) -> Result<()> {
        let node = self.node(id)?;
        for child in node.children.forward(self) {
            let child_offset = self.node(child)?.parent_data.offset;
            self.paint_node(child, ctx, offset + child_offset)?;
        }
        Ok(())
    }

    /// Clear the paint flag of every node painted in the last pass.
    pub(crate) fn complete_paint(&mut self, painted: &[NodeId]) {
        for &id in painted {
            if let Ok(node) = self.node_mut(id) {
                node.dirty.complete_paint();
            }
        }
        self.stats.nodes_painted += painted.len() as u64;
    }

    // ------------------------------------------------------------------
    // Hit testing
    // ------------------------------------------------------------------

    /// Hit test `id` with `position` in its local coordinates.
    pub fn hit_test(&self, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        let node = self.node(id)?;
        if node.size.is_none() {
            return Err(Error::NotLaidOut(id));
        }
        node.object
            .as_ref()
            .ok_or(Error::UnknownNode(id))?
            .hit_test(self, id, result, position)
    }

    /// Test children topmost first, stopping at the first hit.
    pub fn hit_test_children(&self, id: NodeId, result: &mut HitTestResult, position: Offset) -> Result<bool> {
        let node = self.node(id)?;
        for child in node.children.backward(self) {
            let child_offset = self.node(child)?.parent_data.offset;
            if self.hit_test(child, result, position - child_offset)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Deliver an event to the object behind `id`.
    pub(crate) fn dispatch_to(&mut self, id: NodeId, event: &PointerEvent) -> Result<bool> {
        self.with_object_mut(id, |object, _| object.handle_event(event))
    }

    // ------------------------------------------------------------------
    // Collaborators
    // ------------------------------------------------------------------

    /// Replace the text measurer; every attached paragraph is re-measured.
    pub fn set_text_measurer(&mut self, measurer: impl TextMeasurer + 'static) {
        *self.text_measurer.get_mut() = Some(Box::new(measurer));
        let paragraphs: Vec<NodeId> = self
            .dense
            .iter()
            .filter(|n| matches!(n.object, Some(RenderObject::Paragraph(_))))
            .map(|n| NodeId::new(n.sparse_index, self.generation_of(n.sparse_index)))
            .collect();
        for id in paragraphs {
            self.mark_needs_layout(id);
        }
    }

    fn generation_of(&self, sparse_index: u32) -> u32 {
        self.sparse[sparse_index as usize]
            .as_ref()
            .map(|e| e.generation)
            .unwrap_or(0)
    }

    /// Measure text with the installed measurer, creating the cosmic-text
    /// one on first use.
    pub fn measure_text(&self, text: &str, style: &TextStyle, min_width: f32, max_width: f32) -> Size {
        let mut measurer = self.text_measurer.borrow_mut();
        measurer
            .get_or_insert_with(|| Box::new(CosmicTextMeasurer::new()))
            .measure(text, style, min_width, max_width)
    }

    pub fn with_text_measurer<R>(&self, f: impl FnOnce(&mut dyn TextMeasurer) -> R) -> R {
        let mut measurer = self.text_measurer.borrow_mut();
        let measurer = measurer.get_or_insert_with(|| Box::new(CosmicTextMeasurer::new()));
        f(measurer.as_mut())
    }

    pub(crate) fn request_image(&mut self, request: ImageRequest) {
        self.image_requests.push(request);
    }

    pub(crate) fn take_image_requests(&mut self) -> Vec<ImageRequest> {
        std::mem::take(&mut self.image_requests)
    }

    /// Hand an image notification to the node it was issued for.
    ///
    /// Returns `false` when the notification is stale: the node is gone,
    /// detached, or has moved on to another image since the request.
    pub fn deliver_image_event(&mut self, ticket: ImageTicket, event: ImageEvent) -> bool {
        let Ok(node) = self.node_mut(ticket.node) else {
            log::debug!("dropping image notification for removed node {:?}", ticket.node);
            self.stats.image_notifications_dropped += 1;
            return false;
        };
        if !node.attached {
            log::debug!("dropping image notification for detached node {:?}", ticket.node);
            self.stats.image_notifications_dropped += 1;
            return false;
        }

        let invalidation = match node.object.as_mut() {
            Some(RenderObject::Image(image)) => image.apply_event(ticket.generation, event),
            _ => None,
        };
        match invalidation {
            Some(flags) => {
                self.stats.image_notifications_applied += 1;
                if flags.contains(DirtyFlags::NEEDS_LAYOUT) {
                    self.mark_needs_layout(ticket.node);
                }
                if flags.contains(DirtyFlags::NEEDS_PAINT) {
                    self.mark_needs_paint(ticket.node);
                }
                true
            }
            None => {
                log::debug!("dropping superseded image notification for {:?}", ticket.node);
                self.stats.image_notifications_dropped += 1;
                false
            }
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub(crate) fn take_stats(&mut self) -> FrameStats {
        std::mem::take(&mut self.stats)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl SiblingStore for Tree {
    fn siblings(&self, id: NodeId) -> Siblings {
        self.node(id)
            .map(|n| n.parent_data.siblings)
            .unwrap_or_default()
    }

    fn set_siblings(&mut self, id: NodeId, siblings: Siblings) {
        if let Ok(node) = self.node_mut(id) {
            node.parent_data.siblings = siblings;
        }
    }
}

fn wrong_kind<T: ObjectKind>(id: NodeId, actual: &'static str) -> Error {
    Error::InvalidArgument(format!("{id:?} is a {actual}, not a {}", T::KIND))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Axis, Flex};
    use crate::alignment::Alignment;
    use crate::objects::{Align, ColoredBox, ConstrainedBox, Padding, View};
    use crate::painting::Color;

    fn sized(tree: &mut Tree, width: f32, height: f32) -> NodeId {
        tree.insert_node(ConstrainedBox::tight_for(Some(width), Some(height)))
    }

    #[test]
    fn test_insert_and_remove_node() {
        let mut tree = Tree::new();
        let a = tree.insert_node(View::new());
        let b = tree.insert_node(View::new());
        assert!(tree.contains(a));
        assert_eq!(tree.len(), 2);

        tree.remove_node(a).unwrap();
        assert!(!tree.contains(a));
        assert!(tree.contains(b));

        // Slot reuse bumps the generation
        let c = tree.insert_node(View::new());
        assert_ne!(a, c);
        assert!(matches!(tree.object(a), Err(Error::UnknownNode(_))));
    }

    #[test]
    fn test_remove_node_destroys_subtree() {
        let mut tree = Tree::new();
        let parent = tree.insert_node(Flex::new(Axis::Horizontal));
        let child = tree.insert_node(View::new());
        let grandchild = tree.insert_node(View::new());
        tree.append_child(parent, child).unwrap();
        tree.append_child(child, grandchild).unwrap();

        tree.remove_node(child).unwrap();
        assert!(!tree.contains(child));
        assert!(!tree.contains(grandchild));
        assert_eq!(tree.child_count(parent).unwrap(), 0);
    }

    #[test]
    fn test_child_list_order() {
        let mut tree = Tree::new();
        let parent = tree.insert_node(Flex::new(Axis::Horizontal));
        let a = tree.insert_node(View::new());
        let b = tree.insert_node(View::new());
        let c = tree.insert_node(View::new());

        tree.append_child(parent, a).unwrap();
        tree.append_child(parent, c).unwrap();
        tree.insert_child(parent, b, Some(a)).unwrap();

        assert_eq!(tree.children(parent), vec![a, b, c]);
        assert_eq!(tree.children_rev(parent), vec![c, b, a]);
        assert_eq!(tree.next_sibling(a).unwrap(), Some(b));
        assert_eq!(tree.previous_sibling(c).unwrap(), Some(b));

        tree.remove_child(parent, b).unwrap();
        assert_eq!(tree.children(parent), vec![a, c]);
        assert_eq!(tree.parent(b).unwrap(), None);
        assert!(tree.contains(b));
    }

    #[test]
    fn test_adoption_errors() {
        let mut tree = Tree::new();
        let parent = tree.insert_node(Padding::new(4.0));
        let a = tree.insert_node(View::new());
        let b = tree.insert_node(View::new());

        tree.append_child(parent, a).unwrap();
        assert!(matches!(
            tree.append_child(parent, b),
            Err(Error::TooManyChildren { .. })
        ));
        assert!(matches!(
            tree.append_child(b, a),
            Err(Error::AlreadyAdopted { .. })
        ));
        assert!(matches!(
            tree.append_child(a, parent),
            Err(Error::WouldCreateCycle { .. })
        ));
        assert!(matches!(
            tree.remove_child(b, a),
            Err(Error::NotAChild { .. })
        ));
    }

    #[test]
    fn test_set_child_replaces() {
        let mut tree = Tree::new();
        let parent = tree.insert_node(Padding::new(4.0));
        let a = tree.insert_node(View::new());
        let b = tree.insert_node(View::new());

        assert_eq!(tree.set_child(parent, Some(a)).unwrap(), None);
        assert_eq!(tree.set_child(parent, Some(b)).unwrap(), Some(a));
        assert_eq!(tree.children(parent), vec![b]);
        assert_eq!(tree.parent(a).unwrap(), None);
    }

    #[test]
    fn test_flex_parent_data_installed_on_adoption() {
        let mut tree = Tree::new();
        let row = tree.insert_node(Flex::new(Axis::Horizontal));
        let plain = tree.insert_node(View::new());
        let flexible = tree.insert_node(View::new());
        tree.set_parent_data(flexible, ParentDataKind::flexible(2)).unwrap();

        tree.append_child(row, plain).unwrap();
        tree.append_child(row, flexible).unwrap();

        assert_eq!(tree.parent_data(plain).unwrap().flex(), 0);
        assert!(tree.parent_data(plain).unwrap().kind.is_flex());
        assert_eq!(tree.parent_data(flexible).unwrap().flex(), 2);
    }

    #[test]
    fn test_depth_and_trace() {
        let mut tree = Tree::new();
        let root = tree.insert_node(View::new());
        let row = tree.insert_node(Flex::new(Axis::Horizontal));
        let padding = tree.insert_node(Padding::new(2.0));
        tree.append_child(root, row).unwrap();
        tree.append_child(row, padding).unwrap();

        assert_eq!(tree.depth(root).unwrap(), 0);
        assert_eq!(tree.depth(padding).unwrap(), 2);
        assert_eq!(tree.ancestor_trace(padding), "View → Flex → Padding");
    }

    #[test]
    fn test_layout_memoizes_clean_nodes() {
        let mut tree = Tree::new();
        let node = sized(&mut tree, 10.0, 10.0);
        let c = BoxConstraints::loose(Size::new(100.0, 100.0));

        tree.layout(node, c, false).unwrap();
        assert_eq!(tree.stats().layouts_executed, 1);

        tree.layout(node, c, false).unwrap();
        assert_eq!(tree.stats().layouts_executed, 1);
        assert_eq!(tree.stats().layouts_skipped, 1);

        // A parent that reads the size always gets a fresh computation
        tree.layout(node, c, true).unwrap();
        assert_eq!(tree.stats().layouts_executed, 2);
    }

    #[test]
    fn test_layout_rejects_malformed_constraints() {
        let mut tree = Tree::new();
        let node = sized(&mut tree, 10.0, 10.0);
        let bad = BoxConstraints::new(20.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            tree.layout(node, bad, false),
            Err(Error::InvalidConstraints { .. })
        ));
    }

    #[test]
    fn test_mark_needs_layout_bubbles_to_boundary() {
        let mut tree = Tree::new();
        let root = tree.insert_node(View::new());
        let padding = tree.insert_node(Padding::new(5.0));
        let align = tree.insert_node(Align::new(Alignment::CENTER));
        let leaf = sized(&mut tree, 10.0, 10.0);
        tree.append_child(root, padding).unwrap();
        tree.append_child(padding, align).unwrap();
        tree.append_child(align, leaf).unwrap();
        tree.set_root(root).unwrap();
        tree.flush_layout(BoxConstraints::tight(Size::new(100.0, 100.0)))
            .unwrap();

        assert!(!tree.needs_layout(root));
        assert!(!tree.needs_layout(leaf));

        // Align receives tight constraints, so it is a boundary; its child
        // gets loose constraints and a parent that reads its size.
        assert!(tree.is_relayout_boundary(align));
        assert!(!tree.is_relayout_boundary(leaf));

        tree.mark_needs_layout(leaf);
        tree.mark_needs_layout(leaf);
        assert!(tree.needs_layout(leaf));
        assert!(tree.needs_layout(align));
        assert!(!tree.needs_layout(padding));
        assert!(!tree.needs_layout(root));
        assert_eq!(tree.pending_layout_roots(), 1);
    }

    #[test]
    fn test_update_reports_wrong_kind() {
        let mut tree = Tree::new();
        let node = tree.insert_node(View::new());
        let err = tree
            .update::<ColoredBox, _>(node, |b| b.set_color(Color::BLACK))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
