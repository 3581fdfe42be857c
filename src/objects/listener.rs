use std::fmt;

use super::{dry_layout_proxy, layout_proxy, RenderBox};
use crate::error::Result;
use crate::events::{PointerEvent, PointerEventKind};
use crate::geometry::Offset;
use crate::layout::{BoxConstraints, Size};
use crate::tree::{NodeId, Tree};

pub type PointerCallback = Box<dyn FnMut(&PointerEvent)>;

/// Calls back on pointer events that hit its child.
///
/// The listener itself is transparent: it is part of the hit chain only when
/// one of its descendants is hit.
#[derive(Default)]
pub struct PointerListener {
    on_down: Option<PointerCallback>,
    on_move: Option<PointerCallback>,
    on_up: Option<PointerCallback>,
    on_cancel: Option<PointerCallback>,
    on_signal: Option<PointerCallback>,
}

impl PointerListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_down(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_down = Some(Box::new(f));
        self
    }

    pub fn on_move(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_move = Some(Box::new(f));
        self
    }

    pub fn on_up(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_up = Some(Box::new(f));
        self
    }

    pub fn on_cancel(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_cancel = Some(Box::new(f));
        self
    }

    pub fn on_signal(mut self, f: impl FnMut(&PointerEvent) + 'static) -> Self {
        self.on_signal = Some(Box::new(f));
        self
    }

    fn callback_for(&mut self, kind: PointerEventKind) -> Option<&mut PointerCallback> {
        match kind {
            PointerEventKind::Down => self.on_down.as_mut(),
            PointerEventKind::Move => self.on_move.as_mut(),
            PointerEventKind::Up => self.on_up.as_mut(),
            PointerEventKind::Cancel => self.on_cancel.as_mut(),
            PointerEventKind::Signal { .. } => self.on_signal.as_mut(),
        }
    }
}

impl fmt::Debug for PointerListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListener")
            .field("on_down", &self.on_down.is_some())
            .field("on_move", &self.on_move.is_some())
            .field("on_up", &self.on_up.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_signal", &self.on_signal.is_some())
            .finish()
    }
}

impl RenderBox for PointerListener {
    fn perform_layout(&mut self, tree: &mut Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        layout_proxy(tree, id, constraints)
    }

    fn dry_layout(&self, tree: &Tree, id: NodeId, constraints: BoxConstraints) -> Result<Size> {
        dry_layout_proxy(tree, id, constraints)
    }

    fn hit_test_self(&self, _size: Size, _position: Offset) -> bool {
        false
    }

    fn handle_event(&mut self, event: &PointerEvent) -> bool {
        match self.callback_for(event.kind) {
            Some(callback) => {
                callback(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_routes_by_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let downs = Rc::clone(&seen);
        let mut listener = PointerListener::new().on_down(move |e| downs.borrow_mut().push(e.position));

        assert!(listener.handle_event(&PointerEvent::down(Offset::new(1.0, 2.0))));
        assert!(!listener.handle_event(&PointerEvent::up(Offset::new(1.0, 2.0))));
        assert_eq!(*seen.borrow(), vec![Offset::new(1.0, 2.0)]);
    }

    #[test]
    fn test_not_a_hit_target_on_its_own() {
        let listener = PointerListener::new();
        assert!(!listener.hit_test_self(Size::new(10.0, 10.0), Offset::new(1.0, 1.0)));
    }
}
