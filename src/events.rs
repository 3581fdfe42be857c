use crate::geometry::Offset;

/// Kind of pointer event delivered to the hit-test chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
    /// Scroll wheel or similar discrete signal.
    Signal { delta: Offset },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Position in the receiver's coordinate space. Events handed to the
    /// pipeline use root coordinates; each listener sees its local position.
    pub position: Offset,
    /// Identifies the pointer (mouse, touch contact) this event belongs to.
    pub pointer: u32,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, position: Offset) -> Self {
        Self {
            kind,
            position,
            pointer: 0,
        }
    }

    pub fn down(position: Offset) -> Self {
        Self::new(PointerEventKind::Down, position)
    }

    pub fn moved(position: Offset) -> Self {
        Self::new(PointerEventKind::Move, position)
    }

    pub fn up(position: Offset) -> Self {
        Self::new(PointerEventKind::Up, position)
    }

    pub fn cancel(position: Offset) -> Self {
        Self::new(PointerEventKind::Cancel, position)
    }

    pub fn signal(position: Offset, delta: Offset) -> Self {
        Self::new(PointerEventKind::Signal { delta }, position)
    }

    pub fn with_pointer(mut self, pointer: u32) -> Self {
        self.pointer = pointer;
        self
    }

    /// The same event re-expressed at another position.
    pub fn at(&self, position: Offset) -> Self {
        Self { position, ..*self }
    }
}
