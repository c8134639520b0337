// Chunk: docs/chunks/pane_resize - Shared pointer event types crate
//!
//! Pointer event types for divider dragging and other pointer-driven
//! interaction.
//!
//! These types abstract over whatever windowing layer the host uses and
//! provide a plain Rust interface for pointer handling. This crate is shared
//! between the workspace core and its hosts to avoid pulling host types into
//! the core.

/// Identifier for a single pointer (mouse, pen, or one touch contact).
///
/// A divider drag "captures" the pointer that started it; events from other
/// pointers are ignored until the capture is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u32);

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Primary button pressed
    Down,
    /// Pointer moved (with or without a button held)
    Move,
    /// Primary button released
    Up,
    /// The host lost the pointer (window blur, capture stolen, etc.)
    Cancel,
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The phase of the event
    pub phase: PointerPhase,
    /// Which pointer produced the event
    pub pointer_id: PointerId,
    /// Position in container coordinates (pixels from top-left)
    pub position: (f64, f64),
}

impl PointerEvent {
    /// Creates a new pointer event for the default pointer.
    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            phase,
            pointer_id: PointerId::default(),
            position: (x, y),
        }
    }

    /// Creates a `Down` event at the given x position.
    pub fn down(x: f64) -> Self {
        Self::new(PointerPhase::Down, x, 0.0)
    }

    /// Creates a `Move` event at the given x position.
    pub fn moved(x: f64) -> Self {
        Self::new(PointerPhase::Move, x, 0.0)
    }

    /// Creates an `Up` event at the given x position.
    pub fn up(x: f64) -> Self {
        Self::new(PointerPhase::Up, x, 0.0)
    }

    /// Returns the same event attributed to another pointer.
    pub fn with_pointer(mut self, pointer_id: PointerId) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Horizontal position of the pointer.
    pub fn x(&self) -> f64 {
        self.position.0
    }
}
