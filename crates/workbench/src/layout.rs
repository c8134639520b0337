// Chunk: docs/chunks/pane_resize - Divider drag controllers
//!
//! Divider drag controllers for the two resizable panes.
//!
//! Each controller is a small state machine:
//!
//! ```text
//! Idle --Down--> Dragging { pointer, start_x, start_width } --Up/Cancel--> Idle
//! ```
//!
//! While dragging, every move recomputes
//! `clamp(start_width + (x - start_x), min, container - min_other)`. The
//! clamped value is the live layout; there is no separate commit.
//!
//! `FileTreeResize` keeps its width in pixels. `SplitResize` keeps the chat
//! pane as a fraction of the container so it survives container resizes.

use workbench_input::{PointerEvent, PointerId, PointerPhase};

use crate::config::{FileTreeConfig, SplitConfig};

/// Clamps a pane width between its floor and what the other pane leaves.
///
/// When the container cannot fit both floors, this pane's floor wins. A
/// non-finite floor counts as zero, and a non-finite bound or width yields
/// the floor.
pub fn clamp_width(width: f64, min: f64, container: f64, min_other: f64) -> f64 {
    let min = if min.is_finite() { min.max(0.0) } else { 0.0 };
    let max = container - min_other;
    if !max.is_finite() || max <= min || width.is_nan() {
        return min;
    }
    width.clamp(min, max)
}

/// Drag state shared by both controllers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        pointer: PointerId,
        start_x: f64,
        start_width: f64,
    },
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Feeds one event. Returns the unclamped target width when the event
    /// belongs to the captured pointer.
    fn step(&mut self, event: &PointerEvent, current_width: f64) -> Option<f64> {
        match (*self, event.phase) {
            (DragState::Idle, PointerPhase::Down) => {
                *self = DragState::Dragging {
                    pointer: event.pointer_id,
                    start_x: event.x(),
                    start_width: current_width,
                };
                None
            }
            (
                DragState::Dragging {
                    pointer,
                    start_x,
                    start_width,
                },
                phase,
            ) if pointer == event.pointer_id => {
                let target = start_width + (event.x() - start_x);
                match phase {
                    PointerPhase::Move => Some(target),
                    PointerPhase::Up => {
                        *self = DragState::Idle;
                        Some(target)
                    }
                    PointerPhase::Cancel => {
                        *self = DragState::Idle;
                        None
                    }
                    PointerPhase::Down => None,
                }
            }
            _ => None,
        }
    }
}

// =============================================================================
// FileTreeResize
// =============================================================================

/// File-tree pane width against the main canvas, in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTreeResize {
    width: f64,
    config: FileTreeConfig,
    drag: DragState,
}

impl FileTreeResize {
    pub fn new(config: FileTreeConfig) -> Self {
        Self {
            width: config.default_width,
            config,
            drag: DragState::Idle,
        }
    }

    /// Handles a pointer event on the divider. Returns true if the width
    /// changed.
    pub fn handle(&mut self, event: &PointerEvent, container_width: f64) -> bool {
        let Some(target) = self.drag.step(event, self.width) else {
            return false;
        };
        let width = clamp_width(
            target,
            self.config.min_width,
            container_width,
            self.config.min_main_width,
        );
        let changed = width != self.width;
        self.width = width;
        changed
    }

    /// Current width, clamped to the given container.
    pub fn width(&self, container_width: f64) -> f64 {
        clamp_width(
            self.width,
            self.config.min_width,
            container_width,
            self.config.min_main_width,
        )
    }

    /// Width as last set, without reclamping.
    pub fn raw_width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width.max(self.config.min_width);
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }
}

// =============================================================================
// SplitResize
// =============================================================================

/// Chat pane width against the canvas panel, stored as a fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResize {
    ratio: f64,
    config: SplitConfig,
    drag: DragState,
}

impl SplitResize {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            ratio: config.default_ratio.clamp(0.0, 1.0),
            config,
            drag: DragState::Idle,
        }
    }

    /// Handles a pointer event on the split divider. Returns true if the
    /// ratio changed.
    pub fn handle(&mut self, event: &PointerEvent, container_width: f64) -> bool {
        if !container_width.is_finite() || container_width <= 0.0 {
            return false;
        }
        let current = self.chat_width(container_width);
        let Some(target) = self.drag.step(event, current) else {
            return false;
        };
        let width = clamp_width(
            target,
            self.config.min_chat_width,
            container_width,
            self.config.min_canvas_width,
        );
        let ratio = (width / container_width).clamp(0.0, 1.0);
        let changed = ratio != self.ratio;
        self.ratio = ratio;
        changed
    }

    /// Chat pane width in pixels for the given container.
    pub fn chat_width(&self, container_width: f64) -> f64 {
        clamp_width(
            self.ratio * container_width,
            self.config.min_chat_width,
            container_width,
            self.config.min_canvas_width,
        )
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.clamp(0.0, 1.0);
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }
}

// =============================================================================
// Tests
// =============================================================================
