//! Pan state for the infinite grid: drag and wheel gestures move the content offset.

use glam::Vec2;

/// Current content offset of the grid plus an in-progress drag, if any.
#[derive(Debug, Clone, Default)]
pub struct GridPanState {
    /// Content offset in pixels. Positive shifts content right/down.
    pub offset: Vec2,
    /// Offset at the moment the active drag started.
    drag_origin: Option<Vec2>,
}

impl GridPanState {
    pub fn new(initial: Vec2) -> Self {
        Self {
            offset: initial,
            drag_origin: None,
        }
    }

    /// Whether the pointer is currently held down on the grid.
    pub fn is_moving(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn begin_drag(&mut self) {
        self.drag_origin = Some(self.offset);
    }

    /// Apply the total pointer movement since [`begin_drag`](Self::begin_drag).
    pub fn drag(&mut self, movement: Vec2) {
        if let Some(origin) = self.drag_origin {
            self.offset = origin + movement;
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Scroll the content opposite to the wheel delta.
    pub fn wheel(&mut self, delta: Vec2) {
        self.offset -= delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_is_relative_to_start() {
        let mut pan = GridPanState::new(Vec2::new(10.0, 20.0));
        pan.begin_drag();
        assert!(pan.is_moving());
        pan.drag(Vec2::new(5.0, 5.0));
        pan.drag(Vec2::new(30.0, -10.0));
        assert_eq!(pan.offset, Vec2::new(40.0, 10.0));
        pan.end_drag();
        assert!(!pan.is_moving());
    }

    #[test]
    fn test_drag_without_begin_is_ignored() {
        let mut pan = GridPanState::default();
        pan.drag(Vec2::new(100.0, 100.0));
        assert_eq!(pan.offset, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_scrolls_opposite_direction() {
        let mut pan = GridPanState::default();
        pan.wheel(Vec2::new(0.0, 40.0));
        assert_eq!(pan.offset, Vec2::new(0.0, -40.0));
    }
}
