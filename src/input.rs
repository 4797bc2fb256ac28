//! Normalized pointer input.
//!
//! Raw mouse and touch events belong to the host. Each frame the host reduces
//! them to a [`PointerState`] in surface pixels and passes it to `tick`.
//!
//! ```ignore
//! let pointer = PointerState {
//!     position: Vec2::new(cursor_x, cursor_y),
//!     pressed: left_button_down,
//!     inside: cursor_over_surface,
//! };
//! let frame = session.tick(now_ms, &pointer);
//! ```

use glam::Vec2;

/// Pointer snapshot for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Position in surface pixels.
    pub position: Vec2,
    /// Primary button or touch is down.
    pub pressed: bool,
    /// Pointer is over the surface.
    pub inside: bool,
}

impl PointerState {
    /// Pointer away from the surface; exerts no force.
    pub fn outside() -> Self {
        Self::default()
    }

    /// Pointer over the surface with no button held.
    pub fn hovering(position: Vec2) -> Self {
        Self {
            position,
            pressed: false,
            inside: true,
        }
    }

    /// Pointer over the surface with the button held.
    pub fn pressing(position: Vec2) -> Self {
        Self {
            position,
            pressed: true,
            inside: true,
        }
    }

    /// Same state expressed relative to a layout origin.
    pub fn relative_to(&self, origin: Vec2) -> Self {
        Self {
            position: self.position - origin,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outside_is_inert() {
        let p = PointerState::outside();
        assert!(!p.inside);
        assert!(!p.pressed);
    }

    #[test]
    fn test_relative_to_offset() {
        let p = PointerState::pressing(Vec2::new(300.0, 200.0)).relative_to(Vec2::new(100.0, 50.0));
        assert_eq!(p.position, Vec2::new(200.0, 150.0));
        assert!(p.pressed && p.inside);
    }
}
