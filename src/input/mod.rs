//! Pointer input
//!
//! Mouse polling and the mapping between screen space and play-area pixels.
//! The play area is scaled uniformly to fit its slot on screen, so every
//! pointer position has to be mapped back before it reaches the engine.

mod gesture;

pub use gesture::{DragGesture, GestureEvent};

use macroquad::prelude::*;

/// Mouse state for one frame, already in play-area pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerState {
    pub position: Vec2,
    pub left_down: bool,
    pub left_pressed: bool,  // Just pressed this frame
    pub left_released: bool, // Just released this frame
}

impl PointerState {
    pub fn poll(layout: &PlayLayout) -> Self {
        let (mx, my) = mouse_position();
        Self {
            position: layout.to_local(Vec2::new(mx, my)),
            left_down: is_mouse_button_down(MouseButton::Left),
            left_pressed: is_mouse_button_pressed(MouseButton::Left),
            left_released: is_mouse_button_released(MouseButton::Left),
        }
    }
}

/// Where the play area sits on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayLayout {
    /// Screen position of the play area's top-left corner
    pub origin: Vec2,
    /// Screen pixels per play-area pixel
    pub scale: f32,
    /// Play area size in play-area pixels
    pub size: Vec2,
}

impl PlayLayout {
    /// Fit a play area into a screen slot, centred, keeping aspect ratio.
    pub fn fit(slot: Rect, play_width: u32, play_height: u32) -> Self {
        let size = Vec2::new(play_width as f32, play_height as f32);
        let scale = (slot.w / size.x).min(slot.h / size.y).max(f32::EPSILON);
        let origin = Vec2::new(
            slot.x + (slot.w - size.x * scale) * 0.5,
            slot.y + (slot.h - size.y * scale) * 0.5,
        );
        Self { origin, scale, size }
    }

    pub fn to_local(&self, screen: Vec2) -> Vec2 {
        (screen - self.origin) / self.scale
    }

    pub fn to_screen(&self, local: Vec2) -> Vec2 {
        self.origin + local * self.scale
    }

    /// The play area in screen space.
    pub fn screen_rect(&self) -> Rect {
        let size = self.size * self.scale;
        Rect::new(self.origin.x, self.origin.y, size.x, size.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_scales_uniformly_and_centres() {
        let layout = PlayLayout::fit(Rect::new(0.0, 0.0, 1280.0, 1200.0), 640, 480);
        assert_eq!(layout.scale, 2.0);
        assert_eq!(layout.origin, Vec2::new(0.0, 120.0));
    }

    #[test]
    fn test_local_and_screen_agree() {
        let layout = PlayLayout::fit(Rect::new(10.0, 20.0, 320.0, 240.0), 640, 480);
        let local = Vec2::new(100.0, 50.0);
        let screen = layout.to_screen(local);
        assert_eq!(screen, Vec2::new(60.0, 45.0));
        assert_eq!(layout.to_local(screen), local);
    }
}
