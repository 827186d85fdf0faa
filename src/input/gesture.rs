//! Pointer drag gesture
//!
//! Press, move, release. A press that never moves is a click on whatever
//! was under the pointer; a press that moves turns into a drag and reports
//! deltas until release.

use macroquad::math::Vec2;

use crate::game::Entity;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragGesture {
    #[default]
    Idle,
    /// Button down, pointer hasn't moved yet
    Pressed { origin: Vec2, target: Option<Entity> },
    /// Button down and moving
    Dragging { last: Vec2, target: Option<Entity> },
}

/// What the gesture produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    Click { at: Vec2, target: Option<Entity> },
    Drag { delta: Vec2, target: Option<Entity> },
}

impl DragGesture {
    /// Button went down over `target`. Restarts any gesture in progress.
    pub fn press(&mut self, at: Vec2, target: Option<Entity>) {
        *self = DragGesture::Pressed { origin: at, target };
    }

    /// Pointer moved while the button may be down.
    pub fn motion(&mut self, at: Vec2) -> Option<GestureEvent> {
        let (from, target) = match *self {
            DragGesture::Idle => return None,
            DragGesture::Pressed { origin, target } => (origin, target),
            DragGesture::Dragging { last, target } => (last, target),
        };
        let delta = at - from;
        if delta == Vec2::ZERO {
            return None;
        }
        *self = DragGesture::Dragging { last: at, target };
        Some(GestureEvent::Drag { delta, target })
    }

    /// Button went up.
    pub fn release(&mut self, at: Vec2) -> Option<GestureEvent> {
        match std::mem::take(self) {
            DragGesture::Pressed { target, .. } => Some(GestureEvent::Click { at, target }),
            DragGesture::Idle | DragGesture::Dragging { .. } => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragGesture::Dragging { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn test_press_release_is_click() {
        let target = Entity::from_raw(3);
        let mut g = DragGesture::default();
        g.press(v(5.0, 5.0), target);
        assert_eq!(g.release(v(5.0, 5.0)), Some(GestureEvent::Click { at: v(5.0, 5.0), target }));
        assert_eq!(g, DragGesture::Idle);
    }

    #[test]
    fn test_motion_turns_press_into_drag() {
        let mut g = DragGesture::default();
        g.press(v(10.0, 10.0), None);

        assert_eq!(g.motion(v(13.0, 8.0)), Some(GestureEvent::Drag { delta: v(3.0, -2.0), target: None }));
        assert!(g.is_dragging());
        assert_eq!(g.motion(v(14.0, 8.0)), Some(GestureEvent::Drag { delta: v(1.0, 0.0), target: None }));
        assert_eq!(g.release(v(14.0, 8.0)), None);
        assert_eq!(g, DragGesture::Idle);
    }

    #[test]
    fn test_zero_motion_keeps_click() {
        let mut g = DragGesture::default();
        g.press(v(1.0, 1.0), None);
        assert_eq!(g.motion(v(1.0, 1.0)), None);
        assert!(matches!(g.release(v(1.0, 1.0)), Some(GestureEvent::Click { .. })));
    }

    #[test]
    fn test_idle_ignores_motion_and_release() {
        let mut g = DragGesture::default();
        assert_eq!(g.motion(v(4.0, 4.0)), None);
        assert_eq!(g.release(v(4.0, 4.0)), None);
    }

    #[test]
    fn test_drag_keeps_press_target() {
        let target = Entity::from_raw(9);
        let mut g = DragGesture::default();
        g.press(v(0.0, 0.0), target);
        g.motion(v(2.0, 0.0));
        assert_eq!(g.motion(v(3.0, 0.0)), Some(GestureEvent::Drag { delta: v(1.0, 0.0), target }));
    }
}
