use crate::keys::{KeyCode, MouseButton};
use glam::Vec2;
use std::collections::HashSet;

/// Accumulated device state between frames.
///
/// Held keys and buttons persist across frames. Key press/release edges
/// persist until [`InputState::end_frame`]. Drag deltas accumulate into a
/// pending rotation until [`InputState::take_rotation_delta`] drains them.
#[derive(Debug, Clone)]
pub struct InputState {
    keys_held: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    buttons_held: HashSet<MouseButton>,
    rotate_button: MouseButton,
    cursor: Option<Vec2>,
    /// Baseline for the current drag. `None` until the first sample arrives.
    drag_origin: Option<Vec2>,
    first_sample_armed: bool,
    pending_rotation: Vec2,
}

impl InputState {
    /// Tracker that rotates on a left-button drag.
    pub fn new() -> Self {
        Self::with_rotate_button(MouseButton::Left)
    }

    pub fn with_rotate_button(rotate_button: MouseButton) -> Self {
        Self {
            keys_held: HashSet::new(),
            keys_pressed: HashSet::new(),
            keys_released: HashSet::new(),
            buttons_held: HashSet::new(),
            rotate_button,
            cursor: None,
            drag_origin: None,
            first_sample_armed: false,
            pending_rotation: Vec2::ZERO,
        }
    }

    pub fn rotate_button(&self) -> MouseButton {
        self.rotate_button
    }

    //--- Event intake -----------------------------------------------------

    /// Record a key going down or up. Auto-repeat presses of a held key do
    /// not produce a second press edge.
    pub fn on_key_change(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_held.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_held.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    /// Record a pointer button change. Pressing the rotate button arms the
    /// first-sample flag so the next move only captures a baseline.
    pub fn on_mouse_button_change(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            let newly_down = self.buttons_held.insert(button);
            if newly_down && button == self.rotate_button {
                self.first_sample_armed = true;
                self.drag_origin = None;
                tracing::debug!("rotate drag armed");
            }
        } else if self.buttons_held.remove(&button) && button == self.rotate_button {
            self.first_sample_armed = false;
            self.drag_origin = None;
        }
    }

    /// Record a pointer move. Returns the rotation delta this sample
    /// contributed, if any. The delta is `last - current`.
    pub fn on_mouse_move(&mut self, x: f32, y: f32) -> Option<Vec2> {
        let current = Vec2::new(x, y);
        self.cursor = Some(current);

        if !self.is_button_held(self.rotate_button) {
            return None;
        }

        if self.first_sample_armed {
            self.first_sample_armed = false;
            self.drag_origin = Some(current);
            return None;
        }

        let last = self.drag_origin?;
        let delta = last - current;
        self.drag_origin = Some(current);
        self.pending_rotation += delta;
        Some(delta)
    }

    //--- Queries ----------------------------------------------------------

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Key went down since the last [`InputState::end_frame`].
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Key went up since the last [`InputState::end_frame`].
    pub fn was_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    pub fn is_dragging(&self) -> bool {
        self.is_button_held(self.rotate_button)
    }

    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    pub fn held_keys(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.keys_held.iter().copied()
    }

    /// Rotation accumulated since the last drain, without consuming it.
    pub fn pending_rotation(&self) -> Vec2 {
        self.pending_rotation
    }

    //--- Consumption ------------------------------------------------------

    /// Drain the accumulated rotation delta.
    pub fn take_rotation_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.pending_rotation)
    }

    /// Clear per-frame edges. Held state is kept.
    pub fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        self.keys_held.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_held.clear();
        self.drag_origin = None;
        self.first_sample_armed = false;
        self.pending_rotation = Vec2::ZERO;
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragging() -> InputState {
        let mut input = InputState::new();
        input.on_mouse_button_change(MouseButton::Left, true);
        input
    }

    #[test]
    fn key_press_and_release_edges() {
        let mut input = InputState::new();
        input.on_key_change(KeyCode::KeyW, true);
        assert!(input.is_held(KeyCode::KeyW));
        assert!(input.was_pressed(KeyCode::KeyW));

        input.end_frame();
        assert!(input.is_held(KeyCode::KeyW));
        assert!(!input.was_pressed(KeyCode::KeyW));

        input.on_key_change(KeyCode::KeyW, false);
        assert!(!input.is_held(KeyCode::KeyW));
        assert!(input.was_released(KeyCode::KeyW));
    }

    #[test]
    fn key_repeat_does_not_re_press() {
        let mut input = InputState::new();
        input.on_key_change(KeyCode::KeyA, true);
        input.end_frame();
        input.on_key_change(KeyCode::KeyA, true);
        assert!(!input.was_pressed(KeyCode::KeyA));
        assert!(input.is_held(KeyCode::KeyA));
    }

    #[test]
    fn first_sample_after_press_emits_nothing() {
        let mut input = dragging();
        assert_eq!(input.on_mouse_move(100.0, 100.0), None);
        assert_eq!(input.pending_rotation(), Vec2::ZERO);
    }

    #[test]
    fn second_sample_emits_inverted_delta() {
        let mut input = dragging();
        input.on_mouse_move(100.0, 100.0);
        let delta = input.on_mouse_move(90.0, 80.0);
        assert_eq!(delta, Some(Vec2::new(10.0, 20.0)));
        assert_eq!(input.take_rotation_delta(), Vec2::new(10.0, 20.0));
        assert_eq!(input.take_rotation_delta(), Vec2::ZERO);
    }

    #[test]
    fn no_motion_while_rotate_button_released() {
        let mut input = InputState::new();
        assert_eq!(input.on_mouse_move(10.0, 10.0), None);
        assert_eq!(input.on_mouse_move(50.0, 70.0), None);
        assert_eq!(input.pending_rotation(), Vec2::ZERO);
        assert_eq!(input.cursor(), Some(Vec2::new(50.0, 70.0)));
    }

    #[test]
    fn other_buttons_do_not_arm_a_drag() {
        let mut input = InputState::new();
        input.on_mouse_button_change(MouseButton::Right, true);
        input.on_mouse_move(0.0, 0.0);
        assert_eq!(input.on_mouse_move(5.0, 5.0), None);
        assert!(!input.is_dragging());
    }

    #[test]
    fn each_drag_rearms_the_baseline() {
        let mut input = dragging();
        input.on_mouse_move(0.0, 0.0);
        input.on_mouse_move(-4.0, 0.0);
        input.on_mouse_button_change(MouseButton::Left, false);

        // Cursor jumps while released; the next drag must not see the jump.
        input.on_mouse_move(500.0, 500.0);
        input.on_mouse_button_change(MouseButton::Left, true);
        assert_eq!(input.on_mouse_move(600.0, 600.0), None);
        assert_eq!(input.on_mouse_move(598.0, 600.0), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(input.take_rotation_delta(), Vec2::new(6.0, 0.0));
    }

    #[test]
    fn deltas_accumulate_until_drained() {
        let mut input = dragging();
        input.on_mouse_move(0.0, 0.0);
        input.on_mouse_move(-1.0, 0.0);
        input.on_mouse_move(-3.0, 2.0);
        assert_eq!(input.pending_rotation(), Vec2::new(3.0, -2.0));
    }

    #[test]
    fn custom_rotate_button() {
        let mut input = InputState::with_rotate_button(MouseButton::Right);
        input.on_mouse_button_change(MouseButton::Right, true);
        input.on_mouse_move(10.0, 10.0);
        assert_eq!(input.on_mouse_move(0.0, 10.0), Some(Vec2::new(10.0, 0.0)));
    }

    #[test]
    fn reset_releases_everything() {
        let mut input = dragging();
        input.on_key_change(KeyCode::KeyW, true);
        input.on_mouse_move(0.0, 0.0);
        input.on_mouse_move(1.0, 1.0);
        input.reset();
        assert!(!input.is_held(KeyCode::KeyW));
        assert!(!input.is_dragging());
        assert_eq!(input.pending_rotation(), Vec2::ZERO);
        assert_eq!(input.held_keys().count(), 0);
    }
}
