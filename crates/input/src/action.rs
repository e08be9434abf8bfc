use crate::keys::KeyCode;
use crate::state::InputState;
use std::collections::BTreeMap;

/// One of the six camera-local movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
}

/// A camera-local axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Forward,
    Right,
    Up,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// The local axis this direction moves along and the sign along it.
    pub fn axis(self) -> (Axis, f32) {
        match self {
            Direction::Forward => (Axis::Forward, 1.0),
            Direction::Back => (Axis::Forward, -1.0),
            Direction::Right => (Axis::Right, 1.0),
            Direction::Left => (Axis::Right, -1.0),
            Direction::Up => (Axis::Up, 1.0),
            Direction::Down => (Axis::Up, -1.0),
        }
    }
}

/// A logical action a key can be bound to.
///
/// The camera controller consumes actions, never raw key codes, so
/// rebinding keys never touches controller logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continuous movement while the key is held.
    Move(Direction),
    /// Restore the initial camera pose on the press edge.
    ResetView,
}

/// Key → action table.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    map: BTreeMap<KeyCode, Action>,
}

impl KeyBindings {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    pub fn bind(&mut self, key: KeyCode, action: Action) -> Option<Action> {
        self.map.insert(key, action)
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<Action> {
        self.map.remove(&key)
    }

    pub fn action_for(&self, key: KeyCode) -> Option<Action> {
        self.map.get(&key).copied()
    }

    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = KeyCode> + '_ {
        self.map
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| *k)
    }

    /// True if any key bound to `Move(direction)` is held.
    pub fn is_direction_held(&self, direction: Direction, input: &InputState) -> bool {
        self.keys_for(Action::Move(direction))
            .any(|key| input.is_held(key))
    }

    /// True if any key bound to `action` went down since the last frame.
    pub fn was_triggered(&self, action: Action, input: &InputState) -> bool {
        self.keys_for(action).any(|key| input.was_pressed(key))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl Default for KeyBindings {
    /// WASD plus arrows for the horizontal plane, E/Q for up/down, R to reset.
    fn default() -> Self {
        let mut bindings = Self::new();
        let defaults = [
            (KeyCode::KeyW, Action::Move(Direction::Forward)),
            (KeyCode::KeyS, Action::Move(Direction::Back)),
            (KeyCode::KeyA, Action::Move(Direction::Left)),
            (KeyCode::KeyD, Action::Move(Direction::Right)),
            (KeyCode::KeyE, Action::Move(Direction::Up)),
            (KeyCode::KeyQ, Action::Move(Direction::Down)),
            (KeyCode::ArrowUp, Action::Move(Direction::Forward)),
            (KeyCode::ArrowDown, Action::Move(Direction::Back)),
            (KeyCode::ArrowLeft, Action::Move(Direction::Left)),
            (KeyCode::ArrowRight, Action::Move(Direction::Right)),
            (KeyCode::KeyR, Action::ResetView),
        ];
        for (key, action) in defaults {
            bindings.bind(key, action);
        }
        bindings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_share_an_axis() {
        assert_eq!(Direction::Forward.axis(), (Axis::Forward, 1.0));
        assert_eq!(Direction::Back.axis(), (Axis::Forward, -1.0));
        assert_eq!(Direction::Left.axis(), (Axis::Right, -1.0));
        assert_eq!(Direction::Down.axis(), (Axis::Up, -1.0));
    }

    #[test]
    fn default_bindings_cover_all_directions() {
        let bindings = KeyBindings::default();
        for dir in Direction::ALL {
            assert!(bindings.keys_for(Action::Move(dir)).count() >= 1);
        }
        assert_eq!(bindings.action_for(KeyCode::KeyR), Some(Action::ResetView));
    }

    #[test]
    fn rebinding_replaces_previous_action() {
        let mut bindings = KeyBindings::default();
        let old = bindings.bind(KeyCode::KeyW, Action::Move(Direction::Up));
        assert_eq!(old, Some(Action::Move(Direction::Forward)));
        assert_eq!(bindings.unbind(KeyCode::KeyW), Some(Action::Move(Direction::Up)));
        assert_eq!(bindings.action_for(KeyCode::KeyW), None);
    }

    #[test]
    fn direction_held_through_any_bound_key() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        assert!(!bindings.is_direction_held(Direction::Forward, &input));
        input.on_key_change(KeyCode::ArrowUp, true);
        assert!(bindings.is_direction_held(Direction::Forward, &input));
        assert!(!bindings.is_direction_held(Direction::Back, &input));
    }

    #[test]
    fn reset_triggers_only_on_press_edge() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.on_key_change(KeyCode::KeyR, true);
        assert!(bindings.was_triggered(Action::ResetView, &input));
        input.end_frame();
        assert!(!bindings.was_triggered(Action::ResetView, &input));
    }
}
