//! Keyboard input
//!
//! Maps `KeyboardEvent.code` values to intents and folds held/pressed
//! intents into a `TickInput` once per simulation step.

use std::collections::HashSet;

use crate::sim::TickInput;

/// What a key asks the crow to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    /// Held: climb. Pressed: pick up the nearest stone.
    AscendOrPickup,
    /// Held: sink. Pressed: drop into the pitcher.
    DescendOrDrop,
    Restart,
}

impl Intent {
    /// Fixed key map, by physical key code
    pub fn from_key_code(code: &str) -> Option<Intent> {
        match code {
            "KeyW" | "ArrowUp" => Some(Intent::Forward),
            "KeyS" | "ArrowDown" => Some(Intent::Backward),
            "KeyA" | "ArrowLeft" => Some(Intent::TurnLeft),
            "KeyD" | "ArrowRight" => Some(Intent::TurnRight),
            "KeyE" | "Space" => Some(Intent::AscendOrPickup),
            "KeyQ" | "ShiftLeft" | "KeyF" | "ControlLeft" => Some(Intent::DescendOrDrop),
            "KeyR" => Some(Intent::Restart),
            _ => None,
        }
    }
}

/// Held intents plus the presses not yet consumed by a tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Intent>,
    pressed: HashSet<Intent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key went down. Auto-repeat keydowns do not count as new presses.
    pub fn press(&mut self, intent: Intent) {
        if self.held.insert(intent) {
            self.pressed.insert(intent);
        }
    }

    pub fn release(&mut self, intent: Intent) {
        self.held.remove(&intent);
    }

    pub fn is_held(&self, intent: Intent) -> bool {
        self.held.contains(&intent)
    }

    /// Input for the next tick
    pub fn to_tick_input(&self) -> TickInput {
        TickInput {
            forward: self.is_held(Intent::Forward),
            backward: self.is_held(Intent::Backward),
            turn_left: self.is_held(Intent::TurnLeft),
            turn_right: self.is_held(Intent::TurnRight),
            ascend: self.is_held(Intent::AscendOrPickup),
            descend: self.is_held(Intent::DescendOrDrop),
            pickup: self.pressed.contains(&Intent::AscendOrPickup),
            drop: self.pressed.contains(&Intent::DescendOrDrop),
            restart: self.pressed.contains(&Intent::Restart),
        }
    }

    /// Presses are consumed by the tick that saw them
    pub fn end_tick(&mut self) {
        self.pressed.clear();
    }

    /// Forget everything (window lost focus, keyups will never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_map() {
        assert_eq!(Intent::from_key_code("KeyW"), Some(Intent::Forward));
        assert_eq!(Intent::from_key_code("ArrowUp"), Some(Intent::Forward));
        assert_eq!(Intent::from_key_code("ArrowLeft"), Some(Intent::TurnLeft));
        assert_eq!(Intent::from_key_code("Space"), Some(Intent::AscendOrPickup));
        assert_eq!(Intent::from_key_code("ShiftLeft"), Some(Intent::DescendOrDrop));
        assert_eq!(Intent::from_key_code("ControlLeft"), Some(Intent::DescendOrDrop));
        assert_eq!(Intent::from_key_code("KeyR"), Some(Intent::Restart));
        assert_eq!(Intent::from_key_code("KeyZ"), None);
        assert_eq!(Intent::from_key_code("ShiftRight"), None);
    }

    #[test]
    fn test_press_is_one_shot() {
        let mut input = InputState::new();
        input.press(Intent::AscendOrPickup);

        let first = input.to_tick_input();
        assert!(first.ascend);
        assert!(first.pickup);
        input.end_tick();

        // Still held, but the press was consumed
        let second = input.to_tick_input();
        assert!(second.ascend);
        assert!(!second.pickup);
    }

    #[test]
    fn test_repeat_keydown_is_not_a_new_press() {
        let mut input = InputState::new();
        input.press(Intent::DescendOrDrop);
        input.end_tick();
        input.press(Intent::DescendOrDrop);
        assert!(!input.to_tick_input().drop);

        input.release(Intent::DescendOrDrop);
        input.press(Intent::DescendOrDrop);
        assert!(input.to_tick_input().drop);
    }

    #[test]
    fn test_quick_tap_survives_until_tick() {
        let mut input = InputState::new();
        input.press(Intent::Restart);
        input.release(Intent::Restart);
        let tick = input.to_tick_input();
        assert!(tick.restart);
        assert!(!tick.is_flying());
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.press(Intent::Forward);
        input.press(Intent::TurnRight);
        input.release_all();
        assert_eq!(input.to_tick_input(), TickInput::default());
    }
}
