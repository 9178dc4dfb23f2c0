//! Human input mapping
//!
//! Turns raw key, touch and mouse events from whatever backend the host uses
//! into the two things the simulation cares about: is blue pulling, and was
//! a restart requested. Only blue is ever driven by a human.

use std::collections::HashSet;

/// Keys that pull the rope for blue
pub const PULL_KEYS: [&str; 2] = ["w", "arrowup"];
/// Key that restarts the round
pub const RESTART_KEY: &str = "r";

/// Accumulated input between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held_keys: HashSet<String>,
    touch_pulling: bool,
    mouse_pulling: bool,
    restart: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key names are matched case-insensitively (`"W"` == `"w"`)
    pub fn key_down(&mut self, key: &str) {
        let key = key.to_lowercase();
        if key == RESTART_KEY {
            self.restart = true;
        }
        self.held_keys.insert(key);
    }

    pub fn key_up(&mut self, key: &str) {
        self.held_keys.remove(&key.to_lowercase());
    }

    /// Replace the active touch set. Any touch in the top half of the
    /// surface pulls for blue.
    pub fn touches(&mut self, touch_ys: &[f32], surface_height: f32) {
        self.touch_pulling = touch_ys.iter().any(|&y| y < surface_height / 2.0);
    }

    pub fn touch_end(&mut self) {
        self.touch_pulling = false;
    }

    /// A press in the top half pulls until release; the bottom half belongs
    /// to the AI and is ignored
    pub fn mouse_down(&mut self, y: f32, surface_height: f32) {
        if y < surface_height / 2.0 {
            self.mouse_pulling = true;
        }
    }

    pub fn mouse_up(&mut self) {
        self.mouse_pulling = false;
    }

    /// Whether blue is pulling this tick
    pub fn human_pulling(&self) -> bool {
        self.touch_pulling
            || self.mouse_pulling
            || PULL_KEYS.iter().any(|k| self.held_keys.contains(*k))
    }

    /// Consume a pending restart request
    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart)
    }

    /// Drop all held state (e.g. after a restart)
    pub fn clear(&mut self) {
        self.held_keys.clear();
        self.touch_pulling = false;
        self.mouse_pulling = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_keys_case_insensitive() {
        let mut input = InputState::new();
        assert!(!input.human_pulling());
        input.key_down("W");
        assert!(input.human_pulling());
        input.key_down("ArrowUp");
        input.key_up("w");
        assert!(input.human_pulling());
        input.key_up("ARROWUP");
        assert!(!input.human_pulling());
    }

    #[test]
    fn test_other_keys_do_not_pull() {
        let mut input = InputState::new();
        input.key_down("s");
        input.key_down("ArrowDown");
        assert!(!input.human_pulling());
    }

    #[test]
    fn test_touch_top_half_only() {
        let mut input = InputState::new();
        input.touches(&[700.0], 800.0);
        assert!(!input.human_pulling());
        input.touches(&[700.0, 120.0], 800.0);
        assert!(input.human_pulling());
        input.touch_end();
        assert!(!input.human_pulling());
    }

    #[test]
    fn test_mouse_bottom_half_ignored() {
        let mut input = InputState::new();
        input.mouse_down(600.0, 800.0);
        assert!(!input.human_pulling());
        input.mouse_down(100.0, 800.0);
        assert!(input.human_pulling());
        input.mouse_up();
        assert!(!input.human_pulling());
    }

    #[test]
    fn test_restart_is_consumed_once() {
        let mut input = InputState::new();
        input.key_down("R");
        assert!(input.take_restart());
        assert!(!input.take_restart());
    }
}
