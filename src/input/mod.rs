use std::collections::{HashMap, HashSet};
use std::hash::Hash;
pub use winit::keyboard::KeyCode;

/// Raw keyboard state for a single frame.
#[derive(Debug, Default)]
pub struct InputState {
    pub keys_held: HashSet<KeyCode>,
    pub keys_pressed: HashSet<KeyCode>,
    pub keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: KeyCode) {
        if self.keys_held.insert(key) {
            self.keys_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.keys_held.remove(&key);
        self.keys_released.insert(key);
    }

    pub fn clear_frame_state(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.keys_held.contains(&key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.keys_pressed.contains(&key) }
    pub fn is_key_released(&self, key: KeyCode) -> bool { self.keys_released.contains(&key) }
}

/// Maps logical actions (defined by the game) to one or more keys.
#[derive(Debug, Clone)]
pub struct ActionMap<A: Hash + Eq + Copy> {
    bindings: HashMap<A, Vec<KeyCode>>,
}

impl<A: Hash + Eq + Copy> ActionMap<A> {
    pub fn new() -> Self {
        Self { bindings: HashMap::new() }
    }

    pub fn bind(&mut self, action: A, key: KeyCode) {
        self.bindings.entry(action).or_default().push(key);
    }

    /// Returns true if the action was triggered this frame (pressed).
    pub fn is_pressed(&self, action: A, input: &InputState) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_pressed(*k)))
    }

    /// Returns true if the action is currently being held.
    pub fn is_held(&self, action: A, input: &InputState) -> bool {
        self.bindings
            .get(&action)
            .is_some_and(|keys| keys.iter().any(|k| input.is_key_held(*k)))
    }
}

impl<A: Hash + Eq + Copy> Default for ActionMap<A> {
    fn default() -> Self { Self::new() }
}

// ── Held-key repeat ──────────────────────────────────────────────────────────

/// Fires once on press, then every `delay` seconds while held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Repeat {
    pub delay: f32,
    cooldown: f32,
}

impl Repeat {
    pub fn new(delay: f32) -> Self {
        Self { delay, cooldown: 0.0 }
    }

    pub fn fire(&mut self, held: bool, dt: f32) -> bool {
        if !held {
            self.cooldown = 0.0;
            return false;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return false;
        }
        self.cooldown = self.delay;
        true
    }

    /// Fire for `action` in `map` if it is held.
    pub fn fire_action<A: Hash + Eq + Copy>(
        &mut self,
        map: &ActionMap<A>,
        action: A,
        input: &InputState,
        dt: f32,
    ) -> bool {
        self.fire(map.is_held(action, input), dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_once() {
        let mut input = InputState::new();
        input.key_down(KeyCode::KeyW);
        assert!(input.is_key_pressed(KeyCode::KeyW));
        input.clear_frame_state();
        input.key_down(KeyCode::KeyW);
        assert!(!input.is_key_pressed(KeyCode::KeyW), "OS key repeat must not re-press");
        assert!(input.is_key_held(KeyCode::KeyW));
        input.key_up(KeyCode::KeyW);
        assert!(input.is_key_released(KeyCode::KeyW));
        assert!(!input.is_key_held(KeyCode::KeyW));
    }

    #[test]
    fn action_map_checks_every_binding() {
        let mut map = ActionMap::new();
        map.bind("up", KeyCode::KeyW);
        map.bind("up", KeyCode::ArrowUp);
        let mut input = InputState::new();
        input.key_down(KeyCode::ArrowUp);
        assert!(map.is_pressed("up", &input));
        assert!(map.is_held("up", &input));
        assert!(!map.is_held("down", &input));
    }

    #[test]
    fn repeat_fires_on_press_then_after_delay() {
        let mut r = Repeat::new(0.25);
        assert!(r.fire(true, 0.0625));
        assert!(!r.fire(true, 0.0625));
        assert!(!r.fire(true, 0.0625));
        assert!(!r.fire(true, 0.0625));
        assert!(r.fire(true, 0.0625));
        assert!(!r.fire(false, 0.0625));
        assert!(r.fire(true, 0.0625), "release resets the cooldown");
    }
}
