//! Input normalization
//!
//! Hosts translate raw keyboard and pointer events into [`InputEvent`]s and
//! push them onto a shared [`InputQueue`]. The game drains the queue into an
//! [`InputState`] once per frame and folds it into a [`TickInput`].
//!
//! Listener registration is scoped: an [`InputBinder`] returns an
//! [`InputGuard`] that deregisters everything when dropped, so listeners
//! cannot outlive the session that registered them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glam::Vec2;

use crate::error::Result;
use crate::sim::{TickInput, VariantRules};

/// Abstract player intents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Jump,
    Fire,
}

/// Normalized host input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Pressed(Intent),
    Released(Intent),
    /// Pointer moved, in world (x, depth)
    PointerAt(Vec2),
    /// Pointer pressed, in world (x, depth)
    PointerDown(Vec2),
    /// Pointer left the play area
    PointerLeft,
}

/// Map a DOM `KeyboardEvent.key` / `code` value to an intent
pub fn intent_for_key(key: &str) -> Option<Intent> {
    match key {
        "ArrowLeft" | "a" | "A" | "KeyA" => Some(Intent::MoveLeft),
        "ArrowRight" | "d" | "D" | "KeyD" => Some(Intent::MoveRight),
        "ArrowUp" | "w" | "W" | "KeyW" => Some(Intent::MoveUp),
        "ArrowDown" | "s" | "S" | "KeyS" => Some(Intent::MoveDown),
        " " | "Space" | "Spacebar" => Some(Intent::Jump),
        "f" | "F" | "KeyF" | "Enter" | "x" | "X" | "KeyX" => Some(Intent::Fire),
        _ => None,
    }
}

/// Shared event queue between host listeners and the game
pub type InputQueue = Rc<RefCell<VecDeque<InputEvent>>>;

pub fn new_queue() -> InputQueue {
    Rc::new(RefCell::new(VecDeque::new()))
}

/// Held keys plus one-shot presses accumulated since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
    fire_held: bool,
    lane_shift: i8,
    jump: bool,
    fire: bool,
    pointer: Option<Vec2>,
}

impl InputState {
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pressed(intent) => match intent {
                Intent::MoveLeft => {
                    self.left = true;
                    self.lane_shift = self.lane_shift.saturating_sub(1);
                }
                Intent::MoveRight => {
                    self.right = true;
                    self.lane_shift = self.lane_shift.saturating_add(1);
                }
                Intent::MoveUp => self.up = true,
                Intent::MoveDown => self.down = true,
                Intent::Jump => self.jump = true,
                Intent::Fire => {
                    self.fire = true;
                    self.fire_held = true;
                }
            },
            InputEvent::Released(intent) => match intent {
                Intent::MoveLeft => self.left = false,
                Intent::MoveRight => self.right = false,
                Intent::MoveUp => self.up = false,
                Intent::MoveDown => self.down = false,
                Intent::Fire => self.fire_held = false,
                Intent::Jump => {}
            },
            InputEvent::PointerAt(pos) => self.pointer = Some(pos),
            InputEvent::PointerDown(pos) => {
                self.pointer = Some(pos);
                self.jump = true;
                self.fire = true;
            }
            InputEvent::PointerLeft => self.pointer = None,
        }
    }

    /// Drain every queued event
    pub fn drain(&mut self, queue: &InputQueue) {
        let events: Vec<InputEvent> = queue.borrow_mut().drain(..).collect();
        for event in events {
            self.apply(event);
        }
    }

    /// Fold into a tick input for the variant and clear one-shot presses
    pub fn take_tick_input(&mut self, rules: &VariantRules) -> TickInput {
        let axis = Vec2::new(
            (self.right as i8 - self.left as i8) as f32,
            (self.up as i8 - self.down as i8) as f32,
        );
        let lanes = rules.lanes().is_some();

        let input = TickInput {
            lane_shift: if lanes { self.lane_shift.clamp(-1, 1) } else { 0 },
            // Up doubles as jump on lane variants
            jump: rules.jumps && (self.jump || (lanes && self.up)),
            // Jump doubles as fire on variants that can't jump
            fire: rules.fires && (self.fire || self.fire_held || (!rules.jumps && self.jump)),
            axis: if lanes { Vec2::ZERO } else { axis },
            pointer: if lanes { None } else { self.pointer },
        };

        self.lane_shift = 0;
        self.jump = false;
        self.fire = false;
        if lanes {
            // Lane moves and jumps are discrete; a held key doesn't repeat
            self.up = false;
        }
        input
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Releases listener registrations when dropped
#[derive(Default)]
pub struct InputGuard {
    releases: Vec<Box<dyn FnOnce()>>,
}

impl InputGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a release action (run in reverse order of registration)
    pub fn on_release(&mut self, release: impl FnOnce() + 'static) {
        self.releases.push(Box::new(release));
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl Drop for InputGuard {
    fn drop(&mut self) {
        while let Some(release) = self.releases.pop() {
            release();
        }
    }
}

impl std::fmt::Debug for InputGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGuard")
            .field("listeners", &self.releases.len())
            .finish()
    }
}

/// Host capability that wires its event sources to an input queue
pub trait InputBinder {
    fn bind(&mut self, queue: InputQueue) -> Result<InputGuard>;
}

/// Binder for headless hosts that push events onto the queue themselves
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputBinder for NoInput {
    fn bind(&mut self, _queue: InputQueue) -> Result<InputGuard> {
        Ok(InputGuard::new())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::sim::Variant;

    #[test]
    fn test_key_mapping() {
        assert_eq!(intent_for_key("ArrowLeft"), Some(Intent::MoveLeft));
        assert_eq!(intent_for_key("KeyD"), Some(Intent::MoveRight));
        assert_eq!(intent_for_key(" "), Some(Intent::Jump));
        assert_eq!(intent_for_key("Enter"), Some(Intent::Fire));
        assert_eq!(intent_for_key("Escape"), None);
    }

    #[test]
    fn test_lane_presses_are_one_shot() {
        let rules = Variant::Runner.rules();
        let mut state = InputState::default();
        state.apply(InputEvent::Pressed(Intent::MoveLeft));
        let input = state.take_tick_input(&rules);
        assert_eq!(input.lane_shift, -1);
        // Still held, but no further lane change
        assert_eq!(state.take_tick_input(&rules).lane_shift, 0);
    }

    #[test]
    fn test_up_jumps_on_lanes_and_moves_in_arena() {
        let mut state = InputState::default();
        state.apply(InputEvent::Pressed(Intent::MoveUp));
        let runner = state.clone().take_tick_input(&Variant::Runner.rules());
        assert!(runner.jump);
        assert_eq!(runner.axis, Vec2::ZERO);

        let collector = state.take_tick_input(&Variant::Collector.rules());
        assert!(!collector.jump);
        assert_eq!(collector.axis, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_jump_fires_in_shooter_and_fire_holds() {
        let rules = Variant::Shooter.rules();
        let mut state = InputState::default();
        state.apply(InputEvent::Pressed(Intent::Jump));
        assert!(state.take_tick_input(&rules).fire);
        assert!(!state.take_tick_input(&rules).fire);

        state.apply(InputEvent::Pressed(Intent::Fire));
        assert!(state.take_tick_input(&rules).fire);
        assert!(state.take_tick_input(&rules).fire);
        state.apply(InputEvent::Released(Intent::Fire));
        assert!(!state.take_tick_input(&rules).fire);
    }

    #[test]
    fn test_pointer_only_reaches_arena_variants() {
        let mut state = InputState::default();
        state.apply(InputEvent::PointerAt(Vec2::new(3.0, 2.0)));
        assert_eq!(
            state.clone().take_tick_input(&Variant::Collector.rules()).pointer,
            Some(Vec2::new(3.0, 2.0))
        );
        assert_eq!(state.take_tick_input(&Variant::LaneRunner.rules()).pointer, None);
    }

    #[test]
    fn test_drain_empties_queue() {
        let queue = new_queue();
        queue.borrow_mut().push_back(InputEvent::Pressed(Intent::MoveRight));
        queue.borrow_mut().push_back(InputEvent::Pressed(Intent::MoveRight));
        let mut state = InputState::default();
        state.drain(&queue);
        assert!(queue.borrow().is_empty());
        assert_eq!(state.take_tick_input(&Variant::Runner.rules()).lane_shift, 1);
    }

    #[test]
    fn test_guard_releases_in_reverse_on_drop() {
        let order = Rc::new(RefCell::new(Vec::new()));
        {
            let mut guard = InputGuard::new();
            for i in 0..3 {
                let order = order.clone();
                guard.on_release(move || order.borrow_mut().push(i));
            }
            assert_eq!(guard.len(), 3);
        }
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_guard_releases_on_unwinding_error_path() {
        let released = Rc::new(Cell::new(false));
        let attempt = || -> Result<()> {
            let mut guard = InputGuard::new();
            let flag = released.clone();
            guard.on_release(move || flag.set(true));
            Err(crate::EngineError::Renderer("boom".into()))?;
            drop(guard);
            Ok(())
        };
        assert!(attempt().is_err());
        assert!(released.get());
    }
}
