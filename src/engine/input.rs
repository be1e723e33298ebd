//! Input Snapshots
//!
//! The loop samples its [`InputSource`] exactly once per wall-clock
//! iteration. Every logic step of that iteration sees the same held-key
//! state and drains from the same typed-key queue, so a key typed once is
//! consumed once no matter how many catch-up steps run.

use std::collections::{BTreeSet, VecDeque};
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2i;

/// Keys the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Key {
    /// W
    W,
    /// A
    A,
    /// S
    S,
    /// D
    D,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Arrow left
    Left,
    /// Arrow right
    Right,
    /// Shift
    Shift,
    /// Space
    Space,
    /// Escape
    Escape,
}

/// Input captured for one loop iteration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    typed: VecDeque<char>,
    held: BTreeSet<Key>,
    mouse_tile: Option<Vec2i>,
}

impl InputSnapshot {
    /// Empty snapshot: nothing typed, nothing held.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add typed characters, oldest first.
    pub fn with_typed(mut self, typed: impl IntoIterator<Item = char>) -> Self {
        self.typed.extend(typed);
        self
    }

    /// Mark keys as held.
    pub fn with_held(mut self, held: impl IntoIterator<Item = Key>) -> Self {
        self.held.extend(held);
        self
    }

    /// Set the tile under the mouse.
    pub fn with_mouse_tile(mut self, tile: Vec2i) -> Self {
        self.mouse_tile = Some(tile);
        self
    }

    /// Whether a typed key is waiting.
    pub fn has_next_typed(&self) -> bool {
        !self.typed.is_empty()
    }

    /// Take the oldest typed key.
    pub fn next_typed(&mut self) -> Option<char> {
        self.typed.pop_front()
    }

    /// Look at the oldest typed key without consuming it.
    pub fn peek_typed(&self) -> Option<char> {
        self.typed.front().copied()
    }

    /// Whether `key` is held.
    pub fn is_down(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    /// Tile under the mouse cursor, if known.
    pub fn mouse_tile(&self) -> Option<Vec2i> {
        self.mouse_tile
    }

    /// Held direction with W/Up > S/Down > A/Left > D/Right priority.
    pub fn direction(&self) -> Vec2i {
        if self.is_down(Key::W) || self.is_down(Key::Up) {
            Vec2i::UP
        } else if self.is_down(Key::S) || self.is_down(Key::Down) {
            Vec2i::DOWN
        } else if self.is_down(Key::A) || self.is_down(Key::Left) {
            Vec2i::LEFT
        } else if self.is_down(Key::D) || self.is_down(Key::Right) {
            Vec2i::RIGHT
        } else {
            Vec2i::ZERO
        }
    }
}

/// Something the loop can sample input from.
pub trait InputSource {
    /// Capture the current state. Called once per loop iteration.
    fn poll(&mut self) -> InputSnapshot;
}

/// Replays a fixed list of snapshots, then repeats the last one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputSnapshot>,
    idle: InputSnapshot,
    polls: u64,
}

impl ScriptedInput {
    /// Script from per-iteration snapshots.
    pub fn new(frames: impl IntoIterator<Item = InputSnapshot>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            idle: InputSnapshot::default(),
            polls: 0,
        }
    }

    /// Same held keys every iteration, forever.
    pub fn holding(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            frames: VecDeque::new(),
            idle: InputSnapshot::new().with_held(keys),
            polls: 0,
        }
    }

    /// Number of polls served.
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputSnapshot {
        self.polls += 1;
        match self.frames.pop_front() {
            Some(frame) => {
                // Keep holding whatever the last scripted frame held
                self.idle = InputSnapshot::new().with_held(frame.held.iter().copied());
                frame
            }
            None => self.idle.clone(),
        }
    }
}

/// Rate limiter for held-direction movement.
///
/// The first press moves immediately; while a direction stays held, repeats
/// come every `interval` seconds of simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRepeat {
    interval: f64,
    elapsed: f64,
    moved_once: bool,
}

impl MoveRepeat {
    /// Limiter with `interval` seconds between repeats.
    pub fn new(interval: f64) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            moved_once: false,
        }
    }

    /// Advance by `dt` and return the move to make this step, or zero.
    pub fn poll(&mut self, input: &InputSnapshot, dt: f64) -> Vec2i {
        self.elapsed += dt;

        let direction = input.direction();
        if direction == Vec2i::ZERO {
            return Vec2i::ZERO;
        }
        if !self.moved_once || self.elapsed >= self.interval {
            self.moved_once = true;
            self.elapsed = 0.0;
            return direction;
        }
        Vec2i::ZERO
    }

    /// Make the next held direction move immediately (after a pause, say).
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.moved_once = false;
    }
}
