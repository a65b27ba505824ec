//! Keyboard input
//!
//! Key-down/key-up events maintain a held set. The simulation polls it once
//! per executed frame, so holding a key moves one lane per frame.

use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::sim::TickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Single-character keys compare case-insensitively (Shift changes `key` mid-hold)
fn normalize(key: &str) -> Cow<'_, str> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_uppercase() => Cow::Owned(c.to_lowercase().collect()),
        _ => Cow::Borrowed(key),
    }
}

/// DOM `KeyboardEvent.key` names bound to each direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            left: vec!["ArrowLeft".into(), "a".into()],
            right: vec!["ArrowRight".into(), "d".into()],
        }
    }
}

impl KeyBindings {
    pub fn direction(&self, key: &str) -> Option<Direction> {
        let key = normalize(key);
        let bound = |keys: &[String]| keys.iter().any(|k| normalize(k) == key);
        if bound(self.left.as_slice()) {
            Some(Direction::Left)
        } else if bound(self.right.as_slice()) {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Currently held keys
#[derive(Debug, Clone, Default)]
pub struct KeyState {
    bindings: KeyBindings,
    held: HashSet<String>,
}

impl KeyState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: HashSet::new(),
        }
    }

    /// Record a key press; returns true if the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        self.held.insert(normalize(key).into_owned());
        self.bindings.direction(key).is_some()
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(&*normalize(key));
    }

    /// Drop everything (focus lost, key-ups will never arrive)
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held
            .iter()
            .any(|key| self.bindings.direction(key) == Some(direction))
    }

    /// Snapshot for one tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            left: self.is_held(Direction::Left),
            right: self.is_held(Direction::Right),
        }
    }
}
