//! Player character
//!
//! The player's state is a label that drives animation. Every transition is
//! commanded by the turn controller; nothing changes on its own.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::span::Span;

/// Animation/condition label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Running,
    StickGrow,
    HitStick,
    Falling,
    /// Hit a platform body mid-air; always ends the run
    Crash,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    state: PlayerState,
    /// `x` is the body center; `y` is 0 on top of the bridge line, negative when hanging below
    pub pos: Vec2,
    pub width: f32,
    /// Hanging upside down under the stick
    pub flipped: bool,
}

impl Player {
    pub fn new(x: f32, width: f32) -> Self {
        Self {
            state: PlayerState::Idle,
            pos: Vec2::new(x, 0.0),
            width,
            flipped: false,
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Change state. Returns the previous state, or `None` if nothing changed.
    pub fn set_state(&mut self, state: PlayerState) -> Option<PlayerState> {
        if self.state == state {
            return None;
        }
        let previous = self.state;
        self.state = state;
        Some(previous)
    }

    /// Horizontal extent of the body
    pub fn body(&self) -> Span {
        Span::centered(self.pos.x, self.width)
    }

    /// Toggle between walking on top of the stick and hanging below it
    pub fn flip(&mut self) -> bool {
        self.flipped = !self.flipped;
        self.pos.y = if self.flipped {
            -(self.width + 5.0)
        } else {
            0.0
        };
        self.flipped
    }

    pub fn translate(&mut self, dx: f32) {
        self.pos.x += dx;
    }
}
