//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame deltas only
//! - Injected random source only
//! - No rendering, audio or storage dependencies

pub mod landing;
pub mod layout;
pub mod player;
pub mod rng;
pub mod span;
pub mod state;
pub mod stick;
pub mod tick;
pub mod timer;

pub use landing::{CollisionGroup, Landing};
pub use layout::{BonusItem, BonusZone, Platform, PlatformLayout, WidthBounds};
pub use player::{Player, PlayerState};
#[cfg(test)]
pub use rng::ScriptedRandom;
pub use rng::{RandomSource, seeded};
pub use span::Span;
pub use state::{GameEvent, GameSession, MoveOutcome, Movement, RunStatus, TurnState};
pub use stick::{GrowthSignal, Stick, StickPhase, StickPose};
pub use tick::{GameTurnController, Input};
pub use timer::{TimerAction, Timers};
