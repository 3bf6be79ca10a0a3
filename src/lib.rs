//! Stick Bridge - a single-lever stick-bridging arcade game
//!
//! Core modules:
//! - `sim`: Turn state machine (stick growth, landing, platforms, scoring)
//! - `game`: Wires the simulation to audio and persistence
//! - `audio`: Sound effect kinds and the shared mute-aware audio handle
//! - `persistence`: Key-value store contract and backends
//! - `scores`: Score, best score and bonus tally bookkeeping
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `platform`: Native/browser differences (logging)

pub mod audio;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod scores;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{GameError, StoreError};
pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// These are the defaults baked into [`Tuning::default`].
pub mod consts {
    /// Frame timestep used by the headless runner (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta accepted in one advance (prevents huge jumps after a stall)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Visible world width; world x is centered on 0
    pub const VIEWPORT_WIDTH: f32 = 720.0;
    pub const PLAYER_WIDTH: f32 = 45.0;

    /// Platform width bounds
    pub const PLATFORM_MIN_WIDTH: f32 = 50.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 300.0;
    /// The run always starts on a full-width platform
    pub const INITIAL_PLATFORM_WIDTH: f32 = 300.0;

    /// Perfect-landing zone width bounds (scaled by platform width)
    pub const BONUS_ZONE_MIN_WIDTH: f32 = 10.0;
    pub const BONUS_ZONE_MAX_WIDTH: f32 = 50.0;

    /// Distance from the current platform edge to the next platform center
    pub const MIN_GAP_DISTANCE: f32 = 200.0;
    pub const SPAWN_OFFSET: f32 = 50.0;

    /// Bonus item placement
    pub const BONUS_ITEM_MARGIN: f32 = 50.0;
    pub const BONUS_ITEM_WIDTH: f32 = 30.0;
    pub const BONUS_ELIGIBILITY_SCORE: u32 = 2;
    pub const BONUS_ITEM_CHANCE: f32 = 0.8;

    /// Stick growth (units/s) and hard cap
    pub const STICK_GROWTH_RATE: f32 = 400.0;
    pub const STICK_MAX_LENGTH: f32 = 2500.0;
    /// Delay between release and landing resolution (stick tipping over)
    pub const ANGLE_TIME: f32 = 0.25;

    /// Player glide speed across the stick (units/s)
    pub const RUN_SPEED: f32 = 500.0;
    /// Delay between falling and the game-over report
    pub const GAME_END_DELAY: f32 = 1.0;
    /// Time the next platform takes to slide on screen
    pub const PLATFORM_SLIDE_TIME: f32 = 0.5;
}
