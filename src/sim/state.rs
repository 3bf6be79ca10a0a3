//! Game session state and the events it emits
//!
//! One `GameSession` lives per run. Only the turn controller mutates it;
//! everything else reads it or consumes the events it emits.

use serde::{Deserialize, Serialize};

use super::landing::Landing;
use super::layout::{BonusItem, Platform};
use super::player::{Player, PlayerState};
use super::stick::Stick;
use super::timer::Timers;
use crate::scores::{BonusKind, BonusTally, ScoreBoard};

/// Phase of the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    /// Waiting for the player to press
    Idle,
    /// Stick growing while the press is held
    Touching,
    /// Stick tipping over, or the run is over
    End,
    /// Player gliding along the stick
    Running,
    /// Player past the next platform's left edge
    Coming,
}

/// Whether the run can still continue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Active,
    /// Fall or crash under way; game over is scheduled
    Failing,
    Over,
}

/// Where the current glide ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Reaches the next platform and swaps it in
    Land,
    /// Walks off the stick tip and falls
    Fall,
}

/// Linear glide of the player toward `target_x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub start_x: f32,
    pub target_x: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub outcome: MoveOutcome,
}

impl Movement {
    pub fn new(start_x: f32, target_x: f32, speed: f32, outcome: MoveOutcome) -> Self {
        Self {
            start_x,
            target_x,
            duration: (target_x - start_x).abs() / speed,
            elapsed: 0.0,
            outcome,
        }
    }

    /// Completed fraction in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).min(1.0)
    }

    pub fn position(&self) -> f32 {
        let t = self.progress();
        if t >= 1.0 {
            return self.target_x;
        }
        self.start_x + (self.target_x - self.start_x) * t
    }
}

/// Everything the renderer, audio and UI react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TurnStateChanged { from: TurnState, to: TurnState },
    PlayerStateChanged { from: PlayerState, to: PlayerState },
    PlayerFlipped { flipped: bool },
    PlayerCrashed { platform_id: Option<u32> },

    StickGrowthStarted { stick_id: u32, origin_x: f32 },
    StickReleased { stick_id: u32, length: f32, auto: bool },
    StickDropped { stick_id: u32 },
    StickDestroyed { stick_id: u32 },

    LandingResolved { landing: Landing, stick_tip_x: f32 },
    PlatformLanded { platform_id: u32 },
    PlatformSpawned { platform_id: u32, position_x: f32, width: f32 },
    PlatformSettled { platform_id: u32 },
    PlatformDestroyed { platform_id: u32 },
    WorldShifted { dx: f32 },

    BonusItemSpawned { item_id: u32, position_x: f32 },
    BonusItemCollected { item_id: u32 },
    BonusItemDestroyed { item_id: u32 },
    BonusCollected { kind: BonusKind, pending: u32 },
    BonusTallyCommitted,
    PendingBonusDiscarded,

    ScoreChanged { score: u32 },
    GameEnded { score: u32, best_score: u32 },
    GameRestarted,
}

/// Complete state of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub turn_state: TurnState,
    pub run_status: RunStatus,
    /// Platform the player stands on
    pub current_platform: Platform,
    /// Platform the stick has to reach
    pub next_platform: Platform,
    pub active_stick: Option<Stick>,
    /// Last turn's stick, kept one more turn so the swap animation has it
    pub retained_stick: Option<Stick>,
    pub bonus_item: Option<BonusItem>,
    pub player: Player,
    pub scores: ScoreBoard,
    pub tally: BonusTally,
    pub movement: Option<Movement>,
    pub timers: Timers,
    next_id: u32,
}

impl GameSession {
    pub fn new(
        current_platform: Platform,
        next_platform: Platform,
        player: Player,
        scores: ScoreBoard,
        tally: BonusTally,
    ) -> Self {
        let next_id = current_platform.id.max(next_platform.id) + 1;
        Self {
            turn_state: TurnState::Idle,
            run_status: RunStatus::Active,
            current_platform,
            next_platform,
            active_stick: None,
            retained_stick: None,
            bonus_item: None,
            player,
            scores,
            tally,
            movement: None,
            timers: Timers::default(),
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn score(&self) -> u32 {
        self.scores.score()
    }

    pub fn best_score(&self) -> u32 {
        self.scores.best_score()
    }

    /// Sticks currently alive (active + retained)
    pub fn stick_count(&self) -> usize {
        usize::from(self.active_stick.is_some()) + usize::from(self.retained_stick.is_some())
    }

    pub fn is_over(&self) -> bool {
        self.run_status == RunStatus::Over
    }
}
