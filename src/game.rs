//! Game shell
//!
//! Wraps the turn controller with the things it must not know about:
//! audio cues, saved progress and player settings. Frame deltas coming in
//! from the host are clamped here before they reach the simulation.

use crate::audio::{SharedAudio, SoundEffect};
use crate::consts::MAX_FRAME_DT;
use crate::error::GameError;
use crate::persistence::KeyValueStore;
use crate::scores::{BonusTally, ScoreBoard};
use crate::settings::Settings;
use crate::sim::{
    CollisionGroup, GameEvent, GameSession, GameTurnController, Input, Landing, PlayerState,
    RandomSource,
};
use crate::tuning::Tuning;

pub struct Game {
    controller: GameTurnController,
    audio: SharedAudio,
    store: Box<dyn KeyValueStore>,
    settings: Settings,
}

impl Game {
    /// Load saved progress and settings, then lay out the first turn
    pub fn new(
        tuning: Tuning,
        rng: Box<dyn RandomSource>,
        audio: SharedAudio,
        store: Box<dyn KeyValueStore>,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        settings.apply(&audio);
        let best_score = ScoreBoard::load_best(store.as_ref());
        let tally = BonusTally::load(store.as_ref());
        log::info!("Starting with best score {}", best_score);

        let controller = GameTurnController::with_progress(tuning, rng, best_score, tally);
        Self {
            controller,
            audio,
            store,
            settings,
        }
    }

    pub fn session(&self) -> &GameSession {
        self.controller.session()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Advance by the host's frame delta
    pub fn frame(&mut self, dt: f32) -> Vec<GameEvent> {
        let events = self.controller.advance(dt.clamp(0.0, MAX_FRAME_DT));
        self.react(&events);
        events
    }

    /// Press or release of the single lever
    pub fn handle_input(&mut self, input: Input) -> Vec<GameEvent> {
        let events = self.controller.handle_input(input);
        self.react(&events);
        events
    }

    pub fn report_collision(&mut self, group: CollisionGroup) -> Vec<GameEvent> {
        let events = self.controller.report_collision(group);
        self.react(&events);
        events
    }

    /// Restart button
    pub fn restart(&mut self) -> Vec<GameEvent> {
        self.audio.play(SoundEffect::ButtonClick);
        self.audio.stop_loop(SoundEffect::StickGrow);
        let events = self.controller.restart();
        self.react(&events);
        events
    }

    /// Mute button. Returns the new mute state.
    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.audio.toggle_muted();
        self.settings.muted = muted;
        if let Err(e) = self.settings.save(self.store.as_mut()) {
            log::warn!("Failed to save settings: {}", e);
        }
        muted
    }

    fn react(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::StickGrowthStarted { .. } => {
                    self.audio.start_loop(SoundEffect::StickGrow);
                }
                GameEvent::StickReleased { .. } => {
                    self.audio.stop_loop(SoundEffect::StickGrow);
                    self.audio.play(SoundEffect::StickHit);
                }
                GameEvent::LandingResolved { landing, .. } if landing.is_success() => {
                    self.audio.play(SoundEffect::StickFall);
                    if *landing == Landing::BonusHit {
                        self.audio.play(SoundEffect::PerfectLanding);
                    }
                }
                GameEvent::BonusItemCollected { .. } => self.audio.play(SoundEffect::BonusCollect),
                GameEvent::PlatformLanded { .. } => self.audio.play(SoundEffect::PlatformLand),
                GameEvent::PlayerStateChanged {
                    to: PlayerState::Falling,
                    ..
                } => self.audio.play(SoundEffect::Fall),
                GameEvent::BonusTallyCommitted => {
                    if let Err(e) = self.save_tally() {
                        log::warn!("{}", e);
                    }
                }
                GameEvent::GameEnded { .. } => {
                    if let Err(e) = self.save_best() {
                        log::warn!("{}", e);
                    }
                }
                _ => {}
            }
        }
    }

    fn save_tally(&mut self) -> Result<(), GameError> {
        self.controller
            .session()
            .tally
            .save(self.store.as_mut())?;
        Ok(())
    }

    fn save_best(&mut self) -> Result<(), GameError> {
        self.controller
            .session()
            .scores
            .save_best(self.store.as_mut())?;
        Ok(())
    }
}
