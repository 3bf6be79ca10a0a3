//! Turn controller
//!
//! Drives one run of the game: input signals, the per-frame advance, the
//! deferred follow-ups and the platform swap after each safe landing. Every
//! entry point returns the events emitted since the previous call.

use super::landing::{self, CollisionGroup, Landing};
use super::layout::{BonusItem, PlatformLayout};
use super::player::{Player, PlayerState};
use super::rng::RandomSource;
use super::state::{GameEvent, GameSession, MoveOutcome, Movement, RunStatus, TurnState};
use super::stick::{GrowthSignal, Stick, StickPose};
use super::timer::TimerAction;
use crate::error::GameError;
use crate::scores::{BonusKind, BonusTally, ScoreBoard};
use crate::tuning::Tuning;

/// Discrete input signals; no coordinates needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    TouchStart,
    TouchEnd,
}

/// Owns the session and is the only thing that mutates it
pub struct GameTurnController {
    session: GameSession,
    tuning: Tuning,
    layout: PlatformLayout,
    rng: Box<dyn RandomSource>,
    events: Vec<GameEvent>,
}

impl GameTurnController {
    /// Fresh controller with no saved progress
    pub fn new(tuning: Tuning, rng: Box<dyn RandomSource>) -> Self {
        Self::with_progress(tuning, rng, 0, BonusTally::default())
    }

    /// Controller that carries a saved best score and banked bonus tally
    pub fn with_progress(
        tuning: Tuning,
        mut rng: Box<dyn RandomSource>,
        best_score: u32,
        tally: BonusTally,
    ) -> Self {
        let layout = PlatformLayout::from(&tuning);
        let session = build_session(
            &tuning,
            &layout,
            rng.as_mut(),
            ScoreBoard::with_best(best_score),
            tally.banked(),
        );
        let mut controller = Self {
            session,
            tuning,
            layout,
            rng,
            events: Vec::new(),
        };
        controller.announce_start();
        controller
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn turn_state(&self) -> TurnState {
        self.session.turn_state
    }

    pub fn handle_input(&mut self, input: Input) -> Vec<GameEvent> {
        match input {
            Input::TouchStart => self.touch_start(),
            Input::TouchEnd => self.touch_end(),
        }
    }

    /// Press: start growing a stick when idle
    pub fn touch_start(&mut self) -> Vec<GameEvent> {
        self.on_touch_start();
        self.take_events()
    }

    /// Release: drop the stick while growing, or flip the player mid-run
    pub fn touch_end(&mut self) -> Vec<GameEvent> {
        self.on_touch_end();
        self.take_events()
    }

    /// Advance one frame
    ///
    /// Order within a frame: due timers, stick growth, glide, contact checks,
    /// glide completion. A crash found in the frame that finishes the glide
    /// wins over the landing.
    pub fn advance(&mut self, dt: f32) -> Vec<GameEvent> {
        if !(dt > 0.0) {
            return self.take_events();
        }
        for action in self.session.timers.advance(dt) {
            self.fire(action);
        }
        self.grow_stick(dt);
        self.advance_movement(dt);
        self.take_events()
    }

    /// Collision reported by the scene layer
    pub fn report_collision(&mut self, group: CollisionGroup) -> Vec<GameEvent> {
        if self.is_airborne() {
            match group {
                CollisionGroup::Platform => self.crash(None),
                CollisionGroup::Bonus => self.collect_item(),
            }
        } else {
            log::trace!(
                "{:?} collision ignored in {:?}",
                group,
                self.session.turn_state
            );
        }
        self.take_events()
    }

    /// Throw the whole session away (timers included) and start over
    pub fn restart(&mut self) -> Vec<GameEvent> {
        log::info!("Restarting run");
        let best_score = self.session.best_score();
        let tally = self.session.tally.banked();
        self.session = build_session(
            &self.tuning,
            &self.layout,
            self.rng.as_mut(),
            ScoreBoard::with_best(best_score),
            tally,
        );
        self.emit(GameEvent::GameRestarted);
        self.announce_start();
        self.take_events()
    }

    // === Input handling ===

    fn on_touch_start(&mut self) {
        if self.session.turn_state != TurnState::Idle || self.session.run_status != RunStatus::Active
        {
            log::trace!("Touch start ignored in {:?}", self.session.turn_state);
            return;
        }

        let id = self.session.next_entity_id();
        let origin_x = self.session.current_platform.right_edge();
        let mut stick = Stick::new(
            id,
            origin_x,
            self.tuning.stick_growth_rate,
            self.tuning.stick_max_length,
        );
        stick.start_growth();
        if let Some(stale) = self.session.active_stick.replace(stick) {
            self.emit(GameEvent::StickDestroyed { stick_id: stale.id });
        }

        self.set_turn_state(TurnState::Touching);
        self.set_player_state(PlayerState::StickGrow);
        self.emit(GameEvent::StickGrowthStarted {
            stick_id: id,
            origin_x,
        });
    }

    fn on_touch_end(&mut self) {
        match self.session.turn_state {
            TurnState::Running => {
                // Flipping is only allowed once the player is off the platform
                let past_edge =
                    self.session.player.pos.x >= self.session.current_platform.right_edge();
                if past_edge {
                    let flipped = self.session.player.flip();
                    log::debug!("Player flipped: {}", flipped);
                    self.emit(GameEvent::PlayerFlipped { flipped });
                }
            }
            TurnState::Touching => {
                if let Err(e) = self.release_stick(false) {
                    log::error!("Release failed: {}", e);
                }
            }
            state => log::trace!("Touch end ignored in {:?}", state),
        }
    }

    // === Stick ===

    fn grow_stick(&mut self, dt: f32) {
        if self.session.turn_state != TurnState::Touching {
            return;
        }
        let signal = match self.session.active_stick.as_mut() {
            Some(stick) => stick.advance(dt),
            None => {
                log::error!(
                    "{}",
                    GameError::MissingStick {
                        state: TurnState::Touching
                    }
                );
                return;
            }
        };
        if signal == GrowthSignal::AutoRelease {
            if let Err(e) = self.release_stick(true) {
                log::error!("Auto-release failed: {}", e);
            }
        }
    }

    fn release_stick(&mut self, auto: bool) -> Result<(), GameError> {
        let state = self.session.turn_state;
        let (stick_id, length) = {
            let stick = self
                .session
                .active_stick
                .as_mut()
                .ok_or(GameError::MissingStick { state })?;
            if !auto {
                stick.stop_growth();
            }
            stick.pose = StickPose::Bridged;
            (stick.id, stick.length)
        };

        log::debug!("Stick {} released at length {:.1}", stick_id, length);
        self.emit(GameEvent::StickReleased {
            stick_id,
            length,
            auto,
        });
        self.set_player_state(PlayerState::HitStick);
        self.set_turn_state(TurnState::End);
        self.session
            .timers
            .schedule(self.tuning.angle_time, TimerAction::ResolveLanding { stick_id });
        Ok(())
    }

    // === Timers ===

    fn fire(&mut self, action: TimerAction) {
        match action {
            TimerAction::ResolveLanding { stick_id } => self.resolve_landing(stick_id),
            TimerAction::EndGame => self.end_game(),
            TimerAction::SettlePlatform { platform_id } => {
                if self.session.next_platform.id == platform_id {
                    self.emit(GameEvent::PlatformSettled { platform_id });
                } else {
                    log::trace!("Platform {} gone before settling", platform_id);
                }
            }
        }
    }

    fn resolve_landing(&mut self, stick_id: u32) {
        let tip_x = match &self.session.active_stick {
            Some(stick) if stick.id == stick_id => stick.tip_x(),
            _ => {
                log::trace!("Stick {} gone before resolution", stick_id);
                return;
            }
        };
        if self.session.turn_state != TurnState::End || self.session.run_status != RunStatus::Active
        {
            log::trace!("Resolution skipped in {:?}", self.session.turn_state);
            return;
        }

        let landing = landing::resolve_on(tip_x, &self.session.next_platform);
        log::debug!("Stick tip at {:.1}: {:?}", tip_x, landing);
        self.emit(GameEvent::LandingResolved {
            landing,
            stick_tip_x: tip_x,
        });

        match landing {
            Landing::BonusHit => {
                let score = self.session.scores.increment();
                self.emit(GameEvent::ScoreChanged { score });
                let pending = self.session.tally.add_pending(BonusKind::Perfect);
                self.emit(GameEvent::BonusCollected {
                    kind: BonusKind::Perfect,
                    pending,
                });
                self.start_move(self.session.next_platform.landing_x(), MoveOutcome::Land);
            }
            Landing::PlatformHit => {
                self.start_move(self.session.next_platform.landing_x(), MoveOutcome::Land);
            }
            Landing::Miss => {
                self.discard_pending();
                self.session.run_status = RunStatus::Failing;
                self.start_move(tip_x, MoveOutcome::Fall);
            }
        }
    }

    fn end_game(&mut self) {
        if self.session.run_status == RunStatus::Over {
            return;
        }
        self.session.run_status = RunStatus::Over;
        self.set_turn_state(TurnState::End);
        self.session.scores.finish_run();
        let score = self.session.score();
        let best_score = self.session.best_score();
        log::info!("Run over: score {} (best {})", score, best_score);
        self.emit(GameEvent::GameEnded { score, best_score });
    }

    fn schedule_game_end(&mut self) {
        if !self.session.timers.is_pending(TimerAction::EndGame) {
            self.session
                .timers
                .schedule(self.tuning.game_end_delay, TimerAction::EndGame);
        }
    }

    // === Movement ===

    fn is_airborne(&self) -> bool {
        matches!(
            self.session.turn_state,
            TurnState::Running | TurnState::Coming
        ) && self.session.run_status != RunStatus::Over
    }

    fn start_move(&mut self, target_x: f32, outcome: MoveOutcome) {
        let movement = Movement::new(
            self.session.player.pos.x,
            target_x,
            self.tuning.run_speed,
            outcome,
        );
        log::debug!(
            "Moving {:.1} -> {:.1} over {:.2}s ({:?})",
            movement.start_x,
            movement.target_x,
            movement.duration,
            outcome
        );
        self.session.movement = Some(movement);
        self.set_turn_state(TurnState::Running);
        self.set_player_state(PlayerState::Running);
    }

    fn advance_movement(&mut self, dt: f32) {
        if !self.is_airborne() {
            return;
        }
        let Some(movement) = self.session.movement.as_mut() else {
            return;
        };
        movement.elapsed += dt;
        let x = movement.position();
        let done = movement.progress() >= 1.0;
        let outcome = movement.outcome;
        self.session.player.pos.x = x;

        if self.session.turn_state == TurnState::Running
            && x >= self.session.next_platform.left_edge()
        {
            self.set_turn_state(TurnState::Coming);
        }

        if self.check_contacts() {
            return;
        }
        if done {
            self.complete_move(outcome);
        }
    }

    /// Returns true when the player crashed
    fn check_contacts(&mut self) -> bool {
        if let Some(item) = self.session.bonus_item {
            if landing::item_contact(&self.session.player, &item) {
                self.collect_item();
            }
        }
        let hit = landing::platform_contact(
            &self.session.player,
            [&self.session.current_platform, &self.session.next_platform],
        )
        .map(|p| p.id);
        match hit {
            Some(platform_id) => {
                self.crash(Some(platform_id));
                true
            }
            None => false,
        }
    }

    fn complete_move(&mut self, outcome: MoveOutcome) {
        self.session.movement = None;
        self.set_turn_state(TurnState::End);
        match outcome {
            MoveOutcome::Land => {
                self.set_player_state(PlayerState::Idle);
                self.swap_platforms();
                self.set_turn_state(TurnState::Idle);
            }
            MoveOutcome::Fall => {
                self.set_player_state(PlayerState::Falling);
                if let Some(stick) = self.session.active_stick.as_mut() {
                    stick.pose = StickPose::Dropped;
                    let stick_id = stick.id;
                    self.emit(GameEvent::StickDropped { stick_id });
                }
                self.schedule_game_end();
            }
        }
    }

    fn crash(&mut self, platform_id: Option<u32>) {
        log::info!("Player crashed into platform {:?}", platform_id);
        self.session.movement = None;
        self.set_player_state(PlayerState::Crash);
        self.emit(GameEvent::PlayerCrashed { platform_id });
        self.set_player_state(PlayerState::Falling);
        self.set_turn_state(TurnState::End);
        self.discard_pending();
        self.session.run_status = RunStatus::Failing;
        self.schedule_game_end();
    }

    // === Bonus ===

    fn collect_item(&mut self) {
        let Some(item) = self.session.bonus_item.take() else {
            return;
        };
        let pending = self.session.tally.add_pending(BonusKind::Collectible);
        log::debug!("Bonus item {} collected ({} pending)", item.id, pending);
        self.emit(GameEvent::BonusItemCollected { item_id: item.id });
        self.emit(GameEvent::BonusCollected {
            kind: BonusKind::Collectible,
            pending,
        });
    }

    fn discard_pending(&mut self) {
        if self.session.tally.discard_pending() {
            log::debug!("Pending bonus discarded");
            self.emit(GameEvent::PendingBonusDiscarded);
        }
    }

    // === Platforms ===

    /// Retire the reached platform, shift the world back to the home anchor
    /// and lay out a new next platform
    fn swap_platforms(&mut self) {
        let dx = self.tuning.home_x() - self.session.player.pos.x;

        let mut landed = self.session.next_platform.clone();
        landed.retire();
        landed.translate(dx);
        let next_id = self.session.next_entity_id();
        let next = self.layout.spawn_platform(
            self.rng.as_mut(),
            next_id,
            landed.right_edge(),
            self.tuning.viewport_width,
        );
        let landed_id = landed.id;
        let old = std::mem::replace(&mut self.session.current_platform, landed);
        self.session.next_platform = next;
        self.emit(GameEvent::PlatformDestroyed {
            platform_id: old.id,
        });
        self.emit(GameEvent::PlatformLanded {
            platform_id: landed_id,
        });

        // The stick that was just crossed stays one more turn
        if let Some(stale) = self.session.retained_stick.take() {
            self.emit(GameEvent::StickDestroyed { stick_id: stale.id });
        }
        self.session.retained_stick = self.session.active_stick.take();

        if let Some(item) = self.session.bonus_item.take() {
            self.emit(GameEvent::BonusItemDestroyed { item_id: item.id });
        }

        self.session.player.translate(dx);
        if let Some(stick) = self.session.retained_stick.as_mut() {
            stick.translate(dx);
        }
        self.emit(GameEvent::WorldShifted { dx });

        let score = self.session.scores.increment();
        self.emit(GameEvent::ScoreChanged { score });
        if self.session.tally.commit() {
            self.emit(GameEvent::BonusTallyCommitted);
        }

        self.announce_next_platform();
    }

    fn announce_start(&mut self) {
        let current = &self.session.current_platform;
        let (platform_id, position_x, width) = (current.id, current.position_x, current.width);
        self.emit(GameEvent::PlatformSpawned {
            platform_id,
            position_x,
            width,
        });
        self.announce_next_platform();
    }

    /// Report the new next platform, schedule its slide-in and maybe hang a bonus item
    fn announce_next_platform(&mut self) {
        let next = &self.session.next_platform;
        let (platform_id, position_x, width, left_edge) =
            (next.id, next.position_x, next.width, next.left_edge());
        log::debug!(
            "Next platform {} at {:.1} (width {:.1})",
            platform_id,
            position_x,
            width
        );
        self.emit(GameEvent::PlatformSpawned {
            platform_id,
            position_x,
            width,
        });
        self.session.timers.schedule(
            self.tuning.platform_slide_time,
            TimerAction::SettlePlatform { platform_id },
        );

        if !self
            .layout
            .wants_bonus_item(self.rng.as_mut(), self.session.score())
        {
            return;
        }
        let right_edge = self.session.current_platform.right_edge();
        match self
            .layout
            .bonus_item_position(self.rng.as_mut(), right_edge, left_edge)
        {
            Some(position_x) => {
                let item_id = self.session.next_entity_id();
                self.session.bonus_item = Some(BonusItem {
                    id: item_id,
                    position_x,
                    width: self.layout.item_width,
                });
                self.emit(GameEvent::BonusItemSpawned {
                    item_id,
                    position_x,
                });
            }
            None => log::debug!("Gap too narrow for a bonus item"),
        }
    }

    // === Bookkeeping ===

    fn set_turn_state(&mut self, to: TurnState) {
        let from = self.session.turn_state;
        if from == to {
            return;
        }
        self.session.turn_state = to;
        log::debug!("Game state: {:?} -> {:?}", from, to);
        self.emit(GameEvent::TurnStateChanged { from, to });
    }

    fn set_player_state(&mut self, to: PlayerState) {
        if let Some(from) = self.session.player.set_state(to) {
            self.emit(GameEvent::PlayerStateChanged { from, to });
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Lay out the opening platform, the player on it and the first gap
fn build_session(
    tuning: &Tuning,
    layout: &PlatformLayout,
    rng: &mut dyn RandomSource,
    scores: ScoreBoard,
    tally: BonusTally,
) -> GameSession {
    let mut current = layout.build_platform(
        1,
        -tuning.viewport_width / 2.0,
        tuning.initial_platform_width,
        false,
    );
    current.retire();
    let player_x = current.right_edge() - tuning.player_width / 1.2;
    let next = layout.spawn_platform(rng, 2, current.right_edge(), tuning.viewport_width);
    GameSession::new(
        current,
        next,
        Player::new(player_x, tuning.player_width),
        scores,
        tally,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::rng::{ScriptedRandom, seeded};
    use proptest::prelude::*;

    const STEP: f32 = 1.0 / 240.0;

    fn controller() -> GameTurnController {
        GameTurnController::new(Tuning::default(), Box::new(ScriptedRandom::constant(0.5)))
    }

    /// Distance from the stick origin to an x on the next platform
    fn reach(c: &GameTurnController, x: f32) -> f32 {
        x - c.session().current_platform.right_edge()
    }

    /// Hold the press until the stick is at least `target` long, then release
    fn grow_to(c: &mut GameTurnController, target: f32) -> Vec<GameEvent> {
        let mut events = c.touch_start();
        while c
            .session()
            .active_stick
            .as_ref()
            .is_some_and(|s| s.is_growing() && s.length < target)
        {
            events.extend(c.advance(STEP));
        }
        events.extend(c.touch_end());
        events
    }

    fn run_until(
        c: &mut GameTurnController,
        done: impl Fn(&GameSession) -> bool,
        max_steps: usize,
    ) -> Vec<GameEvent> {
        let mut events = Vec::new();
        for _ in 0..max_steps {
            if done(c.session()) {
                break;
            }
            events.extend(c.advance(SIM_DT));
        }
        events
    }

    /// Run frames until the turn is back to idle or the run is over
    fn settle(c: &mut GameTurnController) -> Vec<GameEvent> {
        run_until(
            c,
            |s| s.is_over() || (s.turn_state == TurnState::Idle && s.movement.is_none()),
            2000,
        )
    }

    fn land_on_platform(c: &mut GameTurnController) -> Vec<GameEvent> {
        let target = reach(c, c.session().next_platform.position_x + 50.0);
        let mut events = grow_to(c, target);
        events.extend(c.advance(SIM_DT));
        events.extend(settle(c));
        events
    }

    fn landing_of(events: &[GameEvent]) -> Option<Landing> {
        events.iter().find_map(|e| match e {
            GameEvent::LandingResolved { landing, .. } => Some(*landing),
            _ => None,
        })
    }

    #[test]
    fn test_initial_layout() {
        let mut c = controller();
        let s = c.session();
        assert_eq!(s.turn_state, TurnState::Idle);
        assert!((s.current_platform.right_edge() - -210.0).abs() < 1e-3);
        assert!(!s.current_platform.collidable);
        assert!(!s.current_platform.bonus_zone.visible);
        assert!((s.player.pos.x - -247.5).abs() < 1e-3);
        assert!((s.next_platform.position_x - 75.0).abs() < 1e-3);
        assert!((s.next_platform.width - 175.0).abs() < 1e-3);
        assert!(s.next_platform.bonus_zone.visible);
        assert!(s.bonus_item.is_none());

        // Opening announcements are delivered with the first call
        let events = c.touch_end();
        let spawned = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PlatformSpawned { .. }))
            .count();
        assert_eq!(spawned, 2);
        assert_eq!(c.turn_state(), TurnState::Idle);
    }

    #[test]
    fn test_press_starts_growth() {
        let mut c = controller();
        let events = c.touch_start();
        assert_eq!(c.turn_state(), TurnState::Touching);
        assert_eq!(c.session().player.state(), PlayerState::StickGrow);
        assert!(events.contains(&GameEvent::TurnStateChanged {
            from: TurnState::Idle,
            to: TurnState::Touching,
        }));

        c.advance(0.1);
        let stick = c.session().active_stick.as_ref().unwrap();
        assert!((stick.length - 40.0).abs() < 1e-3);
        assert!((stick.origin_x - -210.0).abs() < 1e-3);
    }

    #[test]
    fn test_release_tips_stick_then_resolves() {
        let mut c = controller();
        let events = grow_to(&mut c, 100.0);
        assert_eq!(c.turn_state(), TurnState::End);
        assert_eq!(c.session().player.state(), PlayerState::HitStick);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::StickReleased { auto: false, .. }))
        );
        assert_eq!(
            c.session().active_stick.as_ref().unwrap().pose,
            StickPose::Bridged
        );

        // Nothing resolves until the tip-over delay has passed
        let events = c.advance(0.2);
        assert!(landing_of(&events).is_none());
        let events = c.advance(0.1);
        assert_eq!(landing_of(&events), Some(Landing::Miss));
        assert_eq!(c.turn_state(), TurnState::Running);
    }

    #[test]
    fn test_bonus_hit_scores_two_and_commits() {
        let mut c = controller();
        let target = reach(&c, c.session().next_platform.position_x);
        grow_to(&mut c, target);

        let events = c.advance(0.3);
        assert_eq!(landing_of(&events), Some(Landing::BonusHit));
        assert_eq!(c.session().score(), 1);
        assert_eq!(c.session().tally.pending(BonusKind::Perfect), 1);
        assert_eq!(c.session().tally.committed(BonusKind::Perfect), 0);

        let events = settle(&mut c);
        assert!(events.contains(&GameEvent::BonusTallyCommitted));
        let s = c.session();
        assert_eq!(s.turn_state, TurnState::Idle);
        assert_eq!(s.player.state(), PlayerState::Idle);
        assert_eq!(s.score(), 2);
        assert_eq!(s.tally.committed(BonusKind::Perfect), 1);
        assert_eq!(s.tally.pending(BonusKind::Perfect), 0);
        assert!((s.player.pos.x - Tuning::default().home_x()).abs() < 1e-3);
    }

    #[test]
    fn test_platform_hit_scores_one() {
        let mut c = controller();
        let events = land_on_platform(&mut c);
        assert_eq!(landing_of(&events), Some(Landing::PlatformHit));
        let s = c.session();
        assert_eq!(s.turn_state, TurnState::Idle);
        assert_eq!(s.score(), 1);
        assert_eq!(s.tally, BonusTally::default());
        assert!(!events.contains(&GameEvent::BonusTallyCommitted));
    }

    #[test]
    fn test_swap_retires_landed_platform() {
        let mut c = controller();
        let reached_id = c.session().next_platform.id;
        let events = land_on_platform(&mut c);
        let s = c.session();
        assert_eq!(s.current_platform.id, reached_id);
        assert!(!s.current_platform.collidable);
        assert!(!s.current_platform.bonus_zone.visible);
        assert!(s.next_platform.collidable);
        assert!(s.next_platform.bonus_zone.visible);
        assert!(s.next_platform.left_edge() > s.current_platform.right_edge());
        assert!(events.contains(&GameEvent::PlatformDestroyed { platform_id: 1 }));
        assert!(events.contains(&GameEvent::PlatformLanded {
            platform_id: reached_id
        }));

        // The retained stick moved with the world and still ends on the landed platform
        let stick = s.retained_stick.as_ref().unwrap();
        assert!(s.current_platform.span().contains_strict(stick.tip_x()));
    }

    #[test]
    fn test_two_landings_keep_one_retained_stick() {
        let mut c = controller();
        land_on_platform(&mut c);
        let first_stick = c.session().retained_stick.as_ref().unwrap().id;
        assert!(c.session().active_stick.is_none());
        assert_eq!(c.session().stick_count(), 1);

        let target = reach(&c, c.session().next_platform.position_x + 50.0);
        let mut events = c.touch_start();
        assert_eq!(c.session().stick_count(), 2);
        while c.session().active_stick.as_ref().is_some_and(|s| s.length < target) {
            events.extend(c.advance(STEP));
        }
        events.extend(c.touch_end());
        events.extend(settle(&mut c));

        assert_eq!(c.session().score(), 2);
        assert_eq!(c.session().stick_count(), 1);
        assert_ne!(c.session().retained_stick.as_ref().unwrap().id, first_stick);
        assert!(events.contains(&GameEvent::StickDestroyed {
            stick_id: first_stick
        }));
    }

    #[test]
    fn test_miss_ends_game_after_delay() {
        let mut c = controller();
        land_on_platform(&mut c);
        assert_eq!(c.session().score(), 1);

        let target = reach(&c, c.session().next_platform.right_edge() + 20.0);
        grow_to(&mut c, target);
        let events = run_until(
            &mut c,
            |s| s.player.state() == PlayerState::Falling,
            1000,
        );
        assert_eq!(landing_of(&events), Some(Landing::Miss));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::StickDropped { .. }))
        );
        assert_eq!(c.turn_state(), TurnState::End);
        assert_eq!(c.session().run_status, RunStatus::Failing);

        let events = c.advance(0.5);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::GameEnded { .. })));
        let events = c.advance(0.6);
        assert!(events.contains(&GameEvent::GameEnded {
            score: 1,
            best_score: 1
        }));
        assert!(c.session().is_over());
        assert_eq!(c.session().score(), 1);
    }

    #[test]
    fn test_bonus_then_crash_discards_pending() {
        let mut c = controller();
        let target = reach(&c, c.session().next_platform.position_x);
        grow_to(&mut c, target);
        c.advance(0.3);
        assert_eq!(c.session().tally.pending(BonusKind::Perfect), 1);

        let edge = c.session().current_platform.right_edge();
        run_until(&mut c, |s| s.player.pos.x >= edge, 1000);
        let events = c.touch_end();
        assert!(events.contains(&GameEvent::PlayerFlipped { flipped: true }));

        let events = run_until(&mut c, |s| s.is_over(), 2000);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::PlayerCrashed { platform_id: Some(2) }))
        );
        assert!(events.contains(&GameEvent::PendingBonusDiscarded));
        assert!(!events.contains(&GameEvent::BonusTallyCommitted));
        let s = c.session();
        assert_eq!(s.score(), 1);
        assert_eq!(s.tally.pending(BonusKind::Perfect), 0);
        assert_eq!(s.tally.committed(BonusKind::Perfect), 0);
        assert_eq!(s.player.state(), PlayerState::Falling);
    }

    #[test]
    fn test_crash_wins_in_completing_frame() {
        let mut c = controller();
        let target = reach(&c, c.session().next_platform.position_x + 50.0);
        grow_to(&mut c, target);
        c.advance(0.24);
        c.advance(0.02);
        let edge = c.session().current_platform.right_edge();
        run_until(&mut c, |s| s.player.pos.x >= edge, 1000);
        assert!(c.touch_end().contains(&GameEvent::PlayerFlipped { flipped: true }));

        // One frame long enough to finish the glide onto the next platform
        let events = c.advance(5.0);
        assert!(events.contains(&GameEvent::PlayerCrashed {
            platform_id: Some(2)
        }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlatformLanded { .. })));
        assert!(!events.contains(&GameEvent::BonusTallyCommitted));
        assert!(!events.contains(&GameEvent::TurnStateChanged {
            from: TurnState::End,
            to: TurnState::Idle,
        }));
        let s = c.session();
        assert_eq!(s.score(), 0);
        assert_eq!(s.turn_state, TurnState::End);
        assert_eq!(s.current_platform.id, 1);
        assert_eq!(s.run_status, RunStatus::Failing);
    }

    #[test]
    fn test_reported_collision_crashes() {
        let mut c = controller();
        let events = c.report_collision(CollisionGroup::Platform);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerCrashed { .. })));

        let target = reach(&c, c.session().next_platform.position_x + 50.0);
        grow_to(&mut c, target);
        c.advance(0.3);
        assert_eq!(c.turn_state(), TurnState::Running);

        let events = c.report_collision(CollisionGroup::Platform);
        assert!(events.contains(&GameEvent::PlayerCrashed { platform_id: None }));
        assert!(events.contains(&GameEvent::PlayerStateChanged {
            from: PlayerState::Crash,
            to: PlayerState::Falling,
        }));
        assert_eq!(c.turn_state(), TurnState::End);
        assert!(c.session().movement.is_none());

        c.advance(1.1);
        assert!(c.session().is_over());
    }

    #[test]
    fn test_flip_needs_player_past_edge() {
        let mut c = controller();
        let target = reach(&c, c.session().next_platform.position_x + 50.0);
        grow_to(&mut c, target);
        c.advance(0.24);
        c.advance(0.02);
        assert_eq!(c.turn_state(), TurnState::Running);
        assert!(c.session().player.pos.x < c.session().current_platform.right_edge());

        let events = c.touch_end();
        assert!(events.is_empty());
        assert!(!c.session().player.flipped);
    }

    #[test]
    fn test_invalid_triggers_are_ignored() {
        let mut c = controller();
        c.touch_end();
        assert_eq!(c.turn_state(), TurnState::Idle);

        c.touch_start();
        let stick_id = c.session().active_stick.as_ref().unwrap().id;
        assert!(c.touch_start().is_empty());
        assert_eq!(c.session().active_stick.as_ref().unwrap().id, stick_id);
        assert!(c.report_collision(CollisionGroup::Bonus).is_empty());

        c.touch_end();
        assert_eq!(c.turn_state(), TurnState::End);
        assert!(c.touch_start().is_empty());
        assert!(c.touch_end().is_empty());
        assert_eq!(c.turn_state(), TurnState::End);
    }

    #[test]
    fn test_auto_release_at_cap() {
        let mut c = controller();
        c.touch_start();
        let events = run_until(&mut c, |s| s.turn_state != TurnState::Touching, 1000);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::StickReleased { auto: true, length, .. } if (*length - 2500.0).abs() < 1e-3
        )));
        assert_eq!(c.session().player.state(), PlayerState::HitStick);

        // Any pending release input is now a no-op
        assert!(c.touch_end().is_empty());
        run_until(&mut c, |s| s.is_over(), 2000);
        assert!(c.session().is_over());
    }

    #[test]
    fn test_bonus_item_banks_on_landing() {
        let tuning = Tuning {
            bonus_eligibility_score: 0,
            ..Tuning::default()
        };
        let mut c = GameTurnController::new(tuning, Box::new(ScriptedRandom::constant(0.5)));
        let item = c.session().bonus_item.unwrap();
        let next = &c.session().next_platform;
        assert!(item.span().left > c.session().current_platform.right_edge());
        assert!(item.span().right < next.left_edge());

        let target = reach(&c, next.position_x + 50.0);
        grow_to(&mut c, target);
        c.advance(0.24);
        c.advance(0.02);
        let edge = c.session().current_platform.right_edge();
        run_until(&mut c, |s| s.player.pos.x >= edge, 1000);
        c.touch_end();

        let events = run_until(&mut c, |s| s.bonus_item.is_none(), 1000);
        assert!(events.contains(&GameEvent::BonusItemCollected { item_id: item.id }));
        assert_eq!(c.session().tally.pending(BonusKind::Collectible), 1);

        // Back on top before reaching the platform
        c.touch_end();
        assert!(!c.session().player.flipped);
        settle(&mut c);
        assert_eq!(c.turn_state(), TurnState::Idle);
        assert_eq!(c.session().score(), 1);
        assert_eq!(c.session().tally.committed(BonusKind::Collectible), 1);
    }

    #[test]
    fn test_no_bonus_item_before_threshold() {
        let mut c = controller();
        assert!(c.session().bonus_item.is_none());
        land_on_platform(&mut c);
        assert!(c.session().bonus_item.is_none());
        land_on_platform(&mut c);
        // Score is now 2, and 0.5 < 0.8 proposes an item
        assert_eq!(c.session().score(), 2);
        assert!(c.session().bonus_item.is_some());
    }

    #[test]
    fn test_stale_timers_are_noops() {
        let mut c = controller();
        c.touch_end();
        c.fire(TimerAction::ResolveLanding { stick_id: 999 });
        c.fire(TimerAction::SettlePlatform { platform_id: 999 });
        assert!(c.take_events().is_empty());

        // Restarting mid-tip drops the resolution with the old session
        c.touch_start();
        c.touch_end();
        c.restart();
        let events = c.advance(0.5);
        assert!(landing_of(&events).is_none());
        assert_eq!(c.turn_state(), TurnState::Idle);
    }

    #[test]
    fn test_platform_settles_after_slide() {
        let mut c = controller();
        let id = c.session().next_platform.id;
        c.touch_end();
        let events = c.advance(0.4);
        assert!(!events.contains(&GameEvent::PlatformSettled { platform_id: id }));
        let events = c.advance(0.2);
        assert!(events.contains(&GameEvent::PlatformSettled { platform_id: id }));
    }

    #[test]
    fn test_restart_keeps_best_and_committed() {
        let mut c = controller();
        let target = reach(&c, c.session().next_platform.position_x);
        grow_to(&mut c, target);
        c.advance(SIM_DT);
        settle(&mut c);
        let target = reach(&c, c.session().next_platform.right_edge() + 20.0);
        grow_to(&mut c, target);
        run_until(&mut c, |s| s.is_over(), 2000);
        assert_eq!(c.session().best_score(), 2);

        let events = c.restart();
        assert!(events.contains(&GameEvent::GameRestarted));
        let s = c.session();
        assert_eq!(s.turn_state, TurnState::Idle);
        assert_eq!(s.run_status, RunStatus::Active);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_score(), 2);
        assert_eq!(s.tally.committed(BonusKind::Perfect), 1);
        assert_eq!(s.stick_count(), 0);
        assert_eq!(s.timers.len(), 1);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameTurnController::new(Tuning::default(), seeded(99));
        let mut b = GameTurnController::new(Tuning::default(), seeded(99));
        for _ in 0..3 {
            for c in [&mut a, &mut b] {
                c.touch_start();
                for _ in 0..40 {
                    c.advance(SIM_DT);
                }
                c.touch_end();
                settle(c);
            }
        }
        assert_eq!(a.session(), b.session());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Press,
        Release,
        Frame(f32),
        Collide(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Press),
            Just(Op::Release),
            (0.001f32..0.2).prop_map(Op::Frame),
            (0.001f32..0.2).prop_map(Op::Frame),
            any::<bool>().prop_map(Op::Collide),
        ]
    }

    fn allowed(from: TurnState, to: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (from, to),
            (Idle, Touching)
                | (Touching, End)
                | (End, Running)
                | (Running, Coming)
                | (Running, End)
                | (Coming, End)
                | (End, Idle)
        )
    }

    proptest! {
        #[test]
        fn prop_inputs_keep_invariants(seed in any::<u64>(), ops in prop::collection::vec(op(), 1..300)) {
            let mut c = GameTurnController::new(Tuning::default(), seeded(seed));
            let mut last_score = 0;
            let mut last_best = 0;
            for op in ops {
                let before = c.turn_state();
                let events = match op {
                    Op::Press => c.touch_start(),
                    Op::Release => c.touch_end(),
                    Op::Frame(dt) => c.advance(dt),
                    Op::Collide(platform) => c.report_collision(if platform {
                        CollisionGroup::Platform
                    } else {
                        CollisionGroup::Bonus
                    }),
                };
                if matches!(op, Op::Press) && before != TurnState::Idle {
                    prop_assert_eq!(c.turn_state(), before);
                }
                for event in &events {
                    if let GameEvent::TurnStateChanged { from, to } = event {
                        prop_assert!(allowed(*from, *to), "{:?} -> {:?}", from, to);
                    }
                }
                let s = c.session();
                prop_assert!(s.score() >= last_score);
                prop_assert!(s.best_score() >= last_best);
                prop_assert!(s.stick_count() <= 2);
                last_score = s.score();
                last_best = s.best_score();
            }
        }
    }
}
