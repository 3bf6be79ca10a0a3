//! Stick Bridge headless runner
//!
//! Plays the game with a simple bot: hold until the stick roughly spans the
//! gap, release, watch the turn play out. Useful for soak-testing balance
//! changes.
//!
//! Usage: `stick-bridge [SEED] [RUNS] [TUNING_JSON]`

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use stick_bridge::audio::AudioController;
use stick_bridge::consts::SIM_DT;
use stick_bridge::sim::{Input, TurnState, seeded};
use stick_bridge::tuning::TuningError;
use stick_bridge::{Game, Tuning, platform};

/// Safety cap so a perfect bot still terminates
const MAX_TURNS_PER_RUN: u32 = 500;
/// Upper bound on frames spent waiting for one turn to play out
const MAX_FRAMES_PER_TURN: u32 = 60 * 30;

#[derive(Debug, Error)]
enum LoadTuningError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Invalid { path: String, source: TuningError },
}

fn main() {
    platform::init_logging();

    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(rand::random::<u64>);
    let runs: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let tuning = match args.next() {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };

    log::info!("Stick Bridge (headless) starting: seed {}, {} runs", seed, runs);

    let audio = AudioController::for_platform().shared();
    let mut game = Game::new(tuning, seeded(seed), audio, platform::default_store());
    let mut bot = Pcg32::seed_from_u64(seed ^ 0x5EED);

    for run in 1..=runs {
        let turns = play_run(&mut game, &mut bot);
        let session = game.session();
        log::info!(
            "Run {}: score {} after {} turns (best {})",
            run,
            session.score(),
            turns,
            session.best_score()
        );
        game.restart();
    }
}

fn load_tuning(path: &str) -> Result<Tuning, LoadTuningError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadTuningError::Read {
        path: path.to_owned(),
        source,
    })?;
    Tuning::from_json(&json).map_err(|source| LoadTuningError::Invalid {
        path: path.to_owned(),
        source,
    })
}

/// Play until game over; returns the number of turns taken
fn play_run(game: &mut Game, bot: &mut Pcg32) -> u32 {
    for turn in 1..=MAX_TURNS_PER_RUN {
        let session = game.session();
        // Aim somewhere between the perfect zone and the far edge
        let next = &session.next_platform;
        let aim = next.position_x + bot.random_range(-0.6..0.6) * next.width / 2.0;
        let target = aim - session.current_platform.right_edge();

        game.handle_input(Input::TouchStart);
        while game
            .session()
            .active_stick
            .as_ref()
            .is_some_and(|s| s.is_growing() && s.length < target)
        {
            game.frame(SIM_DT);
        }
        game.handle_input(Input::TouchEnd);

        for _ in 0..MAX_FRAMES_PER_TURN {
            let s = game.session();
            if s.is_over() || (s.turn_state == TurnState::Idle && s.movement.is_none()) {
                break;
            }
            game.frame(SIM_DT);
        }
        if game.session().is_over() {
            return turn;
        }
    }
    log::warn!("Turn cap reached");
    MAX_TURNS_PER_RUN
}
