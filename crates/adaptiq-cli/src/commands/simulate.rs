//! The `adaptiq simulate` command.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use adaptiq_core::engine::{GameEngine, RoundReporter};
use adaptiq_core::error::PredictionError;
use adaptiq_core::report::SessionSummary;
use adaptiq_core::session::AnswerOutcome;
use adaptiq_core::traits::{Presenter, Round};
use adaptiq_predictors::config::load_config_from;

use super::{build_predictor, print_summary, resolve_pool};

/// Answers correctly with a fixed probability.
struct SimulatedPlayer {
    accuracy: f64,
    rng: Mutex<StdRng>,
}

impl SimulatedPlayer {
    fn new(accuracy: f64, seed: Option<u64>) -> Self {
        // Offset so the player does not share a stream with question draws.
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            accuracy,
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl Presenter for SimulatedPlayer {
    async fn present(&self, _: &Round) -> Result<bool> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| anyhow::anyhow!("simulated player state poisoned"))?;
        Ok(rng.gen_bool(self.accuracy))
    }
}

/// One line per round.
struct RoundLog;

impl RoundReporter for RoundLog {
    fn on_question(&self, _: &Round) {}

    fn on_answer(&self, outcome: &AnswerOutcome) {
        let mark = if outcome.correct { "correct" } else { "wrong" };
        let change = if outcome.difficulty_changed() {
            format!(" -> {} ({})", outcome.difficulty, outcome.rule)
        } else {
            String::new()
        };
        println!(
            "  Round {:>3}: {:<7} [{}]{}",
            outcome.round, mark, outcome.previous_difficulty, change
        );
    }

    fn on_prediction_error(&self, round: u64, error: &PredictionError) {
        eprintln!("  Warning: round {round}: {error}");
    }

    fn on_game_over(&self, _: &SessionSummary) {}
}

pub async fn execute(
    pool: Option<PathBuf>,
    accuracy: f64,
    seed: Option<u64>,
    rounds: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&accuracy),
        "accuracy must be between 0.0 and 1.0"
    );
    if let Some(rounds) = rounds {
        anyhow::ensure!(rounds >= 1, "rounds must be at least 1");
    }

    let mut config = load_config_from(config_path.as_deref())?;
    if seed.is_some() {
        config.seed = seed;
    }
    if rounds.is_some() {
        config.max_rounds = rounds;
    }

    let pool = resolve_pool(pool, &config)?;
    let engine = GameEngine::new(build_predictor(&config)?, config.engine_config());
    let mut session = engine.new_session(pool.clone());
    let player = SimulatedPlayer::new(accuracy, config.seed);

    println!(
        "Simulating {} ({} questions) at {:.0}% accuracy",
        pool.name,
        pool.len(),
        accuracy * 100.0
    );

    let summary = engine.play(&mut session, &player, &RoundLog).await?;
    print_summary(&summary);

    if let Some(path) = output {
        summary.save_json(&path)?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
