//! The `adaptiq play` command.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use adaptiq_core::engine::{GameEngine, RoundReporter};
use adaptiq_core::error::PredictionError;
use adaptiq_core::model::Mode;
use adaptiq_core::report::SessionSummary;
use adaptiq_core::session::AnswerOutcome;
use adaptiq_core::traits::{Presenter, Round};
use adaptiq_predictors::config::load_config_from;

use super::{build_predictor, print_summary, resolve_pool};

/// The player asked to stop, or stdin was closed.
#[derive(Debug)]
struct Quit;

impl std::fmt::Display for Quit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("player quit")
    }
}

impl std::error::Error for Quit {}

/// Reads answers from stdin.
struct TerminalPresenter;

fn read_answer() -> Result<Option<String>> {
    let mut line = String::new();
    let read = std::io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[async_trait]
impl Presenter for TerminalPresenter {
    async fn present(&self, round: &Round) -> Result<bool> {
        let question = &round.question;
        println!(
            "\nRound {} [{}, {}]",
            round.id, round.difficulty, round.mode
        );
        println!("{}", question.prompt);
        if round.mode == Mode::MultipleChoice {
            for (i, choice) in question.choices.iter().enumerate() {
                println!("  {}. {choice}", i + 1);
            }
        }
        print!("> ");
        std::io::stdout().flush()?;

        let answer = tokio::task::spawn_blocking(read_answer).await??;
        let answer = match answer {
            Some(a) if !a.eq_ignore_ascii_case("q") && !a.eq_ignore_ascii_case("quit") => a,
            _ => return Err(Quit.into()),
        };

        let correct = question.is_correct_response(&answer);
        if correct {
            println!("Correct!");
        } else {
            println!("Wrong. The answer was: {}", question.answer);
        }
        Ok(correct)
    }
}

/// Console progress reporter.
struct ConsoleReporter;

impl RoundReporter for ConsoleReporter {
    fn on_question(&self, _: &Round) {}

    fn on_answer(&self, outcome: &AnswerOutcome) {
        if outcome.correct {
            println!("  +{} points", outcome.points);
        }
        if outcome.difficulty_changed() {
            println!(
                "  Difficulty: {} -> {}",
                outcome.previous_difficulty, outcome.difficulty
            );
        }
    }

    fn on_prediction_error(&self, round: u64, error: &PredictionError) {
        eprintln!("  Warning: round {round}: {error}");
    }

    fn on_game_over(&self, _: &SessionSummary) {}
}

pub async fn execute(
    pool: Option<PathBuf>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if seed.is_some() {
        config.seed = seed;
    }

    let pool = resolve_pool(pool, &config)?;
    let engine = GameEngine::new(build_predictor(&config)?, config.engine_config());
    let mut session = engine.new_session(pool.clone());

    println!("{} ({} questions)", pool.name, pool.len());
    println!("Type your answer, or `q` to quit.");

    let summary = match engine
        .play(&mut session, &TerminalPresenter, &ConsoleReporter)
        .await
    {
        Ok(summary) => summary,
        Err(e) if e.is::<Quit>() => session.summary(),
        Err(e) => return Err(e),
    };

    print_summary(&summary);
    Ok(())
}
