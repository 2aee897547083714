pub mod init;
pub mod play;
pub mod simulate;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use adaptiq_core::model::QuestionPool;
use adaptiq_core::parser::{load_pool, validate_pool};
use adaptiq_core::report::SessionSummary;
use adaptiq_core::traits::Predictor;
use adaptiq_predictors::{create_predictor, AdaptiqConfig};

/// Load the pool named on the command line, falling back to the config.
pub fn resolve_pool(pool: Option<PathBuf>, config: &AdaptiqConfig) -> Result<Arc<QuestionPool>> {
    let path = pool
        .or_else(|| config.pool.clone())
        .context("no question pool given; pass --pool or set `pool` in adaptiq.toml")?;

    let pool = load_pool(&path)?;
    for warning in validate_pool(&pool) {
        match &warning.question_id {
            Some(id) => tracing::warn!(question = %id, "{}", warning.message),
            None => tracing::warn!("{}", warning.message),
        }
    }
    Ok(Arc::new(pool))
}

pub fn build_predictor(config: &AdaptiqConfig) -> Result<Arc<dyn Predictor>> {
    let predictor = create_predictor(&config.predictor)?;
    tracing::debug!(predictor = predictor.name(), "predictor ready");
    Ok(Arc::from(predictor))
}

pub fn print_summary(summary: &SessionSummary) {
    if summary.game_over {
        println!("\nGame over! No questions left at the hardest difficulty.");
    } else {
        println!("\nSession ended.");
    }
    println!("Score: {}", summary.score);
    println!("Streak: {}", summary.final_streak);
    println!(
        "Difficulty: {} ({} change(s))",
        summary.final_difficulty, summary.tier_changes
    );
    println!(
        "Answered {}/{} correctly ({:.1}%), longest streak {}",
        summary.correct_answers,
        summary.rounds_played,
        summary.accuracy() * 100.0,
        summary.longest_streak,
    );

    if summary.per_tier.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Difficulty", "Asked", "Correct", "Accuracy", "Points"]);
    for (difficulty, stats) in &summary.per_tier {
        table.add_row(vec![
            Cell::new(difficulty),
            Cell::new(stats.asked),
            Cell::new(stats.correct),
            Cell::new(format!("{:.1}%", stats.accuracy() * 100.0)),
            Cell::new(stats.points),
        ]);
    }
    println!("\n{table}");
}
