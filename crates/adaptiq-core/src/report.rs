//! Round history and end-of-game summary with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::TransitionRule;
use crate::model::{Difficulty, Mode};
use crate::session::SessionState;
use crate::statistics::{longest_streak, tier_changes, tier_stats, TierStats};

/// One scored round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u64,
    pub question_id: String,
    pub mode: Mode,
    /// Tier the question was asked at.
    pub difficulty: Difficulty,
    pub correct: bool,
    pub points: u32,
    /// Tier after the answer was scored.
    pub next_difficulty: Difficulty,
    pub rule: TransitionRule,
}

/// End-of-game report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Session identifier.
    pub session_id: Uuid,
    /// Pool the session drew from.
    pub pool_id: String,
    pub score: u64,
    /// Visible streak at the end of the game.
    pub final_streak: u32,
    pub final_difficulty: Difficulty,
    pub game_over: bool,
    pub rounds_played: usize,
    pub correct_answers: usize,
    pub longest_streak: u32,
    /// Rounds after which the tier moved.
    #[serde(default)]
    pub tier_changes: usize,
    /// Accuracy per tier the player was asked questions at.
    pub per_tier: BTreeMap<Difficulty, TierStats>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Every scored round, in order.
    pub history: Vec<RoundRecord>,
}

impl SessionSummary {
    pub fn new(
        session_id: Uuid,
        pool_id: &str,
        state: &SessionState,
        history: &[RoundRecord],
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            pool_id: pool_id.to_string(),
            score: state.score,
            final_streak: state.actual_streak,
            final_difficulty: state.difficulty,
            game_over: state.game_over,
            rounds_played: history.len(),
            correct_answers: history.iter().filter(|r| r.correct).count(),
            longest_streak: longest_streak(history),
            tier_changes: tier_changes(history),
            per_tier: tier_stats(history),
            started_at,
            finished_at: Utc::now(),
            history: history.to_vec(),
        }
    }

    /// Fraction of rounds answered correctly (0.0 when nothing was played).
    pub fn accuracy(&self) -> f64 {
        if self.rounds_played == 0 {
            0.0
        } else {
            self.correct_answers as f64 / self.rounds_played as f64
        }
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize summary")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read summary from {}", path.display()))?;
        let summary: SessionSummary =
            serde_json::from_str(&content).context("failed to parse summary JSON")?;
        Ok(summary)
    }
}
