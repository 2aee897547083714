//! Core trait definitions for difficulty predictors and presentation adapters.
//!
//! Predictors are implemented by the `adaptiq-predictors` crate; presenters
//! live with whatever front end drives the session (the CLI ships a terminal
//! presenter and a simulated player).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Difficulty, Mode, Question};

// ---------------------------------------------------------------------------
// Predictor trait
// ---------------------------------------------------------------------------

/// A black-box capability suggesting the next difficulty tier.
///
/// Only consulted when none of the local promotion/demotion rules apply.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Human-readable predictor name (e.g. "http").
    fn name(&self) -> &str;

    /// Suggest the next difficulty for the given player stats.
    async fn predict(&self, request: &PredictRequest) -> anyhow::Result<PredictResponse>;
}

/// Player stats sent to a predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    /// Session the request belongs to.
    pub session_id: Uuid,
    /// Round number the request belongs to (1-based).
    pub round: u64,
    /// Inner streak after the current answer was scored.
    pub streak: u32,
    /// Difficulty the answered question was asked at.
    pub current_difficulty: Difficulty,
}

/// A predictor's suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Suggested tier, as reported by the predictor. Validated by the caller.
    pub difficulty: String,
    /// Round the predictor was answering, if it echoes one.
    #[serde(default)]
    pub round: Option<u64>,
}

impl PredictResponse {
    /// A response suggesting `difficulty` for `round`.
    pub fn for_round(difficulty: Difficulty, round: u64) -> Self {
        Self {
            difficulty: difficulty.to_string(),
            round: Some(round),
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation adapter trait
// ---------------------------------------------------------------------------

/// A question issued to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-based).
    pub id: u64,
    /// How the question should be presented.
    pub mode: Mode,
    /// Difficulty the question was drawn at.
    pub difficulty: Difficulty,
    /// The question itself.
    pub question: Question,
}

/// Renders a round and reports whether the player answered correctly.
#[async_trait]
pub trait Presenter: Send + Sync {
    async fn present(&self, round: &Round) -> anyhow::Result<bool>;
}
