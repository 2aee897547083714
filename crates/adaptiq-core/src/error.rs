//! Quiz and predictor error types.
//!
//! Predictor implementations return `PredictionError` through `anyhow`; the
//! difficulty controller downcasts it to tell timeouts from other failures.

use thiserror::Error;

use crate::model::{Difficulty, Mode};

/// Errors surfaced by a quiz session to its caller.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The pool has no bucket for the requested (mode, difficulty) pair.
    #[error("questions not found for mode: {mode} and difficulty: {difficulty}")]
    Configuration { mode: Mode, difficulty: Difficulty },

    /// The predictor could not suggest the next difficulty.
    #[error("error predicting difficulty: {0}")]
    Prediction(#[from] PredictionError),

    /// A new round was requested while another is still awaiting its answer.
    #[error("round {pending} is still awaiting an answer")]
    RoundPending { pending: u64 },

    /// An answer was submitted while no round was in progress.
    #[error("no round is awaiting an answer")]
    NoPendingRound,

    /// An answer was submitted for a round other than the pending one.
    #[error("answer for round {got} does not match pending round {expected}")]
    StaleRound { expected: u64, got: u64 },

    /// The session has already finished.
    #[error("the game is over")]
    GameOver,

    /// The session stopped issuing questions after a fatal error.
    #[error("session halted: {0}")]
    Halted(String),
}

/// Errors that can occur when asking a predictor for the next difficulty.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The predictor suggested something that is not a known tier.
    #[error("invalid difficulty tier: {0}")]
    InvalidTier(String),

    /// The response belongs to a different round than the one asked about.
    #[error("stale prediction for round {got}, expected round {expected}")]
    Stale { expected: u64, got: u64 },

    /// The predictor did not answer in time.
    #[error("prediction timed out after {0}ms")]
    Timeout(u64),

    /// The predictor endpoint returned an error response.
    #[error("predictor error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Any other predictor failure.
    #[error("prediction failed: {0}")]
    Failed(String),
}

impl PredictionError {
    /// Returns `true` if the failure is a timeout, which is recovered with
    /// rule-based demotion instead of being surfaced.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PredictionError::Timeout(_))
    }

    /// Classify an error returned through the `Predictor` trait boundary.
    pub fn classify(err: anyhow::Error) -> PredictionError {
        match err.downcast::<PredictionError>() {
            Ok(prediction) => prediction,
            Err(other) => PredictionError::Failed(format!("{other:#}")),
        }
    }
}
