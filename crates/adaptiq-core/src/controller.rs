//! Difficulty adaptation rules.
//!
//! After every answer the counters are updated first, then the transition
//! rules are evaluated top to bottom, first match wins:
//!
//! | Rule | Condition | Result |
//! |------|-----------|--------|
//! | Promotion | inner streak ≥ 3 | one tier up (hard stays hard), inner streak reset |
//! | Hard miss | at hard, wrong answer | normal, inner streak reset |
//! | Normal double miss | at normal, 2+ wrong in a row | easy, inner streak and wrong counter reset |
//! | Predictor | anything else | whatever the predictor suggests |
//!
//! Everything except the last row is a pure function of the counters. The
//! predictor is asked through [`DifficultyController`], which bounds the call
//! with a timeout and validates the response.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PredictionError;
use crate::model::Difficulty;
use crate::session::SessionState;
use crate::traits::{PredictRequest, Predictor};

/// Inner streak needed to promote.
pub const PROMOTION_STREAK: u32 = 3;

/// Consecutive wrong answers at normal that demote to easy.
pub const NORMAL_DEMOTION_MISSES: u32 = 2;

/// Which rule decided a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionRule {
    Promotion,
    HardMiss,
    NormalDoubleMiss,
    Predictor,
    /// The predictor timed out and rule-based demotion was applied.
    TimeoutFallback,
    /// The predictor failed; difficulty was left unchanged.
    PredictionFailed,
}

impl std::fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransitionRule::Promotion => "promotion",
            TransitionRule::HardMiss => "hard miss",
            TransitionRule::NormalDoubleMiss => "normal double miss",
            TransitionRule::Predictor => "predictor",
            TransitionRule::TimeoutFallback => "timeout fallback",
            TransitionRule::PredictionFailed => "prediction failed",
        };
        write!(f, "{s}")
    }
}

/// A transition decided without the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub difficulty: Difficulty,
    pub inner_streak: u32,
    pub consecutive_wrong: u32,
    pub rule: TransitionRule,
}

/// Outcome of evaluating the local rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Settled(Settled),
    /// No local rule applies; ask the predictor.
    Delegate,
}

/// Apply the counter update for one answer and return the points awarded.
///
/// Correct answers earn `1 + floor(actual_streak / 3)`, using the streak
/// after it has been incremented.
pub fn score_answer(state: &mut SessionState, is_correct: bool) -> u32 {
    if is_correct {
        state.inner_streak += 1;
        state.actual_streak += 1;
        state.consecutive_wrong = 0;
        let points = 1 + state.actual_streak / 3;
        state.score += u64::from(points);
        points
    } else {
        state.inner_streak = 0;
        state.actual_streak = 0;
        state.consecutive_wrong += 1;
        0
    }
}

/// Evaluate the local transition rules against counters that already
/// reflect the answer.
pub fn next_difficulty(
    current: Difficulty,
    is_correct: bool,
    inner_streak: u32,
    consecutive_wrong: u32,
) -> Transition {
    if inner_streak >= PROMOTION_STREAK {
        return Transition::Settled(Settled {
            difficulty: current.promoted(),
            inner_streak: 0,
            consecutive_wrong,
            rule: TransitionRule::Promotion,
        });
    }
    if current.is_hardest() && !is_correct {
        return Transition::Settled(Settled {
            difficulty: Difficulty::Normal,
            inner_streak: 0,
            consecutive_wrong,
            rule: TransitionRule::HardMiss,
        });
    }
    if current == Difficulty::Normal && consecutive_wrong >= NORMAL_DEMOTION_MISSES {
        return Transition::Settled(Settled {
            difficulty: Difficulty::Easy,
            inner_streak: 0,
            consecutive_wrong: 0,
            rule: TransitionRule::NormalDoubleMiss,
        });
    }
    Transition::Delegate
}

/// Transition used when the predictor times out: the demotion rules are
/// evaluated as if the answer had been wrong at the current tier, and the
/// tier is kept when neither applies.
pub fn timeout_fallback(current: Difficulty, inner_streak: u32, consecutive_wrong: u32) -> Settled {
    let demotion = match current {
        Difficulty::Hard => Some((Difficulty::Normal, consecutive_wrong)),
        Difficulty::Normal if consecutive_wrong >= NORMAL_DEMOTION_MISSES => {
            Some((Difficulty::Easy, 0))
        }
        _ => None,
    };
    match demotion {
        Some((difficulty, consecutive_wrong)) => Settled {
            difficulty,
            inner_streak: 0,
            consecutive_wrong,
            rule: TransitionRule::TimeoutFallback,
        },
        None => Settled {
            difficulty: current,
            inner_streak,
            consecutive_wrong,
            rule: TransitionRule::TimeoutFallback,
        },
    }
}

/// Asks the injected predictor for the next tier.
#[derive(Clone)]
pub struct DifficultyController {
    predictor: Arc<dyn Predictor>,
    timeout: Option<Duration>,
}

impl DifficultyController {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            timeout: None,
        }
    }

    /// Bound every predictor call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn predictor_name(&self) -> &str {
        self.predictor.name()
    }

    /// Ask the predictor and validate its answer.
    ///
    /// A response echoing a different round is stale and rejected, as is a
    /// suggestion that is not a known tier.
    pub async fn predict(&self, request: &PredictRequest) -> Result<Difficulty, PredictionError> {
        tracing::debug!(
            predictor = self.predictor.name(),
            round = request.round,
            streak = request.streak,
            current = %request.current_difficulty,
            "asking predictor"
        );

        let call = self.predictor.predict(request);
        let response = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(result) => result,
                Err(_) => {
                    let ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    return Err(PredictionError::Timeout(ms));
                }
            },
            None => call.await,
        }
        .map_err(PredictionError::classify)?;

        if let Some(round) = response.round {
            if round != request.round {
                return Err(PredictionError::Stale {
                    expected: request.round,
                    got: round,
                });
            }
        }

        response
            .difficulty
            .parse::<Difficulty>()
            .map_err(|_| PredictionError::InvalidTier(response.difficulty.clone()))
    }
}

impl std::fmt::Debug for DifficultyController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DifficultyController")
            .field("predictor", &self.predictor.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}
