//! Local predictors that need no external service.

use async_trait::async_trait;

use adaptiq_core::model::Difficulty;
use adaptiq_core::traits::{PredictRequest, PredictResponse, Predictor};

/// Keeps the player at their current tier.
///
/// With this predictor only the built-in promotion and demotion rules move
/// the difficulty.
#[derive(Debug, Default, Clone, Copy)]
pub struct HoldPredictor;

#[async_trait]
impl Predictor for HoldPredictor {
    fn name(&self) -> &str {
        "hold"
    }

    async fn predict(&self, request: &PredictRequest) -> anyhow::Result<PredictResponse> {
        Ok(PredictResponse::for_round(
            request.current_difficulty,
            request.round,
        ))
    }
}

/// Always suggests the same tier.
#[derive(Debug, Clone, Copy)]
pub struct FixedPredictor {
    difficulty: Difficulty,
}

impl FixedPredictor {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }
}

#[async_trait]
impl Predictor for FixedPredictor {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn predict(&self, request: &PredictRequest) -> anyhow::Result<PredictResponse> {
        Ok(PredictResponse::for_round(self.difficulty, request.round))
    }
}
