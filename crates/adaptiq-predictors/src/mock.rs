//! Mock predictor for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use adaptiq_core::error::PredictionError;
use adaptiq_core::model::Difficulty;
use adaptiq_core::traits::{PredictRequest, PredictResponse, Predictor};

/// One scripted reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    /// Suggest the tier the player is already at.
    Hold,
    /// Suggest this tier.
    Tier(Difficulty),
    /// Suggest an arbitrary string, which may not be a valid tier.
    Raw(String),
    /// Answer for a different round than the one asked about.
    Stale,
    /// Fail with this message.
    Fail(String),
}

/// A mock predictor for exercising sessions without a real model.
///
/// Replies are taken from the script in order; once it runs out, the
/// fallback reply is used for every further call.
pub struct MockPredictor {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    delay: Option<Duration>,
    call_count: AtomicU32,
    requests: Mutex<Vec<PredictRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockPredictor {
    /// Create a mock that plays `script` and then holds the current tier.
    pub fn scripted(script: impl IntoIterator<Item = MockReply>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: MockReply::Hold,
            delay: None,
            call_count: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always holds the current tier.
    pub fn holding() -> Self {
        Self::scripted([])
    }

    /// Create a mock that always suggests `difficulty`.
    pub fn always(difficulty: Difficulty) -> Self {
        Self::holding().with_fallback(MockReply::Tier(difficulty))
    }

    /// Create a mock that always fails.
    pub fn failing(message: &str) -> Self {
        Self::holding().with_fallback(MockReply::Fail(message.to_string()))
    }

    /// Reply used once the script is exhausted.
    pub fn with_fallback(mut self, reply: MockReply) -> Self {
        self.fallback = reply;
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of calls made to this predictor.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this predictor.
    pub fn last_request(&self) -> Option<PredictRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Every request received, oldest first.
    pub fn requests(&self) -> Vec<PredictRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl Predictor for MockPredictor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn predict(&self, request: &PredictRequest) -> anyhow::Result<PredictResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.requests).push(request.clone());

        let reply = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match reply {
            MockReply::Hold => Ok(PredictResponse::for_round(
                request.current_difficulty,
                request.round,
            )),
            MockReply::Tier(difficulty) => Ok(PredictResponse::for_round(difficulty, request.round)),
            MockReply::Raw(difficulty) => Ok(PredictResponse {
                difficulty,
                round: Some(request.round),
            }),
            MockReply::Stale => Ok(PredictResponse::for_round(
                request.current_difficulty,
                request.round + 1,
            )),
            MockReply::Fail(message) => Err(PredictionError::Failed(message).into()),
        }
    }
}
