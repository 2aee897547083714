//! Remote difficulty model reached over HTTP.
//!
//! The request body is the JSON form of [`PredictRequest`]; the service
//! answers with `{"difficulty": "...", "round": n}` where `round` is optional.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::instrument;

use adaptiq_core::error::PredictionError;
use adaptiq_core::traits::{PredictRequest, PredictResponse, Predictor};

const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Predictor backed by a remote HTTP endpoint.
pub struct HttpPredictor {
    url: String,
    api_key: Option<String>,
    timeout_ms: u64,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(url: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        Self::with_timeout(url, api_key, Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Build a predictor whose HTTP requests give up after `timeout`.
    pub fn with_timeout(
        url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        if url.trim().is_empty() {
            anyhow::bail!("predictor url is empty");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url: url.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            client,
        })
    }

}

impl std::fmt::Debug for HttpPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPredictor")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self, request), fields(round = request.round, url = %self.url))]
    async fn predict(&self, request: &PredictRequest) -> anyhow::Result<PredictResponse> {
        let mut call = self.client.post(&self.url).json(request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        // A transport timeout is a failed prediction, not the session's
        // prediction deadline, so it does not trigger the demotion fallback.
        let response = call.send().await.map_err(|e| {
            if e.is_timeout() {
                PredictionError::NetworkError(format!(
                    "request to {} timed out after {}ms",
                    self.url, self.timeout_ms
                ))
            } else if e.is_connect() {
                PredictionError::NetworkError(format!("predictor not reachable at {}", self.url))
            } else {
                PredictionError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let prediction: PredictResponse = response
            .json()
            .await
            .map_err(|e| PredictionError::Failed(format!("failed to parse response: {e}")))?;

        tracing::debug!(difficulty = %prediction.difficulty, "prediction received");
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adaptiq_core::model::Difficulty;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> PredictRequest {
        PredictRequest {
            session_id: Uuid::nil(),
            round: 3,
            streak: 1,
            current_difficulty: Difficulty::Normal,
        }
    }

    fn classify(err: anyhow::Error) -> PredictionError {
        PredictionError::classify(err)
    }

    #[tokio::test]
    async fn successful_prediction() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/predict"))
            .and(body_partial_json(serde_json::json!({
                "round": 3,
                "streak": 1,
                "current_difficulty": "normal"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"difficulty": "hard", "round": 3})),
            )
            .mount(&server)
            .await;

        let predictor = HttpPredictor::new(&format!("{}/predict", server.uri()), None).unwrap();
        let response = predictor.predict(&request()).await.unwrap();
        assert_eq!(response.difficulty, "hard");
        assert_eq!(response.round, Some(3));
    }

    #[tokio::test]
    async fn round_is_optional_in_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"difficulty": "easy"})),
            )
            .mount(&server)
            .await;

        let predictor = HttpPredictor::new(&server.uri(), None).unwrap();
        let response = predictor.predict(&request()).await.unwrap();
        assert_eq!(response.difficulty, "easy");
        assert_eq!(response.round, None);
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"difficulty": "easy"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let predictor = HttpPredictor::new(&server.uri(), Some("secret".into())).unwrap();
        predictor.predict(&request()).await.unwrap();
    }

    #[tokio::test]
    async fn server_error_maps_to_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let predictor = HttpPredictor::new(&server.uri(), None).unwrap();
        let err = classify(predictor.predict(&request()).await.unwrap_err());
        match err {
            PredictionError::ApiError { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "model loading");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let predictor = HttpPredictor::new(&server.uri(), None).unwrap();
        let err = classify(predictor.predict(&request()).await.unwrap_err());
        assert!(matches!(err, PredictionError::Failed(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"difficulty": "easy"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let predictor =
            HttpPredictor::with_timeout(&server.uri(), None, Duration::from_millis(100)).unwrap();
        let err = classify(predictor.predict(&request()).await.unwrap_err());
        assert!(!err.is_timeout());
        match err {
            PredictionError::NetworkError(msg) => assert!(msg.contains("timed out after 100ms")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn transport_timeout_fails_the_round_without_demotion() {
        use std::sync::Arc;

        use adaptiq_core::controller::{DifficultyController, TransitionRule};
        use adaptiq_core::error::QuizError;
        use adaptiq_core::model::{Mode, Question, QuestionPool};
        use adaptiq_core::session::{GameSession, NextRound};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"difficulty": "hard"}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut pool = QuestionPool::new("slow", "Slow");
        for mode in [Mode::MultipleChoice, Mode::FillInTheBlank] {
            for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
                for i in 0..3 {
                    pool.insert(Question {
                        id: format!("{mode}-{difficulty}-{i}"),
                        mode,
                        difficulty,
                        prompt: "?".into(),
                        choices: vec![],
                        answer: "a".into(),
                    });
                }
            }
        }

        let predictor =
            HttpPredictor::with_timeout(&server.uri(), None, Duration::from_millis(100)).unwrap();
        let mut session = GameSession::new(
            Arc::new(pool),
            DifficultyController::new(Arc::new(predictor)),
            Some(2),
        );

        // One correct answer at easy leaves the decision to the predictor.
        let round = match session.next_round().unwrap() {
            NextRound::Question(round) => round,
            NextRound::GameOver => panic!("pool is not empty"),
        };
        let err = session.submit_answer(round.id, true).await.unwrap_err();

        assert!(matches!(err, QuizError::Prediction(PredictionError::NetworkError(_))));
        assert_eq!(session.history()[0].rule, TransitionRule::PredictionFailed);
        assert_eq!(session.state().difficulty, Difficulty::Easy);
        assert_eq!(session.state().score, 1);
        assert_eq!(session.state().inner_streak, 1);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_error() {
        let predictor = HttpPredictor::new("http://127.0.0.1:1/predict", None).unwrap();
        let err = classify(predictor.predict(&request()).await.unwrap_err());
        assert!(matches!(err, PredictionError::NetworkError(_)));
    }

    #[test]
    fn empty_url_is_rejected() {
        assert!(HttpPredictor::new("  ", None).is_err());
    }

    #[test]
    fn debug_masks_api_key() {
        let predictor = HttpPredictor::new("http://localhost/predict", Some("sk-1".into())).unwrap();
        let debug = format!("{predictor:?}");
        assert!(!debug.contains("sk-1"));
        assert!(debug.contains("***"));
    }
}
