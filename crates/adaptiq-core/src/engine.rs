//! Central game loop orchestrator.
//!
//! Drives one [`GameSession`] at a time: draw a question, hand it to the
//! presenter, score the answer, repeat until the pool is exhausted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::controller::DifficultyController;
use crate::error::{PredictionError, QuizError};
use crate::model::QuestionPool;
use crate::report::SessionSummary;
use crate::session::{AnswerOutcome, GameSession, NextRound};
use crate::traits::{Predictor, Presenter, Round};

/// Configuration for the game engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on a single predictor call. `None` waits indefinitely.
    pub predictor_timeout: Option<Duration>,
    /// Stop the game on a predictor failure instead of keeping the tier.
    pub halt_on_prediction_error: bool,
    /// Stop after this many rounds even if questions remain.
    pub max_rounds: Option<u64>,
    /// Seed for question draws. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            predictor_timeout: Some(Duration::from_secs(2)),
            halt_on_prediction_error: false,
            max_rounds: None,
            seed: None,
        }
    }
}

/// Progress reporting trait.
pub trait RoundReporter: Send + Sync {
    fn on_question(&self, round: &Round);
    fn on_answer(&self, outcome: &AnswerOutcome);
    fn on_prediction_error(&self, round: u64, error: &PredictionError);
    fn on_game_over(&self, summary: &SessionSummary);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl RoundReporter for NoopReporter {
    fn on_question(&self, _: &Round) {}
    fn on_answer(&self, _: &AnswerOutcome) {}
    fn on_prediction_error(&self, _: u64, _: &PredictionError) {}
    fn on_game_over(&self, _: &SessionSummary) {}
}

/// The central game engine.
pub struct GameEngine {
    predictor: Arc<dyn Predictor>,
    config: EngineConfig,
}

impl GameEngine {
    pub fn new(predictor: Arc<dyn Predictor>, config: EngineConfig) -> Self {
        Self { predictor, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a fresh session over `pool`.
    pub fn new_session(&self, pool: Arc<QuestionPool>) -> GameSession {
        let mut controller = DifficultyController::new(Arc::clone(&self.predictor));
        if let Some(timeout) = self.config.predictor_timeout {
            controller = controller.with_timeout(timeout);
        }
        GameSession::new(pool, controller, self.config.seed)
    }

    /// Play `session` until the pool is exhausted or `max_rounds` is reached.
    ///
    /// Configuration errors and presenter failures end the game with an
    /// error. Predictor failures are reported and the game continues at the
    /// same tier, unless `halt_on_prediction_error` is set.
    pub async fn play(
        &self,
        session: &mut GameSession,
        presenter: &dyn Presenter,
        reporter: &dyn RoundReporter,
    ) -> Result<SessionSummary> {
        let mut played = 0u64;

        loop {
            if self.config.max_rounds.is_some_and(|max| played >= max) {
                tracing::info!(rounds = played, "round limit reached");
                break;
            }

            let round = match session.next_round()? {
                NextRound::Question(round) => round,
                NextRound::GameOver => break,
            };
            reporter.on_question(&round);

            let correct = presenter.present(&round).await?;
            played += 1;

            match session.submit_answer(round.id, correct).await {
                Ok(outcome) => reporter.on_answer(&outcome),
                Err(QuizError::Prediction(err)) => {
                    tracing::error!("error predicting difficulty for round {}: {err}", round.id);
                    reporter.on_prediction_error(round.id, &err);
                    if self.config.halt_on_prediction_error {
                        return Err(QuizError::Prediction(err).into());
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        let summary = session.summary();
        reporter.on_game_over(&summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Mode, Question};
    use crate::traits::{PredictRequest, PredictResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Hold;

    #[async_trait]
    impl Predictor for Hold {
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

    struct Garbage;

    #[async_trait]
    impl Predictor for Garbage {
        fn name(&self) -> &str {
            "garbage"
        }

        async fn predict(&self, _: &PredictRequest) -> anyhow::Result<PredictResponse> {
            Ok(PredictResponse {
                difficulty: "impossible".into(),
                round: None,
            })
        }
    }

    struct Always(bool);

    #[async_trait]
    impl Presenter for Always {
        async fn present(&self, _: &Round) -> anyhow::Result<bool> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct Recorder {
        questions: Mutex<Vec<String>>,
        errors: Mutex<u32>,
        finished: Mutex<bool>,
    }

    impl RoundReporter for Recorder {
        fn on_question(&self, round: &Round) {
            self.questions.lock().unwrap().push(round.question.id.clone());
        }
        fn on_answer(&self, _: &AnswerOutcome) {}
        fn on_prediction_error(&self, _: u64, _: &PredictionError) {
            *self.errors.lock().unwrap() += 1;
        }
        fn on_game_over(&self, _: &SessionSummary) {
            *self.finished.lock().unwrap() = true;
        }
    }

    /// Exactly one question per (mode, difficulty).
    fn single_pool() -> Arc<QuestionPool> {
        let mut pool = QuestionPool::new("single", "Single");
        for mode in Mode::ALL {
            for difficulty in Difficulty::ALL {
                pool.insert(Question {
                    id: format!("{mode}-{difficulty}"),
                    mode,
                    difficulty,
                    prompt: String::new(),
                    choices: vec![],
                    answer: String::new(),
                });
            }
        }
        Arc::new(pool)
    }

    fn seeded(seed: u64) -> EngineConfig {
        EngineConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn plays_until_exhaustion() {
        let engine = GameEngine::new(Arc::new(Hold), seeded(21));
        let mut session = engine.new_session(single_pool());
        let reporter = Recorder::default();

        let summary = engine
            .play(&mut session, &Always(true), &reporter)
            .await
            .unwrap();

        assert!(summary.game_over);
        assert!(*reporter.finished.lock().unwrap());
        assert!(summary.rounds_played >= 1 && summary.rounds_played <= 6);
        assert_eq!(summary.score, session.state().score);

        let asked = reporter.questions.lock().unwrap();
        let unique: std::collections::HashSet<_> = asked.iter().collect();
        assert_eq!(unique.len(), asked.len());
    }

    #[tokio::test]
    async fn final_score_is_deterministic_for_a_seed() {
        let run = |seed| async move {
            let engine = GameEngine::new(Arc::new(Hold), seeded(seed));
            let mut session = engine.new_session(single_pool());
            engine
                .play(&mut session, &Always(true), &NoopReporter)
                .await
                .unwrap()
        };

        let a = run(5).await;
        let b = run(5).await;
        assert_eq!(a.score, b.score);
        assert_eq!(a.history, b.history);
    }

    #[tokio::test]
    async fn round_limit_stops_early() {
        let config = EngineConfig {
            max_rounds: Some(2),
            ..seeded(1)
        };
        let engine = GameEngine::new(Arc::new(Hold), config);
        let mut pool = QuestionPool::new("big", "Big");
        for mode in Mode::ALL {
            for difficulty in Difficulty::ALL {
                for i in 0..5 {
                    pool.insert(Question {
                        id: format!("{mode}-{difficulty}-{i}"),
                        mode,
                        difficulty,
                        prompt: String::new(),
                        choices: vec![],
                        answer: String::new(),
                    });
                }
            }
        }
        let mut session = engine.new_session(Arc::new(pool));

        let summary = engine
            .play(&mut session, &Always(false), &NoopReporter)
            .await
            .unwrap();
        assert_eq!(summary.rounds_played, 2);
        assert!(!summary.game_over);
        assert_eq!(summary.score, 0);
    }

    #[tokio::test]
    async fn prediction_errors_are_reported_and_play_continues() {
        let engine = GameEngine::new(Arc::new(Garbage), seeded(9));
        let mut session = engine.new_session(single_pool());
        let reporter = Recorder::default();

        let summary = engine
            .play(&mut session, &Always(true), &reporter)
            .await
            .unwrap();
        assert!(summary.game_over);
        assert!(*reporter.errors.lock().unwrap() >= 1);
    }

    #[tokio::test]
    async fn prediction_errors_can_halt() {
        let config = EngineConfig {
            halt_on_prediction_error: true,
            ..seeded(9)
        };
        let engine = GameEngine::new(Arc::new(Garbage), config);
        let mut session = engine.new_session(single_pool());

        let err = engine
            .play(&mut session, &Always(true), &NoopReporter)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("invalid difficulty tier"));
    }

    #[tokio::test]
    async fn configuration_error_ends_play() {
        let mut pool = QuestionPool::new("empty", "Empty");
        pool.ensure_bucket(Mode::MultipleChoice, Difficulty::Easy);
        let engine = GameEngine::new(Arc::new(Hold), seeded(2));
        let mut session = engine.new_session(Arc::new(pool));

        let err = engine
            .play(&mut session, &Always(true), &NoopReporter)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("questions not found"));
        assert_eq!(session.state().score, 0);
    }
}
