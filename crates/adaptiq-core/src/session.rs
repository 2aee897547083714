//! Per-player game session.
//!
//! [`GameSession`] owns everything one playthrough mutates: the counters in
//! [`SessionState`], the asked set, the questions asked since the last tier
//! change, the random source, and the round history. Rounds are strictly
//! sequential: a question is issued with [`GameSession::next_round`] and must
//! be answered with [`GameSession::submit_answer`] before another is issued.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::controller::{
    next_difficulty, score_answer, timeout_fallback, DifficultyController, Settled, Transition,
    TransitionRule,
};
use crate::error::QuizError;
use crate::model::{Difficulty, Question, QuestionPool};
use crate::report::{RoundRecord, SessionSummary};
use crate::selection::{select_next, AskedSet, SelectionOutcome};
use crate::traits::{PredictRequest, Round};

/// Score, streaks and difficulty of one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Never decreases.
    pub score: u64,
    /// Consecutive correct answers, shown to the player.
    pub actual_streak: u32,
    /// Consecutive correct answers driving promotion. Reset on promotion
    /// and demotion as well as on wrong answers.
    pub inner_streak: u32,
    pub consecutive_wrong: u32,
    pub difficulty: Difficulty,
    pub game_over: bool,
}

/// Where a session is in its round cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Ready to issue the next question.
    Ready,
    /// A question is out and its answer has not been scored yet.
    AwaitingAnswer(u64),
    /// No unseen question remains at the hardest tier.
    GameOver,
    /// A configuration error stopped the session.
    Halted(String),
}

/// Result of asking for the next question.
#[derive(Debug, Clone, PartialEq)]
pub enum NextRound {
    Question(Round),
    GameOver,
}

/// What happened when an answer was scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub round: u64,
    pub correct: bool,
    pub points: u32,
    pub previous_difficulty: Difficulty,
    pub difficulty: Difficulty,
    pub rule: TransitionRule,
}

impl AnswerOutcome {
    pub fn difficulty_changed(&self) -> bool {
        self.previous_difficulty != self.difficulty
    }
}

/// A single playthrough.
pub struct GameSession {
    id: Uuid,
    pool: Arc<QuestionPool>,
    controller: DifficultyController,
    rng: StdRng,
    state: SessionState,
    asked: AskedSet,
    previous: Vec<Question>,
    phase: SessionPhase,
    pending: Option<Round>,
    rounds_issued: u64,
    history: Vec<RoundRecord>,
    started_at: DateTime<Utc>,
}

impl GameSession {
    /// Start a session at easy with every counter at zero.
    ///
    /// With `seed` set, question draws are reproducible; otherwise the random
    /// source is seeded from entropy.
    pub fn new(
        pool: Arc<QuestionPool>,
        controller: DifficultyController,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let id = Uuid::new_v4();
        tracing::info!(
            session = %id,
            pool = %pool.id,
            questions = pool.len(),
            predictor = controller.predictor_name(),
            "session started"
        );

        Self {
            id,
            pool,
            controller,
            rng,
            state: SessionState::default(),
            asked: AskedSet::new(),
            previous: Vec::new(),
            phase: SessionPhase::Ready,
            pending: None,
            rounds_issued: 0,
            history: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn asked(&self) -> &AskedSet {
        &self.asked
    }

    /// Questions asked since the last difficulty change, oldest first.
    pub fn previous_questions(&self) -> &[Question] {
        &self.previous
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    /// The round currently awaiting an answer, if any.
    pub fn pending_round(&self) -> Option<&Round> {
        self.pending.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    fn ensure_active(&self) -> Result<(), QuizError> {
        match &self.phase {
            SessionPhase::GameOver => Err(QuizError::GameOver),
            SessionPhase::Halted(reason) => Err(QuizError::Halted(reason.clone())),
            SessionPhase::Ready | SessionPhase::AwaitingAnswer(_) => Ok(()),
        }
    }

    /// Draw the next question at the current difficulty.
    ///
    /// Escalation during the draw moves the session to the tier the question
    /// came from. Exhaustion at hard ends the game. A configuration error
    /// halts the session and leaves [`SessionState`] untouched.
    pub fn next_round(&mut self) -> Result<NextRound, QuizError> {
        self.ensure_active()?;
        if let SessionPhase::AwaitingAnswer(pending) = self.phase {
            return Err(QuizError::RoundPending { pending });
        }

        let outcome = match select_next(
            self.state.difficulty,
            &mut self.asked,
            &self.pool,
            &mut self.rng,
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.phase = SessionPhase::Halted(err.to_string());
                return Err(err);
            }
        };

        match outcome {
            SelectionOutcome::Exhausted => {
                self.state.game_over = true;
                self.phase = SessionPhase::GameOver;
                tracing::info!(
                    session = %self.id,
                    score = self.state.score,
                    streak = self.state.actual_streak,
                    difficulty = %self.state.difficulty,
                    "game over"
                );
                Ok(NextRound::GameOver)
            }
            SelectionOutcome::Selected {
                mode,
                question,
                difficulty,
            } => {
                if difficulty != self.state.difficulty {
                    self.state.difficulty = difficulty;
                    self.previous.clear();
                }
                self.previous.push(question.clone());
                self.rounds_issued += 1;

                let round = Round {
                    id: self.rounds_issued,
                    mode,
                    difficulty,
                    question,
                };
                tracing::debug!(
                    round = round.id,
                    question = %round.question.id,
                    %mode,
                    %difficulty,
                    "question issued"
                );
                self.phase = SessionPhase::AwaitingAnswer(round.id);
                self.pending = Some(round.clone());
                Ok(NextRound::Question(round))
            }
        }
    }

    /// Score the answer to the pending round and move to the next difficulty.
    ///
    /// Counter updates are committed even when the predictor fails; in that
    /// case the difficulty stays where it was, the round is closed, and the
    /// error is returned so the caller can decide whether to keep playing.
    /// Nothing is committed if this future is dropped before it completes.
    pub async fn submit_answer(
        &mut self,
        round_id: u64,
        is_correct: bool,
    ) -> Result<AnswerOutcome, QuizError> {
        self.ensure_active()?;
        let round = match (&self.phase, &self.pending) {
            (SessionPhase::AwaitingAnswer(expected), Some(round)) => {
                if *expected != round_id {
                    return Err(QuizError::StaleRound {
                        expected: *expected,
                        got: round_id,
                    });
                }
                round.clone()
            }
            _ => return Err(QuizError::NoPendingRound),
        };

        let current = self.state.difficulty;
        let mut next = self.state.clone();
        let points = score_answer(&mut next, is_correct);

        let transition = next_difficulty(
            current,
            is_correct,
            next.inner_streak,
            next.consecutive_wrong,
        );
        let settled = match transition {
            Transition::Settled(settled) => Ok(settled),
            Transition::Delegate => {
                let request = PredictRequest {
                    session_id: self.id,
                    round: round.id,
                    streak: next.inner_streak,
                    current_difficulty: current,
                };
                match self.controller.predict(&request).await {
                    Ok(difficulty) => Ok(Settled {
                        difficulty,
                        inner_streak: next.inner_streak,
                        consecutive_wrong: next.consecutive_wrong,
                        rule: TransitionRule::Predictor,
                    }),
                    Err(err) if err.is_timeout() => {
                        tracing::warn!(round = round.id, "{err}, falling back to rule-based demotion");
                        Ok(timeout_fallback(
                            current,
                            next.inner_streak,
                            next.consecutive_wrong,
                        ))
                    }
                    Err(err) => Err(err),
                }
            }
        };

        let (settled, failure) = match settled {
            Ok(settled) => (settled, None),
            Err(err) => {
                tracing::warn!(round = round.id, "error predicting difficulty: {err}");
                let unchanged = Settled {
                    difficulty: current,
                    inner_streak: next.inner_streak,
                    consecutive_wrong: next.consecutive_wrong,
                    rule: TransitionRule::PredictionFailed,
                };
                (unchanged, Some(err))
            }
        };

        next.difficulty = settled.difficulty;
        next.inner_streak = settled.inner_streak;
        next.consecutive_wrong = settled.consecutive_wrong;
        if settled.difficulty != current {
            tracing::info!(
                round = round.id,
                from = %current,
                to = %settled.difficulty,
                rule = %settled.rule,
                "difficulty changed"
            );
            self.previous.clear();
        }
        self.state = next;

        let outcome = AnswerOutcome {
            round: round.id,
            correct: is_correct,
            points,
            previous_difficulty: current,
            difficulty: settled.difficulty,
            rule: settled.rule,
        };
        self.history.push(RoundRecord {
            round: round.id,
            question_id: round.question.id.clone(),
            mode: round.mode,
            difficulty: round.difficulty,
            correct: is_correct,
            points,
            next_difficulty: settled.difficulty,
            rule: settled.rule,
        });
        self.pending = None;
        self.phase = SessionPhase::Ready;

        match failure {
            Some(err) => Err(QuizError::Prediction(err)),
            None => Ok(outcome),
        }
    }

    /// End-of-game report. Available at any point; final once the game is over.
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::new(
            self.id,
            &self.pool.id,
            &self.state,
            &self.history,
            self.started_at,
        )
    }
}
