//! Non-repeating question draw with tier escalation.
//!
//! A draw picks a presentation mode uniformly at random, then an unseen
//! question from that mode's bucket at the requested tier. When the bucket is
//! exhausted the tier escalates (easy → normal → hard) and the draw retries;
//! exhausting hard ends the game.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::QuizError;
use crate::model::{Difficulty, Mode, Question, QuestionPool};

/// Identities of every question presented in the current game.
///
/// Never cleared during a playthrough, regardless of tier changes.
#[derive(Debug, Clone, Default)]
pub struct AskedSet {
    ids: HashSet<String>,
    order: Vec<String>,
}

impl AskedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, question: &Question) -> bool {
        self.ids.contains(&question.id)
    }

    /// Record a question. Returns `false` if it was already recorded.
    pub fn insert(&mut self, question: &Question) -> bool {
        let fresh = self.ids.insert(question.id.clone());
        if fresh {
            self.order.push(question.id.clone());
        }
        fresh
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Question ids in the order they were asked.
    pub fn ids(&self) -> &[String] {
        &self.order
    }
}

/// Result of a draw.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// An unseen question was found, possibly after escalating.
    Selected {
        mode: Mode,
        question: Question,
        /// Tier the question was drawn from. Differs from the requested tier
        /// when the draw escalated.
        difficulty: Difficulty,
    },
    /// No unseen question remains at the hardest tier.
    Exhausted,
}

/// Draw the next question for `difficulty`.
///
/// On success the question is recorded in `asked`. Nothing is recorded when
/// the draw fails or ends in exhaustion.
pub fn select_next<R: Rng + ?Sized>(
    difficulty: Difficulty,
    asked: &mut AskedSet,
    pool: &QuestionPool,
    rng: &mut R,
) -> Result<SelectionOutcome, QuizError> {
    let mut tier = difficulty;

    // One attempt per tier at most: easy, normal, hard.
    for _ in 0..Difficulty::ALL.len() {
        let mode = Mode::ALL[rng.gen_range(0..Mode::ALL.len())];
        tracing::debug!(%mode, difficulty = %tier, "drawing question");

        let Some(bucket) = pool.get(mode, tier) else {
            tracing::error!(%mode, difficulty = %tier, "questions not found in pool");
            return Err(QuizError::Configuration {
                mode,
                difficulty: tier,
            });
        };

        let available: Vec<&Question> = bucket.iter().filter(|q| !asked.contains(q)).collect();

        if let Some(question) = available.choose(rng) {
            let question = (*question).clone();
            asked.insert(&question);
            return Ok(SelectionOutcome::Selected {
                mode,
                question,
                difficulty: tier,
            });
        }

        match tier.harder() {
            Some(next) => {
                tracing::info!(from = %tier, to = %next, %mode, "bucket exhausted, escalating");
                tier = next;
            }
            None => break,
        }
    }

    tracing::info!("no more questions available at the highest difficulty");
    Ok(SelectionOutcome::Exhausted)
}
