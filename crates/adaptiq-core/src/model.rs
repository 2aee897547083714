//! Core data model types for adaptiq.
//!
//! These are the fundamental types the whole system uses to represent
//! questions, presentation modes, difficulty tiers, and the question pool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a question is presented to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    MultipleChoice,
    FillInTheBlank,
}

impl Mode {
    /// Every supported presentation mode, in canonical order.
    pub const ALL: [Mode; 2] = [Mode::MultipleChoice, Mode::FillInTheBlank];
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::MultipleChoice => write!(f, "multipleChoice"),
            Mode::FillInTheBlank => write!(f, "fillInTheBlank"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], "").as_str() {
            "multiplechoice" | "mc" => Ok(Mode::MultipleChoice),
            "fillintheblank" | "fill" | "blank" => Ok(Mode::FillInTheBlank),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Difficulty tier. Ordered from easiest to hardest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// All tiers from easiest to hardest.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// The next harder tier, or `None` at the top.
    pub fn harder(self) -> Option<Difficulty> {
        match self {
            Difficulty::Easy => Some(Difficulty::Normal),
            Difficulty::Normal => Some(Difficulty::Hard),
            Difficulty::Hard => None,
        }
    }

    /// One tier up, saturating at hard.
    pub fn promoted(self) -> Difficulty {
        self.harder().unwrap_or(Difficulty::Hard)
    }

    /// Whether no tier is harder than this one.
    pub fn is_hardest(self) -> bool {
        self == Difficulty::Hard
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Normal => write!(f, "normal"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single quiz question.
///
/// Identity is the `id`: two questions with the same id are the same
/// question as far as selection and the no-repeat rule are concerned.
/// `prompt`, `choices` and `answer` are presentation payload and are never
/// inspected by the selection or difficulty logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the pool.
    pub id: String,
    /// Presentation mode this question belongs to.
    pub mode: Mode,
    /// Difficulty tier this question belongs to.
    pub difficulty: Difficulty,
    /// Text shown to the player.
    pub prompt: String,
    /// Candidate answers (multiple choice only).
    #[serde(default)]
    pub choices: Vec<String>,
    /// The expected answer.
    pub answer: String,
}

impl PartialEq for Question {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Question {}

impl Question {
    /// Check a free-form response against the answer key.
    ///
    /// Comparison ignores surrounding whitespace and ASCII case. For multiple
    /// choice, a 1-based choice number is accepted as well.
    pub fn is_correct_response(&self, response: &str) -> bool {
        let response = response.trim();
        if response.eq_ignore_ascii_case(self.answer.trim()) {
            return true;
        }
        if self.mode != Mode::MultipleChoice {
            return false;
        }
        match response.parse::<usize>() {
            Ok(n) if n >= 1 => self
                .choices
                .get(n - 1)
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(self.answer.trim())),
            _ => false,
        }
    }
}

/// The full question catalog, keyed by mode then difficulty.
///
/// Populated once before a session starts and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct QuestionPool {
    /// Unique identifier for this pool.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this pool.
    pub description: String,
    questions: BTreeMap<Mode, BTreeMap<Difficulty, Vec<Question>>>,
}

impl QuestionPool {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            questions: BTreeMap::new(),
        }
    }

    /// Add a question under its own mode and difficulty.
    pub fn insert(&mut self, question: Question) {
        self.questions
            .entry(question.mode)
            .or_default()
            .entry(question.difficulty)
            .or_default()
            .push(question);
    }

    /// Declare a (mode, difficulty) bucket without adding questions to it.
    ///
    /// An empty bucket is "present but exhausted", which is different from a
    /// missing one: selection escalates past the former and fails on the latter.
    pub fn ensure_bucket(&mut self, mode: Mode, difficulty: Difficulty) {
        self.questions
            .entry(mode)
            .or_default()
            .entry(difficulty)
            .or_default();
    }

    /// Questions for a (mode, difficulty) pair, or `None` if the pool has no
    /// such bucket.
    pub fn get(&self, mode: Mode, difficulty: Difficulty) -> Option<&[Question]> {
        self.questions
            .get(&mode)
            .and_then(|by_tier| by_tier.get(&difficulty))
            .map(Vec::as_slice)
    }

    /// Total number of questions across all buckets.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate every question in mode, difficulty, insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .values()
            .flat_map(|by_tier| by_tier.values())
            .flatten()
    }

    /// Append every bucket of `other` to this pool.
    pub fn merge(&mut self, other: QuestionPool) {
        for (mode, by_tier) in other.questions {
            for (difficulty, questions) in by_tier {
                self.questions
                    .entry(mode)
                    .or_default()
                    .entry(difficulty)
                    .or_default()
                    .extend(questions);
            }
        }
    }
}
