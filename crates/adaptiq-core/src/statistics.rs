//! Aggregate statistics over a session's round history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Difficulty;
use crate::report::RoundRecord;

/// Answer counts for one difficulty tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStats {
    /// Questions asked at this tier.
    pub asked: u32,
    /// Questions answered correctly at this tier.
    pub correct: u32,
    /// Points earned at this tier.
    pub points: u64,
}

impl TierStats {
    pub fn accuracy(&self) -> f64 {
        if self.asked == 0 {
            0.0
        } else {
            self.correct as f64 / self.asked as f64
        }
    }
}

/// Group round results by the tier each question was asked at.
pub fn tier_stats(history: &[RoundRecord]) -> BTreeMap<Difficulty, TierStats> {
    let mut stats: BTreeMap<Difficulty, TierStats> = BTreeMap::new();
    for record in history {
        let entry = stats.entry(record.difficulty).or_default();
        entry.asked += 1;
        if record.correct {
            entry.correct += 1;
        }
        entry.points += u64::from(record.points);
    }
    stats
}

/// Longest run of consecutive correct answers.
pub fn longest_streak(history: &[RoundRecord]) -> u32 {
    let mut best = 0;
    let mut current = 0;
    for record in history {
        if record.correct {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best
}

/// Number of tier changes over the session.
pub fn tier_changes(history: &[RoundRecord]) -> usize {
    history
        .iter()
        .filter(|r| r.difficulty != r.next_difficulty)
        .count()
}
