//! Spaced-repetition scheduling engine.
//!
//! Everything in here is pure: callers hand in review state (through a
//! [`ProgressLookup`]) and the current time, and get new values back.
//! Persisting the results is the job of `crate::storage`.

pub mod classify;
pub mod constants;
pub mod dates;
pub mod selector;
pub mod sm2;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use classify::{
    domain_mastery_percent, due_questions, overall_statistics, upcoming_review_histogram,
    weak_questions,
};
pub use selector::{StudyMode, select_for_session};
pub use sm2::{get_or_create, update};

/// Review history for a single question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub question_id: String,
    pub ease_factor: f64,
    /// Days until the next review; 0 until the first review
    pub interval: u32,
    /// Consecutive non-Again reviews since the last reset
    pub repetitions: u32,
    pub next_review_date: DateTime<Utc>,
    pub last_reviewed_date: Option<DateTime<Utc>>,
    pub correct_attempts: u32,
    pub total_attempts: u32,
}

impl ReviewState {
    /// Fraction of attempts answered correctly, 0.0 before the first attempt
    pub fn accuracy(&self) -> f64 {
        if self.total_attempts == 0 {
            0.0
        } else {
            f64::from(self.correct_attempts) / f64::from(self.total_attempts)
        }
    }
}

/// How well the learner felt they knew the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    #[cfg(test)]
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Map a numeric confidence score (0 = again, 3 = hard, 4 = good, 5 = easy).
    /// Anything else is treated as Good so a stray value never aborts a review.
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Rating::Again,
            3 => Rating::Hard,
            4 => Rating::Good,
            5 => Rating::Easy,
            _ => Rating::Good,
        }
    }

    pub fn score(self) -> u8 {
        match self {
            Rating::Again => 0,
            Rating::Hard => 3,
            Rating::Good => 4,
            Rating::Easy => 5,
        }
    }

    pub fn ease_delta(self) -> f64 {
        match self {
            Rating::Again => constants::AGAIN_EASE_DELTA,
            Rating::Hard => constants::HARD_EASE_DELTA,
            Rating::Good => constants::GOOD_EASE_DELTA,
            Rating::Easy => constants::EASY_EASE_DELTA,
        }
    }

    pub fn interval_multiplier(self) -> f64 {
        match self {
            Rating::Again => constants::AGAIN_MULTIPLIER,
            Rating::Hard => constants::HARD_MULTIPLIER,
            Rating::Good => constants::GOOD_MULTIPLIER,
            Rating::Easy => constants::EASY_MULTIPLIER,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::Again => "Again",
            Rating::Hard => "Hard",
            Rating::Good => "Good",
            Rating::Easy => "Easy",
        };
        f.write_str(label)
    }
}

/// Read access to stored review state, keyed by question id
pub trait ProgressLookup {
    fn progress(&self, question_id: &str) -> Option<&ReviewState>;
}

/// In-memory snapshot of every stored review state
pub type ProgressMap = HashMap<String, ReviewState>;

impl ProgressLookup for HashMap<String, ReviewState> {
    fn progress(&self, question_id: &str) -> Option<&ReviewState> {
        self.get(question_id)
    }
}
