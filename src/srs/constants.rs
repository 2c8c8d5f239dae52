//! Fixed parameters of the scheduler and the progress thresholds built on it.

/// Ease factor given to a question the first time it is seen
pub const INITIAL_EASE: f64 = 2.5;

/// Lowest ease a question can drop to, so a string of failures cannot stall it forever
pub const MIN_EASE: f64 = 1.3;

pub const MAX_EASE: f64 = 5.0;

/// Longest gap between two reviews, in days
pub const MAX_INTERVAL: u32 = 180;

/// Interval after the first successful review (days)
pub const FIRST_INTERVAL: u32 = 1;

/// Interval after the second successful review (days)
pub const SECOND_INTERVAL: u32 = 6;

// Interval multipliers applied after the ease-based growth
pub const AGAIN_MULTIPLIER: f64 = 0.0;
pub const HARD_MULTIPLIER: f64 = 1.2;
pub const GOOD_MULTIPLIER: f64 = 2.5;
pub const EASY_MULTIPLIER: f64 = 2.8;

// Ease deltas, scaled by answer accuracy before being applied
pub const AGAIN_EASE_DELTA: f64 = -0.2;
pub const HARD_EASE_DELTA: f64 = -0.15;
pub const GOOD_EASE_DELTA: f64 = 0.0;
pub const EASY_EASE_DELTA: f64 = 0.15;

/// Questions with an interval of at least this many days can count as mastered
pub const MASTERY_INTERVAL_DAYS: u32 = 21;

/// Questions with ease at or above this can count as mastered
pub const MASTERY_EASE_FACTOR: f64 = 2.5;

/// Correct answers needed before a question can count as mastered
pub const MASTERY_CORRECT_ATTEMPTS: u32 = 3;

/// Questions with ease below this are weak
pub const WEAK_QUESTION_EASE: f64 = 2.0;

/// Questions answered correctly less often than this are weak
pub const WEAK_ACCURACY: f64 = 0.5;

/// How far back a review counts as recent when judging weakness (days)
pub const RECENT_REVIEW_DAYS: i64 = 7;

/// Share of a mixed session reserved for never-seen questions
pub const NEW_REVIEW_RATIO: f64 = 0.2;

/// Mastery percentage at which a learner is considered exam-ready
pub const EXAM_READY_PERCENTAGE: u32 = 80;
