//! SM-2 style review update.
//!
//! The classic rule grows the interval 1 day, then 6 days, then by the
//! ease factor. On top of that every non-Again rating applies its own
//! multiplier (Hard 1.2, Good 2.5, Easy 2.8), so intervals open up faster
//! than textbook SM-2. Ease moves by a fixed delta per rating, scaled down
//! for partial credit on multiple-select questions.

use chrono::{DateTime, Utc};

use super::constants::{FIRST_INTERVAL, INITIAL_EASE, MAX_EASE, MAX_INTERVAL, MIN_EASE, SECOND_INTERVAL};
use super::{ProgressLookup, Rating, ReviewState, dates};

/// Review state for a question that has never been answered. It is due at `now`.
pub fn create_initial(question_id: &str, now: DateTime<Utc>) -> ReviewState {
    ReviewState {
        question_id: question_id.to_string(),
        ease_factor: INITIAL_EASE,
        interval: 0,
        repetitions: 0,
        next_review_date: now,
        last_reviewed_date: None,
        correct_attempts: 0,
        total_attempts: 0,
    }
}

/// Stored state for `question_id`, or a fresh one. Nothing is persisted here.
pub fn get_or_create<L: ProgressLookup + ?Sized>(
    question_id: &str,
    lookup: &L,
    now: DateTime<Utc>,
) -> ReviewState {
    lookup
        .progress(question_id)
        .cloned()
        .unwrap_or_else(|| create_initial(question_id, now))
}

/// Apply one answered review to `state` and return the rescheduled state.
///
/// `accuracy_percent` is the partial-credit score (0-100) of the answer;
/// it scales the ease adjustment. `now` is the moment of the review.
pub fn update(
    state: &ReviewState,
    rating: Rating,
    was_correct: bool,
    accuracy_percent: f64,
    now: DateTime<Utc>,
) -> ReviewState {
    let ease_factor = adjust_ease(state.ease_factor, rating, accuracy_percent);
    let (interval, repetitions) = next_interval(state, rating, ease_factor);

    ReviewState {
        question_id: state.question_id.clone(),
        ease_factor,
        interval,
        repetitions,
        next_review_date: dates::add_days(now, interval),
        last_reviewed_date: Some(now),
        correct_attempts: state.correct_attempts.saturating_add(u32::from(was_correct)),
        total_attempts: state.total_attempts.saturating_add(1),
    }
}

fn adjust_ease(current: f64, rating: Rating, accuracy_percent: f64) -> f64 {
    let adjustment = rating.ease_delta() * (accuracy_percent / 100.0);
    (current + adjustment).clamp(MIN_EASE, MAX_EASE)
}

fn next_interval(state: &ReviewState, rating: Rating, ease_factor: f64) -> (u32, u32) {
    if rating == Rating::Again {
        return (FIRST_INTERVAL, 0);
    }

    let repetitions = state.repetitions.saturating_add(1);
    let mut interval = match repetitions {
        1 => f64::from(FIRST_INTERVAL),
        2 => f64::from(SECOND_INTERVAL),
        _ => (f64::from(state.interval) * ease_factor).round(),
    };

    let multiplier = rating.interval_multiplier();
    if multiplier > 0.0 {
        interval = (interval * multiplier).round();
    }

    let interval = interval.clamp(f64::from(FIRST_INTERVAL), f64::from(MAX_INTERVAL)) as u32;
    (interval, repetitions)
}
