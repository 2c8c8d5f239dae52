//! Bucketing questions into new / due / weak / mastered, and the aggregate
//! numbers derived from those buckets.
//!
//! Every query keeps the order of `ids`. A question without stored progress
//! is new and due, never weak or mastered.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::constants::{
    INITIAL_EASE, MASTERY_CORRECT_ATTEMPTS, MASTERY_EASE_FACTOR, MASTERY_INTERVAL_DAYS,
    RECENT_REVIEW_DAYS, WEAK_ACCURACY, WEAK_QUESTION_EASE,
};
use super::{ProgressLookup, ReviewState, dates};

/// Questions whose review date has arrived, plus every never-seen question
pub fn due_questions<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<String> {
    filter_ids(ids, |id| match lookup.progress(id) {
        None => true,
        Some(state) => dates::is_due(state.next_review_date, now),
    })
}

/// Questions that have never been attempted
pub fn new_questions<L: ProgressLookup + ?Sized>(ids: &[String], lookup: &L) -> Vec<String> {
    filter_ids(ids, |id| {
        lookup
            .progress(id)
            .is_none_or(|state| state.total_attempts == 0)
    })
}

/// Questions the learner keeps struggling with
pub fn weak_questions<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<String> {
    filter_ids(ids, |id| {
        lookup
            .progress(id)
            .is_some_and(|state| is_weak(state, now))
    })
}

/// Questions that are durably learned
pub fn mastered_questions<L: ProgressLookup + ?Sized>(ids: &[String], lookup: &L) -> Vec<String> {
    filter_ids(ids, |id| lookup.progress(id).is_some_and(is_mastered))
}

fn is_weak(state: &ReviewState, now: DateTime<Utc>) -> bool {
    if state.total_attempts == 0 {
        return false;
    }

    let low_ease = state.ease_factor < WEAK_QUESTION_EASE;
    let low_accuracy = state.accuracy() < WEAK_ACCURACY;
    let recently_struggled = state
        .last_reviewed_date
        .is_some_and(|last| now - last < Duration::days(RECENT_REVIEW_DAYS))
        && state.ease_factor < WEAK_QUESTION_EASE;

    low_ease || low_accuracy || recently_struggled
}

fn is_mastered(state: &ReviewState) -> bool {
    state.interval >= MASTERY_INTERVAL_DAYS
        && state.ease_factor >= MASTERY_EASE_FACTOR
        && state.correct_attempts >= MASTERY_CORRECT_ATTEMPTS
}

/// Share of `ids` that are mastered, as a whole percentage
pub fn domain_mastery_percent<L: ProgressLookup + ?Sized>(ids: &[String], lookup: &L) -> u32 {
    if ids.is_empty() {
        return 0;
    }
    let mastered = mastered_questions(ids, lookup).len();
    (100.0 * mastered as f64 / ids.len() as f64).round() as u32
}

/// Number of reviews scheduled on each of the next `days` days, today first.
/// Overdue and never-seen questions are not counted.
pub fn upcoming_review_histogram<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    days: usize,
    now: DateTime<Utc>,
) -> Vec<u32> {
    let mut counts = vec![0u32; days];

    for state in ids.iter().filter_map(|id| lookup.progress(id)) {
        let offset = dates::days_from_today(state.next_review_date, now);
        if let Ok(offset) = usize::try_from(offset)
            && let Some(slot) = counts.get_mut(offset)
        {
            *slot += 1;
        }
    }

    counts
}

/// Order `ids` so the most overdue question comes first.
/// Never-seen questions sort as if they were due right now; ties keep input order.
pub fn sort_by_overdue<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut sorted = ids.to_vec();
    sorted.sort_by_key(|id| {
        lookup
            .progress(id)
            .map(|state| state.next_review_date)
            .unwrap_or(now)
    });
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStatistics {
    pub total_questions: usize,
    pub new_questions: usize,
    pub due_questions: usize,
    pub mastered_questions: usize,
    pub weak_questions: usize,
    /// Mean ease over attempted questions; the initial ease when nothing is attempted
    pub average_ease_factor: f64,
    /// Correct attempts over all attempts, as a percentage
    pub overall_accuracy: f64,
}

pub fn overall_statistics<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    now: DateTime<Utc>,
) -> OverallStatistics {
    let mut total_attempts = 0u64;
    let mut total_correct = 0u64;
    let mut total_ease = 0.0;
    let mut attempted = 0usize;

    for state in ids.iter().filter_map(|id| lookup.progress(id)) {
        if state.total_attempts > 0 {
            total_attempts += u64::from(state.total_attempts);
            total_correct += u64::from(state.correct_attempts);
            total_ease += state.ease_factor;
            attempted += 1;
        }
    }

    OverallStatistics {
        total_questions: ids.len(),
        new_questions: new_questions(ids, lookup).len(),
        due_questions: due_questions(ids, lookup, now).len(),
        mastered_questions: mastered_questions(ids, lookup).len(),
        weak_questions: weak_questions(ids, lookup, now).len(),
        average_ease_factor: if attempted > 0 {
            total_ease / attempted as f64
        } else {
            INITIAL_EASE
        },
        overall_accuracy: if total_attempts > 0 {
            total_correct as f64 / total_attempts as f64 * 100.0
        } else {
            0.0
        },
    }
}

fn filter_ids(ids: &[String], mut keep: impl FnMut(&str) -> bool) -> Vec<String> {
    ids.iter().filter(|id| keep(id)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::ProgressMap;
    use crate::srs::sm2::create_initial;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    struct Fixture {
        progress: ProgressMap,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                progress: ProgressMap::new(),
            }
        }

        fn with(mut self, id: &str, edit: impl FnOnce(&mut ReviewState)) -> Self {
            let mut state = create_initial(id, now());
            edit(&mut state);
            self.progress.insert(id.to_string(), state);
            self
        }
    }

    fn attempted(state: &mut ReviewState, correct: u32, total: u32) {
        state.correct_attempts = correct;
        state.total_attempts = total;
        state.interval = 1;
        state.last_reviewed_date = Some(now() - Duration::days(30));
        state.next_review_date = now() + Duration::days(5);
    }

    #[test]
    fn test_unseen_question_is_due_and_new() {
        let progress = ProgressMap::new();
        let all = ids(&["q1"]);
        assert_eq!(due_questions(&all, &progress, now()), all);
        assert_eq!(new_questions(&all, &progress), all);
        assert!(weak_questions(&all, &progress, now()).is_empty());
        assert!(mastered_questions(&all, &progress).is_empty());
    }

    #[test]
    fn test_due_by_calendar_day() {
        let fixture = Fixture::new()
            .with("later-today", |s| {
                attempted(s, 1, 1);
                s.next_review_date = now() + Duration::hours(6);
            })
            .with("yesterday", |s| {
                attempted(s, 1, 1);
                s.next_review_date = now() - Duration::days(1);
            })
            .with("tomorrow", |s| {
                attempted(s, 1, 1);
                s.next_review_date = now() + Duration::days(1);
            });

        let all = ids(&["later-today", "yesterday", "tomorrow"]);
        assert_eq!(
            due_questions(&all, &fixture.progress, now()),
            ids(&["later-today", "yesterday"])
        );
    }

    #[test]
    fn test_stored_but_unattempted_is_new() {
        let fixture = Fixture::new()
            .with("stored", |_| {})
            .with("seen", |s| attempted(s, 1, 1));
        let all = ids(&["stored", "seen", "unseen"]);
        assert_eq!(
            new_questions(&all, &fixture.progress),
            ids(&["stored", "unseen"])
        );
    }

    #[test]
    fn test_weak_rules() {
        let fixture = Fixture::new()
            .with("low-ease", |s| {
                attempted(s, 3, 3);
                s.ease_factor = 1.9;
            })
            .with("low-accuracy", |s| attempted(s, 1, 3))
            .with("half-right", |s| attempted(s, 2, 4))
            .with("solid", |s| attempted(s, 4, 4))
            .with("never-tried", |s| s.ease_factor = 1.3);

        let all = ids(&["low-ease", "low-accuracy", "half-right", "solid", "never-tried"]);
        assert_eq!(
            weak_questions(&all, &fixture.progress, now()),
            ids(&["low-ease", "low-accuracy"])
        );
    }

    #[test]
    fn test_mastery_requires_three_correct() {
        let mut fixture = Fixture::new().with("q1", |s| {
            s.interval = 25;
            s.ease_factor = 2.6;
            s.correct_attempts = 2;
            s.total_attempts = 2;
        });
        let all = ids(&["q1"]);
        assert!(mastered_questions(&all, &fixture.progress).is_empty());

        if let Some(state) = fixture.progress.get_mut("q1") {
            state.correct_attempts = 3;
            state.total_attempts = 3;
        }
        assert_eq!(mastered_questions(&all, &fixture.progress), all);
    }

    #[test]
    fn test_mastery_thresholds_inclusive() {
        let fixture = Fixture::new()
            .with("edge", |s| {
                s.interval = 21;
                s.ease_factor = 2.5;
                s.correct_attempts = 3;
                s.total_attempts = 5;
            })
            .with("short", |s| {
                s.interval = 20;
                s.ease_factor = 3.0;
                s.correct_attempts = 9;
                s.total_attempts = 9;
            });
        assert_eq!(
            mastered_questions(&ids(&["edge", "short"]), &fixture.progress),
            ids(&["edge"])
        );
    }

    #[test]
    fn test_domain_mastery_percent() {
        let progress = ProgressMap::new();
        assert_eq!(domain_mastery_percent(&[], &progress), 0);

        let fixture = Fixture::new().with("m", |s| {
            s.interval = 30;
            s.correct_attempts = 3;
            s.total_attempts = 3;
        });
        assert_eq!(
            domain_mastery_percent(&ids(&["m", "a", "b"]), &fixture.progress),
            33
        );
        assert_eq!(domain_mastery_percent(&ids(&["m", "a"]), &fixture.progress), 50);
    }

    #[test]
    fn test_upcoming_histogram() {
        let fixture = Fixture::new()
            .with("today", |s| s.next_review_date = now() + Duration::hours(3))
            .with("in-two", |s| s.next_review_date = now() + Duration::days(2))
            .with("also-two", |s| s.next_review_date = now() + Duration::days(2))
            .with("overdue", |s| s.next_review_date = now() - Duration::days(3))
            .with("far", |s| s.next_review_date = now() + Duration::days(30));

        let all = ids(&["today", "in-two", "also-two", "overdue", "far", "unseen"]);
        assert_eq!(
            upcoming_review_histogram(&all, &fixture.progress, 7, now()),
            vec![1, 0, 2, 0, 0, 0, 0]
        );
        assert!(upcoming_review_histogram(&all, &fixture.progress, 0, now()).is_empty());
    }

    #[test]
    fn test_sort_by_overdue() {
        let fixture = Fixture::new()
            .with("a", |s| s.next_review_date = now() - Duration::days(1))
            .with("b", |s| s.next_review_date = now() - Duration::days(10));
        assert_eq!(
            sort_by_overdue(&ids(&["unseen", "a", "b"]), &fixture.progress, now()),
            ids(&["b", "a", "unseen"])
        );
    }

    #[test]
    fn test_overall_statistics() {
        let progress = ProgressMap::new();
        let empty = overall_statistics(&ids(&["x", "y"]), &progress, now());
        assert_eq!(empty.total_questions, 2);
        assert_eq!(empty.new_questions, 2);
        assert_eq!(empty.due_questions, 2);
        assert_eq!(empty.average_ease_factor, INITIAL_EASE);
        assert_eq!(empty.overall_accuracy, 0.0);

        let fixture = Fixture::new()
            .with("a", |s| {
                attempted(s, 3, 4);
                s.ease_factor = 2.0;
            })
            .with("b", |s| {
                attempted(s, 1, 4);
                s.ease_factor = 3.0;
            });
        let stats = overall_statistics(&ids(&["a", "b", "c"]), &fixture.progress, now());
        assert_eq!(stats.new_questions, 1);
        assert_eq!(stats.due_questions, 1);
        assert_eq!(stats.weak_questions, 1);
        assert!((stats.average_ease_factor - 2.5).abs() < 1e-9);
        assert!((stats.overall_accuracy - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_queries_are_repeatable() {
        let fixture = Fixture::new()
            .with("a", |s| attempted(s, 0, 2))
            .with("b", |s| attempted(s, 2, 2));
        let all = ids(&["a", "b", "c"]);
        let first = (
            due_questions(&all, &fixture.progress, now()),
            weak_questions(&all, &fixture.progress, now()),
            overall_statistics(&all, &fixture.progress, now()),
        );
        let second = (
            due_questions(&all, &fixture.progress, now()),
            weak_questions(&all, &fixture.progress, now()),
            overall_statistics(&all, &fixture.progress, now()),
        );
        assert_eq!(first, second);
    }
}
