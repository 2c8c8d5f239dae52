use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::classify::{due_questions, new_questions, sort_by_overdue, weak_questions};
use super::constants::NEW_REVIEW_RATIO;
use super::ProgressLookup;

/// Which pool a study session draws its questions from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StudyMode {
    /// Only questions never attempted
    New,
    /// Only questions scheduled for review
    Due,
    /// Only questions the learner struggles with
    Weak,
    /// Mostly due reviews with some new questions mixed in
    #[default]
    Mixed,
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StudyMode::New => "new",
            StudyMode::Due => "due",
            StudyMode::Weak => "weak",
            StudyMode::Mixed => "mixed",
        };
        f.write_str(label)
    }
}

/// Pick up to `target_count` question ids for a session and shuffle them.
///
/// Mixed sessions reserve `floor(target_count * 0.2)` slots for new questions
/// and fill the rest from due reviews; a short pool is not backfilled from
/// the other one.
pub fn select_for_session<L, R>(
    ids: &[String],
    lookup: &L,
    mode: StudyMode,
    target_count: usize,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<String>
where
    L: ProgressLookup + ?Sized,
    R: Rng + ?Sized,
{
    let ids = dedup(ids);

    let mut selected = match mode {
        StudyMode::New => take_unique(new_questions(&ids, lookup), target_count, &HashSet::new()),
        StudyMode::Due => take_unique(due_pool(&ids, lookup, now), target_count, &HashSet::new()),
        StudyMode::Weak => take_unique(
            weak_questions(&ids, lookup, now),
            target_count,
            &HashSet::new(),
        ),
        StudyMode::Mixed => {
            let new_count = (target_count as f64 * NEW_REVIEW_RATIO).floor() as usize;
            let review_count = target_count - new_count;

            let fresh = take_unique(new_questions(&ids, lookup), new_count, &HashSet::new());
            let taken: HashSet<String> = fresh.iter().cloned().collect();
            let reviews = take_unique(due_pool(&ids, lookup, now), review_count, &taken);

            fresh.into_iter().chain(reviews).collect()
        }
    };

    log::debug!(
        "Selected {} of {} questions for a {} session",
        selected.len(),
        ids.len(),
        mode
    );

    selected.shuffle(rng);
    selected
}

fn due_pool<L: ProgressLookup + ?Sized>(
    ids: &[String],
    lookup: &L,
    now: DateTime<Utc>,
) -> Vec<String> {
    sort_by_overdue(&due_questions(ids, lookup, now), lookup, now)
}

fn take_unique(pool: Vec<String>, count: usize, exclude: &HashSet<String>) -> Vec<String> {
    pool.into_iter()
        .filter(|id| !exclude.contains(id))
        .take(count)
        .collect()
}

fn dedup(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
