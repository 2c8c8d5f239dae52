use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use super::Database;
use crate::srs::constants::{MAX_EASE, MAX_INTERVAL, MIN_EASE};
use crate::srs::{ProgressMap, ReviewState};

const COLUMNS: &str = "question_id, ease_factor, interval_days, repetitions, next_review_date, last_reviewed_date, correct_attempts, total_attempts";

/// Raw columns of a `question_progress` row before validation
struct ProgressRow {
    question_id: String,
    ease_factor: f64,
    interval_days: i64,
    repetitions: i64,
    next_review_date: String,
    last_reviewed_date: Option<String>,
    correct_attempts: i64,
    total_attempts: i64,
}

/// Persists review state per question. Rows that cannot be turned back into
/// a valid [`ReviewState`] are skipped with a warning, so the question is
/// treated as new.
pub struct ProgressStore<'a> {
    db: &'a Database,
}

impl<'a> ProgressStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Get stored progress for one question
    pub fn load(&self, question_id: &str) -> Result<Option<ReviewState>> {
        let row = self
            .db
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM question_progress WHERE question_id = ?1"),
                params![question_id],
                |row| Ok(Self::read_row(row)),
            )
            .optional()
            .with_context(|| format!("Failed to load progress for {}", question_id))?;

        Ok(row.and_then(|row| Self::validated(question_id, row)))
    }

    /// Get progress for every stored question
    pub fn load_all(&self) -> Result<ProgressMap> {
        let mut stmt = self
            .db
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM question_progress"))?;

        // Per-row read errors stay inside the row so one bad row can't fail the query
        let rows = stmt.query_map([], |row| {
            let question_id = row.get::<_, String>(0).unwrap_or_default();
            Ok((question_id, Self::read_row(row)))
        })?;
        let mut progress = ProgressMap::new();

        for row in rows {
            let (question_id, row) = row?;
            if let Some(state) = Self::validated(&question_id, row) {
                progress.insert(state.question_id.clone(), state);
            }
        }

        Ok(progress)
    }

    /// Insert or replace the progress for `state.question_id`
    pub fn save(&self, state: &ReviewState) -> Result<()> {
        self.db
            .conn
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO question_progress ({COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    state.question_id,
                    state.ease_factor,
                    state.interval,
                    state.repetitions,
                    state.next_review_date.to_rfc3339(),
                    state.last_reviewed_date.map(|d| d.to_rfc3339()),
                    state.correct_attempts,
                    state.total_attempts,
                ],
            )
            .with_context(|| format!("Failed to save progress for {}", state.question_id))?;

        Ok(())
    }

    /// Delete progress for one question; returns whether anything was removed
    pub fn delete(&self, question_id: &str) -> Result<bool> {
        let affected = self.db.conn.execute(
            "DELETE FROM question_progress WHERE question_id = ?1",
            params![question_id],
        )?;

        if affected > 0 {
            log::info!("Reset progress for {}", question_id);
        }
        Ok(affected > 0)
    }

    /// Delete all progress; returns the number of questions reset
    pub fn clear(&self) -> Result<usize> {
        let affected = self.db.conn.execute("DELETE FROM question_progress", [])?;
        log::info!("Reset progress for {} questions", affected);
        Ok(affected)
    }

    fn read_row(row: &rusqlite::Row) -> rusqlite::Result<ProgressRow> {
        Ok(ProgressRow {
            question_id: row.get(0)?,
            ease_factor: row.get(1)?,
            interval_days: row.get(2)?,
            repetitions: row.get(3)?,
            next_review_date: row.get(4)?,
            last_reviewed_date: row.get(5)?,
            correct_attempts: row.get(6)?,
            total_attempts: row.get(7)?,
        })
    }

    fn validated(question_id: &str, row: rusqlite::Result<ProgressRow>) -> Option<ReviewState> {
        match row
            .context("Unreadable column")
            .and_then(Self::row_to_state)
        {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Ignoring corrupted progress for {}: {:#}", question_id, e);
                None
            }
        }
    }

    fn row_to_state(row: ProgressRow) -> Result<ReviewState> {
        if !(MIN_EASE..=MAX_EASE).contains(&row.ease_factor) {
            bail!("ease factor {} out of range", row.ease_factor);
        }

        let interval = u32::try_from(row.interval_days).context("Invalid interval")?;
        if interval > MAX_INTERVAL {
            bail!("interval {} out of range", interval);
        }

        let correct_attempts = u32::try_from(row.correct_attempts).context("Invalid attempts")?;
        let total_attempts = u32::try_from(row.total_attempts).context("Invalid attempts")?;
        if correct_attempts > total_attempts {
            bail!("{} correct out of {} attempts", correct_attempts, total_attempts);
        }

        Ok(ReviewState {
            question_id: row.question_id,
            ease_factor: row.ease_factor,
            interval,
            repetitions: u32::try_from(row.repetitions).context("Invalid repetitions")?,
            next_review_date: parse_timestamp(&row.next_review_date)
                .context("Invalid next_review_date timestamp")?,
            last_reviewed_date: row
                .last_reviewed_date
                .as_deref()
                .map(parse_timestamp)
                .transpose()
                .context("Invalid last_reviewed_date timestamp")?,
            correct_attempts,
            total_attempts,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
