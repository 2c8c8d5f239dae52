use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::params;
use serde::Serialize;

use super::Database;
use crate::session::SessionSummary;
use crate::srs::dates;

/// A finished session as kept in the history table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub mode: String,
    pub total_questions: i64,
    pub answered_questions: i64,
    pub skipped_questions: i64,
    pub correct_answers: i64,
    pub accuracy_percentage: i64,
    pub time_spent_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudyStreak {
    pub current: u32,
    pub longest: u32,
    pub last_study_date: Option<NaiveDate>,
}

pub struct SessionStore<'a> {
    db: &'a Database,
}

impl<'a> SessionStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Append a finished session to the history
    pub fn record(&self, summary: &SessionSummary) -> Result<i64> {
        self.db
            .conn
            .execute(
                "INSERT INTO session_history (session_id, started_at, mode, total_questions, answered_questions, skipped_questions, correct_answers, accuracy_percentage, time_spent_seconds)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    summary.session_id,
                    summary.started_at.to_rfc3339(),
                    summary.mode.to_string(),
                    summary.total_questions as i64,
                    summary.answered_questions as i64,
                    summary.skipped_questions as i64,
                    summary.correct_answers as i64,
                    summary.accuracy_percentage,
                    summary.time_spent_seconds,
                ],
            )
            .context("Failed to record session")?;

        log::info!(
            "Recorded session {} ({} answered)",
            summary.session_id,
            summary.answered_questions
        );
        Ok(self.db.conn.last_insert_rowid())
    }

    /// Sessions started on or after the start of the day `days` ago, newest first
    pub fn recent(&self, days: u32, now: DateTime<Utc>) -> Result<Vec<SessionRecord>> {
        let cutoff = dates::start_of_day(now) - Duration::days(i64::from(days));
        Ok(self
            .all()?
            .into_iter()
            .filter(|s| s.started_at >= cutoff)
            .collect())
    }

    /// Every recorded session, newest first
    pub fn all(&self) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.db.conn.prepare(
            "SELECT session_id, started_at, mode, total_questions, answered_questions, skipped_questions, correct_answers, accuracy_percentage, time_spent_seconds
             FROM session_history ORDER BY started_at DESC, id DESC",
        )?;

        let mut rows = stmt.query([])?;
        let mut sessions = Vec::new();

        while let Some(row) = rows.next()? {
            sessions.push(Self::row_to_record(row)?);
        }

        Ok(sessions)
    }

    pub fn total_study_seconds(&self) -> Result<i64> {
        let total: i64 = self.db.conn.query_row(
            "SELECT COALESCE(SUM(time_spent_seconds), 0) FROM session_history",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Note that the learner studied on `day`. Marking the same day twice is a no-op.
    pub fn mark_study_day(&self, day: NaiveDate) -> Result<()> {
        self.db.conn.execute(
            "INSERT OR IGNORE INTO study_days (day) VALUES (?1)",
            params![day.format("%Y-%m-%d").to_string()],
        )?;
        Ok(())
    }

    pub fn study_days(&self) -> Result<Vec<NaiveDate>> {
        let mut stmt = self
            .db
            .conn
            .prepare("SELECT day FROM study_days ORDER BY day ASC")?;
        let mut rows = stmt.query([])?;
        let mut days = Vec::new();

        while let Some(row) = rows.next()? {
            let day: String = row.get(0)?;
            match NaiveDate::parse_from_str(&day, "%Y-%m-%d") {
                Ok(d) => days.push(d),
                Err(e) => log::warn!("Ignoring bad study day {:?}: {}", day, e),
            }
        }

        Ok(days)
    }

    pub fn streak(&self, today: NaiveDate) -> Result<StudyStreak> {
        Ok(compute_streak(&self.study_days()?, today))
    }

    fn row_to_record(row: &rusqlite::Row) -> Result<SessionRecord> {
        let started_str: String = row.get(1)?;

        Ok(SessionRecord {
            session_id: row.get(0)?,
            started_at: DateTime::parse_from_rfc3339(&started_str)
                .context("Invalid started_at timestamp")?
                .with_timezone(&Utc),
            mode: row.get(2)?,
            total_questions: row.get(3)?,
            answered_questions: row.get(4)?,
            skipped_questions: row.get(5)?,
            correct_answers: row.get(6)?,
            accuracy_percentage: row.get(7)?,
            time_spent_seconds: row.get(8)?,
        })
    }
}

/// Streaks from a list of distinct study days in ascending order.
///
/// The current streak only counts if the last study day is today or
/// yesterday; otherwise it has lapsed to 0.
pub fn compute_streak(days: &[NaiveDate], today: NaiveDate) -> StudyStreak {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            Some(prev) if day == prev => run,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    let current = match previous {
        Some(last) if (today - last).num_days() <= 1 => run,
        _ => 0,
    };

    StudyStreak {
        current,
        longest,
        last_study_date: previous,
    }
}
