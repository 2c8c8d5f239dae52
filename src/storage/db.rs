use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::PathBuf;

use crate::config::Config;

pub struct Database {
    pub conn: Connection,
    pub path: PathBuf,
}

impl Database {
    /// Open or create the progress database in the configured data directory
    pub fn open(config: &Config) -> Result<Self> {
        let path = config.data_dir()?.join("progress.db");
        Self::open_at_path(path)
    }

    /// Open or create a database at a specific path
    pub fn open_at_path(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {:?}", parent))?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        log::debug!("Opened progress database at {:?}", path);

        let db = Self { conn, path };
        db.init_schema()?;

        Ok(db)
    }

    /// Throwaway database, used by tests
    #[allow(dead_code)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let db = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        // One row per question that has ever been scheduled
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS question_progress (
                question_id TEXT PRIMARY KEY,
                ease_factor REAL NOT NULL,
                interval_days INTEGER NOT NULL,
                repetitions INTEGER NOT NULL,
                next_review_date TEXT NOT NULL,
                last_reviewed_date TEXT,
                correct_attempts INTEGER NOT NULL,
                total_attempts INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS session_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                started_at TEXT NOT NULL,
                mode TEXT NOT NULL,
                total_questions INTEGER NOT NULL,
                answered_questions INTEGER NOT NULL,
                skipped_questions INTEGER NOT NULL,
                correct_answers INTEGER NOT NULL,
                accuracy_percentage INTEGER NOT NULL,
                time_spent_seconds INTEGER NOT NULL
            )",
            [],
        )?;

        // Calendar days (YYYY-MM-DD) with at least one answered question
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS study_days (
                day TEXT PRIMARY KEY
            )",
            [],
        )?;

        Ok(())
    }
}
