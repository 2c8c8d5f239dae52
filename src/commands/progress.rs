use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use inquire::Select;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::srs::ReviewState;
use crate::storage::{Database, ProgressStore, SessionRecord, SessionStore, StudyStreak};

/// Forget review history for one question, or for everything with `all`
pub fn reset(question_id: Option<String>, all: bool) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&config)?;
    let store = ProgressStore::new(&db);

    match (question_id, all) {
        (Some(id), false) => match store.load(&id)? {
            Some(state) => {
                store.delete(&id)?;
                println!(
                    "{} Reset progress for {} (was {}/{} correct, {} day interval)",
                    "✓".green(),
                    id.cyan(),
                    state.correct_attempts,
                    state.total_attempts,
                    state.interval
                );
            }
            // Unreadable rows load as None but still get removed
            None if store.delete(&id)? => {
                println!("{} Removed unreadable progress for {}", "✓".green(), id.cyan());
            }
            None => {
                println!("{} No progress recorded for {}", "!".yellow(), id.cyan());
            }
        },
        (None, true) => {
            let confirm = Select::new(
                "Reset ALL review progress? This cannot be undone.",
                vec!["No", "Yes"],
            )
            .prompt();
            if !matches!(confirm, Ok("Yes")) {
                println!("{}", "Cancelled.".dimmed());
                return Ok(());
            }
            let removed = store.clear()?;
            println!(
                "{} Reset progress for {} questions in {}",
                "✓".green(),
                removed,
                db.path.display().to_string().dimmed()
            );
        }
        (Some(_), true) => bail!("Pass either a question id or --all, not both"),
        (None, false) => bail!("Pass a question id to reset, or --all to reset everything"),
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ProgressExport {
    exported_at: DateTime<Utc>,
    streak: StudyStreak,
    /// Keyed by question id, sorted for stable output
    progress: BTreeMap<String, ReviewState>,
    sessions: Vec<SessionRecord>,
}

/// Write review state and session history to a JSON file
pub fn export(path: &Path) -> Result<()> {
    let config = Config::load()?;
    let db = Database::open(&config)?;
    let now = Utc::now();

    let sessions = SessionStore::new(&db);
    let export = ProgressExport {
        exported_at: now,
        streak: sessions.streak(now.date_naive())?,
        progress: ProgressStore::new(&db).load_all()?.into_iter().collect(),
        sessions: sessions.all()?,
    };

    let json = serde_json::to_string_pretty(&export).context("Failed to serialize progress")?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;

    println!(
        "{} Exported {} questions and {} sessions to {}",
        "✓".green(),
        export.progress.len(),
        export.sessions.len(),
        path.display().to_string().cyan()
    );
    Ok(())
}
