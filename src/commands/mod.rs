pub mod config;
pub mod exam;
pub mod progress;
pub mod stats;
pub mod study;

use anyhow::{Context, Result};
use colored::Colorize;
use inquire::{InquireError, MultiSelect, Select};

use crate::config::Config;
use crate::questions::{Question, QuestionBank, QuestionType};
use crate::storage::Database;

/// Everything a command needs: settings, the question bank and the progress database
pub struct Workspace {
    pub config: Config,
    pub bank: QuestionBank,
    pub db: Database,
}

impl Workspace {
    /// Load config, bank and database. Returns `None` (after telling the user
    /// how to fix it) when no question bank is configured.
    pub fn open() -> Result<Option<Self>> {
        let config = Config::load()?;

        let Some(bank_path) = config.question_bank_path() else {
            println!(
                "{} No question bank configured. Run {} or set {}.",
                "Error:".red().bold(),
                "examprep config".cyan(),
                "EXAMPREP_QUESTION_BANK".cyan()
            );
            return Ok(None);
        };

        let bank = QuestionBank::load(&bank_path)
            .with_context(|| format!("Failed to load question bank {:?}", bank_path))?;
        let db = Database::open(&config)?;

        Ok(Some(Self { config, bank, db }))
    }
}

/// Outcome of asking the learner something
pub enum Prompted<T> {
    Answered(T),
    /// Escape: move on without answering
    Skipped,
    /// Ctrl-C: stop the whole session
    Quit,
}

impl<T> Prompted<T> {
    fn from_result(result: Result<T, InquireError>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Prompted::Answered(value)),
            Err(InquireError::OperationCanceled) => Ok(Prompted::Skipped),
            Err(InquireError::OperationInterrupted) => Ok(Prompted::Quit),
            Err(e) => Err(e.into()),
        }
    }
}

/// Print a question with its scenario and number
pub fn print_question(question: &Question, bank: &QuestionBank, position: usize, total: usize) {
    println!(
        "\n{} [{}/{}] {}",
        "Question".bold().cyan(),
        position,
        total,
        format!(
            "({} · {} · {})",
            bank.domain_name(&question.domain),
            question.difficulty,
            question.question_type
        )
        .dimmed()
    );
    if let Some(scenario) = &question.scenario {
        println!("  {}", scenario.italic());
    }
    println!("\n  {} {}\n", "Q:".bold().yellow(), question.question);
}

/// Ask for an answer, returning the selected option ids
pub fn ask_answer(question: &Question) -> Result<Prompted<Vec<String>>> {
    let labels: Vec<String> = question
        .options
        .iter()
        .map(|o| format!("{}. {}", o.id, o.text))
        .collect();

    let picked = match question.question_type {
        QuestionType::MultipleChoice => Select::new("Your answer:", labels)
            .with_help_message("Enter to submit, Esc to skip")
            .raw_prompt()
            .map(|choice| vec![choice.index]),
        QuestionType::MultipleSelect => MultiSelect::new(
            &format!("Select {}:", question.correct_answer.len()),
            labels,
        )
        .with_help_message("Space to toggle, Enter to submit, Esc to skip")
        .raw_prompt()
        .map(|choices| choices.into_iter().map(|c| c.index).collect()),
    };

    Ok(match Prompted::from_result(picked)? {
        Prompted::Answered(indexes) => Prompted::Answered(
            indexes
                .into_iter()
                .filter_map(|i| question.options.get(i).map(|o| o.id.clone()))
                .collect(),
        ),
        Prompted::Skipped => Prompted::Skipped,
        Prompted::Quit => Prompted::Quit,
    })
}

/// Format a duration in seconds as "1h 05m" / "4m 10s"
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds >= 3600 {
        format!("{}h {:02}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}m {:02}s", seconds / 60, seconds % 60)
    }
}
