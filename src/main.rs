use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

mod commands;
mod config;
mod exam;
mod questions;
mod session;
mod srs;
mod storage;

use commands::study::StudyOptions;
use questions::{Difficulty, QuestionType};
use srs::StudyMode;

/// ASCII art banner for the application
const BANNER: &str = r#"
  _____                     ____
 | ____|_  ____ _ _ __ ___ |  _ \ _ __ ___ _ __
 |  _| \ \/ / _` | '_ ` _ \| |_) | '__/ _ \ '_ \
 | |___ >  < (_| | | | | | |  __/| | |  __/ |_) |
 |_____/_/\_\__,_|_| |_| |_|_|   |_|  \___| .__/
                                          |_|
"#;

fn print_banner() {
    println!("{}", BANNER.cyan().bold());
}

/// Print a styled status line
fn print_status(label: &str, value: &str, icon: &str) {
    println!(
        "  {} {} {}",
        icon,
        format!("{}:", label).dimmed(),
        value.cyan()
    );
}

#[derive(Parser)]
#[command(name = "examprep")]
#[command(about = "Spaced-repetition study for certification exams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a study session
    Study {
        /// Which questions to pick (defaults to the configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<StudyMode>,
        /// Number of questions (defaults to the configured session length)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Only study these domain ids
        #[arg(short, long)]
        domain: Vec<String>,
        /// Only study these difficulties
        #[arg(long, value_enum)]
        difficulty: Vec<Difficulty>,
        /// Only study these question types
        #[arg(long = "type", value_enum)]
        question_type: Vec<QuestionType>,
        /// Only study questions with one of these tags
        #[arg(short, long)]
        tag: Vec<String>,
    },
    /// Take a timed mock exam
    Exam {
        /// Number of questions
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Show progress, readiness and upcoming reviews
    Stats,
    /// List weak questions
    Weak,
    /// Reset review progress
    Reset {
        /// Question id to reset
        question_id: Option<String>,
        /// Reset every question
        #[arg(long)]
        all: bool,
    },
    /// Export progress and session history as JSON
    Export {
        /// Output file
        #[arg(default_value = "examprep-progress.json")]
        path: PathBuf,
    },
    /// Configure settings (question bank, session length, mode)
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Study {
            mode,
            count,
            domain,
            difficulty,
            question_type,
            tag,
        }) => {
            commands::study::run(StudyOptions {
                mode,
                count,
                domains: domain,
                difficulties: difficulty,
                types: question_type,
                tags: tag,
            })?;
        }
        Some(Commands::Exam { count }) => commands::exam::run(count)?,
        Some(Commands::Stats) => commands::stats::run()?,
        Some(Commands::Weak) => commands::stats::weak()?,
        Some(Commands::Reset { question_id, all }) => {
            commands::progress::reset(question_id, all)?;
        }
        Some(Commands::Export { path }) => commands::progress::export(&path)?,
        Some(Commands::Config) => commands::config::run()?,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
        None => {
            // No subcommand - show interactive menu
            run_interactive()?;
        }
    }

    Ok(())
}

/// Status numbers for the menu header; `None` when no bank is usable yet
fn quick_status(config: &config::Config) -> Option<(usize, usize, u32)> {
    let bank = questions::QuestionBank::load(&config.question_bank_path()?).ok()?;
    let db = storage::Database::open(config).ok()?;
    let progress = storage::ProgressStore::new(&db).load_all().ok()?;
    let now = chrono::Utc::now();

    let due = srs::due_questions(&bank.all_ids(), &progress, now).len();
    let streak = storage::SessionStore::new(&db)
        .streak(now.date_naive())
        .map(|s| s.current)
        .unwrap_or(0);

    Some((bank.questions.len(), due, streak))
}

fn run_interactive() -> Result<()> {
    use inquire::Select;

    print_banner();

    println!(
        "  {} {}\n",
        "Version:".dimmed(),
        env!("CARGO_PKG_VERSION").cyan()
    );

    println!("{}", "─".repeat(50).dimmed());

    let config = config::Config::load()?;
    match quick_status(&config) {
        Some((total, due, streak)) => {
            print_status("Questions", &total.to_string(), "📚");
            print_status("Due today", &due.to_string(), "⏰");
            print_status("Streak", &format!("{} day(s)", streak), "🔥");
        }
        None => {
            let status = if config.has_question_bank() {
                "Failed to load (run 'stats' for details)".red().to_string()
            } else {
                "Not set (run 'config')".red().to_string()
            };
            print_status("Question bank", &status, "📂");
        }
    }

    println!("{}\n", "─".repeat(50).dimmed());

    let options = vec![
        "📖  Study",
        "📝  Take a mock exam",
        "📈  View progress",
        "🩹  Weak questions",
        "⚙️   Configure settings",
        "🚪  Exit",
    ];

    let selection = match Select::new("What would you like to do?", options)
        .with_help_message("Use arrow keys to navigate, Enter to select")
        .prompt()
    {
        Ok(s) => s,
        Err(inquire::InquireError::OperationCanceled)
        | Err(inquire::InquireError::OperationInterrupted) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    println!();

    match selection {
        s if s.contains("Study") => commands::study::run(StudyOptions::default())?,
        s if s.contains("mock exam") => commands::exam::run(None)?,
        s if s.contains("progress") => commands::stats::run()?,
        s if s.contains("Weak") => commands::stats::weak()?,
        s if s.contains("Configure") => commands::config::run()?,
        s if s.contains("Exit") => {
            println!("{}", "👋 Good luck on the exam!".cyan());
        }
        _ => {}
    }

    Ok(())
}
