use anyhow::Result;
use colored::Colorize;
use inquire::{MultiSelect, Select, Text};
use std::path::PathBuf;

use crate::config::{Config, QUESTIONS_PER_SESSION_OPTIONS};
use crate::questions::QuestionBank;
use crate::srs::StudyMode;

pub fn run() -> Result<()> {
    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".bright_black()
    );
    println!(
        "    {}            {}            {}",
        "│".bright_black(),
        "⚙️  SETTINGS ⚙️".bold().white(),
        "│".bright_black()
    );
    println!(
        "    {}           {}           {}",
        "│".bright_black(),
        "Tune how your study sessions run".dimmed(),
        "│".bright_black()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".bright_black()
    );
    println!();

    let mut config = Config::load()?;

    let options = vec![
        "📂  Question Bank      │ Point at your questions file",
        "🔢  Session Length     │ Questions per session",
        "🎯  Study Mode         │ Default question mix",
        "🏷️   Focus Domains      │ Limit study to some domains",
        "📋  View Settings      │ See current configuration",
        "←   Back",
    ];

    loop {
        let selection =
            Select::new("What would you like to configure?", options.clone()).prompt();

        let selection = match selection {
            Ok(s) => s,
            Err(inquire::InquireError::OperationCanceled)
            | Err(inquire::InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let result = match selection {
            s if s.contains("Question Bank") => set_question_bank(&mut config),
            s if s.contains("Session Length") => set_session_length(&mut config),
            s if s.contains("Study Mode") => set_study_mode(&mut config),
            s if s.contains("Focus Domains") => set_focus_domains(&mut config),
            s if s.contains("View Settings") => {
                view_config(&config);
                Ok(())
            }
            s if s.contains("Back") => break,
            _ => Ok(()),
        };

        if let Err(e) = result {
            if !is_cancel(&e) {
                eprintln!("{} {}", "Error:".red(), e);
            }
        }

        println!();
    }

    Ok(())
}

fn is_cancel(e: &anyhow::Error) -> bool {
    matches!(
        e.downcast_ref::<inquire::InquireError>(),
        Some(inquire::InquireError::OperationCanceled)
            | Some(inquire::InquireError::OperationInterrupted)
    )
}

fn set_question_bank(config: &mut Config) -> Result<()> {
    let current = config
        .question_bank
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    let input = Text::new("Path to the question bank JSON:")
        .with_initial_value(&current)
        .prompt()?;
    let input = input.trim();

    if input.is_empty() {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let path = PathBuf::from(input);
    // Refuse to save a bank that won't load
    let bank = QuestionBank::load(&path)?;

    config.question_bank = Some(path);
    config.save()?;

    println!(
        "{} Question bank set: {} questions across {} domains",
        "✓".green(),
        bank.questions.len().to_string().yellow(),
        bank.domains.len()
    );
    Ok(())
}

fn set_session_length(config: &mut Config) -> Result<()> {
    let labels: Vec<String> = QUESTIONS_PER_SESSION_OPTIONS
        .iter()
        .map(|n| format!("{} questions", n))
        .collect();
    let cursor = QUESTIONS_PER_SESSION_OPTIONS
        .iter()
        .position(|n| *n == config.questions_per_session)
        .unwrap_or(1);

    let choice = Select::new("Questions per session:", labels)
        .with_starting_cursor(cursor)
        .raw_prompt()?;

    config.questions_per_session = QUESTIONS_PER_SESSION_OPTIONS[choice.index];
    config.save()?;

    println!(
        "{} Sessions will have {} questions",
        "✓".green(),
        config.questions_per_session.to_string().yellow()
    );
    Ok(())
}

fn set_study_mode(config: &mut Config) -> Result<()> {
    let modes = [
        (StudyMode::Mixed, "mixed - due reviews plus some new questions"),
        (StudyMode::Due, "due   - only questions scheduled for review"),
        (StudyMode::New, "new   - only questions you haven't seen"),
        (StudyMode::Weak, "weak  - questions you keep getting wrong"),
    ];
    let labels: Vec<&str> = modes.iter().map(|(_, label)| *label).collect();
    let cursor = modes
        .iter()
        .position(|(mode, _)| *mode == config.study_mode)
        .unwrap_or(0);

    let choice = Select::new("Default study mode:", labels)
        .with_starting_cursor(cursor)
        .raw_prompt()?;

    config.study_mode = modes[choice.index].0;
    config.save()?;

    println!(
        "{} Default mode set to {}",
        "✓".green(),
        config.study_mode.to_string().yellow()
    );
    Ok(())
}

fn set_focus_domains(config: &mut Config) -> Result<()> {
    let Some(path) = config.question_bank_path() else {
        println!(
            "{} Set a question bank first so domains can be listed.",
            "!".yellow()
        );
        return Ok(());
    };
    let bank = QuestionBank::load(&path)?;

    let labels: Vec<String> = bank
        .domains
        .iter()
        .map(|d| format!("{} ({}% of exam)", d.name, d.exam_percentage))
        .collect();
    let defaults: Vec<usize> = bank
        .domains
        .iter()
        .enumerate()
        .filter(|(_, d)| config.preferred_domains.contains(&d.id))
        .map(|(i, _)| i)
        .collect();

    let chosen = MultiSelect::new("Focus on these domains (none = all):", labels)
        .with_default(&defaults)
        .raw_prompt()?;

    config.preferred_domains = chosen
        .into_iter()
        .filter_map(|c| bank.domains.get(c.index).map(|d| d.id.clone()))
        .collect();
    config.save()?;

    if config.preferred_domains.is_empty() {
        println!("{} Studying all domains", "✓".green());
    } else {
        println!(
            "{} Focusing on {}",
            "✓".green(),
            config.preferred_domains.join(", ").yellow()
        );
    }
    Ok(())
}

fn view_config(config: &Config) {
    println!("\n{}", "Current Configuration:".bold());
    println!("{}", "─".repeat(30).dimmed());

    let bank_status = match (&config.question_bank, config.question_bank_path()) {
        (Some(path), _) => path.display().to_string().green().to_string(),
        (None, Some(path)) => format!("{} (from EXAMPREP_QUESTION_BANK)", path.display())
            .yellow()
            .to_string(),
        (None, None) => "not set".red().to_string(),
    };
    println!("  Question bank: {}", bank_status);
    println!("  Questions per session: {}", config.questions_per_session);
    println!("  Study mode: {}", config.study_mode);
    println!(
        "  Focus domains: {}",
        if config.preferred_domains.is_empty() {
            "all".to_string()
        } else {
            config.preferred_domains.join(", ")
        }
    );

    if let Ok(path) = Config::config_path() {
        println!("  Config file: {}", path.display().to_string().dimmed());
    }

    if let Ok(path) = config.data_dir() {
        println!("  Data directory: {}", path.display().to_string().dimmed());
    }
}
