use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use inquire::Select;

use super::{Prompted, Workspace, ask_answer, print_question};
use crate::questions::grading::{self, AnswerResult};
use crate::questions::{Difficulty, Question, QuestionFilter, QuestionType};
use crate::session::{AnswerRecord, SessionSummary, StudySession};
use crate::srs::{self, Rating, StudyMode};
use crate::storage::{ProgressStore, SessionStore};

/// Options for a study session; anything left unset falls back to the config
#[derive(Debug, Default)]
pub struct StudyOptions {
    pub mode: Option<StudyMode>,
    pub count: Option<usize>,
    pub domains: Vec<String>,
    pub difficulties: Vec<Difficulty>,
    pub types: Vec<QuestionType>,
    pub tags: Vec<String>,
}

pub fn run(options: StudyOptions) -> Result<()> {
    let Some(ws) = Workspace::open()? else {
        return Ok(());
    };

    let mode = options.mode.unwrap_or(ws.config.study_mode);
    let count = options.count.unwrap_or(ws.config.questions_per_session);
    let filter = QuestionFilter {
        domains: if options.domains.is_empty() {
            ws.config.preferred_domains.clone()
        } else {
            options.domains
        },
        difficulties: options.difficulties,
        types: options.types,
        tags: options.tags,
    };

    let ids = ws.bank.ids(&filter);
    if ids.is_empty() {
        println!("{}", "No questions match those filters.".dimmed());
        return Ok(());
    }

    let progress_store = ProgressStore::new(&ws.db);
    let session_store = SessionStore::new(&ws.db);
    let mut progress = progress_store.load_all()?;

    let now = Utc::now();
    let selected = srs::select_for_session(&ids, &progress, mode, count, now, &mut rand::thread_rng());

    if selected.is_empty() {
        println!(
            "\n{} Nothing to study in {} mode right now.",
            "✓".green(),
            mode.to_string().cyan()
        );
        if mode != StudyMode::New {
            println!("  Try {} to start on fresh questions.", "examprep study --mode new".cyan());
        }
        return Ok(());
    }

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".blue()
    );
    println!(
        "    {}               {}               {}",
        "│".blue(),
        "📚 STUDY SESSION 📚".bold().white(),
        "│".blue()
    );
    println!(
        "    {}   {} questions · {} mode                        {}",
        "│".blue(),
        selected.len().to_string().yellow().bold(),
        mode.to_string().cyan(),
        "│".blue()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".blue()
    );

    let total = selected.len();
    let mut session = StudySession::new(mode, selected, now);

    for position in 0..total {
        let id = session.question_ids[position].clone();
        let Some(question) = ws.bank.get(&id) else {
            log::warn!("Selected question {} is missing from the bank", id);
            continue;
        };

        print_question(question, &ws.bank, position + 1, total);

        let selected_options = match ask_answer(question)? {
            Prompted::Answered(selected) => selected,
            Prompted::Skipped => {
                session.skip(&id)?;
                println!("  {}", "Skipped.".dimmed());
                continue;
            }
            Prompted::Quit => {
                println!("\n{}", "Study session ended early.".dimmed());
                break;
            }
        };

        let result = grading::validate_answer(question, &selected_options);
        print_feedback(question, &result);

        let rating = match ask_rating(&result)? {
            Prompted::Answered(rating) => rating,
            Prompted::Skipped => suggested_rating(&result),
            Prompted::Quit => {
                println!("\n{}", "Study session ended early.".dimmed());
                break;
            }
        };

        if let Err(e) = session.record_answer(AnswerRecord {
            question_id: id.clone(),
            domain: question.domain.clone(),
            result: result.clone(),
            rating,
        }) {
            eprintln!("{} {}", "Error:".red(), e);
            continue;
        }

        let reviewed_at = Utc::now();
        let current = srs::get_or_create(&id, &progress, reviewed_at);
        let next = srs::update(
            &current,
            rating,
            result.is_correct,
            result.accuracy_percentage,
            reviewed_at,
        );
        progress_store.save(&next)?;

        println!(
            "  {} Next review in {} {}",
            "↻".cyan(),
            next.interval.to_string().yellow(),
            if next.interval == 1 { "day" } else { "days" }
        );
        progress.insert(id, next);

        session_store.mark_study_day(reviewed_at.date_naive())?;
        println!("{}", "─".repeat(50).dimmed());
    }

    let summary = session.summary(Utc::now());
    if summary.answered_questions > 0 {
        session_store.record(&summary)?;
    }
    print_summary(&summary);

    let missed: Vec<&str> = session
        .answers()
        .iter()
        .filter(|a| !a.result.is_correct)
        .map(|a| a.question_id.as_str())
        .collect();
    if !missed.is_empty() {
        println!("  {} {}\n", "Missed:".red(), missed.join(", ").yellow());
    }

    Ok(())
}

fn print_feedback(question: &Question, result: &AnswerResult) {
    println!();
    if result.is_correct {
        println!("  {} Correct!", "✓".green().bold());
    } else if result.is_partially_correct {
        println!(
            "  {} Partially correct ({}%)",
            "◐".yellow().bold(),
            result.accuracy_percentage
        );
    } else {
        println!("  {} Incorrect", "✗".red().bold());
    }

    if !result.is_correct {
        println!(
            "  {} {}",
            "Answer:".dimmed(),
            result.correct_options.join(", ").green()
        );
        for (option, reason) in grading::feedback(question, result) {
            println!("    {} {}", format!("{}:", option).yellow(), reason);
        }
    }

    if !question.explanation.correct.is_empty() {
        println!("\n  {} {}", "Why:".bold(), question.explanation.correct);
    }
    if let Some(name) = &question.key_concept_name {
        println!(
            "  {} {}{}",
            "Key concept:".bold(),
            name.cyan(),
            question
                .key_concept
                .as_deref()
                .map(|c| format!(" - {}", c))
                .unwrap_or_default()
        );
    }
    println!();
}

/// Default rating when the learner does not pick one
fn suggested_rating(result: &AnswerResult) -> Rating {
    if result.is_correct {
        Rating::Good
    } else {
        Rating::Again
    }
}

/// Confidence scores offered after each answer
const RATING_CHOICES: [(u8, &str); 4] = [
    (0, "Again - I didn't know it"),
    (3, "Hard  - I got there, barely"),
    (4, "Good  - I knew it"),
    (5, "Easy  - Too easy"),
];

fn ask_rating(result: &AnswerResult) -> Result<Prompted<Rating>> {
    let suggested = suggested_rating(result).score();
    let default = RATING_CHOICES
        .iter()
        .position(|(score, _)| *score == suggested)
        .unwrap_or(2);
    let labels: Vec<&str> = RATING_CHOICES.iter().map(|(_, label)| *label).collect();

    let picked = Select::new("How confident were you?", labels)
        .with_starting_cursor(default)
        .with_help_message("Esc accepts the highlighted rating")
        .raw_prompt()
        .map(|choice| {
            let score = RATING_CHOICES.get(choice.index).map_or(u8::MAX, |(s, _)| *s);
            Rating::from_score(score)
        });

    Prompted::from_result(picked)
}

fn print_summary(summary: &SessionSummary) {
    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".green()
    );
    println!(
        "    {}            {}            {}",
        "│".green(),
        "📊 SESSION SUMMARY 📊".bold().white(),
        "│".green()
    );
    println!(
        "    {}  Answered: {} │ Correct: {} │ Score: {}%           {}",
        "│".green(),
        summary.answered_questions.to_string().cyan(),
        summary.correct_answers.to_string().green(),
        summary.accuracy_percentage,
        "│".green()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".green()
    );

    if summary.skipped_questions > 0 {
        println!("  {} skipped", summary.skipped_questions.to_string().yellow());
    }
    println!(
        "  {} {}",
        "Time:".dimmed(),
        super::format_duration(summary.time_spent_seconds)
    );

    for domain in &summary.domain_breakdown {
        println!(
            "  {:<30} {}/{} ({}%)",
            domain.domain,
            domain.correct_answers,
            domain.total_questions,
            domain.accuracy_percentage
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_choices_cover_every_rating() {
        let ratings: Vec<Rating> = RATING_CHOICES
            .iter()
            .map(|(score, _)| Rating::from_score(*score))
            .collect();
        assert_eq!(ratings, Rating::ALL.to_vec());
    }
}
