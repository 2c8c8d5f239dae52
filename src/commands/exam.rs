use anyhow::Result;
use chrono::{Duration, Utc};
use colored::Colorize;
use inquire::Select;

use super::{Prompted, Workspace, ask_answer, print_question};
use crate::exam::{self, EXAM_DURATION_MINUTES, ExamResult, PASSING_SCORE};
use crate::questions::Question;

pub fn run(count: Option<usize>) -> Result<()> {
    let Some(ws) = Workspace::open()? else {
        return Ok(());
    };

    let total = count.unwrap_or(exam::DEFAULT_EXAM_QUESTIONS);
    let questions = exam::generate_exam(&ws.bank, total, &mut rand::thread_rng());
    if questions.is_empty() {
        println!("{}", "The question bank has no questions for an exam.".dimmed());
        return Ok(());
    }

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".magenta()
    );
    println!(
        "    {}                 {}                 {}",
        "│".magenta(),
        "📝 MOCK EXAM 📝".bold().white(),
        "│".magenta()
    );
    println!(
        "    {}   {} questions · {} minutes · pass at {}%         {}",
        "│".magenta(),
        questions.len().to_string().yellow().bold(),
        EXAM_DURATION_MINUTES,
        (PASSING_SCORE * 100.0).round(),
        "│".magenta()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".magenta()
    );
    println!(
        "  {}",
        "No feedback until the end. Esc leaves a question unanswered.".dimmed()
    );

    let start = Select::new("Start the exam?", vec!["Yes", "No"]).prompt();
    match start {
        Ok("Yes") => {}
        Ok(_)
        | Err(inquire::InquireError::OperationCanceled)
        | Err(inquire::InquireError::OperationInterrupted) => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    let started_at = Utc::now();
    let deadline = started_at + Duration::minutes(EXAM_DURATION_MINUTES);
    let mut answers: Vec<(&Question, Vec<String>)> =
        questions.iter().map(|q| (*q, Vec::new())).collect();

    for position in 0..answers.len() {
        let now = Utc::now();
        if now >= deadline {
            println!("\n{}", "⏰ Time is up!".red().bold());
            break;
        }

        let question = answers[position].0;
        let remaining = (deadline - now).num_seconds();
        println!(
            "\n{} {}",
            "Time left:".dimmed(),
            super::format_duration(remaining).yellow()
        );
        print_question(question, &ws.bank, position + 1, answers.len());

        match ask_answer(question)? {
            Prompted::Answered(selected) => {
                // Answers submitted after the deadline don't count
                if Utc::now() < deadline {
                    answers[position].1 = selected;
                }
            }
            Prompted::Skipped => {}
            Prompted::Quit => {
                println!("\n{}", "Exam ended early.".dimmed());
                break;
            }
        }
    }

    let result = exam::grade_exam(&ws.bank, &answers);
    log::info!(
        "Exam finished: {}/{} correct",
        result.correct_answers,
        result.total_questions
    );
    print_result(&result, (Utc::now() - started_at).num_seconds());

    Ok(())
}

fn print_result(result: &ExamResult, elapsed_seconds: i64) {
    let (border, verdict) = if result.passed {
        ("│".green(), "✓ PASSED".green().bold())
    } else {
        ("│".red(), "✗ NOT PASSED".red().bold())
    };

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".dimmed()
    );
    println!(
        "    {}  {}  Score: {}% ({}/{})                   {}",
        border,
        verdict,
        result.score_percentage.to_string().bold(),
        result.correct_answers,
        result.total_questions,
        border
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".dimmed()
    );
    println!(
        "  {} {}\n",
        "Time:".dimmed(),
        super::format_duration(elapsed_seconds)
    );

    println!("{}", "By domain:".bold());
    for domain in &result.domains {
        let pct = domain.accuracy_percentage;
        let pct_str = format!("{:>3}%", pct);
        let colored_pct = if pct >= 70 {
            pct_str.green()
        } else if pct >= 50 {
            pct_str.yellow()
        } else {
            pct_str.red()
        };
        println!(
            "  {:<30} {} {}",
            domain.domain_name,
            colored_pct,
            format!(
                "({} right, {} wrong, {} unanswered)",
                domain.correct_answers, domain.incorrect_answers, domain.unanswered
            )
            .dimmed()
        );
    }
    println!();
}
