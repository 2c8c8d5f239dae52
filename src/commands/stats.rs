use anyhow::Result;
use chrono::{Duration, Utc};
use colored::Colorize;

use super::Workspace;
use crate::exam;
use crate::srs::{self, ProgressLookup, dates};
use crate::storage::{ProgressStore, SessionStore};

const UPCOMING_DAYS: usize = 7;
const RECENT_SESSION_DAYS: u32 = 7;

pub fn run() -> Result<()> {
    let Some(ws) = Workspace::open()? else {
        return Ok(());
    };

    let progress = ProgressStore::new(&ws.db).load_all()?;
    let sessions = SessionStore::new(&ws.db);
    let now = Utc::now();
    let today = now.date_naive();
    let ids = ws.bank.all_ids();

    let stats = srs::overall_statistics(&ids, &progress, now);
    let readiness = exam::exam_readiness(&ws.bank, &progress);
    let streak = sessions.streak(today)?;

    println!();
    println!(
        "    {}",
        "╭──────────────────────────────────────────────────────╮".cyan()
    );
    println!(
        "    {}                {}                {}",
        "│".cyan(),
        "📈 YOUR PROGRESS 📈".bold().white(),
        "│".cyan()
    );
    println!(
        "    {}",
        "╰──────────────────────────────────────────────────────╯".cyan()
    );
    println!();

    println!(
        "  {} {}   {} {}   {} {}",
        "Questions:".dimmed(),
        stats.total_questions.to_string().bold(),
        "New:".dimmed(),
        stats.new_questions.to_string().blue(),
        "Due:".dimmed(),
        stats.due_questions.to_string().yellow()
    );
    println!(
        "  {} {}   {} {}",
        "Mastered:".dimmed(),
        stats.mastered_questions.to_string().green(),
        "Weak:".dimmed(),
        stats.weak_questions.to_string().red()
    );
    println!(
        "  {} {:.0}%   {} {:.2}",
        "Accuracy:".dimmed(),
        stats.overall_accuracy,
        "Avg ease:".dimmed(),
        stats.average_ease_factor
    );
    println!(
        "  {} {} day(s), longest {}   {} {}",
        "Streak:".dimmed(),
        streak.current.to_string().yellow().bold(),
        streak.longest,
        "Study time:".dimmed(),
        super::format_duration(sessions.total_study_seconds()?)
    );

    println!("\n{}", "Exam readiness".bold());
    let score = format!("{}%", readiness.score);
    println!(
        "  {} {}",
        if readiness.ready {
            score.green().bold()
        } else {
            score.yellow().bold()
        },
        if readiness.ready {
            "ready to sit the exam".green()
        } else {
            "keep going".dimmed()
        }
    );
    for (domain_id, mastery) in &readiness.domains {
        println!(
            "  {:<30} {} {:>3}%",
            ws.bank.domain_name(domain_id),
            progress_bar(*mastery),
            mastery
        );
    }

    println!("\n{}", "Upcoming reviews".bold());
    let histogram = srs::upcoming_review_histogram(&ids, &progress, UPCOMING_DAYS, now);
    for (offset, count) in histogram.iter().enumerate() {
        let day = today + Duration::days(offset as i64);
        println!(
            "  {:<12} {}",
            dates::relative_day_label(day, today),
            if *count == 0 {
                "-".dimmed()
            } else {
                count.to_string().cyan()
            }
        );
    }

    let recent = sessions.recent(RECENT_SESSION_DAYS, now)?;
    if !recent.is_empty() {
        println!("\n{}", "Recent sessions".bold());
        for session in recent {
            println!(
                "  {}  {:<6} {:>3}/{:<3} {:>3}%  {}",
                session.started_at.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                session.mode,
                session.correct_answers,
                session.answered_questions,
                session.accuracy_percentage,
                super::format_duration(session.time_spent_seconds).dimmed()
            );
        }
    }
    println!();

    Ok(())
}

/// List questions that need extra work, weakest first within each domain
pub fn weak() -> Result<()> {
    let Some(ws) = Workspace::open()? else {
        return Ok(());
    };

    let progress = ProgressStore::new(&ws.db).load_all()?;
    let now = Utc::now();
    let weak = srs::weak_questions(&ws.bank.all_ids(), &progress, now);

    if weak.is_empty() {
        println!("\n{} No weak questions. Nice work.\n", "✓".green());
        return Ok(());
    }

    let mut rows: Vec<_> = weak
        .iter()
        .filter_map(|id| Some((ws.bank.get(id)?, progress.progress(id)?)))
        .collect();
    rows.sort_by(|(qa, sa), (qb, sb)| {
        qa.domain
            .cmp(&qb.domain)
            .then(sa.ease_factor.total_cmp(&sb.ease_factor))
    });

    println!("\n{} ({})\n", "Weak questions".bold().red(), rows.len());
    let mut current_domain = "";
    for (question, state) in rows {
        if question.domain != current_domain {
            current_domain = &question.domain;
            println!("{}", ws.bank.domain_name(current_domain).bold().cyan());
        }
        println!(
            "  {:<12} ease {:.2}  {}/{} correct  due {}",
            question.id.yellow(),
            state.ease_factor,
            state.correct_attempts,
            state.total_attempts,
            dates::relative_day_label(state.next_review_date.date_naive(), now.date_naive())
        );
        println!("    {}", truncate(&question.question, 70).dimmed());
    }
    println!(
        "\n  Drill them with {}\n",
        "examprep study --mode weak".cyan()
    );

    Ok(())
}

fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) / 5) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), "░".repeat(20));
        assert_eq!(progress_bar(50).chars().filter(|c| *c == '█').count(), 10);
        assert_eq!(progress_bar(150), "█".repeat(20));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
    }
}
