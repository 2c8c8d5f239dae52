//! Mock exam generation, grading and the readiness score.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;

use crate::questions::{DomainInfo, Question, QuestionBank, grading};
use crate::session::percentage;
use crate::srs::constants::EXAM_READY_PERCENTAGE;
use crate::srs::{ProgressLookup, domain_mastery_percent};

pub const EXAM_DURATION_MINUTES: i64 = 120;
pub const DEFAULT_EXAM_QUESTIONS: usize = 50;
/// Fraction of questions that must be right to pass
pub const PASSING_SCORE: f64 = 0.7;

/// Number of questions each domain contributes to an exam of `total` questions.
///
/// Each domain gets its rounded share; whatever rounding leaves over (or
/// takes away) goes to the domain with the biggest allocation. When the
/// weights add up to more than 100 the surplus is taken from the largest
/// domains in turn, so the counts always sum to `total`.
pub fn domain_distribution(domains: &[DomainInfo], total: usize) -> Vec<(String, usize)> {
    let weight_sum: u32 = domains.iter().map(|d| d.exam_percentage).sum();
    if !domains.is_empty() && weight_sum != 100 {
        log::warn!("Domain exam percentages add up to {}, not 100", weight_sum);
    }

    let mut distribution: Vec<(String, i64)> = domains
        .iter()
        .map(|d| {
            let count = (f64::from(d.exam_percentage) / 100.0 * total as f64).round() as i64;
            (d.id.clone(), count)
        })
        .collect();

    let allocated: i64 = distribution.iter().map(|(_, count)| count).sum();
    let mut diff = total as i64 - allocated;

    while diff != 0 {
        // First of the largest, so ties go to the domain listed first
        let Some(i) = distribution
            .iter()
            .enumerate()
            .fold(None::<(usize, i64)>, |best, (i, (_, count))| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((i, *count)),
            })
            .map(|(i, _)| i)
        else {
            break;
        };
        let change = diff.max(-distribution[i].1);
        distribution[i].1 += change;
        diff -= change;
        if change == 0 {
            break;
        }
    }

    distribution
        .into_iter()
        .map(|(id, count)| (id, count as usize))
        .collect()
}

/// Pick an exam's questions following the domain weights, then shuffle so
/// domains are interleaved. Domains with too few questions contribute what
/// they have.
pub fn generate_exam<'b, R: Rng + ?Sized>(
    bank: &'b QuestionBank,
    total: usize,
    rng: &mut R,
) -> Vec<&'b Question> {
    let mut selected = Vec::with_capacity(total);

    for (domain, count) in domain_distribution(&bank.domains, total) {
        let mut pool: Vec<&Question> = bank.questions.iter().filter(|q| q.domain == domain).collect();
        if pool.len() < count {
            log::warn!(
                "Domain {} has {} questions, exam wanted {}",
                domain,
                pool.len(),
                count
            );
        }
        pool.shuffle(rng);
        selected.extend(pool.into_iter().take(count));
    }

    selected.shuffle(rng);
    selected
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainResult {
    pub domain: String,
    pub domain_name: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub unanswered: usize,
    /// Accuracy over answered questions only
    pub accuracy_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamResult {
    pub total_questions: usize,
    pub correct_answers: usize,
    pub score_percentage: u32,
    pub passed: bool,
    /// Heaviest exam domain first
    pub domains: Vec<DomainResult>,
}

/// Grade a finished exam. `answers` pairs each question with the selected
/// option ids; an empty selection counts as unanswered.
pub fn grade_exam(bank: &QuestionBank, answers: &[(&Question, Vec<String>)]) -> ExamResult {
    let mut by_domain: HashMap<&str, DomainResult> = HashMap::new();
    let mut correct_answers = 0;

    for (question, selected) in answers {
        let entry = by_domain
            .entry(question.domain.as_str())
            .or_insert_with(|| DomainResult {
                domain: question.domain.clone(),
                domain_name: bank.domain_name(&question.domain).to_string(),
                total_questions: 0,
                correct_answers: 0,
                incorrect_answers: 0,
                unanswered: 0,
                accuracy_percentage: 0,
            });
        entry.total_questions += 1;

        if selected.is_empty() {
            entry.unanswered += 1;
        } else if grading::validate_answer(question, selected).is_correct {
            entry.correct_answers += 1;
            correct_answers += 1;
        } else {
            entry.incorrect_answers += 1;
        }
    }

    let weight = |id: &str| bank.domain(id).map(|d| d.exam_percentage).unwrap_or(0);
    let mut domains: Vec<DomainResult> = by_domain
        .into_values()
        .map(|mut result| {
            result.accuracy_percentage = percentage(
                result.correct_answers,
                result.correct_answers + result.incorrect_answers,
            );
            result
        })
        .collect();
    domains.sort_by(|a, b| {
        weight(&b.domain)
            .cmp(&weight(&a.domain))
            .then_with(|| a.domain.cmp(&b.domain))
    });

    let total_questions = answers.len();
    let passed =
        total_questions > 0 && correct_answers as f64 / total_questions as f64 >= PASSING_SCORE;

    ExamResult {
        total_questions,
        correct_answers,
        score_percentage: percentage(correct_answers, total_questions),
        passed,
        domains,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Readiness {
    pub score: u32,
    pub ready: bool,
    /// Mastery percentage per domain, in bank order
    pub domains: Vec<(String, u32)>,
}

/// Exam readiness: domain mastery percentages averaged with the exam weights
pub fn exam_readiness<L: ProgressLookup + ?Sized>(bank: &QuestionBank, lookup: &L) -> Readiness {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    let mut domains = Vec::with_capacity(bank.domains.len());

    for domain in &bank.domains {
        let mastery = domain_mastery_percent(&bank.domain_ids(&domain.id), lookup);
        weighted += f64::from(mastery) * f64::from(domain.exam_percentage);
        total_weight += f64::from(domain.exam_percentage);
        domains.push((domain.id.clone(), mastery));
    }

    let score = if total_weight > 0.0 {
        (weighted / total_weight).round() as u32
    } else {
        0
    };

    Readiness {
        score,
        ready: score >= EXAM_READY_PERCENTAGE,
        domains,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::QuestionType;
    use crate::questions::test_support::{domain, question};
    use crate::srs::ProgressMap;
    use crate::srs::sm2::create_initial;
    use chrono::{DateTime, TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn bank(per_domain: usize) -> QuestionBank {
        let domains = vec![domain("compute", 50), domain("iam", 30), domain("gke", 20)];
        let questions = domains
            .iter()
            .flat_map(|d| {
                (0..per_domain).map(move |i| {
                    question(&format!("{}-{}", d.id, i), &d.id, QuestionType::MultipleChoice, &["A"])
                })
            })
            .collect();
        QuestionBank { domains, questions }
    }

    #[test]
    fn test_distribution_sums_to_total() {
        let domains = vec![domain("a", 25), domain("b", 18), domain("c", 15), domain("d", 42)];
        let distribution = domain_distribution(&domains, 50);
        assert_eq!(distribution.iter().map(|(_, c)| c).sum::<usize>(), 50);

        // 12.5 -> 13, 9, 7.5 -> 8, 21 = 51, so the largest domain gives one back
        assert_eq!(
            distribution,
            vec![
                ("a".to_string(), 13),
                ("b".to_string(), 9),
                ("c".to_string(), 8),
                ("d".to_string(), 20)
            ]
        );
    }

    #[test]
    fn test_distribution_with_overweight_domains() {
        // 60 + 60 + 60: every domain rounds up to 1 of a 1-question exam
        let domains = vec![domain("a", 60), domain("b", 60), domain("c", 60)];
        let distribution = domain_distribution(&domains, 1);
        assert_eq!(distribution.iter().map(|(_, c)| c).sum::<usize>(), 1);
        assert_eq!(distribution[2], ("c".to_string(), 1));

        let distribution = domain_distribution(&domains, 10);
        assert_eq!(distribution.iter().map(|(_, c)| c).sum::<usize>(), 10);
    }

    #[test]
    fn test_generate_exam_follows_weights() {
        let bank = bank(20);
        let mut rng = StdRng::seed_from_u64(3);
        let exam = generate_exam(&bank, 10, &mut rng);

        assert_eq!(exam.len(), 10);
        let count = |d: &str| exam.iter().filter(|q| q.domain == d).count();
        assert_eq!((count("compute"), count("iam"), count("gke")), (5, 3, 2));
    }

    #[test]
    fn test_generate_exam_short_domain() {
        let bank = bank(1);
        let exam = generate_exam(&bank, 10, &mut StdRng::seed_from_u64(3));
        assert_eq!(exam.len(), 3);
    }

    #[test]
    fn test_grade_exam() {
        let bank = bank(4);
        let q = |id: &str| bank.get(id).unwrap();
        let right = vec!["A".to_string()];
        let wrong = vec!["B".to_string()];

        let answers = vec![
            (q("compute-0"), right.clone()),
            (q("compute-1"), right.clone()),
            (q("compute-2"), wrong.clone()),
            (q("iam-0"), right.clone()),
            (q("gke-0"), Vec::new()),
        ];
        let result = grade_exam(&bank, &answers);

        assert_eq!(result.total_questions, 5);
        assert_eq!(result.correct_answers, 3);
        assert_eq!(result.score_percentage, 60);
        assert!(!result.passed);

        let order: Vec<&str> = result.domains.iter().map(|d| d.domain.as_str()).collect();
        assert_eq!(order, vec!["compute", "iam", "gke"]);
        assert_eq!(result.domains[0].accuracy_percentage, 67);
        assert_eq!(result.domains[2].unanswered, 1);
        assert_eq!(result.domains[2].accuracy_percentage, 0);
    }

    #[test]
    fn test_pass_threshold() {
        let bank = bank(10);
        let answers: Vec<_> = bank
            .questions
            .iter()
            .take(10)
            .enumerate()
            .map(|(i, q)| (q, vec![if i < 7 { "A" } else { "B" }.to_string()]))
            .collect();
        assert!(grade_exam(&bank, &answers).passed);
        assert!(!grade_exam(&bank, &[]).passed);
    }

    #[test]
    fn test_readiness_weighted_by_exam_share() {
        let bank = bank(2);
        let mut progress = ProgressMap::new();
        for id in ["compute-0", "compute-1", "iam-0"] {
            let mut state = create_initial(id, now());
            state.interval = 30;
            state.correct_attempts = 4;
            state.total_attempts = 4;
            progress.insert(id.to_string(), state);
        }

        // compute 100% * 50 + iam 50% * 30 + gke 0% * 20 = 65
        let readiness = exam_readiness(&bank, &progress);
        assert_eq!(readiness.score, 65);
        assert!(!readiness.ready);
        assert_eq!(readiness.domains[1], ("iam".to_string(), 50));
    }
}
