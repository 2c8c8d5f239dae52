//! Bookkeeping for one study sitting: which questions were asked, how each
//! was answered and rated, and the summary shown at the end.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::questions::grading::AnswerResult;
use crate::srs::{Rating, StudyMode};

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Question {0} is not part of this session")]
    UnknownQuestion(String),

    #[error("Question {0} was already answered in this session")]
    AlreadyAnswered(String),
}

#[derive(Debug, Clone)]
pub struct AnswerRecord {
    pub question_id: String,
    pub domain: String,
    pub result: AnswerResult,
    pub rating: Rating,
}

pub struct StudySession {
    pub id: String,
    pub mode: StudyMode,
    pub question_ids: Vec<String>,
    pub started_at: DateTime<Utc>,
    answers: Vec<AnswerRecord>,
    answered: HashSet<String>,
    skipped: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainStats {
    pub domain: String,
    pub total_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub accuracy_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub mode: StudyMode,
    pub started_at: DateTime<Utc>,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub skipped_questions: usize,
    pub correct_answers: usize,
    pub incorrect_answers: usize,
    pub accuracy_percentage: u32,
    pub time_spent_seconds: i64,
    pub domain_breakdown: Vec<DomainStats>,
}

impl StudySession {
    pub fn new(mode: StudyMode, question_ids: Vec<String>, started_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("session-{}", started_at.timestamp_millis()),
            mode,
            question_ids,
            started_at,
            answers: Vec::new(),
            answered: HashSet::new(),
            skipped: HashSet::new(),
        }
    }

    /// Record the answer to a question. Each question can be answered once;
    /// the caller must only reschedule the question when this succeeds.
    pub fn record_answer(&mut self, record: AnswerRecord) -> Result<(), SessionError> {
        self.check_open(&record.question_id)?;

        log::debug!(
            "Session {}: {} answered ({}% accurate, rated {})",
            self.id,
            record.question_id,
            record.result.accuracy_percentage,
            record.rating
        );

        self.answered.insert(record.question_id.clone());
        self.answers.push(record);
        Ok(())
    }

    pub fn skip(&mut self, question_id: &str) -> Result<(), SessionError> {
        self.check_open(question_id)?;
        self.skipped.insert(question_id.to_string());
        Ok(())
    }

    fn check_open(&self, question_id: &str) -> Result<(), SessionError> {
        if !self.question_ids.iter().any(|id| id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id.to_string()));
        }
        if self.answered.contains(question_id) || self.skipped.contains(question_id) {
            return Err(SessionError::AlreadyAnswered(question_id.to_string()));
        }
        Ok(())
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn summary(&self, ended_at: DateTime<Utc>) -> SessionSummary {
        let correct_answers = self.answers.iter().filter(|a| a.result.is_correct).count();
        let answered_questions = self.answers.len();

        let mut domains: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for answer in &self.answers {
            let entry = domains.entry(answer.domain.as_str()).or_default();
            entry.0 += 1;
            if answer.result.is_correct {
                entry.1 += 1;
            }
        }

        let domain_breakdown = domains
            .into_iter()
            .map(|(domain, (total, correct))| DomainStats {
                domain: domain.to_string(),
                total_questions: total,
                correct_answers: correct,
                incorrect_answers: total - correct,
                accuracy_percentage: percentage(correct, total),
            })
            .collect();

        SessionSummary {
            session_id: self.id.clone(),
            mode: self.mode,
            started_at: self.started_at,
            total_questions: self.question_ids.len(),
            answered_questions,
            skipped_questions: self.skipped.len(),
            correct_answers,
            incorrect_answers: answered_questions - correct_answers,
            accuracy_percentage: percentage(correct_answers, answered_questions),
            time_spent_seconds: (ended_at - self.started_at).num_seconds().max(0),
            domain_breakdown,
        }
    }
}

/// `part / whole` as a rounded percentage, 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        0
    } else {
        (part as f64 / whole as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap()
    }

    fn answer(id: &str, domain: &str, correct: bool) -> AnswerRecord {
        AnswerRecord {
            question_id: id.to_string(),
            domain: domain.to_string(),
            result: AnswerResult {
                is_correct: correct,
                is_partially_correct: false,
                correct_options: vec!["A".to_string()],
                selected_options: vec![if correct { "A" } else { "B" }.to_string()],
                incorrect_selections: Vec::new(),
                missed_correct_options: Vec::new(),
                correct_count: usize::from(correct),
                total_correct_count: 1,
                accuracy_percentage: if correct { 100.0 } else { 0.0 },
            },
            rating: Rating::Good,
        }
    }

    fn session() -> StudySession {
        let ids = ["q1", "q2", "q3", "q4"].map(String::from).to_vec();
        StudySession::new(StudyMode::Mixed, ids, start())
    }

    #[test]
    fn test_second_answer_rejected() {
        let mut session = session();
        session.record_answer(answer("q1", "iam", true)).unwrap();
        assert_eq!(
            session.record_answer(answer("q1", "iam", false)),
            Err(SessionError::AlreadyAnswered("q1".to_string()))
        );
        assert_eq!(session.answers().len(), 1);

        session.skip("q2").unwrap();
        assert!(session.record_answer(answer("q2", "iam", true)).is_err());
        assert_eq!(
            session.skip("zz"),
            Err(SessionError::UnknownQuestion("zz".to_string()))
        );
    }

    #[test]
    fn test_summary() {
        let mut session = session();
        session.record_answer(answer("q1", "iam", true)).unwrap();
        session.record_answer(answer("q2", "iam", false)).unwrap();
        session.record_answer(answer("q3", "gke", true)).unwrap();
        session.skip("q4").unwrap();

        let summary = session.summary(start() + Duration::seconds(95));
        assert_eq!(summary.total_questions, 4);
        assert_eq!(summary.answered_questions, 3);
        assert_eq!(summary.skipped_questions, 1);
        assert_eq!(summary.correct_answers, 2);
        assert_eq!(summary.incorrect_answers, 1);
        assert_eq!(summary.accuracy_percentage, 67);
        assert_eq!(summary.time_spent_seconds, 95);

        let domains: Vec<_> = summary
            .domain_breakdown
            .iter()
            .map(|d| (d.domain.as_str(), d.total_questions, d.accuracy_percentage))
            .collect();
        assert_eq!(domains, vec![("gke", 1, 100), ("iam", 2, 50)]);
    }

    #[test]
    fn test_empty_summary() {
        let summary = session().summary(start());
        assert_eq!(summary.answered_questions, 0);
        assert_eq!(summary.accuracy_percentage, 0);
        assert!(summary.domain_breakdown.is_empty());
    }
}
