use serde::Serialize;
use std::collections::HashSet;

use super::{Question, QuestionType};

const MISSED_OPTION_REASON: &str = "This was a correct answer that you missed.";

/// Outcome of checking one submitted answer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerResult {
    pub is_correct: bool,
    /// At least one correct option chosen, but not a fully correct answer
    pub is_partially_correct: bool,
    pub correct_options: Vec<String>,
    pub selected_options: Vec<String>,
    pub incorrect_selections: Vec<String>,
    pub missed_correct_options: Vec<String>,
    pub correct_count: usize,
    pub total_correct_count: usize,
    /// Partial-credit score, 0-100, rounded
    pub accuracy_percentage: f64,
}

/// Grade `selected` option ids against the question's answer key.
///
/// Multiple-choice is all or nothing. Multiple-select earns credit for each
/// correct option picked, minus a penalty for each wrong one relative to the
/// total number of options.
pub fn validate_answer(question: &Question, selected: &[String]) -> AnswerResult {
    let correct_set: HashSet<&str> = question.correct_answer.iter().map(String::as_str).collect();

    // Picking the same option twice counts once
    let mut selected_set: HashSet<&str> = HashSet::new();
    let selected: Vec<String> = selected
        .iter()
        .filter(|opt| selected_set.insert(opt.as_str()))
        .cloned()
        .collect();

    let (correct_selections, incorrect_selections): (Vec<String>, Vec<String>) = selected
        .iter()
        .cloned()
        .partition(|opt| correct_set.contains(opt.as_str()));

    let missed_correct_options: Vec<String> = question
        .correct_answer
        .iter()
        .filter(|opt| !selected_set.contains(opt.as_str()))
        .cloned()
        .collect();

    let correct_count = correct_selections.len();
    let total_correct_count = question.correct_answer.len();

    let is_correct = correct_count == total_correct_count && incorrect_selections.is_empty();
    let is_partially_correct = correct_count > 0 && !is_correct;

    let accuracy = match question.question_type {
        QuestionType::MultipleSelect => {
            let correct_weight = ratio(correct_count, total_correct_count);
            let penalty = ratio(incorrect_selections.len(), question.options.len());
            ((correct_weight - penalty) * 100.0).max(0.0)
        }
        QuestionType::MultipleChoice => {
            if is_correct {
                100.0
            } else {
                0.0
            }
        }
    };

    AnswerResult {
        is_correct,
        is_partially_correct,
        correct_options: question.correct_answer.clone(),
        selected_options: selected,
        incorrect_selections,
        missed_correct_options,
        correct_count,
        total_correct_count,
        accuracy_percentage: accuracy.round(),
    }
}

/// Explanation for every option the learner got wrong: picked but incorrect,
/// or correct but left out. Keyed by option id, in answer order.
pub fn feedback<'q>(question: &'q Question, result: &AnswerResult) -> Vec<(String, &'q str)> {
    let mut reasons = Vec::new();

    for option in &result.incorrect_selections {
        if let Some(reason) = question.explanation.incorrect.get(option) {
            reasons.push((option.clone(), reason.as_str()));
        }
    }
    for option in &result.missed_correct_options {
        if !reasons.iter().any(|(id, _)| id == option) {
            reasons.push((option.clone(), MISSED_OPTION_REASON));
        }
    }

    reasons
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
