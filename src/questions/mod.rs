//! Question bank: loading, validation and filtering.
//!
//! A bank is one JSON file listing the exam domains (with their share of the
//! real exam) and every question.

pub mod grading;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Allowed number of answer options per question
const OPTION_COUNT: std::ops::RangeInclusive<usize> = 2..=5;

#[derive(Debug, Error)]
pub enum BankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(String),

    #[error("Duplicate domain id: {0}")]
    DuplicateDomain(String),

    #[error("Question {question} has {count} options, expected 2 to 5")]
    OptionCount { question: String, count: usize },

    #[error("Question {0} has no correct answer")]
    NoCorrectAnswer(String),

    #[error("Question {question} lists unknown option {option} as correct")]
    UnknownCorrectOption { question: String, option: String },

    #[error("Multiple-choice question {0} must have exactly one correct answer")]
    SingleAnswerExpected(String),

    #[error("Question {question} belongs to unknown domain {domain}")]
    UnknownDomain { question: String, domain: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    MultipleSelect,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        })
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::MultipleSelect => "multiple select",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub id: String,
    pub name: String,
    /// Share of the real exam drawn from this domain
    pub exam_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub correct: String,
    /// Why each wrong option is wrong, keyed by option id
    #[serde(default)]
    pub incorrect: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub domain: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub scenario: Option<String>,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub correct_answer: Vec<String>,
    #[serde(default)]
    pub explanation: Explanation,
    #[serde(default)]
    pub key_concept_name: Option<String>,
    #[serde(default)]
    pub key_concept: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub domains: Vec<DomainInfo>,
    pub questions: Vec<Question>,
}

/// Narrowing applied before questions reach the scheduler. Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct QuestionFilter {
    pub domains: Vec<String>,
    pub difficulties: Vec<Difficulty>,
    pub types: Vec<QuestionType>,
    /// Keep questions carrying any of these tags
    pub tags: Vec<String>,
}

impl QuestionFilter {
    pub fn matches(&self, question: &Question) -> bool {
        (self.domains.is_empty() || self.domains.contains(&question.domain))
            && (self.difficulties.is_empty() || self.difficulties.contains(&question.difficulty))
            && (self.types.is_empty() || self.types.contains(&question.question_type))
            && (self.tags.is_empty() || question.tags.iter().any(|t| self.tags.contains(t)))
    }
}

impl QuestionBank {
    /// Read and validate a bank file
    pub fn load(path: &Path) -> Result<Self, BankError> {
        let content = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&content)?;
        log::info!(
            "Loaded {} questions in {} domains from {:?}",
            bank.questions.len(),
            bank.domains.len(),
            path
        );
        Ok(bank)
    }

    pub fn from_json(content: &str) -> Result<Self, BankError> {
        let bank: QuestionBank = serde_json::from_str(content)?;
        bank.validate()?;
        Ok(bank)
    }

    pub fn validate(&self) -> Result<(), BankError> {
        let mut domain_ids = HashSet::new();
        for domain in &self.domains {
            if !domain_ids.insert(domain.id.as_str()) {
                return Err(BankError::DuplicateDomain(domain.id.clone()));
            }
        }

        let mut question_ids = HashSet::new();
        for question in &self.questions {
            if !question_ids.insert(question.id.as_str()) {
                return Err(BankError::DuplicateQuestion(question.id.clone()));
            }
            if !domain_ids.contains(question.domain.as_str()) {
                return Err(BankError::UnknownDomain {
                    question: question.id.clone(),
                    domain: question.domain.clone(),
                });
            }
            if !OPTION_COUNT.contains(&question.options.len()) {
                return Err(BankError::OptionCount {
                    question: question.id.clone(),
                    count: question.options.len(),
                });
            }
            if question.correct_answer.is_empty() {
                return Err(BankError::NoCorrectAnswer(question.id.clone()));
            }
            if let Some(option) = question
                .correct_answer
                .iter()
                .find(|c| !question.options.iter().any(|o| &o.id == *c))
            {
                return Err(BankError::UnknownCorrectOption {
                    question: question.id.clone(),
                    option: option.clone(),
                });
            }
            if question.question_type == QuestionType::MultipleChoice
                && question.correct_answer.len() != 1
            {
                return Err(BankError::SingleAnswerExpected(question.id.clone()));
            }
        }

        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn domain(&self, id: &str) -> Option<&DomainInfo> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Display name of a domain, falling back to its id
    pub fn domain_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.domain(id).map(|d| d.name.as_str()).unwrap_or(id)
    }

    /// Ids of all questions passing `filter`, in bank order
    pub fn ids(&self, filter: &QuestionFilter) -> Vec<String> {
        self.questions
            .iter()
            .filter(|q| filter.matches(q))
            .map(|q| q.id.clone())
            .collect()
    }

    pub fn domain_ids(&self, domain: &str) -> Vec<String> {
        self.questions
            .iter()
            .filter(|q| q.domain == domain)
            .map(|q| q.id.clone())
            .collect()
    }

    /// All question ids
    pub fn all_ids(&self) -> Vec<String> {
        self.ids(&QuestionFilter::default())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Four-option question (A-D) with the given answer key
    pub fn question(id: &str, domain: &str, question_type: QuestionType, correct: &[&str]) -> Question {
        let options: Vec<AnswerOption> = ["A", "B", "C", "D"]
            .iter()
            .map(|o| AnswerOption {
                id: o.to_string(),
                text: format!("Option {}", o),
            })
            .collect();
        let incorrect = options
            .iter()
            .filter(|o| !correct.contains(&o.id.as_str()))
            .map(|o| (o.id.clone(), format!("{} is not right", o.id)))
            .collect();

        Question {
            id: id.to_string(),
            domain: domain.to_string(),
            difficulty: Difficulty::Medium,
            question_type,
            scenario: None,
            question: format!("Question {}?", id),
            options,
            correct_answer: correct.iter().map(|c| c.to_string()).collect(),
            explanation: Explanation {
                correct: "Because.".to_string(),
                incorrect,
            },
            key_concept_name: None,
            key_concept: None,
            tags: Vec::new(),
        }
    }

    pub fn domain(id: &str, exam_percentage: u32) -> DomainInfo {
        DomainInfo {
            id: id.to_string(),
            name: id.to_uppercase(),
            exam_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{domain, question};
    use super::*;
    use std::io::Write;

    const BANK_JSON: &str = r#"{
        "domains": [
            { "id": "iam", "name": "Identity & Access Management", "exam_percentage": 60 },
            { "id": "gke", "name": "Google Kubernetes Engine", "exam_percentage": 40 }
        ],
        "questions": [
            {
                "id": "iam-001",
                "domain": "iam",
                "difficulty": "easy",
                "type": "multiple-choice",
                "question": "Which role grants read-only access?",
                "options": [
                    { "id": "A", "text": "roles/viewer" },
                    { "id": "B", "text": "roles/editor" }
                ],
                "correct_answer": ["A"],
                "explanation": {
                    "correct": "Viewer is read-only.",
                    "incorrect": { "B": "Editor can modify resources." }
                },
                "tags": ["roles"]
            },
            {
                "id": "gke-001",
                "domain": "gke",
                "difficulty": "hard",
                "type": "multiple-select",
                "scenario": "A cluster keeps running out of nodes.",
                "question": "Which two settings help?",
                "options": [
                    { "id": "A", "text": "Cluster autoscaler" },
                    { "id": "B", "text": "Node auto-provisioning" },
                    { "id": "C", "text": "Pod disruption budget" }
                ],
                "correct_answer": ["A", "B"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_bank() {
        let bank = QuestionBank::from_json(BANK_JSON).unwrap();
        assert_eq!(bank.questions.len(), 2);

        let gke = bank.get("gke-001").unwrap();
        assert_eq!(gke.question_type, QuestionType::MultipleSelect);
        assert_eq!(gke.difficulty, Difficulty::Hard);
        assert!(gke.tags.is_empty());
        assert!(gke.explanation.incorrect.is_empty());
        assert_eq!(bank.domain_name("iam"), "Identity & Access Management");
        assert_eq!(bank.domain_name("nope"), "nope");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BANK_JSON.as_bytes()).unwrap();
        let bank = QuestionBank::load(file.path()).unwrap();
        assert_eq!(bank.all_ids(), vec!["iam-001", "gke-001"]);

        assert!(matches!(
            QuestionBank::load(Path::new("/definitely/not/here.json")),
            Err(BankError::Io(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        let mut bank = QuestionBank {
            domains: vec![domain("iam", 100)],
            questions: vec![
                question("q1", "iam", QuestionType::MultipleChoice, &["A"]),
                question("q1", "iam", QuestionType::MultipleChoice, &["B"]),
            ],
        };
        assert!(matches!(bank.validate(), Err(BankError::DuplicateQuestion(id)) if id == "q1"));

        bank.questions[1].id = "q2".to_string();
        bank.questions[1].correct_answer = vec!["A".to_string(), "B".to_string()];
        assert!(matches!(bank.validate(), Err(BankError::SingleAnswerExpected(_))));

        bank.questions[1].correct_answer = vec!["Z".to_string()];
        assert!(matches!(
            bank.validate(),
            Err(BankError::UnknownCorrectOption { option, .. }) if option == "Z"
        ));

        bank.questions[1].question_type = QuestionType::MultipleSelect;
        bank.questions[1].correct_answer = Vec::new();
        assert!(matches!(bank.validate(), Err(BankError::NoCorrectAnswer(id)) if id == "q2"));

        bank.questions[1].question_type = QuestionType::MultipleChoice;
        bank.questions[1].correct_answer = vec!["A".to_string()];
        bank.questions[1].options.truncate(1);
        assert!(matches!(
            bank.validate(),
            Err(BankError::OptionCount { count: 1, .. })
        ));

        let extra = |id: &str| AnswerOption {
            id: id.to_string(),
            text: format!("Option {}", id),
        };
        bank.questions[1].options = ["A", "B", "C", "D", "E", "F"].map(extra).to_vec();
        assert!(matches!(
            bank.validate(),
            Err(BankError::OptionCount { count: 6, .. })
        ));

        bank.questions[1].options.truncate(5);
        assert!(bank.validate().is_ok());

        bank.questions[1].domain = "gke".to_string();
        assert!(matches!(bank.validate(), Err(BankError::UnknownDomain { .. })));

        bank.questions[1].domain = "iam".to_string();
        assert!(bank.validate().is_ok());
    }

    #[test]
    fn test_filters() {
        let bank = QuestionBank::from_json(BANK_JSON).unwrap();

        let by_domain = QuestionFilter {
            domains: vec!["gke".to_string()],
            ..Default::default()
        };
        assert_eq!(bank.ids(&by_domain), vec!["gke-001"]);

        let by_type_and_tag = QuestionFilter {
            types: vec![QuestionType::MultipleChoice],
            tags: vec!["roles".to_string(), "other".to_string()],
            ..Default::default()
        };
        assert_eq!(bank.ids(&by_type_and_tag), vec!["iam-001"]);

        let nothing = QuestionFilter {
            difficulties: vec![Difficulty::Medium],
            ..Default::default()
        };
        assert!(bank.ids(&nothing).is_empty());
    }
}
