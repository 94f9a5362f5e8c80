//! Question batch data model and boundary validation.

use crate::error::AskError;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Reserved label for the free-text "other" answer.
pub const OTHER_LABEL: &str = "Other";
/// Delimiter used when joining multi-select answers.
pub const DEFAULT_ANSWER_DELIMITER: &str = ", ";

/// Option choice for a multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionOption {
    /// Short label shown to the user and reported back as the answer.
    pub label: String,
    /// Explanation of what picking this option means.
    #[serde(default)]
    pub description: String,
}

impl QuestionOption {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
        }
    }
}

/// Single question presented as one wizard step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    /// Full question text.
    #[serde(alias = "question")]
    pub prompt: String,
    /// Short tag used as display chip and answer key.
    pub header: String,
    /// Ordered choices.
    pub options: Vec<QuestionOption>,
    /// Allow more than one option to be picked.
    #[serde(default, alias = "multiSelect")]
    pub multi_select: bool,
}

impl Question {
    /// Look up an option by label.
    pub fn option(&self, label: &str) -> Option<&QuestionOption> {
        self.options.iter().find(|option| option.label == label)
    }
}

/// Shape constraints applied when a batch is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_questions: usize,
    pub min_options: usize,
    pub max_options: usize,
    pub max_header_len: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_questions: 4,
            min_options: 2,
            max_options: 4,
            max_header_len: 12,
        }
    }
}

/// Ordered batch of questions asked together as one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct QuestionBatch {
    questions: Vec<Question>,
}

impl QuestionBatch {
    /// Build a batch validated against the default limits.
    pub fn new(questions: Vec<Question>) -> Result<Self, AskError> {
        Self::with_limits(questions, &BatchLimits::default())
    }

    /// Build a batch validated against explicit limits.
    pub fn with_limits(questions: Vec<Question>, limits: &BatchLimits) -> Result<Self, AskError> {
        let batch = Self { questions };
        batch.validate(limits)?;
        Ok(batch)
    }

    /// Check the batch shape. Deserialized batches are unchecked until this runs.
    pub fn validate(&self, limits: &BatchLimits) -> Result<(), AskError> {
        if self.questions.is_empty() {
            return Err(invalid("at least one question is required"));
        }
        if self.questions.len() > limits.max_questions {
            return Err(invalid(format!(
                "at most {} questions are allowed, got {}",
                limits.max_questions,
                self.questions.len()
            )));
        }

        let mut headers = HashSet::new();
        for (idx, question) in self.questions.iter().enumerate() {
            let position = idx + 1;
            if question.prompt.trim().is_empty() {
                return Err(invalid(format!("question {position} has empty prompt text")));
            }
            let header = question.header.trim();
            if header.is_empty() {
                return Err(invalid(format!("question {position} has an empty header")));
            }
            if question.header.chars().count() > limits.max_header_len {
                return Err(invalid(format!(
                    "question {position} header '{}' exceeds {} characters",
                    question.header, limits.max_header_len
                )));
            }
            if !headers.insert(question.header.as_str()) {
                return Err(invalid(format!(
                    "duplicate header '{}' in batch",
                    question.header
                )));
            }
            if question.options.len() < limits.min_options {
                return Err(invalid(format!(
                    "question {position} needs at least {} options",
                    limits.min_options
                )));
            }
            if question.options.len() > limits.max_options {
                return Err(invalid(format!(
                    "question {position} has too many options (max {})",
                    limits.max_options
                )));
            }

            let mut labels = HashSet::new();
            for option in &question.options {
                if option.label.trim().is_empty() {
                    return Err(invalid(format!("question {position} has an empty option label")));
                }
                if option.label == OTHER_LABEL {
                    return Err(invalid(format!(
                        "question {position} uses the reserved label '{OTHER_LABEL}'"
                    )));
                }
                if !labels.insert(option.label.as_str()) {
                    return Err(invalid(format!(
                        "question {position} repeats option '{}'",
                        option.label
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

fn invalid(message: impl Into<String>) -> AskError {
    AskError::InvalidBatch(message.into())
}

/// Final answers keyed by question header, in insertion order.
///
/// Inserting a header twice overwrites the earlier value in place. Serialises
/// as a map whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSet {
    entries: Vec<(String, String)>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a header, replacing any previous value.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == header) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((header, value)),
        }
    }

    pub fn get(&self, header: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == header)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as `header: value` lines for the agent.
    pub fn to_lines(&self) -> String {
        self.iter()
            .map(|(header, value)| format!("{header}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K, V> FromIterator<(K, V)> for AnswerSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut answers = AnswerSet::new();
        for (header, value) in iter {
            answers.insert(header, value);
        }
        answers
    }
}

impl Serialize for AnswerSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de> Deserialize<'de> for AnswerSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AnswerSetVisitor;

        impl<'de> Visitor<'de> for AnswerSetVisitor {
            type Value = AnswerSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of question headers to answers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AnswerSet, A::Error> {
                let mut answers = AnswerSet::new();
                while let Some((header, value)) = map.next_entry::<String, String>()? {
                    answers.insert(header, value);
                }
                Ok(answers)
            }
        }

        deserializer.deserialize_map(AnswerSetVisitor)
    }
}
