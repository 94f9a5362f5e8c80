//! Configuration schema for Parley.

use crate::error::ConfigError;
use parley_protocol::{BatchLimits, DEFAULT_ANSWER_DELIMITER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root config.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ParleyConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub questions: QuestionsConfig,
}

impl ParleyConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ParleyConfigBuilder {
        ParleyConfigBuilder::new()
    }
}

/// Builder for assembling a `ParleyConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ParleyConfigBuilder {
    config: ParleyConfig,
}

impl ParleyConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ParleyConfig::default(),
        }
    }

    /// Replace the question handling configuration.
    pub fn questions(mut self, questions: QuestionsConfig) -> Self {
        self.config.questions = questions;
        self
    }

    /// Override only the answer timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.questions.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Finalize and return the built `ParleyConfig`.
    pub fn build(self) -> ParleyConfig {
        self.config
    }
}

/// Question batch shape and answer timeout policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionsConfig {
    /// How long a request may stay unanswered.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_questions")]
    pub max_questions: usize,
    #[serde(default = "default_min_options")]
    pub min_options: usize,
    #[serde(default = "default_max_options")]
    pub max_options: usize,
    #[serde(default = "default_max_header_len")]
    pub max_header_len: usize,
    /// Separator placed between multi-select answers.
    #[serde(default = "default_answer_delimiter")]
    pub answer_delimiter: String,
}

impl Default for QuestionsConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            max_questions: default_max_questions(),
            min_options: default_min_options(),
            max_options: default_max_options(),
            max_header_len: default_max_header_len(),
            answer_delimiter: default_answer_delimiter(),
        }
    }
}

impl QuestionsConfig {
    /// Answer timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reject limits and timeouts no coordinator could work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "questions.timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_questions == 0 {
            return Err(ConfigError::Invalid(
                "questions.max_questions must be greater than zero".to_string(),
            ));
        }
        if self.min_options == 0 || self.min_options > self.max_options {
            return Err(ConfigError::Invalid(
                "questions.min_options must be between 1 and max_options".to_string(),
            ));
        }
        if self.max_header_len == 0 {
            return Err(ConfigError::Invalid(
                "questions.max_header_len must be greater than zero".to_string(),
            ));
        }
        if self.answer_delimiter.is_empty() {
            return Err(ConfigError::Invalid(
                "questions.answer_delimiter cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Batch limits enforced when a batch is accepted.
    pub fn limits(&self) -> BatchLimits {
        BatchLimits {
            max_questions: self.max_questions,
            min_options: self.min_options,
            max_options: self.max_options,
            max_header_len: self.max_header_len,
        }
    }
}

fn default_timeout_ms() -> u64 {
    5 * 60 * 1000
}

fn default_max_questions() -> usize {
    BatchLimits::default().max_questions
}

fn default_min_options() -> usize {
    BatchLimits::default().min_options
}

fn default_max_options() -> usize {
    BatchLimits::default().max_options
}

fn default_max_header_len() -> usize {
    BatchLimits::default().max_header_len
}

fn default_answer_delimiter() -> String {
    DEFAULT_ANSWER_DELIMITER.to_string()
}
