//! Agent-facing tool that asks the user questions through the coordinator.

use crate::coordinator::QuestionCoordinator;
use async_trait::async_trait;
use log::info;
use parley_protocol::{Question, QuestionBatch, SessionId, ToolError};
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt::Debug;
use std::sync::Arc;

/// Tool metadata spec for discovery and schema presentation.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// JSON schema for tool arguments.
    pub args_schema: Value,
}

/// Per-call context handed to tools by the agent runtime.
#[derive(Clone)]
pub struct ToolContext {
    /// Session the calling agent runs in.
    pub session_id: SessionId,
    /// Agent identifier, for logging.
    pub agent_id: String,
    /// Coordinator that owns the question rendezvous.
    pub questions: Arc<QuestionCoordinator>,
}

/// Interface for executable tools.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    /// Return the tool name.
    fn name(&self) -> &str;
    /// Return the tool description.
    fn description(&self) -> &str;
    /// Return the JSON schema for tool arguments.
    fn args_schema(&self) -> Value;

    /// Invoke the tool with a context and arguments.
    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError>;

    /// Build a `ToolSpec` describing this tool.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}

/// Tool that asks the user one to four multiple-choice questions.
#[derive(Debug, Default)]
pub struct AskUserQuestionTool;

#[async_trait]
impl Tool for AskUserQuestionTool {
    fn name(&self) -> &str {
        "AskUserQuestion"
    }

    fn description(&self) -> &str {
        "Ask the user one or more multiple choice questions and wait for the answers. \
         Use this when requirements are ambiguous or several valid approaches exist. \
         The user can always pick 'Other' and type a custom answer."
    }

    fn args_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "questions": {
                    "type": "array",
                    "description": "Questions to ask the user (1-4)",
                    "minItems": 1,
                    "maxItems": 4,
                    "items": {
                        "type": "object",
                        "properties": {
                            "question": {
                                "type": "string",
                                "description": "The complete question to ask"
                            },
                            "header": {
                                "type": "string",
                                "description": "Very short label shown as a chip (max 12 chars)",
                                "maxLength": 12
                            },
                            "options": {
                                "type": "array",
                                "description": "Available choices (2-4). 'Other' is added automatically.",
                                "minItems": 2,
                                "maxItems": 4,
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "label": { "type": "string" },
                                        "description": { "type": "string" }
                                    },
                                    "required": ["label", "description"]
                                }
                            },
                            "multiSelect": {
                                "type": "boolean",
                                "default": false
                            }
                        },
                        "required": ["question", "header", "options"]
                    }
                }
            },
            "required": ["questions"]
        })
    }

    async fn call(&self, ctx: &ToolContext, args: Value) -> Result<Value, ToolError> {
        let input: AskUserQuestionArgs = serde_json::from_value(args)
            .map_err(|err| ToolError::InvalidArguments(err.to_string()))?;
        let batch = QuestionBatch::with_limits(input.questions, ctx.questions.limits())?;

        info!(
            "asking user questions (session_id={}, agent_id={}, questions={})",
            ctx.session_id,
            ctx.agent_id,
            batch.len()
        );
        let answers = ctx.questions.ask(batch, ctx.session_id).await?;

        Ok(json!({
            "summary": answers.to_lines(),
            "answers": answers,
        }))
    }
}

/// Arguments for AskUserQuestionTool.
#[derive(Debug, Deserialize)]
struct AskUserQuestionArgs {
    questions: Vec<Question>,
}
