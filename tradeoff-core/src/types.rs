//! Core types for comparison requests, analysis results, and LLM completions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;

/// A validated decision-comparison request.
///
/// Only obtainable through validation, so every instance satisfies the
/// structural rules: non-blank question, at least two distinct options,
/// at least one criterion, and trimmed text throughout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRequest {
    question: String,
    options: Vec<String>,
    criteria: Vec<String>,
    context: Option<String>,
}

impl ComparisonRequest {
    /// Validate and build a request from already-typed parts.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        criteria: Vec<String>,
        context: Option<String>,
    ) -> Result<Self, ValidationError> {
        let raw = serde_json::json!({
            "question": question.into(),
            "options": options,
            "criteria": criteria,
            "context": context,
        });
        crate::validation::validate_request(&raw)
    }

    pub(crate) fn from_parts(
        question: String,
        options: Vec<String>,
        criteria: Vec<String>,
        context: Option<String>,
    ) -> Self {
        Self {
            question,
            options,
            criteria,
            context,
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn criteria(&self) -> &[String] {
        &self.criteria
    }

    /// Situational context, `None` when omitted or blank.
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}

/// Strengths, weaknesses, and explanation for one option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAnalysis {
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub explanation: String,
}

/// The trade-off report returned to callers.
///
/// `analysis` holds exactly one entry per requested option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResponse {
    pub question: String,
    pub analysis: BTreeMap<String, OptionAnalysis>,
    pub trade_offs: String,
    pub context_notes: Option<String>,
}

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A single chat message sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: usize,
    pub output_tokens: usize,
}

/// A request to the LLM for completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: Option<usize>,
    pub model: Option<String>,
}

impl Default for CompletionRequest {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            temperature: 0.7,
            max_tokens: None,
            model: None,
        }
    }
}

/// A completed response from the LLM.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub text: String,
    pub usage: TokenUsage,
    pub model: String,
    pub finish_reason: Option<String>,
}
