//! Model output parsing and shape reconciliation.
//!
//! Parsing runs in two stages: a strict deserialization of the whole text,
//! then a heuristic pass that strips Markdown fences and reads the first
//! complete JSON object, ignoring any prose around it. Reconciliation then checks the parsed output
//! against the request: every requested option must be present, and every
//! option needs non-empty strengths, weaknesses, and explanation.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::ParseError;
use crate::types::{ComparisonRequest, ComparisonResponse, OptionAnalysis};

/// Phrases that single out one option as the answer.
const WINNER_PHRASES: &[&str] = &[
    "best overall",
    "clear winner",
    "the winner",
    "obvious choice",
    "top choice",
    "the best option is",
    "is the best choice",
    "is the best option",
    "you should choose",
    "we recommend",
    "i recommend",
    "definitely go with",
];

/// Loosely-typed model output, before reconciliation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelOutput {
    #[serde(alias = "analysis")]
    pub options: BTreeMap<String, ModelOption>,
    #[serde(default)]
    pub trade_offs: Option<String>,
    #[serde(default)]
    pub context_notes: Option<Value>,
}

/// One option as the model described it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelOption {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub explanation: String,
}

/// Parse raw model text, strictly first and heuristically second.
pub fn parse_model_output(raw: &str) -> Result<ModelOutput, ParseError> {
    let strict_err = match serde_json::from_str::<ModelOutput>(raw.trim()) {
        Ok(output) => return Ok(output),
        Err(e) => e,
    };
    debug!(error = %strict_err, "Strict parse failed, trying JSON extraction");

    let candidate = from_first_brace(strip_code_fence(raw))
        .ok_or_else(|| ParseError::new("no JSON object found in model output", raw))?;

    // Raw newlines inside string literals are a common model mistake.
    let repaired = candidate.replace(['\n', '\r'], " ");
    // Only the first value is read, so trailing prose (even with braces) is ignored.
    serde_json::Deserializer::from_str(&repaired)
        .into_iter::<ModelOutput>()
        .next()
        .unwrap_or_else(|| Err(serde::de::Error::custom("empty input")))
        .map_err(|e| {
            ParseError::new(format!("model output is not valid analysis JSON: {}", e), raw)
        })
}

/// Parse and reconcile in one step.
pub fn parse_response(
    request: &ComparisonRequest,
    raw: &str,
) -> Result<ComparisonResponse, ParseError> {
    let output = parse_model_output(raw)?;
    reconcile(request, output, raw)
}

/// Check parsed output against the request and build the final response.
pub fn reconcile(
    request: &ComparisonRequest,
    output: ModelOutput,
    raw: &str,
) -> Result<ComparisonResponse, ParseError> {
    let mut by_name: BTreeMap<String, ModelOption> = BTreeMap::new();
    for (name, option) in output.options {
        by_name.entry(name.trim().to_string()).or_insert(option);
    }

    let mut analysis = BTreeMap::new();
    for option in request.options() {
        let Some(model_option) = by_name.remove(option.as_str()) else {
            return Err(ParseError::new(
                format!("model output has no analysis for option '{}'", option),
                raw,
            ));
        };
        analysis.insert(option.clone(), normalize_option(option, model_option, raw)?);
    }
    if !by_name.is_empty() {
        debug!(
            extra = ?by_name.keys().collect::<Vec<_>>(),
            "Dropping options the request did not ask about"
        );
    }

    let trade_offs = output
        .trade_offs
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ParseError::new("model output has no trade-offs summary", raw))?;

    let context_notes = if request.context().is_some() {
        output.context_notes.as_ref().and_then(context_note_text)
    } else {
        None
    };

    Ok(ComparisonResponse {
        question: request.question().to_string(),
        analysis,
        trade_offs,
        context_notes,
    })
}

fn normalize_option(
    name: &str,
    option: ModelOption,
    raw: &str,
) -> Result<OptionAnalysis, ParseError> {
    let strengths = clean_list(option.strengths);
    let weaknesses = clean_list(option.weaknesses);
    let explanation = option.explanation.trim().to_string();

    if strengths.is_empty() {
        return Err(ParseError::new(format!("option '{}' has no strengths", name), raw));
    }
    if weaknesses.is_empty() {
        return Err(ParseError::new(format!("option '{}' has no weaknesses", name), raw));
    }
    if explanation.is_empty() {
        return Err(ParseError::new(format!("option '{}' has no explanation", name), raw));
    }

    Ok(OptionAnalysis {
        strengths,
        weaknesses,
        explanation,
    })
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn context_note_text(value: &Value) -> Option<String> {
    let text = value.as_str()?.trim();
    match text {
        "" | "null" | "None" => None,
        _ => Some(text.to_string()),
    }
}

/// Return the body of the first Markdown code fence, or the input unchanged.
fn strip_code_fence(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text;
    };
    let after = &text[start + 3..];
    // Skip the language tag line, e.g. ```json
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    match body.find("```") {
        Some(end) => &body[..end],
        None => body,
    }
}

/// The text starting at the first `{`.
fn from_first_brace(text: &str) -> Option<&str> {
    text.find('{').map(|start| &text[start..])
}

/// Winner-declaring phrases found in a response, lowercase and deduplicated.
///
/// This is a heuristic: an empty result does not prove neutrality.
pub fn winner_language(response: &ComparisonResponse) -> Vec<&'static str> {
    let mut corpus = String::new();
    corpus.push_str(&response.trade_offs);
    if let Some(notes) = &response.context_notes {
        corpus.push(' ');
        corpus.push_str(notes);
    }
    for option in response.analysis.values() {
        corpus.push(' ');
        corpus.push_str(&option.explanation);
        for item in option.strengths.iter().chain(&option.weaknesses) {
            corpus.push(' ');
            corpus.push_str(item);
        }
    }
    let corpus = corpus.to_lowercase();

    WINNER_PHRASES
        .iter()
        .copied()
        .filter(|phrase| corpus.contains(phrase))
        .collect()
}
