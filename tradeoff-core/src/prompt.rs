//! Prompt construction for trade-off analysis.
//!
//! The prompt is a pure function of the request: identical requests render
//! identical messages.

use serde_json::json;

use crate::types::{ComparisonRequest, Message};

/// System message framing the model as a neutral analyst.
pub const SYSTEM_PROMPT: &str = "You are an expert decision analyst who helps people understand \
trade-offs without declaring winners. You always answer with a single JSON object and nothing else.";

/// Render the user prompt for a validated request.
pub fn build_prompt(request: &ComparisonRequest) -> String {
    let mut prompt = String::new();

    prompt.push_str("Analyze the following options. Do not declare a winner, do not rank the options, ");
    prompt.push_str("and do not recommend a single choice.\n\n");
    prompt.push_str(&format!("Question: {}\n", request.question()));
    prompt.push_str("Options:\n");
    for option in request.options() {
        prompt.push_str(&format!("- {}\n", option));
    }
    prompt.push_str("Criteria:\n");
    for criterion in request.criteria() {
        prompt.push_str(&format!("- {}\n", criterion));
    }
    if let Some(context) = request.context() {
        prompt.push_str(&format!("Context: {}\n", context));
    }

    prompt.push_str("\nFor each option provide:\n");
    prompt.push_str("- 3 to 5 strengths (short phrases)\n");
    prompt.push_str("- 2 to 4 weaknesses (short phrases)\n");
    prompt.push_str("- an explanation of when this option makes sense, in 1-3 sentences\n");
    prompt.push_str("Then summarize the key trade-offs across all options without naming a best choice.\n");
    if request.context().is_some() {
        prompt.push_str("Add context_notes explaining how the given context affects the trade-offs.\n");
    } else {
        prompt.push_str("Set context_notes to null.\n");
    }

    prompt.push_str("\nUse every option name exactly as written above as a key. ");
    prompt.push_str("Respond with JSON only, no Markdown, no citations, matching this shape:\n");
    prompt.push_str(&response_template(request));
    prompt
}

/// Build the system + user messages sent to the provider.
pub fn build_messages(request: &ComparisonRequest) -> Vec<Message> {
    vec![Message::system(SYSTEM_PROMPT), Message::user(build_prompt(request))]
}

/// JSON skeleton naming every option, so the model echoes the exact keys.
fn response_template(request: &ComparisonRequest) -> String {
    let options: serde_json::Map<String, serde_json::Value> = request
        .options()
        .iter()
        .map(|option| {
            (
                option.clone(),
                json!({
                    "strengths": ["..."],
                    "weaknesses": ["..."],
                    "explanation": "...",
                }),
            )
        })
        .collect();

    let context_notes = if request.context().is_some() {
        json!("...")
    } else {
        serde_json::Value::Null
    };

    let template = json!({
        "options": options,
        "trade_offs": "...",
        "context_notes": context_notes,
    });
    serde_json::to_string_pretty(&template).unwrap_or_else(|_| template.to_string())
}
