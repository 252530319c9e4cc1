//! Request validation.
//!
//! Turns an untyped JSON body into a [`ComparisonRequest`], collecting every
//! violated rule instead of stopping at the first one. Validation is pure:
//! the same input always yields the same violations in the same order.

use serde_json::Value;
use std::collections::HashMap;

use crate::error::{FieldViolation, ValidationError};
use crate::types::ComparisonRequest;

/// Minimum number of options a comparison needs.
pub const MIN_OPTIONS: usize = 2;
/// Minimum number of criteria a comparison needs.
pub const MIN_CRITERIA: usize = 1;

/// Validate a raw JSON candidate and build a trimmed [`ComparisonRequest`].
pub fn validate_request(raw: &Value) -> Result<ComparisonRequest, ValidationError> {
    let Some(body) = raw.as_object() else {
        return Err(ValidationError {
            violations: vec![FieldViolation::new("body", "expected a JSON object")],
        });
    };

    let mut violations = Vec::new();

    let question = check_question(body.get("question"), &mut violations);
    let options = check_string_list(
        body.get("options"),
        "options",
        MIN_OPTIONS,
        "at least 2 options are required",
        &mut violations,
    );
    let criteria = check_string_list(
        body.get("criteria"),
        "criteria",
        MIN_CRITERIA,
        "at least 1 criterion is required",
        &mut violations,
    );
    let context = check_context(body.get("context"), &mut violations);

    if !violations.is_empty() {
        return Err(ValidationError { violations });
    }

    Ok(ComparisonRequest::from_parts(
        question.unwrap_or_default(),
        options,
        criteria,
        context,
    ))
}

fn check_question(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<String> {
    match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new("question", "field required"));
            None
        }
        Some(Value::String(s)) if s.trim().is_empty() => {
            violations.push(FieldViolation::new("question", "must not be empty"));
            None
        }
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(_) => {
            violations.push(FieldViolation::new("question", "must be a string"));
            None
        }
    }
}

/// Check a list of strings: presence, type, minimum length, blank items, and
/// exact duplicates (after trimming, case-sensitive).
fn check_string_list(
    value: Option<&Value>,
    field: &str,
    min: usize,
    min_message: &str,
    violations: &mut Vec<FieldViolation>,
) -> Vec<String> {
    let items = match value {
        None | Some(Value::Null) => {
            violations.push(FieldViolation::new(field, "field required"));
            return Vec::new();
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            violations.push(FieldViolation::new(field, "must be an array of strings"));
            return Vec::new();
        }
    };

    if items.len() < min {
        violations.push(FieldViolation::new(field, min_message));
    }

    let mut accepted = Vec::with_capacity(items.len());
    let mut first_seen: HashMap<String, usize> = HashMap::new();
    for (index, item) in items.iter().enumerate() {
        let path = format!("{field}[{index}]");
        let Some(text) = item.as_str() else {
            violations.push(FieldViolation::new(path, "must be a string"));
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            violations.push(FieldViolation::new(path, "must not be empty"));
            continue;
        }
        if let Some(first) = first_seen.get(trimmed) {
            violations.push(FieldViolation::new(
                path,
                format!("duplicate of {field}[{first}]"),
            ));
            continue;
        }
        first_seen.insert(trimmed.to_string(), index);
        accepted.push(trimmed.to_string());
    }
    accepted
}

fn check_context(value: Option<&Value>, violations: &mut Vec<FieldViolation>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(_) => {
            violations.push(FieldViolation::new("context", "must be a string"));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(err: &ValidationError) -> Vec<&str> {
        err.violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_request() {
        let req = validate_request(&json!({
            "question": "Which DB?",
            "options": ["Postgres", "MySQL"],
            "criteria": ["cost"],
        }))
        .unwrap();
        assert_eq!(req.question(), "Which DB?");
        assert_eq!(req.options(), ["Postgres", "MySQL"]);
        assert_eq!(req.criteria(), ["cost"]);
        assert_eq!(req.context(), None);
    }

    #[test]
    fn test_single_option_rejected() {
        let err = validate_request(&json!({
            "question": "...",
            "options": ["OnlyOne"],
            "criteria": ["cost"],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["options"]);
        assert!(err.violations[0].message.contains('2'));
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let err = validate_request(&json!({
            "question": "Q",
            "options": ["A", "B"],
            "criteria": [],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["criteria"]);
        assert!(err.violations[0].message.contains('1'));
    }

    #[test]
    fn test_collects_every_violation() {
        let err = validate_request(&json!({
            "question": "   ",
            "options": ["A"],
            "criteria": ["  "],
            "context": 42,
        }))
        .unwrap_err();
        assert_eq!(
            fields(&err),
            vec!["question", "options", "criteria[0]", "context"]
        );
    }

    #[test]
    fn test_missing_fields() {
        let err = validate_request(&json!({})).unwrap_err();
        assert_eq!(fields(&err), vec!["question", "options", "criteria"]);
        assert!(err.violations.iter().all(|v| v.message == "field required"));
    }

    #[test]
    fn test_wrong_types() {
        let err = validate_request(&json!({
            "question": 7,
            "options": "A,B",
            "criteria": ["cost", 3],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["question", "options", "criteria[1]"]);
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_request(&json!(["A", "B"])).unwrap_err();
        assert_eq!(fields(&err), vec!["body"]);
    }

    #[test]
    fn test_blank_option_reported_by_index() {
        let err = validate_request(&json!({
            "question": "Q",
            "options": ["A", " ", "C"],
            "criteria": ["cost"],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["options[1]"]);
    }

    #[test]
    fn test_duplicate_options_rejected() {
        let err = validate_request(&json!({
            "question": "Q",
            "options": ["A", "B", " A "],
            "criteria": ["cost"],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["options[2]"]);
        assert_eq!(err.violations[0].message, "duplicate of options[0]");
    }

    #[test]
    fn test_duplicates_are_case_sensitive() {
        let req = validate_request(&json!({
            "question": "Q",
            "options": ["aws", "AWS"],
            "criteria": ["cost"],
        }))
        .unwrap();
        assert_eq!(req.options(), ["aws", "AWS"]);
    }

    #[test]
    fn test_duplicate_criteria_rejected() {
        let err = validate_request(&json!({
            "question": "Q",
            "options": ["A", "B"],
            "criteria": ["cost", "cost"],
        }))
        .unwrap_err();
        assert_eq!(fields(&err), vec!["criteria[1]"]);
    }

    #[test]
    fn test_context_trimmed_and_blank_dropped() {
        let with = validate_request(&json!({
            "question": "Q",
            "options": ["A", "B"],
            "criteria": ["cost"],
            "context": "  small team ",
        }))
        .unwrap();
        assert_eq!(with.context(), Some("small team"));

        let blank = validate_request(&json!({
            "question": "Q",
            "options": ["A", "B"],
            "criteria": ["cost"],
            "context": "",
        }))
        .unwrap();
        assert_eq!(blank.context(), None);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let raw = json!({
            "question": "",
            "options": ["A", "A", ""],
            "criteria": [],
        });
        let first = validate_request(&raw).unwrap_err();
        let second = validate_request(&raw).unwrap_err();
        assert_eq!(first, second);
    }
}
