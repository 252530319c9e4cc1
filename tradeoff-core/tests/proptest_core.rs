//! Property-based tests for core components using proptest.

use proptest::prelude::*;
use serde_json::json;
use std::time::Duration;

use tradeoff_core::MockAnalyzer;
use tradeoff_core::config::RetryConfig;
use tradeoff_core::parse::{parse_model_output, parse_response};
use tradeoff_core::validate_request;

fn distinct_names(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[A-Za-z][A-Za-z0-9 ]{0,11}[A-Za-z0-9]", min..max)
        .prop_map(|set| set.into_iter().collect())
}

// --- Validation properties ---

proptest! {
    #[test]
    fn valid_requests_are_accepted_and_trimmed(
        question in "[A-Za-z][A-Za-z ?]{0,40}",
        options in distinct_names(2, 6),
        criteria in distinct_names(1, 4),
    ) {
        let padded: Vec<String> = options.iter().map(|o| format!("  {} ", o)).collect();
        let raw = json!({"question": question, "options": padded, "criteria": criteria});

        let request = validate_request(&raw).unwrap();
        prop_assert_eq!(request.options(), options.as_slice());
        prop_assert_eq!(request.criteria(), criteria.as_slice());
        prop_assert_eq!(request.question(), question.trim());
    }

    #[test]
    fn validation_is_deterministic(
        question in ".{0,20}",
        options in prop::collection::vec(".{0,6}", 0..4),
        criteria in prop::collection::vec(".{0,6}", 0..3),
    ) {
        let raw = json!({"question": question, "options": options, "criteria": criteria});
        prop_assert_eq!(validate_request(&raw), validate_request(&raw));
    }

    #[test]
    fn fewer_than_two_options_always_rejected(
        options in distinct_names(0, 2),
        criteria in distinct_names(1, 3),
    ) {
        let raw = json!({"question": "Q", "options": options, "criteria": criteria});
        let err = validate_request(&raw).unwrap_err();
        prop_assert!(err.mentions("options"));
    }

    #[test]
    fn duplicate_options_always_rejected(
        options in distinct_names(2, 5),
        pick in 0usize..5,
    ) {
        let mut with_dup = options.clone();
        with_dup.push(options[pick % options.len()].clone());
        let raw = json!({"question": "Q", "options": with_dup, "criteria": ["c"]});
        let err = validate_request(&raw).unwrap_err();
        prop_assert!(err.mentions("options"));
    }
}

// --- Parsing properties ---

proptest! {
    #[test]
    fn parser_never_panics(raw in ".{0,200}") {
        let _ = parse_model_output(&raw);
    }

    #[test]
    fn closing_brace_before_opening_brace_is_an_error(
        before in "[A-Za-z ]{0,30}",
        middle in "[A-Za-z .,]{0,30}",
        after in "[A-Za-z ]{0,30}",
    ) {
        let raw = format!("{}}}{}{{{}", before, middle, after);
        prop_assert!(parse_model_output(&raw).is_err());
    }

    #[test]
    fn parser_survives_surrounding_prose(
        prefix in "[A-Za-z .,:]{0,40}",
        suffix in "[A-Za-z .,:]{0,40}",
    ) {
        let request = validate_request(&json!({
            "question": "Q", "options": ["A", "B"], "criteria": ["c"]
        })).unwrap();
        let body = json!({
            "options": {
                "A": {"strengths": ["s"], "weaknesses": ["w"], "explanation": "e"},
                "B": {"strengths": ["s"], "weaknesses": ["w"], "explanation": "e"}
            },
            "trade_offs": "t"
        });
        let raw = format!("{}{}{}", prefix, body, suffix);
        prop_assert!(parse_response(&request, &raw).is_ok());
    }
}

// --- Retry backoff properties ---

proptest! {
    #[test]
    fn backoff_is_capped_and_monotonic(
        base in 0u64..5_000,
        max in 0u64..20_000,
        attempt in 1usize..20,
        hint_secs in prop::option::of(0u64..60),
    ) {
        let retry = RetryConfig { max_attempts: 3, base_delay_ms: base, max_delay_ms: max };
        let hint = hint_secs.map(Duration::from_secs);
        let delay = retry.backoff(attempt, hint);
        prop_assert!(delay <= Duration::from_millis(max));
        prop_assert!(retry.backoff(attempt + 1, hint) >= delay);
    }
}

// --- Mock analyzer properties ---

proptest! {
    #[test]
    fn mock_report_covers_exactly_the_options(
        options in distinct_names(2, 6),
        criteria in distinct_names(1, 4),
    ) {
        let request = validate_request(&json!({
            "question": "Q", "options": options, "criteria": criteria
        })).unwrap();
        let report = MockAnalyzer::report(&request);
        let mut keys: Vec<String> = report.analysis.keys().cloned().collect();
        let mut expected = options.clone();
        keys.sort();
        expected.sort();
        prop_assert_eq!(keys, expected);
    }
}
