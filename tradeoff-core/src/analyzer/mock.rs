//! Offline analyzer for local development and demos.

use async_trait::async_trait;
use std::collections::BTreeMap;

use super::Analyzer;
use crate::error::AnalysisError;
use crate::types::{ComparisonRequest, ComparisonResponse, OptionAnalysis};

/// Builds a deterministic, criteria-derived report without any network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// The report for `request`; identical requests yield identical reports.
    pub fn report(request: &ComparisonRequest) -> ComparisonResponse {
        let criteria = request.criteria();
        let first = criteria.first().map(String::as_str).unwrap_or("key areas");
        let last = criteria.last().map(String::as_str).unwrap_or("cost");
        let second = criteria.get(1).map(String::as_str).unwrap_or("value proposition");
        let third = criteria.get(2).map(String::as_str).unwrap_or("solution");

        let analysis: BTreeMap<String, OptionAnalysis> = request
            .options()
            .iter()
            .map(|option| {
                let entry = OptionAnalysis {
                    strengths: vec![
                        format!("Strong performance in {}", first),
                        format!("Good {}", second),
                        format!("Reliable {}", third),
                    ],
                    weaknesses: vec![
                        format!("Higher {} compared to alternatives", last),
                        format!("Learning curve for {}", first),
                    ],
                    explanation: format!(
                        "{} offers a balanced approach with strong capabilities in {}. \
                         It may need more investment in {}, so it suits teams that can absorb that.",
                        option, first, last
                    ),
                };
                (option.clone(), entry)
            })
            .collect();

        let priorities = if criteria.len() >= 2 {
            criteria[..2].join(", ")
        } else {
            first.to_string()
        };
        let trade_offs = format!(
            "When choosing between {}, weigh your priorities around {}. \
             Each option has distinct advantages that fit different use cases and constraints.",
            request.options().join(", "),
            priorities
        );

        let context_notes = request.context().map(|context| {
            format!(
                "Given your context ({}), look for the option whose trade-offs around {} matter least to you.",
                context, first
            )
        });

        ComparisonResponse {
            question: request.question().to_string(),
            analysis,
            trade_offs,
            context_notes,
        }
    }
}

#[async_trait]
impl Analyzer for MockAnalyzer {
    async fn analyze(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ComparisonResponse, AnalysisError> {
        Ok(Self::report(request))
    }

    fn kind(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::winner_language;

    fn request(context: Option<&str>) -> ComparisonRequest {
        ComparisonRequest::new(
            "Which language?",
            vec!["Rust".into(), "Go".into(), "Zig".into()],
            vec!["performance".into(), "tooling".into()],
            context.map(String::from),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_covers_every_option() {
        let report = MockAnalyzer::new().analyze(&request(None)).await.unwrap();
        assert_eq!(report.analysis.len(), 3);
        for option in ["Rust", "Go", "Zig"] {
            let entry = &report.analysis[option];
            assert!(!entry.strengths.is_empty());
            assert!(!entry.weaknesses.is_empty());
            assert!(entry.explanation.starts_with(option));
        }
        assert_eq!(report.context_notes, None);
        assert!(report.trade_offs.contains("performance, tooling"));
    }

    #[test]
    fn test_uses_criteria_with_fallbacks() {
        let report = MockAnalyzer::report(&request(None));
        let rust = &report.analysis["Rust"];
        assert_eq!(rust.strengths[0], "Strong performance in performance");
        assert_eq!(rust.strengths[1], "Good tooling");
        assert_eq!(rust.strengths[2], "Reliable solution");
        assert_eq!(rust.weaknesses[0], "Higher tooling compared to alternatives");
    }

    #[test]
    fn test_context_notes_when_context_given() {
        let report = MockAnalyzer::report(&request(Some("embedded firmware")));
        let notes = report.context_notes.unwrap();
        assert!(notes.contains("embedded firmware"));
    }

    #[test]
    fn test_deterministic_and_neutral() {
        let a = MockAnalyzer::report(&request(Some("x")));
        let b = MockAnalyzer::report(&request(Some("x")));
        assert_eq!(a, b);
        assert!(winner_language(&a).is_empty());
    }

    #[test]
    fn test_kind() {
        assert_eq!(MockAnalyzer::new().kind(), "mock");
    }
}
