//! Property-based tests for the Gemini translation layer
//!
//! These tests verify that parsing provider payloads preserves key invariants:
//! - Grounding sources keep their order and never contain blank fields
//! - Empty replies are reported as missing text
//! - Server-side failures are the only transient classification

use super::gemini::{
    classify_failure, extract_sources, normalize_response, GeminiCandidate, GeminiContent,
    GeminiGroundingChunk, GeminiGroundingMetadata, GeminiPart, GeminiResponse, GeminiWebSource,
};
use super::types::GroundingSource;
use proptest::prelude::*;
use reqwest::StatusCode;

// ============================================================================
// Strategies
// ============================================================================

fn arb_optional_field() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z0-9:/._-]{1,30}".prop_map(Some),
    ]
}

fn arb_chunk() -> impl Strategy<Value = GeminiGroundingChunk> {
    prop_oneof![
        1 => Just(GeminiGroundingChunk { web: None }),
        4 => (arb_optional_field(), arb_optional_field()).prop_map(|(uri, title)| {
            GeminiGroundingChunk {
                web: Some(GeminiWebSource { uri, title }),
            }
        }),
    ]
}

fn expected_sources(chunks: &[GeminiGroundingChunk]) -> Vec<GroundingSource> {
    chunks
        .iter()
        .filter_map(|c| {
            let web = c.web.as_ref()?;
            match (web.uri.as_deref(), web.title.as_deref()) {
                (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                    Some(GroundingSource::new(uri, title))
                }
                _ => None,
            }
        })
        .collect()
}

fn response_with_parts(parts: Vec<Option<String>>) -> GeminiResponse {
    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: Some(GeminiContent {
                role: Some("model".to_string()),
                parts: parts.into_iter().map(|text| GeminiPart { text }).collect(),
            }),
            grounding_metadata: None,
        }],
        usage_metadata: None,
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_sources_are_complete_and_ordered(
        chunks in proptest::collection::vec(arb_chunk(), 0..12)
    ) {
        let expected = expected_sources(&chunks);
        let sources = extract_sources(chunks);

        prop_assert!(sources.iter().all(|s| !s.uri.is_empty() && !s.title.is_empty()));
        prop_assert_eq!(sources, expected);
    }

    #[test]
    fn prop_sources_flow_through_normalization(
        chunks in proptest::collection::vec(arb_chunk(), 0..8)
    ) {
        let expected = expected_sources(&chunks);
        let resp = GeminiResponse {
            candidates: vec![GeminiCandidate {
                content: None,
                grounding_metadata: Some(GeminiGroundingMetadata { grounding_chunks: chunks }),
            }],
            usage_metadata: None,
        };

        let normalized = normalize_response(resp);
        prop_assert!(normalized.text.is_none());
        prop_assert_eq!(normalized.sources, expected);
    }

    #[test]
    fn prop_text_is_none_only_when_all_parts_empty(
        parts in proptest::collection::vec(
            prop_oneof![Just(None), "[a-zA-Z ]{0,20}".prop_map(Some)],
            0..6,
        )
    ) {
        let joined: String = parts.iter().flatten().cloned().collect();
        let normalized = normalize_response(response_with_parts(parts));

        if joined.is_empty() {
            prop_assert!(normalized.text.is_none());
        } else {
            prop_assert_eq!(normalized.text, Some(joined));
        }
    }

    #[test]
    fn prop_any_5xx_is_transient(code in 500u16..600, message in "[a-z ]{0,20}") {
        let status = StatusCode::from_u16(code).unwrap();
        let body = format!(r#"{{"error":{{"code":{code},"message":"{message}"}}}}"#);
        prop_assert!(classify_failure(status, &body).kind.is_transient());
    }

    #[test]
    fn prop_4xx_without_marker_is_terminal(
        code in 400u16..500,
        marker in prop_oneof![
            Just("INVALID_ARGUMENT"),
            Just("PERMISSION_DENIED"),
            Just("RESOURCE_EXHAUSTED"),
            Just("NOT_FOUND"),
        ],
    ) {
        let status = StatusCode::from_u16(code).unwrap();
        let body = format!(r#"{{"error":{{"code":{code},"message":"nope","status":"{marker}"}}}}"#);
        prop_assert!(!classify_failure(status, &body).kind.is_transient());
    }

    #[test]
    fn prop_internal_marker_is_transient(code in 400u16..600) {
        let status = StatusCode::from_u16(code).unwrap();
        let body = r#"{"error":{"code":500,"message":"internal","status":"INTERNAL"}}"#;
        prop_assert!(classify_failure(status, body).kind.is_transient());
    }
}
