//! Property-based tests for the Gemini translation layer
//!
//! These tests verify that translation between our internal types and the
//! provider wire format preserves key invariants:
//! - User text reaches the wire unchanged, as the only content entry
//! - System text and temperature are carried through
//! - Response text parts are concatenated in order
//! - Responses with no text never produce an empty reply

use super::gemini::{
    GeminiCandidate, GeminiContent, GeminiPart, GeminiResponse, GeminiService,
};
use super::types::{LlmMessage, LlmRequest, SystemContent};
use proptest::prelude::*;

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.!?,']{1,100}"
}

fn arb_request() -> impl Strategy<Value = LlmRequest> {
    (arb_text(), arb_text(), 0.0f32..2.0).prop_map(|(system, user, temperature)| LlmRequest {
        system: vec![SystemContent::new(system)],
        messages: vec![LlmMessage::user(user)],
        temperature: Some(temperature),
        max_tokens: None,
    })
}

fn response_with_parts(parts: Vec<Option<String>>) -> GeminiResponse {
    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: Some(GeminiContent {
                role: Some("model".to_string()),
                parts: parts.into_iter().map(|text| GeminiPart { text }).collect(),
            }),
            finish_reason: Some("STOP".to_string()),
        }],
        usage_metadata: None,
    }
}

proptest! {
    #[test]
    fn translation_preserves_user_text(request in arb_request()) {
        let wire = GeminiService::translate_request(&request);

        prop_assert_eq!(wire.contents.len(), 1);
        let content = &wire.contents[0];
        prop_assert_eq!(content.role.as_deref(), Some("user"));
        prop_assert_eq!(content.parts.len(), 1);
        prop_assert_eq!(
            content.parts[0].text.as_deref(),
            Some(request.messages[0].text.as_str())
        );
    }

    #[test]
    fn translation_carries_system_and_temperature(request in arb_request()) {
        let wire = GeminiService::translate_request(&request);

        let system = wire.system_instruction.expect("system instruction present");
        prop_assert!(system.role.is_none());
        prop_assert_eq!(system.parts[0].text.as_deref(), Some(request.system[0].text.as_str()));
        prop_assert_eq!(
            wire.generation_config.temperature.map(f32::to_bits),
            request.temperature.map(f32::to_bits)
        );
    }

    #[test]
    fn normalization_concatenates_parts(parts in proptest::collection::vec(arb_text(), 1..5)) {
        let expected: String = parts.concat();
        let resp = response_with_parts(parts.into_iter().map(Some).collect());

        let normalized = GeminiService::normalize_response(resp);
        prop_assert_eq!(normalized.text, Some(expected));
    }

    #[test]
    fn normalization_never_yields_empty_text(n in 0usize..4) {
        let resp = response_with_parts(vec![None; n]);
        let normalized = GeminiService::normalize_response(resp);
        prop_assert!(normalized.text.is_none());
    }
}
