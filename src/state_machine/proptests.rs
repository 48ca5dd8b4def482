//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::conversation::message::Role;
use crate::conversation::Conversation;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_blank_text() -> impl Strategy<Value = String> {
    "[ \t\n]{0,8}"
}

fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z?!]{1}[a-zA-Z ?!.]{0,40}"
}

fn arb_state() -> impl Strategy<Value = ChatState> {
    prop_oneof![
        Just(ChatState::Idle),
        "[a-f0-9]{8}".prop_map(|submission_id| ChatState::AwaitingCompletion { submission_id }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_text().prop_map(Event::submit),
        arb_blank_text().prop_map(Event::submit),
        ("[a-f0-9]{8}", arb_text()).prop_map(|(id, reply)| Event::resolved(id, reply)),
        ("[a-f0-9]{8}", arb_text()).prop_map(|(id, error)| Event::failed(id, error)),
    ]
}

/// Operations a visitor and the network can perform on a live conversation
#[derive(Debug, Clone)]
enum Op {
    Submit(String),
    Resolve(String),
    Fail,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_text().prop_map(Op::Submit),
        arb_blank_text().prop_map(Op::Submit),
        arb_text().prop_map(Op::Resolve),
        Just(Op::Fail),
    ]
}

fn append_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::AppendMessage { .. }))
        .count()
}

// ============================================================================
// Transition properties
// ============================================================================

proptest! {
    #[test]
    fn blank_submissions_never_transition(state in arb_state(), text in arb_blank_text()) {
        let result = transition(&state, Event::submit(text));
        prop_assert_eq!(result.unwrap_err(), TransitionError::EmptyInput);
    }

    #[test]
    fn pending_state_rejects_all_submissions(id in "[a-f0-9]{8}", text in arb_text()) {
        let state = ChatState::AwaitingCompletion { submission_id: id };
        prop_assert_eq!(
            transition(&state, Event::submit(text)).unwrap_err(),
            TransitionError::Busy
        );
    }

    #[test]
    fn successful_transitions_flip_pending(state in arb_state(), event in arb_event()) {
        if let Ok(result) = transition(&state, event) {
            // Every accepted event moves Idle <-> AwaitingCompletion
            prop_assert_ne!(state.is_pending(), result.new_state.is_pending());
            prop_assert!(append_count(&result.effects) <= 1);

            let requests = result
                .effects
                .iter()
                .filter(|e| matches!(e, Effect::RequestCompletion { .. }))
                .count();
            prop_assert_eq!(requests, usize::from(result.new_state.is_pending()));
        }
    }

    #[test]
    fn mismatched_resolution_is_stale(
        pending in "[a-f0-9]{8}",
        other in "[a-f0-9]{8}",
        reply in arb_text(),
    ) {
        prop_assume!(pending != other);
        let state = ChatState::AwaitingCompletion { submission_id: pending };
        prop_assert!(matches!(
            transition(&state, Event::resolved(other, reply)),
            Err(TransitionError::StaleResolution(_))
        ));
    }
}

// ============================================================================
// Conversation-level properties
// ============================================================================

proptest! {
    #[test]
    fn transcript_grows_by_two_per_resolved_turn(ops in proptest::collection::vec(arb_op(), 0..40)) {
        let mut conversation = Conversation::new("Hello!");
        let mut resolved_turns = 0usize;
        let mut failed_turns = 0usize;

        for op in ops {
            let before = conversation.messages().len();
            let was_pending = conversation.is_pending();

            match op {
                Op::Submit(text) => {
                    let accepted = conversation.submit(&text).is_ok();
                    prop_assert_eq!(accepted, !was_pending && !text.trim().is_empty());
                    prop_assert_eq!(conversation.messages().len(), before + usize::from(accepted));
                    prop_assert_eq!(conversation.is_pending(), was_pending || accepted);
                }
                Op::Resolve(reply) => {
                    let Some(id) = conversation.state().submission_id().map(str::to_string) else {
                        prop_assert!(conversation.on_completion_resolved("nothing", reply).is_err());
                        prop_assert_eq!(conversation.messages().len(), before);
                        continue;
                    };
                    conversation.on_completion_resolved(&id, reply).unwrap();
                    resolved_turns += 1;
                    prop_assert_eq!(conversation.messages().len(), before + 1);
                    prop_assert!(!conversation.is_pending());
                }
                Op::Fail => {
                    let Some(id) = conversation.state().submission_id().map(str::to_string) else {
                        continue;
                    };
                    conversation.on_completion_failed(&id, "task died").unwrap();
                    failed_turns += 1;
                    prop_assert_eq!(conversation.messages().len(), before);
                    prop_assert!(!conversation.is_pending());
                }
            }
        }

        let in_flight = usize::from(conversation.is_pending());
        prop_assert_eq!(
            conversation.messages().len(),
            1 + 2 * resolved_turns + failed_turns + in_flight
        );
    }

    #[test]
    fn transcript_alternates_after_seed(
        questions in proptest::collection::vec(arb_text(), 1..10),
    ) {
        let mut conversation = Conversation::new("Hello!");
        for question in &questions {
            conversation.submit(question).unwrap();
            let id = conversation.state().submission_id().unwrap().to_string();
            conversation.on_completion_resolved(&id, "reply").unwrap();
        }

        let messages = conversation.messages();
        prop_assert_eq!(messages.len(), 1 + 2 * questions.len());
        prop_assert_eq!(messages[0].role, Role::Model);
        for (i, pair) in messages[1..].chunks(2).enumerate() {
            prop_assert_eq!(pair[0].role, Role::User);
            prop_assert_eq!(&pair[0].text, &questions[i]);
            prop_assert_eq!(pair[1].role, Role::Model);
        }
    }
}
