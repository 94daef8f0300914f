//! Property-based tests for the matcher, the hasher, and the cooldown machine.
//!
//! Uses proptest to verify invariants across random inputs:
//! - Similarity is symmetric, bounded, and positive on itself
//! - Ranking is bounded by `top_n` and sorted by descending score
//! - Canonical hashes ignore key order and track value changes
//! - `cooldown:active` never repeats without an intervening `cooldown:ended`

// Property tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::Instant;
use uado::cooldown::CooldownConfig;
use uado::cooldown::machine::{CooldownMachine, CooldownState, Input};
use uado::models::{CooldownEvent, PatternEntry};
use uado::services::{ContentHasher, rank_matches, similarity, tokenize};

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z]{1,6}", 0..8).prop_map(|words| words.join(" "))
}

proptest! {
    /// Property: similarity is symmetric and within [0, 1].
    #[test]
    fn prop_similarity_symmetric(a in text(), b in text()) {
        let ab = similarity(&a, &b);
        let ba = similarity(&b, &a);
        prop_assert!((ab - ba).abs() < 1e-12);
        prop_assert!((0.0..=1.0 + 1e-12).contains(&ab));
    }

    /// Property: any text with at least one token is similar to itself.
    #[test]
    fn prop_similarity_reflexive(a in "[a-z]{1,8}( [a-z]{1,8}){0,5}") {
        prop_assert!(similarity(&a, &a) > 0.0);
        prop_assert!((similarity(&a, &a) - 1.0).abs() < 1e-9);
    }

    /// Property: texts with disjoint vocabularies score zero.
    #[test]
    fn prop_disjoint_vocabulary_scores_zero(a in "[a-m]{1,5}( [a-m]{1,5}){0,4}", b in "[n-z]{1,5}( [n-z]{1,5}){0,4}") {
        prop_assert_eq!(similarity(&a, &b), 0.0);
    }

    /// Property: tokens are lowercase and never empty.
    #[test]
    fn prop_tokens_normalized(s in "\\PC{0,40}") {
        for token in tokenize(&s) {
            prop_assert!(!token.is_empty());
            prop_assert_eq!(token.to_lowercase(), token.clone());
        }
    }

    /// Property: ranking returns at most `top_n` positive scores, best first.
    #[test]
    fn prop_ranking_sorted_and_bounded(
        query in text(),
        prompts in prop::collection::vec(text(), 0..12),
        top_n in 0usize..6,
    ) {
        let entries: Vec<PatternEntry> = prompts
            .iter()
            .map(|p| PatternEntry::new(p.clone(), "f.ts", ""))
            .collect();
        let ranked = rank_matches(&query, &entries, top_n);

        prop_assert!(ranked.len() <= top_n);
        prop_assert!(ranked.iter().all(|s| s.score > 0.0));
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    /// Property: the hash ignores insertion order of object keys.
    #[test]
    fn prop_hash_ignores_key_order(
        fields in prop::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8),
    ) {
        let forward: Map<String, Value> =
            fields.iter().map(|(k, v)| (k.clone(), Value::from(*v))).collect();
        let reversed: Map<String, Value> =
            fields.iter().rev().map(|(k, v)| (k.clone(), Value::from(*v))).collect();

        let a = ContentHasher::compute_hash(&Value::Object(forward));
        let b = ContentHasher::compute_hash(&Value::Object(reversed));
        prop_assert_eq!(a.len(), 64);
        prop_assert_eq!(a, b);
    }

    /// Property: changing a field value changes the hash.
    #[test]
    fn prop_hash_tracks_values(key in "[a-z]{1,6}", x in any::<i64>(), y in any::<i64>()) {
        prop_assume!(x != y);
        let object = |v: i64| {
            let mut map = Map::new();
            map.insert(key.clone(), Value::from(v));
            Value::Object(map)
        };
        let a = ContentHasher::compute_hash(&object(x));
        let b = ContentHasher::compute_hash(&object(y));
        prop_assert_ne!(a, b);
    }
}

#[derive(Debug, Clone)]
enum Step {
    Churn,
    Hint,
    Advance(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Churn),
        Just(Step::Hint),
        (1u64..150).prop_map(Step::Advance),
    ]
}

proptest! {
    /// Property: edges alternate and the last edge matches the state.
    #[test]
    fn prop_cooldown_edges_alternate(steps in prop::collection::vec(step(), 0..60)) {
        let config = CooldownConfig::from_millis(Some(100), Some(20));
        let mut machine = CooldownMachine::new(config);
        let mut now = Instant::now();
        let mut emitted = Vec::new();

        for step in steps {
            let transition = match step {
                Step::Churn => machine.apply(Input::Churn, now),
                Step::Hint => machine.apply(Input::StabilityHint, now),
                Step::Advance(ms) => {
                    let until = now + Duration::from_millis(ms);
                    match machine.pending_timer() {
                        Some(timer) if timer.deadline <= until => {
                            now = timer.deadline;
                            let fired = machine.apply(Input::TimerFired { epoch: timer.epoch }, now);
                            now = until;
                            fired
                        },
                        _ => {
                            now = until;
                            continue;
                        },
                    }
                },
            };
            if let Some(event) = transition.emit {
                emitted.push(event);
            }
            // A stale epoch is always ignored.
            let stale = machine.apply(Input::TimerFired { epoch: u64::MAX }, now);
            prop_assert!(stale.emit.is_none());
        }

        for (i, event) in emitted.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert_eq!(*event, CooldownEvent::Active);
            } else {
                prop_assert!(event.is_ended());
            }
        }
        let expected = if emitted.len() % 2 == 1 { CooldownState::Active } else { CooldownState::Idle };
        prop_assert_eq!(machine.state(), expected);
        prop_assert_eq!(machine.pending_timer().is_some(), expected == CooldownState::Active);
    }
}
