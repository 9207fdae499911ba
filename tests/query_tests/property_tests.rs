//! Property tests for filter evaluation and wildcards

use nestdb::query::{compare_values, evaluate, like, values_equal};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;

// =============================================================================
// Strategies
// =============================================================================

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        any::<i64>().prop_map(|n| json!(n)),
        any::<u64>().prop_map(|n| json!(n)),
        // Around 2^53, where f64 stops representing every integer
        (-4i64..4).prop_map(|d| json!((1i64 << 53) + d)),
        (-4.0f64..4.0).prop_map(|d| json!(9_007_199_254_740_992.0 + d.round())),
        "[a-z@.]{0,8}".prop_map(Value::String),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn document() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", value(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// Flat filters over the same small field alphabet as `document()`
fn filter() -> impl Strategy<Value = Value> {
    let condition = prop_oneof![
        value(),
        value().prop_map(|v| json!({"$eq": v})),
        value().prop_map(|v| json!({"$gt": v})),
        value().prop_map(|v| json!({"$lt": v})),
        "[a-z%_]{0,4}".prop_map(|p| json!({"$like": p})),
        prop::collection::vec(value(), 0..3).prop_map(|v| json!({"$in": v})),
    ];
    prop::collection::btree_map("[a-e]", condition, 0..3)
        .prop_map(|m| Value::Object(m.into_iter().collect()))
}

// =============================================================================
// Evaluator Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_empty_filter_matches_all(doc in document()) {
        prop_assert!(evaluate(&doc, &json!({})), "{}", stringify!(evaluate(&doc, &json!({}))));
    }

    #[test]
    fn prop_empty_or_matches_none(doc in document()) {
        prop_assert!(!evaluate(&doc, &json!({"$or": []})), "{}", stringify!(!evaluate(&doc, &json!({"$or": []}))));
    }

    #[test]
    fn prop_or_is_disjunction(doc in document(), f1 in filter(), f2 in filter()) {
        let combined = json!({"$or": [f1.clone(), f2.clone()]});
        prop_assert_eq!(
            evaluate(&doc, &combined),
            evaluate(&doc, &f1) || evaluate(&doc, &f2)
        );
    }

    #[test]
    fn prop_missing_field_never_matches(doc in document(), condition in value()) {
        // "z" is outside the document field alphabet
        prop_assert!(!evaluate(&doc, &json!({"z": condition.clone()})), "{}", stringify!(!evaluate(&doc, &json!({"z": condition.clone()}))));
        prop_assert!(!evaluate(&doc, &json!({"z": {"$eq": condition}})), "{}", stringify!(!evaluate(&doc, &json!({"z": {"$eq": condition}}))));
    }

    #[test]
    fn prop_gt_lt_eq_are_exclusive(field in value(), operand in value()) {
        let doc = json!({"f": field});
        let gt = evaluate(&doc, &json!({"f": {"$gt": operand.clone()}}));
        let lt = evaluate(&doc, &json!({"f": {"$lt": operand.clone()}}));
        let eq = evaluate(&doc, &json!({"f": {"$eq": operand}}));
        prop_assert_eq!([gt, lt, eq].iter().filter(|b| **b).count(), 1);
    }
}

// =============================================================================
// Ordering Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_compare_is_antisymmetric(a in value(), b in value()) {
        prop_assert_eq!(compare_values(&a, &b), compare_values(&b, &a).reverse());
    }

    #[test]
    fn prop_compare_is_reflexive(a in value()) {
        prop_assert_eq!(compare_values(&a, &a), Ordering::Equal);
        prop_assert!(values_equal(&a, &a.clone()));
    }

    #[test]
    fn prop_compare_is_transitive(a in value(), b in value(), c in value()) {
        let ab = compare_values(&a, &b);
        let bc = compare_values(&b, &c);
        let ac = compare_values(&a, &c);
        if ab.is_le() && bc.is_le() {
            prop_assert!(ac.is_le());
        }
        if ab.is_eq() && bc.is_eq() {
            prop_assert!(ac.is_eq());
        }
    }
}

// =============================================================================
// Wildcard Laws
// =============================================================================

proptest! {
    #[test]
    fn prop_percent_matches_everything(text in ".{0,16}") {
        prop_assert!(like(&text, "%"));
    }

    #[test]
    fn prop_underscore_matches_single_char(text in ".{0,4}") {
        prop_assert_eq!(like(&text, "_"), text.chars().count() == 1);
    }

    #[test]
    fn prop_literal_pattern_is_equality(text in "[a-z]{0,6}", pattern in "[a-z]{0,6}") {
        prop_assert_eq!(like(&text, &pattern), text == pattern);
    }

    #[test]
    fn prop_prefix_suffix(prefix in "[a-z]{0,4}", middle in "[a-z]{0,4}", suffix in "[a-z]{0,4}") {
        let text = format!("{prefix}{middle}{suffix}");
        let pattern = format!("{prefix}%{suffix}");
        prop_assert!(like(&text, &pattern));
    }
}

#[test]
fn test_equality_chain_near_two_pow_53() {
    let big_int = json!(9_007_199_254_740_993u64);
    let big_float = json!(9_007_199_254_740_992.0f64);
    let exact_int = json!(9_007_199_254_740_992u64);

    // Not (big_int == big_float == exact_int) while big_int > exact_int
    assert!(!values_equal(&big_int, &big_float));
    assert!(values_equal(&big_float, &exact_int));
    assert_eq!(compare_values(&big_int, &exact_int), Ordering::Greater);
}

#[test]
fn test_wildcard_examples() {
    assert!(like("abc", "a%c"));
    assert!(like("abc", "a_c"));
    assert!(!like("ab", "a_c"));
    assert!(like("", "%"));
}
