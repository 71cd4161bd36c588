mod common;

use common::{fixture, ids};
use log_search::filter::{normalize, normalize_and_compile, to_canonical_json};
use log_search::{LogRecord, execute};
use proptest::prelude::*;
use serde_json::{Value, json};

static BROWSERS: [&str; 6] = ["Chrome", "Safari", "Firefox", "IE", "Edge", "Opera"];
static COUNTRIES: [&str; 5] = ["Italy", "Germany", "Philippines", "Spain", "Peru"];
static NEEDLES: [&str; 4] = ["stack", "LINE", "loaded", "zzz"];

fn arb_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::sample::select(&BROWSERS[..]).prop_map(|b| json!({"IS": {"browser": b}})),
        prop::sample::select(&COUNTRIES[..]).prop_map(|c| json!({"EQ": {"country": c}})),
        prop::sample::select(&NEEDLES[..]).prop_map(|m| json!({"CONTAINS": {"message": m}})),
        prop::collection::vec(prop::sample::select(&COUNTRIES[..]), 0..3)
            .prop_map(|cs| json!({"IN": {"country": cs}})),
        prop::sample::select(&BROWSERS[..]).prop_map(|b| json!({"not_like": {"browser": b}})),
    ]
}

fn arb_expression() -> impl Strategy<Value = Value> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|v| json!({"AND": v})),
            prop::collection::vec(inner.clone(), 0..4).prop_map(|v| json!({"OR": v})),
            inner.prop_map(|e| json!({"NOT": e})),
        ]
    })
}

fn run(raw: &Value) -> Vec<i64> {
    let predicate = normalize_and_compile(LogRecord::schema(), raw).expect("valid filter");
    ids(&execute(fixture(), &predicate, LogRecord::schema()))
}

proptest! {
    #[test]
    fn prop_de_morgan_holds(a in arb_expression(), b in arb_expression()) {
        let left = run(&json!({"NOT": {"OR": [a.clone(), b.clone()]}}));
        let right = run(&json!({"AND": [{"NOT": a}, {"NOT": b}]}));
        prop_assert_eq!(left, right);
    }

    #[test]
    fn prop_results_are_strictly_ordered(raw in arb_expression()) {
        let result = run(&raw);
        prop_assert!(result.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn prop_normalization_is_idempotent(raw in arb_expression()) {
        let once = normalize(&raw).expect("valid expression");
        let twice = normalize(&to_canonical_json(&once)).expect("canonical form is valid");
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_negation_is_the_complement(raw in arb_expression()) {
        let kept = run(&raw);
        let dropped = run(&json!({"NOT": raw}));
        prop_assert_eq!(kept.len() + dropped.len(), common::FIXTURE_SIZE);
        prop_assert!(kept.iter().all(|id| !dropped.contains(id)));
    }
}
