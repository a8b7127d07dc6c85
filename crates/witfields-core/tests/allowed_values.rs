//! Allowed values computed from the rule table, the hierarchy and the
//! identity constants.

mod support;

use std::sync::Arc;

use support::{PRIORITY, context, context_with, saved_item};
use witfields_core::config::{AllowedValuesConfig, EngineConfig};
use witfields_core::core_fields::{self, names};
use witfields_core::WitContext;

fn allowed(ctx: &WitContext, key: &str) -> Option<Vec<String>> {
    let def = ctx.registry().require(key).expect("known field");
    ctx.allowed_values(&def).map(|v| v.as_slice().to_vec())
}

#[test]
fn nested_sets_expand_to_their_leaves() {
    let ctx = context();
    assert_eq!(
        allowed(&ctx, names::STATE),
        Some(vec!["Active".into(), "Closed".into(), "Resolved".into()])
    );
}

#[test]
fn numeric_fields_sort_numerically() {
    let ctx = context();
    let def = ctx.registry().require(PRIORITY).expect("priority");
    let values = ctx.allowed_values(&def).expect("values");
    assert_eq!(values.as_slice(), ["1", "2", "3", "10"]);
    assert_eq!(values.index_of("10"), Some(3));
}

#[test]
fn unsorted_values_keep_rule_order() {
    let ctx = context_with(EngineConfig {
        allowed_values: AllowedValuesConfig { sort: false },
        ..EngineConfig::default()
    });
    assert_eq!(
        allowed(&ctx, "Priority"),
        Some(vec!["3".into(), "10".into(), "1".into(), "2".into()])
    );
}

#[test]
fn deny_write_rules_need_exactly_one_inversion() {
    let ctx = context();
    assert_eq!(allowed(&ctx, names::REASON), Some(vec!["Fixed".into()]));
}

#[test]
fn fields_without_rules_allow_nothing_in_particular() {
    let ctx = context();
    assert_eq!(allowed(&ctx, names::TITLE), Some(Vec::new()));
}

#[test]
fn hierarchy_and_identity_fields() {
    let ctx = context();
    assert_eq!(
        allowed(&ctx, names::TEAM_PROJECT),
        Some(vec!["ProjectX".into(), "ProjectY".into()])
    );
    let node_names = allowed(&ctx, names::NODE_NAME).expect("names");
    assert_eq!(node_names.len(), 7);
    assert!(node_names.iter().any(|n| n == "Sprint 9"));
    assert_eq!(
        allowed(&ctx, names::AUTHORIZED_AS),
        Some(vec!["Alice Smith".into(), "Bob Jones".into()])
    );
    assert_eq!(allowed(&ctx, names::NODE_TYPE), None);
}

#[test]
fn values_are_computed_once_per_definition() {
    let ctx = context();
    let def = ctx.registry().require(core_fields::STATE).expect("state");
    let first = ctx.allowed_values(&def).expect("values");
    let second = ctx.allowed_values(&def).expect("values");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn pick_lists_replace_global_values_for_one_item() {
    let ctx = context();
    let mut item = saved_item(&ctx);
    {
        let mut state = item.field_mut(names::STATE).expect("state");
        state
            .pick_list_mut()
            .set_allowed(["Resolved", "Active"].map(String::from));
        state.pick_list_mut().set_prohibited(["Closed".to_string()]);
    }
    let state = item.peek(names::STATE).expect("state");
    let values = state.allowed_values().expect("pick list");
    assert_eq!(values.as_slice(), ["Active", "Resolved"]);
    assert_eq!(state.prohibited_values(), ["Closed"]);

    let other = saved_item(&ctx);
    let global = other
        .peek(names::STATE)
        .expect("state")
        .allowed_values()
        .expect("global");
    assert_eq!(global.len(), 3);

    item.field_mut(names::STATE).expect("state").pick_list_mut().clear();
    let state = item.peek(names::STATE).expect("state");
    assert_eq!(state.allowed_values().map(|v| v.len()), Some(3));
    assert!(state.prohibited_values().is_empty());
}
