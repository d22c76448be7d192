// crates/promo-engine-plugins/tests/actions.rs
// ============================================================================
// Module: Action Tests
// Description: Validate the built-in wallet grant, story, and no-op actions.
// Purpose: Ensure grants are idempotent and story payloads carry timestamps.
// Dependencies: promo-engine-core, promo-engine-plugins
// ============================================================================

//! Behavior tests for the built-in action plugins.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use promo_engine_core::ActionCommand;
use promo_engine_core::ActionPlugin;
use promo_engine_core::InMemoryLedger;
use promo_engine_core::Policy;
use promo_engine_core::TriggerContext;
use promo_engine_core::time::ManualClock;
use promo_engine_core::time::Timestamp;
use promo_engine_plugins::NoopAction;
use promo_engine_plugins::StoryInjectAction;
use promo_engine_plugins::WalletGrantAction;
use serde_json::Value;
use serde_json::json;

/// Builds a policy fixture, optionally carrying a story payload.
fn policy(story: Option<Value>) -> Policy {
    serde_json::from_value(json!({
        "policy_id": "pol-1",
        "program": { "max_instances": 1, "pacing": { "max_cost_per_minute": 100.0 } },
        "trigger": {
            "plugin": "event_match",
            "event": "WEATHER_CHANGE",
            "requested_instances": 1,
            "conditions": []
        },
        "segment": { "plugin": "all_users", "required_tags": [] },
        "constraints": [],
        "scoring": { "plugin": "expected_utility" },
        "story": story,
        "actions": [],
        "resource_scope": { "merchant_id": "m-1" }
    }))
    .expect("policy fixture must deserialize")
}

/// Builds a trigger context, optionally carrying a target user.
fn ctx(user_id: Option<&str>) -> TriggerContext {
    let user = user_id.map(|id| json!({ "user_id": id, "tags": [] }));
    serde_json::from_value(json!({
        "event": { "name": "WEATHER_CHANGE", "payload": {} },
        "merchant": { "merchant_id": "m-1", "kill_switch_enabled": false },
        "user": user,
        "risk_score": 0.0,
        "estimate": {
            "success_probability": 0.5,
            "value": 100.0,
            "cost": 12.0,
            "risk_penalty": 0.0,
            "fatigue_penalty": 0.0,
            "uncertainty": 0.1
        },
        "event_id": "evt-1",
        "trace_id": "trace-1"
    }))
    .expect("context fixture must deserialize")
}

/// Builds a compiled command for the given plugin and parameters.
fn command(plugin: &str, params: Value) -> ActionCommand {
    ActionCommand {
        id: "pol-1:action:1".to_string(),
        plugin: plugin.to_string(),
        channel: "default".to_string(),
        params,
    }
}

// ============================================================================
// SECTION: Wallet Grant
// ============================================================================

#[test]
fn wallet_grant_commits_once_for_redelivered_events() {
    let ledger = Arc::new(InMemoryLedger::new());
    let action = WalletGrantAction::new(Arc::<InMemoryLedger>::clone(&ledger));
    let policy = policy(None);
    let ctx = ctx(Some("u-1"));
    let command = command("wallet_grant", json!({ "account": "points", "amount": 50.0 }));

    let first = action.execute(&ctx, &policy, &command).expect("grant must succeed");
    let second = action.execute(&ctx, &policy, &command).expect("grant must succeed");

    assert!(first.success && second.success);
    assert_eq!(first.details["txn_id"], second.details["txn_id"]);
    assert_eq!(ledger.grant_count().expect("ledger readable"), 1);
}

#[test]
fn wallet_grant_requires_a_target_user() {
    let ledger = Arc::new(InMemoryLedger::new());
    let action = WalletGrantAction::new(ledger);
    let policy = policy(None);
    let ctx = ctx(None);
    let command = command("wallet_grant", json!({ "account": "points", "amount": 50.0 }));

    let err = action.execute(&ctx, &policy, &command).expect_err("grant must fail");
    assert!(err.to_string().contains("target user"));
}

#[test]
fn wallet_grant_rejects_non_positive_amounts() {
    let ledger = Arc::new(InMemoryLedger::new());
    let action = WalletGrantAction::new(Arc::<InMemoryLedger>::clone(&ledger));
    let policy = policy(None);
    let ctx = ctx(Some("u-1"));
    let command = command("wallet_grant", json!({ "account": "points", "amount": 0.0 }));

    let err = action.execute(&ctx, &policy, &command).expect_err("grant must fail");
    assert!(err.to_string().contains("positive"));
    assert_eq!(ledger.grant_count().expect("ledger readable"), 0);
}

#[test]
fn wallet_grant_records_the_receiving_account_and_amount() {
    let ledger = Arc::new(InMemoryLedger::new());
    let action = WalletGrantAction::new(Arc::<InMemoryLedger>::clone(&ledger));
    let policy = policy(None);
    let ctx = ctx(Some("u-1"));
    let params = json!({ "account": "coupons", "amount": 7.5 });
    let command = command("wallet_grant", params);

    let response = action.execute(&ctx, &policy, &command).expect("grant must succeed");
    assert_eq!(response.details["account"], json!("coupons"));
    assert_eq!(response.details["amount"], json!(7.5));

    let key = "m-1|evt-1|pol-1|wallet_grant|coupons|7.5";
    let (request, _) = ledger
        .grant_for(key)
        .expect("ledger readable")
        .expect("grant recorded under the deterministic key");
    assert_eq!(request.amount, 7.5);
    assert_eq!(request.account, "coupons");
}

// ============================================================================
// SECTION: Story Inject and Noop
// ============================================================================

#[test]
fn story_inject_attaches_payload_and_generation_time() {
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(42_000)));
    let action = StoryInjectAction::new(clock);
    let story = json!({ "story_id": "rain-story", "payload": { "headline": "Rainy day boost" } });
    let policy = policy(Some(story));
    let ctx = ctx(Some("u-1"));
    let command = command("story_inject", Value::Null);

    let response = action.execute(&ctx, &policy, &command).expect("story must succeed");
    assert!(response.success);
    assert_eq!(response.details["story_id"], json!("rain-story"));
    assert_eq!(response.details["payload"]["headline"], json!("Rainy day boost"));
    assert_eq!(response.details["generated_at"], json!(42_000));
}

#[test]
fn story_inject_succeeds_empty_when_the_policy_has_no_story() {
    let clock = Arc::new(ManualClock::new(Timestamp::from_millis(0)));
    let action = StoryInjectAction::new(clock);
    let policy = policy(None);
    let ctx = ctx(Some("u-1"));
    let command = command("story_inject", Value::Null);

    let response = action.execute(&ctx, &policy, &command).expect("story must succeed");
    assert!(response.success);
    assert_eq!(response.details, Value::Null);
}

#[test]
fn noop_always_succeeds() {
    let action = NoopAction::new();
    let policy = policy(None);
    let ctx = ctx(Some("u-1"));
    let command = command("noop", Value::Null);

    let response = action.execute(&ctx, &policy, &command).expect("noop must succeed");
    assert!(response.success);
    assert!(response.reason_codes.is_empty());
}
