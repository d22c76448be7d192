// crates/promo-engine-plugins/tests/scenarios.rs
// ============================================================================
// Module: Scenario Tests
// Description: End-to-end pipeline scenarios over the built-in plugin set.
// Purpose: Validate full admission, grant, and blocking flows per policy.
// Dependencies: promo-engine-core, promo-engine-plugins
// ============================================================================

//! End-to-end evaluation scenarios with every built-in plugin registered.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use promo_engine_core::BudgetState;
use promo_engine_core::InMemoryLedger;
use promo_engine_core::InMemoryResourceStore;
use promo_engine_core::PipelineOutcome;
use promo_engine_core::PluginRegistry;
use promo_engine_core::Policy;
use promo_engine_core::PolicyPipeline;
use promo_engine_core::ResourceStore;
use promo_engine_core::TriggerContext;
use promo_engine_core::reason;
use promo_engine_core::time::ManualClock;
use promo_engine_core::time::Timestamp;
use promo_engine_plugins::BudgetGuardConstraint;
use promo_engine_plugins::register_builtin_plugins;
use serde_json::json;

/// Weather-promotion policy exercising every built-in plugin kind.
fn policy() -> Policy {
    serde_json::from_value(json!({
        "policy_id": "pol-rain",
        "program": { "max_instances": 1, "pacing": { "max_cost_per_minute": 100.0 } },
        "trigger": {
            "plugin": "event_match",
            "event": "WEATHER_CHANGE",
            "requested_instances": 1,
            "conditions": [ { "field": "weather", "equals": "RAIN" } ]
        },
        "segment": { "plugin": "tag_segment", "required_tags": ["rainy_city"] },
        "constraints": [
            { "plugin": "kill_switch", "params": null },
            { "plugin": "budget_guard", "params": { "cap": 60.0, "cost_per_hit": 12.0 } },
            { "plugin": "frequency_cap", "params": { "window_sec": 86400, "daily": 1 } },
            { "plugin": "anti_fraud", "params": null }
        ],
        "scoring": { "plugin": "expected_utility" },
        "story": { "story_id": "rain-story", "payload": { "headline": "Rainy day boost" } },
        "actions": [
            { "plugin": "wallet_grant", "channel": "wallet", "params": { "account": "points", "amount": 50.0 } },
            { "plugin": "story_inject", "channel": null, "params": null }
        ],
        "resource_scope": { "merchant_id": "m-1" }
    }))
    .expect("policy fixture must deserialize")
}

/// Rainy-day trigger context for the given weather and kill-switch state.
fn ctx(weather: &str, kill_switch: bool, with_user: bool) -> TriggerContext {
    let user = with_user.then(|| json!({ "user_id": "u-1", "tags": ["rainy_city"] }));
    serde_json::from_value(json!({
        "event": { "name": "WEATHER_CHANGE", "payload": { "weather": weather } },
        "merchant": { "merchant_id": "m-1", "kill_switch_enabled": kill_switch },
        "user": user,
        "risk_score": 0.1,
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

/// Builds a pipeline with every built-in plugin and returns the ledger handle.
fn build_pipeline() -> (PolicyPipeline<InMemoryResourceStore, ManualClock>, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    let clock = ManualClock::new(Timestamp::from_millis(1_000));
    let mut registry = PluginRegistry::new();
    register_builtin_plugins(&mut registry, Arc::<InMemoryLedger>::clone(&ledger), Arc::new(clock.clone()));
    let pipeline = PolicyPipeline::new(Arc::new(registry), InMemoryResourceStore::new(), clock);
    (pipeline, ledger)
}

#[test]
fn rainy_weather_event_admits_grants_and_injects_the_story() {
    let (pipeline, ledger) = build_pipeline();
    let policy = policy();

    let report =
        pipeline.evaluate(&policy, &ctx("RAIN", false, true)).expect("evaluate must not error");

    assert_eq!(report.outcome, PipelineOutcome::Executed);
    let candidate = &report.candidates[0];
    assert!(candidate.admitted);
    let score = candidate.score.as_ref().expect("admitted candidate is scored");
    assert_eq!(score.utility, 38.0);

    let execution = candidate.execution.as_ref().expect("admitted candidate executes");
    assert!(execution.success);
    assert_eq!(execution.responses.len(), 2);
    assert_eq!(execution.responses[1].details["story_id"], json!("rain-story"));

    // The grant committed once and the budget charged one hit.
    assert_eq!(ledger.grant_count().expect("ledger readable"), 1);
    let key = BudgetGuardConstraint::key(&policy);
    let budget = pipeline
        .store()
        .budget_snapshot(&key)
        .expect("snapshot must not error")
        .expect("budget entry exists");
    assert_eq!(budget.used, 12.0);
}

#[test]
fn condition_mismatch_is_a_no_match() {
    let (pipeline, ledger) = build_pipeline();
    let report =
        pipeline.evaluate(&policy(), &ctx("SUN", false, true)).expect("evaluate must not error");

    assert_eq!(report.outcome, PipelineOutcome::NoMatch);
    assert_eq!(ledger.grant_count().expect("ledger readable"), 0);
}

#[test]
fn kill_switch_blocks_without_consuming_any_resource() {
    let (pipeline, ledger) = build_pipeline();
    let policy = policy();

    let report =
        pipeline.evaluate(&policy, &ctx("RAIN", true, true)).expect("evaluate must not error");

    assert_eq!(report.outcome, PipelineOutcome::Blocked);
    let candidate = &report.candidates[0];
    assert!(!candidate.admitted);
    assert!(candidate.reason_codes.contains(&reason::KILL_SWITCH_ENABLED.to_string()));
    assert!(candidate.explain.risk_flags.contains(&"kill_switch".to_string()));

    // Checks run before any reserve, so the budget never charged.
    let key = BudgetGuardConstraint::key(&policy);
    let budget = pipeline
        .store()
        .budget_snapshot(&key)
        .expect("snapshot must not error")
        .expect("check initialized the entry");
    assert_eq!(budget.used, 0.0);
    assert_eq!(ledger.grant_count().expect("ledger readable"), 0);
}

#[test]
fn nearly_exhausted_budget_blocks_the_next_hit() {
    let (pipeline, ledger) = build_pipeline();
    let policy = policy();
    let key = BudgetGuardConstraint::key(&policy);

    // Seed the budget at 54.0 of the 60.0 cap.
    pipeline
        .store()
        .with_budget(&key, BudgetState::fresh(60.0, Timestamp::from_millis(1_000)), &mut |state| {
            state.used = 54.0;
        })
        .expect("seeding must not error");

    let report =
        pipeline.evaluate(&policy, &ctx("RAIN", false, true)).expect("evaluate must not error");

    assert_eq!(report.outcome, PipelineOutcome::Blocked);
    assert!(
        report.candidates[0].reason_codes.contains(&reason::BUDGET_CAP_EXCEEDED.to_string())
    );
    let budget = pipeline
        .store()
        .budget_snapshot(&key)
        .expect("snapshot must not error")
        .expect("budget entry exists");
    assert_eq!(budget.used, 54.0);
    assert_eq!(ledger.grant_count().expect("ledger readable"), 0);
}

#[test]
fn anonymous_events_fail_frequency_scope_and_segment_first() {
    let (pipeline, _ledger) = build_pipeline();

    // The tag segment already drops anonymous events silently.
    let report =
        pipeline.evaluate(&policy(), &ctx("RAIN", false, false)).expect("evaluate must not error");
    assert_eq!(report.outcome, PipelineOutcome::NoMatch);

    // With an all-users segment the frequency constraint reports the scope.
    let mut policy = policy();
    policy.segment.plugin = "all_users".to_string();
    let report =
        pipeline.evaluate(&policy, &ctx("RAIN", false, false)).expect("evaluate must not error");
    assert_eq!(report.outcome, PipelineOutcome::Blocked);
    assert!(
        report.candidates[0]
            .reason_codes
            .contains(&reason::FREQUENCY_SCOPE_INVALID.to_string())
    );
}

#[test]
fn second_event_within_the_window_hits_the_frequency_cap() {
    let (pipeline, ledger) = build_pipeline();
    let policy = policy();

    let first =
        pipeline.evaluate(&policy, &ctx("RAIN", false, true)).expect("evaluate must not error");
    assert_eq!(first.outcome, PipelineOutcome::Executed);

    let second =
        pipeline.evaluate(&policy, &ctx("RAIN", false, true)).expect("evaluate must not error");
    assert_eq!(second.outcome, PipelineOutcome::Blocked);
    assert!(
        second.candidates[0].reason_codes.contains(&reason::FREQUENCY_CAP_REACHED.to_string())
    );
    assert_eq!(ledger.grant_count().expect("ledger readable"), 1);
}
