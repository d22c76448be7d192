// crates/promo-engine-core/tests/adapter.rs
// ============================================================================
// Module: Adapter Tests
// Description: Validate deterministic compilation and best-effort execution.
// Purpose: Ensure plans are reproducible and failures never abort execution.
// Dependencies: promo-engine-core
// ============================================================================

//! Behavior tests for the execution adapter.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::sync::Arc;

use promo_engine_core::ActionCommand;
use promo_engine_core::ActionError;
use promo_engine_core::ActionPlugin;
use promo_engine_core::ActionResponse;
use promo_engine_core::ConstraintResult;
use promo_engine_core::ExecutionAdapter;
use promo_engine_core::PluginRegistry;
use promo_engine_core::Policy;
use promo_engine_core::ScoreResult;
use promo_engine_core::TraceId;
use promo_engine_core::TriggerContext;
use serde_json::Value;
use serde_json::json;

/// Action that always succeeds.
struct OkAction;

impl ActionPlugin for OkAction {
    fn execute(
        &self,
        _ctx: &TriggerContext,
        _policy: &Policy,
        command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError> {
        Ok(ActionResponse::succeeded(&command.id, json!({ "done": true })))
    }
}

/// Action that always fails validation.
struct FailingAction;

impl ActionPlugin for FailingAction {
    fn execute(
        &self,
        _ctx: &TriggerContext,
        _policy: &Policy,
        _command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError> {
        Err(ActionError::Validation("refused".to_string()))
    }
}

/// Builds a policy with three actions: ok, missing, failing.
fn policy() -> Policy {
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
        "story": null,
        "actions": [
            { "plugin": "ok_action", "channel": "push", "params": { "n": 1 } },
            { "plugin": "missing_action", "channel": null, "params": null },
            { "plugin": "failing_action", "channel": null, "params": null }
        ],
        "resource_scope": { "merchant_id": "m-1" }
    }))
    .expect("policy fixture must deserialize")
}

/// Builds a trigger context fixture.
fn ctx() -> TriggerContext {
    serde_json::from_value(json!({
        "event": { "name": "WEATHER_CHANGE", "payload": {} },
        "merchant": { "merchant_id": "m-1", "kill_switch_enabled": false },
        "user": { "user_id": "u-1", "tags": [] },
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

#[test]
fn compiling_twice_yields_identical_plans() {
    let policy = policy();
    let trace_id = TraceId::new("trace-1");

    let first = ExecutionAdapter::compile(&policy, &trace_id);
    let second = ExecutionAdapter::compile(&policy, &trace_id);
    assert_eq!(first, second);

    assert_eq!(first.commands.len(), 3);
    assert_eq!(first.commands[0].id, "pol-1:action:1");
    assert_eq!(first.commands[1].id, "pol-1:action:2");
    assert_eq!(first.commands[2].id, "pol-1:action:3");
    assert_eq!(first.commands[0].channel, "push");
    assert_eq!(first.commands[1].channel, "default");
    assert_eq!(first.commands[0].params, json!({ "n": 1 }));
    assert_eq!(first.commands[1].params, Value::Null);
}

#[test]
fn execution_is_best_effort_and_reports_every_command() {
    let mut registry = PluginRegistry::new();
    registry.register_action("ok_action", OkAction);
    registry.register_action("failing_action", FailingAction);
    let adapter = ExecutionAdapter::new(Arc::new(registry));
    let policy = policy();
    let ctx = ctx();
    let plan = ExecutionAdapter::compile(&policy, &ctx.trace_id);

    let result = adapter.execute(&ctx, &policy, &plan);

    // Every command responds even though the second and third fail.
    assert!(!result.success);
    assert_eq!(result.responses.len(), 3);
    assert!(result.responses[0].success);
    assert!(!result.responses[1].success);
    assert_eq!(
        result.responses[1].reason_codes,
        vec!["action plugin missing: missing_action".to_string()]
    );
    assert!(!result.responses[2].success);
    assert!(result.responses[2].reason_codes[0].contains("refused"));
}

#[test]
fn explain_orders_constraint_reasons_before_scorer_reasons() {
    let policy = policy();
    let constraint = ConstraintResult {
        ok: false,
        reason_codes: vec!["BUDGET_CAP_EXCEEDED".to_string()],
        risk_flags: vec!["budget".to_string()],
    };
    let score = ScoreResult {
        utility: 30.0,
        uncertainty: 0.1,
        expected_range: (22.5, 37.5),
        reason_codes: vec!["LOW_CONFIDENCE".to_string()],
    };

    let report = ExecutionAdapter::explain(&policy, Some(&score), &constraint);
    assert_eq!(
        report.reason_codes,
        vec!["BUDGET_CAP_EXCEEDED".to_string(), "LOW_CONFIDENCE".to_string()]
    );
    assert_eq!(report.risk_flags, vec!["budget".to_string()]);
    assert_eq!(report.expected_range, Some((22.5, 37.5)));
    assert_eq!(report.policy_id.as_str(), "pol-1");
}
