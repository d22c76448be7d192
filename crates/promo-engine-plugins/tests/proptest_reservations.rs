// crates/promo-engine-plugins/tests/proptest_reservations.rs
// ============================================================================
// Module: Reservation Property-Based Tests
// Description: Property tests for reserve/release inversion and cap safety.
// Purpose: Detect counter drift and cap violations across wide input ranges.
// ============================================================================

//! Property-based tests for reservation invariants.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use promo_engine_core::Clock;
use promo_engine_core::ConstraintPlugin;
use promo_engine_core::ConstraintSpec;
use promo_engine_core::InMemoryResourceStore;
use promo_engine_core::Policy;
use promo_engine_core::Sku;
use promo_engine_core::TriggerContext;
use promo_engine_core::UserId;
use promo_engine_core::time::ManualClock;
use promo_engine_core::time::Timestamp;
use promo_engine_plugins::BudgetGuardConstraint;
use promo_engine_plugins::FrequencyCapConstraint;
use promo_engine_plugins::InventoryLockConstraint;
use proptest::prelude::*;
use serde_json::json;

/// Builds a policy fixture with an effectively unbounded pacing limit.
fn policy() -> Policy {
    serde_json::from_value(json!({
        "policy_id": "pol-prop",
        "program": { "max_instances": 1, "pacing": { "max_cost_per_minute": 1.0e12 } },
        "trigger": {
            "plugin": "event_match",
            "event": "ANY",
            "requested_instances": 1,
            "conditions": []
        },
        "segment": { "plugin": "all_users", "required_tags": [] },
        "constraints": [],
        "scoring": { "plugin": "expected_utility" },
        "story": null,
        "actions": [],
        "resource_scope": { "merchant_id": "m-prop" }
    }))
    .expect("policy fixture must deserialize")
}

/// Builds a trigger context with a target user.
fn ctx() -> TriggerContext {
    serde_json::from_value(json!({
        "event": { "name": "ANY", "payload": {} },
        "merchant": { "merchant_id": "m-prop", "kill_switch_enabled": false },
        "user": { "user_id": "u-prop", "tags": [] },
        "risk_score": 0.0,
        "estimate": {
            "success_probability": 0.5,
            "value": 1.0,
            "cost": 0.0,
            "risk_penalty": 0.0,
            "fatigue_penalty": 0.0,
            "uncertainty": 0.1
        },
        "event_id": "evt-prop",
        "trace_id": "trace-prop"
    }))
    .expect("context fixture must deserialize")
}

proptest! {
    /// Releasing every committed budget reservation returns `used` to zero.
    #[test]
    fn budget_release_inverts_reserve(costs in prop::collection::vec(0.01f64..50.0, 1..16)) {
        let plugin = BudgetGuardConstraint::new();
        let store = InMemoryResourceStore::new();
        let clock = ManualClock::new(Timestamp::from_millis(0));
        let policy = policy();
        let ctx = ctx();
        let key = BudgetGuardConstraint::key(&policy);

        let mut tokens = Vec::new();
        for cost in &costs {
            let spec = ConstraintSpec {
                plugin: "budget_guard".to_string(),
                params: json!({ "cap": 1.0e12, "cost_per_hit": cost }),
            };
            let outcome = plugin
                .reserve(&policy, &ctx, &spec, &ctx.estimate, &store, &clock)
                .expect("reserve must not error");
            prop_assert!(outcome.ok);
            tokens.push(outcome.reserved.expect("committed reserve carries a token"));
        }
        for token in tokens.iter().rev() {
            plugin.release(token, &store).expect("release must not error");
        }

        let state = store
            .budget_snapshot(&key)
            .expect("snapshot must not error")
            .expect("entry exists after reserve");
        prop_assert!(state.used.abs() < 1.0e-6);
        prop_assert!(state.minute_spent.abs() < 1.0e-6);
    }

    /// No sequence of reserve attempts pushes `reserved` past the hard cap.
    #[test]
    fn inventory_reserved_never_exceeds_hard_cap(
        hard_cap in 1u64..20,
        attempts in prop::collection::vec(1u64..5, 1..32),
    ) {
        let plugin = InventoryLockConstraint::new();
        let store = InMemoryResourceStore::new();
        let clock = ManualClock::new(Timestamp::from_millis(0));
        let policy = policy();
        let ctx = ctx();
        let key = InventoryLockConstraint::key(&policy, &Sku::new("sku-prop"));

        for units in &attempts {
            let spec = ConstraintSpec {
                plugin: "inventory_lock".to_string(),
                params: json!({ "sku": "sku-prop", "units": units, "hard_cap": hard_cap }),
            };
            plugin
                .reserve(&policy, &ctx, &spec, &ctx.estimate, &store, &clock)
                .expect("reserve must not error");
            let state = store
                .inventory_snapshot(&key)
                .expect("snapshot must not error")
                .expect("entry exists after reserve");
            prop_assert!(state.reserved <= hard_cap);
        }
    }

    /// Check-then-reserve admission never exceeds `daily` markers within the
    /// trailing window, regardless of event spacing.
    #[test]
    fn frequency_markers_in_window_never_exceed_daily(
        window_sec in 1u64..3_600,
        daily in 1u32..5,
        gaps in prop::collection::vec(0i64..600_000, 1..40),
    ) {
        let plugin = FrequencyCapConstraint::new();
        let store = InMemoryResourceStore::new();
        let clock = ManualClock::new(Timestamp::from_millis(0));
        let policy = policy();
        let ctx = ctx();
        let key = FrequencyCapConstraint::key(&policy, &UserId::new("u-prop"));
        let spec = ConstraintSpec {
            plugin: "frequency_cap".to_string(),
            params: json!({ "window_sec": window_sec, "daily": daily }),
        };
        let window_millis = i64::try_from(window_sec * 1_000).expect("window fits in i64");

        for gap in &gaps {
            clock.advance_millis(*gap);
            let result = plugin
                .check(&policy, &ctx, &spec, &ctx.estimate, &store, &clock)
                .expect("check must not error");
            if result.ok {
                let outcome = plugin
                    .reserve(&policy, &ctx, &spec, &ctx.estimate, &store, &clock)
                    .expect("reserve must not error");
                prop_assert!(outcome.ok);
            }

            let now = clock.now();
            let markers = store
                .frequency_snapshot(&key)
                .expect("snapshot must not error")
                .unwrap_or_default();
            let recent = markers
                .iter()
                .filter(|marker| now.millis_since(**marker) < window_millis)
                .count();
            prop_assert!(recent <= usize::try_from(daily).expect("daily fits in usize"));
        }
    }
}
