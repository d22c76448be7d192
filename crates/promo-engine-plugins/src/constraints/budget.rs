// promo-engine-plugins/src/constraints/budget.rs
// ============================================================================
// Module: Budget Guard Constraint
// Description: Budget cap and per-minute pacing over shared budget counters.
// Purpose: Enforce `used <= cap` and the fixed-origin pacing window.
// Dependencies: promo-engine-core, serde
// ============================================================================

//! ## Overview
//! The budget guard owns the budget namespace, keyed `merchant|policy`.
//! `check` reads the counters without mutating them; `reserve` re-validates
//! both caps inside the per-key critical section and commits the cost;
//! `release` subtracts the token's amount, floored at zero. The pacing window
//! is fixed-origin: it resets when the window start is at least one minute
//! stale, so a boundary burst may admit up to twice the pacing cap. That
//! behavior is contractual; do not replace it with a sliding window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::BudgetState;
use promo_engine_core::ConstraintError;
use promo_engine_core::ConstraintPlugin;
use promo_engine_core::ConstraintResult;
use promo_engine_core::ConstraintSpec;
use promo_engine_core::ModelEstimate;
use promo_engine_core::Policy;
use promo_engine_core::ReservationToken;
use promo_engine_core::ReserveOutcome;
use promo_engine_core::ResourceKey;
use promo_engine_core::ResourceStore;
use promo_engine_core::TriggerContext;
use promo_engine_core::reason;
use promo_engine_core::time::Clock;
use serde::Deserialize;

use crate::constraints::parse_params;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Budget guard parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct BudgetParams {
    /// Hard budget cap.
    pub cap: f64,
    /// Cost committed per admitted candidate.
    pub cost_per_hit: f64,
}

// ============================================================================
// SECTION: Budget Guard Constraint
// ============================================================================

/// Budget cap and pacing constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct BudgetGuardConstraint;

impl BudgetGuardConstraint {
    /// Plugin name used for parameter diagnostics.
    const NAME: &'static str = "budget_guard";

    /// Creates the constraint plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the budget key for a policy.
    #[must_use]
    pub fn key(policy: &Policy) -> ResourceKey {
        ResourceKey::compose(&[
            policy.resource_scope.merchant_id.as_str(),
            policy.policy_id.as_str(),
        ])
    }
}

impl ConstraintPlugin for BudgetGuardConstraint {
    fn check(
        &self,
        policy: &Policy,
        _ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError> {
        let params: BudgetParams = parse_params(Self::NAME, &spec.params)?;
        let key = Self::key(policy);
        let now = clock.now();
        let max_per_minute = policy.program.pacing.max_cost_per_minute;

        let mut result = ConstraintResult::passed();
        store.with_budget(&key, BudgetState::fresh(params.cap, now), &mut |state| {
            let minute_spent = if state.window_stale(now) { 0.0 } else { state.minute_spent };
            if state.used + params.cost_per_hit > state.cap {
                result = ConstraintResult::violation(reason::BUDGET_CAP_EXCEEDED, "budget");
            } else if minute_spent + params.cost_per_hit > max_per_minute {
                result = ConstraintResult::violation(reason::BUDGET_PACING_EXCEEDED, "budget");
            }
        })?;
        Ok(result)
    }

    fn reserve(
        &self,
        policy: &Policy,
        _ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ReserveOutcome, ConstraintError> {
        let params: BudgetParams = parse_params(Self::NAME, &spec.params)?;
        let key = Self::key(policy);
        let now = clock.now();
        let max_per_minute = policy.program.pacing.max_cost_per_minute;

        let mut outcome = ReserveOutcome::conflict(reason::RESERVATION_CONFLICT);
        store.with_budget(&key, BudgetState::fresh(params.cap, now), &mut |state| {
            if state.window_stale(now) {
                state.minute_window_start = now;
                state.minute_spent = 0.0;
            }
            if state.used + params.cost_per_hit > state.cap {
                outcome = ReserveOutcome::conflict(reason::BUDGET_CAP_EXCEEDED);
                return;
            }
            if state.minute_spent + params.cost_per_hit > max_per_minute {
                outcome = ReserveOutcome::conflict(reason::BUDGET_PACING_EXCEEDED);
                return;
            }
            state.used += params.cost_per_hit;
            state.minute_spent += params.cost_per_hit;
            outcome = ReserveOutcome::committed(ReservationToken::Budget {
                key: key.clone(),
                amount: params.cost_per_hit,
            });
        })?;
        Ok(outcome)
    }

    fn release(
        &self,
        token: &ReservationToken,
        store: &dyn ResourceStore,
    ) -> Result<(), ConstraintError> {
        let ReservationToken::Budget {
            key,
            amount,
        } = token
        else {
            return Ok(());
        };
        let init = BudgetState::fresh(0.0, promo_engine_core::Timestamp::from_millis(0));
        store.with_budget(key, init, &mut |state| {
            state.used = (state.used - amount).max(0.0);
            state.minute_spent = (state.minute_spent - amount).max(0.0);
        })?;
        Ok(())
    }
}
