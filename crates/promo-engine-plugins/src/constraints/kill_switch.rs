// promo-engine-plugins/src/constraints/kill_switch.rs
// ============================================================================
// Module: Kill Switch Constraint
// Description: Stateless gate blocking every candidate for a paused merchant.
// Purpose: Give merchants an immediate, unconditional stop for all policies.
// Dependencies: promo-engine-core
// ============================================================================

//! ## Overview
//! The kill switch is a stateless gate: `check` fails iff the merchant's kill
//! switch is enabled, and `reserve`/`release` are no-ops because nothing is
//! consumed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::ConstraintError;
use promo_engine_core::ConstraintPlugin;
use promo_engine_core::ConstraintResult;
use promo_engine_core::ConstraintSpec;
use promo_engine_core::ModelEstimate;
use promo_engine_core::Policy;
use promo_engine_core::ReservationToken;
use promo_engine_core::ReserveOutcome;
use promo_engine_core::ResourceStore;
use promo_engine_core::TriggerContext;
use promo_engine_core::reason;
use promo_engine_core::time::Clock;

// ============================================================================
// SECTION: Kill Switch Constraint
// ============================================================================

/// Stateless merchant kill-switch gate.
#[derive(Debug, Default, Clone, Copy)]
pub struct KillSwitchConstraint;

impl KillSwitchConstraint {
    /// Creates the constraint plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConstraintPlugin for KillSwitchConstraint {
    fn check(
        &self,
        _policy: &Policy,
        ctx: &TriggerContext,
        _spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        _store: &dyn ResourceStore,
        _clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError> {
        if ctx.merchant.kill_switch_enabled {
            return Ok(ConstraintResult::violation(reason::KILL_SWITCH_ENABLED, "kill_switch"));
        }
        Ok(ConstraintResult::passed())
    }

    fn reserve(
        &self,
        _policy: &Policy,
        _ctx: &TriggerContext,
        _spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        _store: &dyn ResourceStore,
        _clock: &dyn Clock,
    ) -> Result<ReserveOutcome, ConstraintError> {
        Ok(ReserveOutcome::stateless())
    }

    fn release(
        &self,
        _token: &ReservationToken,
        _store: &dyn ResourceStore,
    ) -> Result<(), ConstraintError> {
        Ok(())
    }
}
