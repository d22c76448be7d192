// promo-engine-plugins/src/constraints/inventory.rs
// ============================================================================
// Module: Inventory Lock Constraint
// Description: Hard-capped per-SKU reservation counters.
// Purpose: Enforce `reserved <= hard_cap` for prize/inventory stock.
// Dependencies: promo-engine-core, serde
// ============================================================================

//! ## Overview
//! The inventory lock owns the inventory namespace, keyed
//! `merchant|policy|sku`. A constraint configured without a SKU always passes
//! and reserves nothing. `reserve` re-validates the hard cap inside the
//! per-key critical section; `release` subtracts with saturation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::ConstraintError;
use promo_engine_core::ConstraintPlugin;
use promo_engine_core::ConstraintResult;
use promo_engine_core::ConstraintSpec;
use promo_engine_core::InventoryState;
use promo_engine_core::ModelEstimate;
use promo_engine_core::Policy;
use promo_engine_core::ReservationToken;
use promo_engine_core::ReserveOutcome;
use promo_engine_core::ResourceKey;
use promo_engine_core::ResourceStore;
use promo_engine_core::Sku;
use promo_engine_core::TriggerContext;
use promo_engine_core::reason;
use promo_engine_core::time::Clock;
use serde::Deserialize;

use crate::constraints::parse_params;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Inventory lock parameters.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InventoryParams {
    /// SKU to reserve; absent means the constraint is a pass-through.
    pub sku: Option<Sku>,
    /// Units reserved per admitted candidate.
    #[serde(default = "default_units")]
    pub units: u64,
    /// Hard reservation cap for the SKU.
    pub hard_cap: u64,
}

/// Default units reserved per candidate.
const fn default_units() -> u64 {
    1
}

// ============================================================================
// SECTION: Inventory Lock Constraint
// ============================================================================

/// Per-SKU inventory reservation constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct InventoryLockConstraint;

impl InventoryLockConstraint {
    /// Plugin name used for parameter diagnostics.
    const NAME: &'static str = "inventory_lock";

    /// Creates the constraint plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the inventory key for a policy and SKU.
    #[must_use]
    pub fn key(policy: &Policy, sku: &Sku) -> ResourceKey {
        ResourceKey::compose(&[
            policy.resource_scope.merchant_id.as_str(),
            policy.policy_id.as_str(),
            sku.as_str(),
        ])
    }
}

impl ConstraintPlugin for InventoryLockConstraint {
    fn check(
        &self,
        policy: &Policy,
        _ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        _clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError> {
        let params: InventoryParams = parse_params(Self::NAME, &spec.params)?;
        let Some(sku) = &params.sku else {
            return Ok(ConstraintResult::passed());
        };
        let key = Self::key(policy, sku);

        let mut result = ConstraintResult::passed();
        store.with_inventory(&key, InventoryState::fresh(params.hard_cap), &mut |state| {
            if params.units > state.hard_cap.saturating_sub(state.reserved) {
                result = ConstraintResult::violation(reason::INVENTORY_EXHAUSTED, "inventory");
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
        _clock: &dyn Clock,
    ) -> Result<ReserveOutcome, ConstraintError> {
        let params: InventoryParams = parse_params(Self::NAME, &spec.params)?;
        let Some(sku) = &params.sku else {
            return Ok(ReserveOutcome::stateless());
        };
        let key = Self::key(policy, sku);

        let mut outcome = ReserveOutcome::conflict(reason::RESERVATION_CONFLICT);
        store.with_inventory(&key, InventoryState::fresh(params.hard_cap), &mut |state| {
            if params.units > state.hard_cap.saturating_sub(state.reserved) {
                outcome = ReserveOutcome::conflict(reason::INVENTORY_EXHAUSTED);
                return;
            }
            state.reserved += params.units;
            outcome = ReserveOutcome::committed(ReservationToken::Inventory {
                key: key.clone(),
                units: params.units,
            });
        })?;
        Ok(outcome)
    }

    fn release(
        &self,
        token: &ReservationToken,
        store: &dyn ResourceStore,
    ) -> Result<(), ConstraintError> {
        let ReservationToken::Inventory {
            key,
            units,
        } = token
        else {
            return Ok(());
        };
        store.with_inventory(key, InventoryState::fresh(0), &mut |state| {
            state.reserved = state.reserved.saturating_sub(*units);
        })?;
        Ok(())
    }
}
