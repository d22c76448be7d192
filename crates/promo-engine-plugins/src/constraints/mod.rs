// promo-engine-plugins/src/constraints/mod.rs
// ============================================================================
// Module: Built-in Constraints
// Description: Resource constraints implementing check/reserve/release.
// Purpose: Group built-in constraint plugins and shared parameter parsing.
// Dependencies: promo-engine-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Each constraint owns one resource namespace: the budget guard owns budget
//! counters, the inventory lock owns reservation counters, the frequency cap
//! owns per-user marker lists. Kill switch and anti-fraud are stateless gates.
//! `check` is a pure read; `reserve` re-validates capacity inside the per-key
//! critical section so cap invariants hold under concurrent admission;
//! `release` is the exact inverse and floors at zero.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod budget;
pub mod fraud;
pub mod frequency;
pub mod inventory;
pub mod kill_switch;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use budget::BudgetGuardConstraint;
pub use fraud::AntiFraudConstraint;
pub use frequency::FrequencyCapConstraint;
pub use inventory::InventoryLockConstraint;
pub use kill_switch::KillSwitchConstraint;

// ============================================================================
// SECTION: Shared Parsing
// ============================================================================

use promo_engine_core::ConstraintError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parses plugin-specific parameters, falling back to defaults on `null`.
pub(crate) fn parse_params<T>(plugin: &str, params: &Value) -> Result<T, ConstraintError>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone()).map_err(|err| ConstraintError::InvalidParams {
        plugin: plugin.to_string(),
        message: err.to_string(),
    })
}
