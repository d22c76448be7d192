// promo-engine-core/src/core/admission.rs
// ============================================================================
// Module: Promo Engine Admission Types
// Description: Constraint results, reservation tokens, and reason codes.
// Purpose: Carry the check/reserve/release protocol's structured outcomes.
// Dependencies: crate::core::{resources, time}, serde
// ============================================================================

//! ## Overview
//! Admission outcomes are structured data, never errors: a failing check
//! reports reason codes and risk flags, and a successful reserve hands back an
//! opaque [`ReservationToken`] which is the only handle needed to undo the
//! reservation. The pipeline passes tokens back verbatim to `release` and
//! never inspects them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::resources::ResourceKey;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Reason Codes
// ============================================================================

/// Machine-readable reason codes emitted by built-in plugins.
pub mod reason {
    /// Merchant kill switch is enabled.
    pub const KILL_SWITCH_ENABLED: &str = "KILL_SWITCH_ENABLED";
    /// Budget cap would be exceeded.
    pub const BUDGET_CAP_EXCEEDED: &str = "BUDGET_CAP_EXCEEDED";
    /// Per-minute pacing cap would be exceeded.
    pub const BUDGET_PACING_EXCEEDED: &str = "BUDGET_PACING_EXCEEDED";
    /// Inventory hard cap would be exceeded.
    pub const INVENTORY_EXHAUSTED: &str = "INVENTORY_EXHAUSTED";
    /// Frequency constraint requires a user id the context does not carry.
    pub const FREQUENCY_SCOPE_INVALID: &str = "FREQUENCY_SCOPE_INVALID";
    /// Frequency cap reached within the rolling window.
    pub const FREQUENCY_CAP_REACHED: &str = "FREQUENCY_CAP_REACHED";
    /// Context risk score exceeds the configured maximum.
    pub const RISK_SCORE_EXCEEDED: &str = "RISK_SCORE_EXCEEDED";
    /// Reservation lost a capacity race after a passing check.
    pub const RESERVATION_CONFLICT: &str = "RESERVATION_CONFLICT";
}

// ============================================================================
// SECTION: Constraint Results
// ============================================================================

/// Outcome of a constraint `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    /// Whether the constraint admits the candidate.
    pub ok: bool,
    /// Machine-readable reasons for a failing check.
    pub reason_codes: Vec<String>,
    /// Risk flags surfaced for audit trails.
    pub risk_flags: Vec<String>,
}

impl ConstraintResult {
    /// Returns a passing result with no annotations.
    #[must_use]
    pub const fn passed() -> Self {
        Self {
            ok: true,
            reason_codes: Vec::new(),
            risk_flags: Vec::new(),
        }
    }

    /// Returns a failing result with one reason code and one risk flag.
    #[must_use]
    pub fn violation(reason_code: &str, risk_flag: &str) -> Self {
        Self {
            ok: false,
            reason_codes: vec![reason_code.to_string()],
            risk_flags: vec![risk_flag.to_string()],
        }
    }
}

/// Outcome of a constraint `reserve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveOutcome {
    /// Whether the reservation was committed.
    pub ok: bool,
    /// Token undoing the reservation; `None` for stateless constraints.
    pub reserved: Option<ReservationToken>,
    /// Machine-readable reasons for a failing reserve.
    pub reason_codes: Vec<String>,
}

impl ReserveOutcome {
    /// Returns a committed outcome carrying the given token.
    #[must_use]
    pub const fn committed(token: ReservationToken) -> Self {
        Self {
            ok: true,
            reserved: Some(token),
            reason_codes: Vec::new(),
        }
    }

    /// Returns a committed outcome for a stateless constraint.
    #[must_use]
    pub const fn stateless() -> Self {
        Self {
            ok: true,
            reserved: None,
            reason_codes: Vec::new(),
        }
    }

    /// Returns a failed outcome with one reason code.
    #[must_use]
    pub fn conflict(reason_code: &str) -> Self {
        Self {
            ok: false,
            reserved: None,
            reason_codes: vec![reason_code.to_string()],
        }
    }
}

// ============================================================================
// SECTION: Reservation Token
// ============================================================================

/// Opaque handle undoing one committed reservation.
///
/// The pipeline treats tokens as opaque and passes them back verbatim to the
/// owning constraint's `release`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReservationToken {
    /// Budget reservation of `amount` against a budget key.
    Budget {
        /// Budget resource key.
        key: ResourceKey,
        /// Reserved cost amount.
        amount: f64,
    },
    /// Inventory reservation of `units` against an inventory key.
    Inventory {
        /// Inventory resource key.
        key: ResourceKey,
        /// Reserved unit count.
        units: u64,
    },
    /// Frequency marker appended to a per-user timestamp list.
    Frequency {
        /// Frequency resource key.
        key: ResourceKey,
        /// Exact marker value appended by `reserve`.
        marker: Timestamp,
    },
}
