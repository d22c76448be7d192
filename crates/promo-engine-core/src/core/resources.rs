// promo-engine-core/src/core/resources.rs
// ============================================================================
// Module: Promo Engine Resource State
// Description: Keyed mutable counters for budget, inventory, and frequency.
// Purpose: Define the shared resource state mutated by constraint plugins.
// Dependencies: crate::core::time, serde
// ============================================================================

//! ## Overview
//! Resource state is the only mutable shared state in the engine. Each
//! constraint plugin owns one namespace (budget, inventory, frequency) and no
//! other plugin may mutate another's namespace. Entries are created lazily
//! with defaults derived from constraint parameters and are never deleted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Resource Keys
// ============================================================================

/// Composite string key scoping one resource entry.
///
/// Keys are composed as `merchantId|policyId[|sku|userId]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Composes a key by joining the given parts with `|`.
    #[must_use]
    pub fn compose(parts: &[&str]) -> Self {
        Self(parts.join("|"))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Resource Entries
// ============================================================================

/// Budget usage state for one `merchant|policy` key.
///
/// Invariant at rest: `used <= cap`. The minute window is fixed-origin: it
/// resets when `now - minute_window_start >= 60_000` ms, so a burst at the
/// window boundary may admit up to twice the pacing cap within a short span.
/// That boundary behavior is deliberate and must not be changed to a sliding
/// window without the policy owner's sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    /// Total cost committed against the cap.
    pub used: f64,
    /// Hard budget cap.
    pub cap: f64,
    /// Fixed origin of the current pacing window.
    pub minute_window_start: Timestamp,
    /// Cost committed within the current pacing window.
    pub minute_spent: f64,
}

impl BudgetState {
    /// Window length for budget pacing, in milliseconds.
    pub const WINDOW_MILLIS: i64 = 60_000;

    /// Returns an empty budget entry with the given cap, opening the pacing
    /// window at `now`.
    #[must_use]
    pub const fn fresh(cap: f64, now: Timestamp) -> Self {
        Self {
            used: 0.0,
            cap,
            minute_window_start: now,
            minute_spent: 0.0,
        }
    }

    /// Returns true when the pacing window has gone stale at `now`.
    #[must_use]
    pub const fn window_stale(&self, now: Timestamp) -> bool {
        now.millis_since(self.minute_window_start) >= Self::WINDOW_MILLIS
    }
}

/// Inventory reservation state for one `merchant|policy|sku` key.
///
/// Invariant: `reserved <= hard_cap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryState {
    /// Units currently reserved.
    pub reserved: u64,
    /// Hard reservation cap for the SKU.
    pub hard_cap: u64,
}

impl InventoryState {
    /// Returns an empty inventory entry with the given hard cap.
    #[must_use]
    pub const fn fresh(hard_cap: u64) -> Self {
        Self {
            reserved: 0,
            hard_cap,
        }
    }
}

/// Frequency marker list for one `merchant|policy|user` key.
///
/// Markers are pruned to the configured window on each check; the cap is
/// enforced at check time only, before the marker is appended.
pub type FrequencyState = Vec<Timestamp>;
