// promo-engine-plugins/src/constraints/frequency.rs
// ============================================================================
// Module: Frequency Cap Constraint
// Description: Per-user delivery markers over a rolling time window.
// Purpose: Cap how often one user receives grants from one policy.
// Dependencies: promo-engine-core, serde
// ============================================================================

//! ## Overview
//! The frequency cap owns the frequency namespace, keyed
//! `merchant|policy|user`, holding a list of delivery timestamps. `check`
//! counts in-window markers without mutating the list; `reserve` prunes stale
//! markers and appends one at the current time; `release` removes the first
//! marker equal to the token's timestamp. Anonymous events fail scope
//! validation instead of silently passing. Unlike budget and inventory, the
//! cap is enforced at check time only; reserve never refuses.

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
use promo_engine_core::ResourceKey;
use promo_engine_core::ResourceStore;
use promo_engine_core::TriggerContext;
use promo_engine_core::UserId;
use promo_engine_core::reason;
use promo_engine_core::time::Clock;
use promo_engine_core::time::Timestamp;
use serde::Deserialize;

use crate::constraints::parse_params;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Frequency cap parameters.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct FrequencyParams {
    /// Rolling window length in seconds.
    pub window_sec: u64,
    /// Maximum deliveries per user within the window.
    pub daily: u32,
}

// ============================================================================
// SECTION: Frequency Cap Constraint
// ============================================================================

/// Per-user rolling-window frequency constraint.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrequencyCapConstraint;

impl FrequencyCapConstraint {
    /// Plugin name used for parameter diagnostics.
    const NAME: &'static str = "frequency_cap";

    /// Creates the constraint plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the frequency key for a policy and user.
    #[must_use]
    pub fn key(policy: &Policy, user_id: &UserId) -> ResourceKey {
        ResourceKey::compose(&[
            policy.resource_scope.merchant_id.as_str(),
            policy.policy_id.as_str(),
            user_id.as_str(),
        ])
    }

    /// Whether a marker still falls inside the rolling window.
    fn in_window(marker: Timestamp, now: Timestamp, window_sec: u64) -> bool {
        let window_millis = i64::try_from(window_sec.saturating_mul(1_000)).unwrap_or(i64::MAX);
        now.millis_since(marker) < window_millis
    }
}

impl ConstraintPlugin for FrequencyCapConstraint {
    fn check(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError> {
        let params: FrequencyParams = parse_params(Self::NAME, &spec.params)?;
        let Some(user) = &ctx.user else {
            return Ok(ConstraintResult::violation(reason::FREQUENCY_SCOPE_INVALID, "frequency"));
        };
        let key = Self::key(policy, &user.user_id);
        let now = clock.now();

        let mut result = ConstraintResult::passed();
        store.with_frequency(&key, &mut |markers| {
            let recent = markers
                .iter()
                .filter(|marker| Self::in_window(**marker, now, params.window_sec))
                .count();
            if recent >= usize::try_from(params.daily).unwrap_or(usize::MAX) {
                result = ConstraintResult::violation(reason::FREQUENCY_CAP_REACHED, "frequency");
            }
        })?;
        Ok(result)
    }

    fn reserve(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ReserveOutcome, ConstraintError> {
        let params: FrequencyParams = parse_params(Self::NAME, &spec.params)?;
        let Some(user) = &ctx.user else {
            return Ok(ReserveOutcome::conflict(reason::FREQUENCY_SCOPE_INVALID));
        };
        let key = Self::key(policy, &user.user_id);
        let now = clock.now();

        store.with_frequency(&key, &mut |markers| {
            markers.retain(|marker| Self::in_window(*marker, now, params.window_sec));
            markers.push(now);
        })?;
        Ok(ReserveOutcome::committed(ReservationToken::Frequency {
            key,
            marker: now,
        }))
    }

    fn release(
        &self,
        token: &ReservationToken,
        store: &dyn ResourceStore,
    ) -> Result<(), ConstraintError> {
        let ReservationToken::Frequency {
            key,
            marker,
        } = token
        else {
            return Ok(());
        };
        store.with_frequency(key, &mut |markers| {
            if let Some(position) = markers.iter().position(|entry| entry == marker) {
                markers.remove(position);
            }
        })?;
        Ok(())
    }
}
