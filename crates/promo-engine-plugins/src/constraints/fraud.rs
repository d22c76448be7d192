// promo-engine-plugins/src/constraints/fraud.rs
// ============================================================================
// Module: Anti-Fraud Constraint
// Description: Stateless risk-score threshold gate.
// Purpose: Block candidates whose upstream risk score exceeds a policy bound.
// Dependencies: promo-engine-core, serde
// ============================================================================

//! ## Overview
//! The anti-fraud gate compares the risk score carried on the trigger context
//! against a configured threshold. It consumes no resources, so `reserve` and
//! `release` are no-ops.

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
use serde::Deserialize;

use crate::constraints::parse_params;

// ============================================================================
// SECTION: Parameters
// ============================================================================

/// Anti-fraud parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct FraudParams {
    /// Inclusive risk-score ceiling; scores strictly above it are blocked.
    #[serde(default = "default_max_risk_score")]
    pub max_risk_score: f64,
}

impl Default for FraudParams {
    fn default() -> Self {
        Self {
            max_risk_score: default_max_risk_score(),
        }
    }
}

/// Default risk-score ceiling.
const fn default_max_risk_score() -> f64 {
    0.8
}

// ============================================================================
// SECTION: Anti-Fraud Constraint
// ============================================================================

/// Stateless risk-score gate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AntiFraudConstraint;

impl AntiFraudConstraint {
    /// Plugin name used for parameter diagnostics.
    const NAME: &'static str = "anti_fraud";

    /// Creates the constraint plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ConstraintPlugin for AntiFraudConstraint {
    fn check(
        &self,
        _policy: &Policy,
        ctx: &TriggerContext,
        spec: &ConstraintSpec,
        _estimate: &ModelEstimate,
        _store: &dyn ResourceStore,
        _clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError> {
        let params: FraudParams = parse_params(Self::NAME, &spec.params)?;
        if ctx.risk_score > params.max_risk_score {
            return Ok(ConstraintResult::violation(reason::RISK_SCORE_EXCEEDED, "fraud"));
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
