// promo-engine-plugins/src/scorer.rs
// ============================================================================
// Module: Expected Utility Scorer
// Description: Linear expected-utility scoring over model estimates.
// Purpose: Annotate admitted candidates with utility and an uncertainty band.
// Dependencies: promo-engine-core
// ============================================================================

//! ## Overview
//! Utility is the linear combination `p*v - c - risk_penalty -
//! fatigue_penalty` over the model estimate carried on the trigger context.
//! The expected range widens with the utility magnitude but never collapses
//! below a fixed floor, so downstream consumers always see a non-degenerate
//! band. Scoring annotates; it never gates admission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::ModelEstimate;
use promo_engine_core::Policy;
use promo_engine_core::ScoreError;
use promo_engine_core::ScoreResult;
use promo_engine_core::ScorerPlugin;
use promo_engine_core::TriggerContext;

// ============================================================================
// SECTION: Expected Utility Scorer
// ============================================================================

/// Minimum half-width of the expected-utility range.
const RANGE_FLOOR: f64 = 0.05;

/// Fraction of the utility magnitude used as the range half-width.
const RANGE_FRACTION: f64 = 0.25;

/// Linear expected-utility scorer.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpectedUtilityScorer;

impl ExpectedUtilityScorer {
    /// Creates the scorer plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ScorerPlugin for ExpectedUtilityScorer {
    fn score(
        &self,
        _policy: &Policy,
        _ctx: &TriggerContext,
        estimate: &ModelEstimate,
    ) -> Result<ScoreResult, ScoreError> {
        let utility = estimate.success_probability * estimate.value
            - estimate.cost
            - estimate.risk_penalty
            - estimate.fatigue_penalty;
        let uncertainty = estimate.uncertainty.clamp(0.0, 1.0);
        let half_width = RANGE_FLOOR.max(utility.abs() * RANGE_FRACTION);
        Ok(ScoreResult {
            utility,
            uncertainty,
            expected_range: (utility - half_width, utility + half_width),
            reason_codes: Vec::new(),
        })
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
