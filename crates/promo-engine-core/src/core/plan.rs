// promo-engine-core/src/core/plan.rs
// ============================================================================
// Module: Promo Engine Execution Types
// Description: Execution plans, action responses, scoring, and explain reports.
// Purpose: Carry the adapter's deterministic compilation and audit outputs.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! An [`ExecutionPlan`] is derived deterministically from a policy: compiling
//! the same policy twice with the same trace id yields identical commands.
//! Execution is best-effort: every command produces a response, failures do
//! not abort the remaining commands, and the aggregate `success` is the
//! logical AND over all responses.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::PolicyId;
use crate::core::identifiers::TraceId;

// ============================================================================
// SECTION: Execution Plan
// ============================================================================

/// One compiled action command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    /// Command identifier, `<policyId>:action:<N>` with a 1-based index.
    pub id: String,
    /// Action plugin name.
    pub plugin: String,
    /// Delivery channel; `"default"` when the action named none.
    pub channel: String,
    /// Plugin-specific parameters.
    pub params: Value,
}

/// Deterministic compilation of a policy's actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Engine runtime tag recorded for audit trails.
    pub runtime: String,
    /// Trace identifier threaded from the caller.
    pub trace_id: TraceId,
    /// Compiled commands in policy action order.
    pub commands: Vec<ActionCommand>,
}

// ============================================================================
// SECTION: Execution Results
// ============================================================================

/// Per-command execution response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    /// Identifier of the command this response belongs to.
    pub command_id: String,
    /// Whether the command succeeded.
    pub success: bool,
    /// Machine-readable reasons for a failing command.
    pub reason_codes: Vec<String>,
    /// Plugin-specific response fields.
    pub details: Value,
}

impl ActionResponse {
    /// Returns a successful response with plugin-specific details.
    #[must_use]
    pub fn succeeded(command_id: impl Into<String>, details: Value) -> Self {
        Self {
            command_id: command_id.into(),
            success: true,
            reason_codes: Vec::new(),
            details,
        }
    }

    /// Returns a failed response with one reason code.
    #[must_use]
    pub fn failed(command_id: impl Into<String>, reason_code: impl Into<String>) -> Self {
        Self {
            command_id: command_id.into(),
            success: false,
            reason_codes: vec![reason_code.into()],
            details: Value::Null,
        }
    }
}

/// Aggregate result over every command in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff no response reported failure.
    pub success: bool,
    /// Per-command responses in plan order.
    pub responses: Vec<ActionResponse>,
}

impl ExecutionResult {
    /// Aggregates responses; `success` is the AND over every response.
    #[must_use]
    pub fn from_responses(responses: Vec<ActionResponse>) -> Self {
        let success = responses.iter().all(|response| response.success);
        Self {
            success,
            responses,
        }
    }
}

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Expected-utility annotation for an admitted candidate.
///
/// Scoring never gates admission; it only annotates the result for
/// downstream explainability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Expected utility `p*v - c - risk_penalty - fatigue_penalty`.
    pub utility: f64,
    /// Estimate uncertainty clamped to `[0, 1]`.
    pub uncertainty: f64,
    /// Utility range `utility ± max(0.05, |utility| * 0.25)`.
    pub expected_range: (f64, f64),
    /// Scorer annotations for audit trails.
    pub reason_codes: Vec<String>,
}

// ============================================================================
// SECTION: Explain Report
// ============================================================================

/// Human- and audit-facing summary for one candidate decision.
///
/// Constraint reason codes precede scorer reason codes so audit logs read
/// gating explanations first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainReport {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Constraint reason codes followed by scorer reason codes.
    pub reason_codes: Vec<String>,
    /// Risk flags aggregated from constraint checks.
    pub risk_flags: Vec<String>,
    /// Expected utility range, when the candidate was scored.
    pub expected_range: Option<(f64, f64)>,
}
