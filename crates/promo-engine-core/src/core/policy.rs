// promo-engine-core/src/core/policy.rs
// ============================================================================
// Module: Promo Engine Policy Model
// Description: Immutable policy definitions and per-evaluation trigger context.
// Purpose: Define the declarative inputs the evaluation pipeline consumes.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! A [`Policy`] is a read-only declarative rule: trigger condition, eligible
//! audience, ordered resource constraints, scoring method, and actions. A
//! [`TriggerContext`] is the ephemeral per-event companion, constructed once
//! per incoming event and discarded after evaluation. Plugin parameters are
//! carried as loosely typed JSON and parsed by the owning plugin, so new
//! plugins never require core schema changes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::identifiers::EventId;
use crate::core::identifiers::MerchantId;
use crate::core::identifiers::PolicyId;
use crate::core::identifiers::TraceId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Policy Definition
// ============================================================================

/// Immutable policy definition evaluated by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// Policy identifier.
    pub policy_id: PolicyId,
    /// Program-level limits for the policy.
    pub program: ProgramSpec,
    /// Trigger configuration.
    pub trigger: TriggerSpec,
    /// Audience segment configuration.
    pub segment: SegmentSpec,
    /// Ordered resource constraints; admission runs them in this order.
    pub constraints: Vec<ConstraintSpec>,
    /// Scoring configuration.
    pub scoring: ScoringSpec,
    /// Optional story payload attached by the story action.
    pub story: Option<StorySpec>,
    /// Ordered action configurations compiled into the execution plan.
    pub actions: Vec<ActionSpec>,
    /// Resource scope anchoring all resource keys.
    pub resource_scope: ResourceScope,
}

/// Program-level limits for a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// Maximum simultaneous candidate instances per event.
    pub max_instances: u32,
    /// Pacing limits applied by the budget constraint.
    pub pacing: PacingSpec,
}

/// Pacing limits for budget consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingSpec {
    /// Maximum cost admitted within one fixed-origin minute window.
    pub max_cost_per_minute: f64,
}

/// Trigger configuration for a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// Trigger plugin name.
    pub plugin: String,
    /// Expected event name, compared trimmed and case-insensitively.
    pub event: String,
    /// Number of simultaneous instances the trigger requests.
    pub requested_instances: u32,
    /// Equality conditions evaluated against the event payload.
    pub conditions: Vec<ConditionSpec>,
}

/// Equality condition over one event payload field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Event payload field name.
    pub field: String,
    /// Expected field value.
    pub equals: Value,
}

/// Audience segment configuration for a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// Segment plugin name.
    pub plugin: String,
    /// Tags the target user must carry (plugin-dependent).
    pub required_tags: Vec<String>,
}

/// One ordered resource constraint with plugin-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    /// Constraint plugin name.
    pub plugin: String,
    /// Plugin-specific parameters parsed by the owning plugin.
    pub params: Value,
}

/// Scoring configuration for a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSpec {
    /// Scorer plugin name.
    pub plugin: String,
}

/// Story payload attached by the story-injection action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySpec {
    /// Story identifier.
    pub story_id: String,
    /// Opaque story payload delivered to the client.
    pub payload: Value,
}

/// One configured action compiled into an execution-plan command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Action plugin name.
    pub plugin: String,
    /// Delivery channel; defaults to `"default"` when absent.
    pub channel: Option<String>,
    /// Plugin-specific parameters parsed by the owning plugin.
    pub params: Value,
}

/// Resource scope anchoring composite resource keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceScope {
    /// Merchant owning the policy's budget, inventory, and frequency state.
    pub merchant_id: MerchantId,
}

// ============================================================================
// SECTION: Trigger Context
// ============================================================================

/// Per-evaluation context constructed once per incoming event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerContext {
    /// Incoming business event.
    pub event: EventRecord,
    /// Merchant state snapshot at evaluation time.
    pub merchant: MerchantProfile,
    /// Target user, when the event carries one.
    pub user: Option<UserProfile>,
    /// Upstream risk score for the event, in `[0, 1]`.
    pub risk_score: f64,
    /// Model estimate consumed by the scorer.
    pub estimate: ModelEstimate,
    /// Event identifier, unique per delivery.
    pub event_id: EventId,
    /// Caller-generated trace identifier for cross-log correlation.
    pub trace_id: TraceId,
}

/// Incoming business event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event name matched against trigger configuration.
    pub name: String,
    /// Event payload fields evaluated by trigger conditions.
    pub payload: Value,
}

/// Merchant state snapshot relevant to admission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantProfile {
    /// Merchant identifier.
    pub merchant_id: MerchantId,
    /// When set, the kill-switch constraint blocks every candidate.
    pub kill_switch_enabled: bool,
}

/// Target user profile for segmentation and frequency capping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User identifier.
    pub user_id: UserId,
    /// Tags carried by the user.
    pub tags: Vec<String>,
}

/// Expected-utility inputs supplied by the external model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelEstimate {
    /// Estimated success probability `p`.
    pub success_probability: f64,
    /// Estimated value on success `v`.
    pub value: f64,
    /// Estimated cost of executing the policy `c`.
    pub cost: f64,
    /// Penalty applied for risk exposure.
    pub risk_penalty: f64,
    /// Penalty applied for audience fatigue.
    pub fatigue_penalty: f64,
    /// Estimate uncertainty, clamped to `[0, 1]` by the scorer.
    pub uncertainty: f64,
}

// ============================================================================
// SECTION: Candidate
// ============================================================================

/// One expanded, independently admitted instance of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Zero-based instance index within the expansion.
    pub instance: u32,
}
