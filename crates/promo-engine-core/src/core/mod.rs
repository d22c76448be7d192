// promo-engine-core/src/core/mod.rs
// ============================================================================
// Module: Promo Engine Core Types
// Description: Canonical data model for policies, admission, and execution.
// Purpose: Group core type modules and re-export their public surface.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain serializable data. Behavior lives in the plugin
//! interfaces and the runtime; these modules carry no side effects.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod admission;
pub mod identifiers;
pub mod plan;
pub mod policy;
pub mod resources;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use admission::ConstraintResult;
pub use admission::ReservationToken;
pub use admission::ReserveOutcome;
pub use admission::reason;
pub use identifiers::EventId;
pub use identifiers::MerchantId;
pub use identifiers::PolicyId;
pub use identifiers::Sku;
pub use identifiers::TraceId;
pub use identifiers::UserId;
pub use plan::ActionCommand;
pub use plan::ActionResponse;
pub use plan::ExecutionPlan;
pub use plan::ExecutionResult;
pub use plan::ExplainReport;
pub use plan::ScoreResult;
pub use policy::ActionSpec;
pub use policy::Candidate;
pub use policy::ConditionSpec;
pub use policy::ConstraintSpec;
pub use policy::EventRecord;
pub use policy::MerchantProfile;
pub use policy::ModelEstimate;
pub use policy::PacingSpec;
pub use policy::Policy;
pub use policy::ProgramSpec;
pub use policy::ResourceScope;
pub use policy::ScoringSpec;
pub use policy::SegmentSpec;
pub use policy::StorySpec;
pub use policy::TriggerContext;
pub use policy::TriggerSpec;
pub use policy::UserProfile;
pub use resources::BudgetState;
pub use resources::FrequencyState;
pub use resources::InventoryState;
pub use resources::ResourceKey;
pub use time::Clock;
pub use time::ManualClock;
pub use time::SystemClock;
pub use time::Timestamp;
