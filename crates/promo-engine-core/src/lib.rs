// promo-engine-core/src/lib.rs
// ============================================================================
// Module: Promo Engine Core Library
// Description: Public API surface for the Promo Engine core.
// Purpose: Expose core types, plugin interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Promo Engine core provides deterministic policy evaluation: trigger
//! matching, candidate expansion, segment filtering, check-then-reserve
//! resource admission with rollback, utility scoring, and best-effort action
//! execution with auditable reason codes. It is backend-agnostic and
//! integrates through explicit interfaces rather than embedding into host
//! services.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::ActionError;
pub use interfaces::ActionPlugin;
pub use interfaces::ConstraintError;
pub use interfaces::ConstraintPlugin;
pub use interfaces::GrantReceipt;
pub use interfaces::GrantRequest;
pub use interfaces::LedgerError;
pub use interfaces::LedgerService;
pub use interfaces::ResourceStore;
pub use interfaces::ScoreError;
pub use interfaces::ScorerPlugin;
pub use interfaces::SegmentPlugin;
pub use interfaces::StoreError;
pub use interfaces::TriggerPlugin;
pub use runtime::CandidateReport;
pub use runtime::EvaluationReport;
pub use runtime::ExecutionAdapter;
pub use runtime::InMemoryLedger;
pub use runtime::InMemoryResourceStore;
pub use runtime::PipelineError;
pub use runtime::PipelineOutcome;
pub use runtime::PluginRegistry;
pub use runtime::PolicyPipeline;
