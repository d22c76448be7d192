// promo-engine-core/src/runtime/mod.rs
// ============================================================================
// Module: Promo Engine Runtime
// Description: Registry, resource store, pipeline, and execution adapter.
// Purpose: Group runtime modules and re-export their public surface.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The runtime orchestrates policy evaluation end to end: plugin lookup,
//! candidate admission against shared resource state, scoring, and
//! best-effort action execution.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod adapter;
pub mod pipeline;
pub mod registry;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use adapter::ExecutionAdapter;
pub use pipeline::CandidateReport;
pub use pipeline::EvaluationReport;
pub use pipeline::PipelineError;
pub use pipeline::PipelineOutcome;
pub use pipeline::PolicyPipeline;
pub use registry::PluginRegistry;
pub use store::InMemoryLedger;
pub use store::InMemoryResourceStore;
