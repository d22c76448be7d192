// promo-engine-gateway/src/lib.rs
// ============================================================================
// Module: Promo Engine Gateway
// Description: Resilience layer around the external model gateway.
// Purpose: Wrap model calls with retry, circuit breaking, and queueing.
// Dependencies: promo-engine-core, async-trait, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! The gateway wraps every model call in three independent resilience layers:
//! a bounded-concurrency [`CallQueue`], a [`RetryPolicy`] with exponential
//! backoff for transient upstream failures, and a [`CircuitBreaker`] that
//! fails fast once consecutive failures cross a threshold. The breaker is a
//! pure state machine over injected timestamps, so cooldown behavior is fully
//! deterministic under test. Model responses are free-form text parsed with a
//! loose-JSON fallback because upstream models wrap JSON in prose.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod breaker;
pub mod client;
pub mod error;
pub mod queue;
pub mod retry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use breaker::BreakerConfig;
pub use breaker::BreakerSnapshot;
pub use breaker::CircuitBreaker;
pub use client::GatewayConfig;
pub use client::ModelCallConfig;
pub use client::ModelGateway;
pub use client::ModelMessage;
pub use client::ModelRole;
pub use client::ModelTransport;
pub use client::parse_loose_json;
pub use error::GatewayError;
pub use queue::CallQueue;
pub use retry::RetryPolicy;
pub use retry::run_with_retry;
