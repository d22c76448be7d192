// promo-engine-gateway/src/error.rs
// ============================================================================
// Module: Gateway Errors
// Description: Gateway error enum and retriable-failure classification.
// Purpose: Separate fail-fast, transient, and permanent model call failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`GatewayError::CircuitOpen`] is the fail-fast signal callers use to
//! degrade without waiting out an upstream outage. Upstream failures are
//! classified as retriable by message text because transports surface
//! heterogeneous errors as strings: transport-level markers (timeout, abort,
//! connection, network, DNS) and embedded HTTP statuses 429 and 5xx retry;
//! everything else fails the call immediately.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Gateway Error
// ============================================================================

/// Failures surfaced by the model gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Circuit breaker is open; callers should degrade instead of waiting.
    #[error("circuit open for {remaining_ms}ms")]
    CircuitOpen {
        /// Milliseconds until the cooldown window elapses.
        remaining_ms: i64,
    },
    /// Upstream model call failed.
    #[error("model upstream failure: {0}")]
    Upstream(String),
    /// Model returned text that could not be parsed as JSON.
    #[error("model response parse failure: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Only upstream failures retry; an open circuit and unparseable output
    /// are deterministic and retrying them wastes the upstream budget.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::CircuitOpen {
                ..
            }
            | Self::Parse(_) => false,
            Self::Upstream(message) => message_is_retriable(message),
        }
    }
}

/// Classifies an upstream failure message as transient.
fn message_is_retriable(message: &str) -> bool {
    /// Transport-level markers that indicate a transient failure.
    const TRANSIENT_MARKERS: [&str; 6] =
        ["timeout", "timed out", "abort", "connection", "network", "dns"];
    let lowered = message.to_ascii_lowercase();
    if TRANSIENT_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        return true;
    }
    has_retriable_status(&lowered)
}

/// Whether the message embeds an HTTP status of 429 or 5xx.
fn has_retriable_status(message: &str) -> bool {
    message
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|token| token.len() == 3)
        .filter_map(|token| token.parse::<u16>().ok())
        .any(|status| status == 429 || (500..=599).contains(&status))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
