// promo-engine-gateway/src/retry.rs
// ============================================================================
// Module: Retry Policy
// Description: Bounded retries with exponential backoff.
// Purpose: Absorb transient upstream failures without hammering the model.
// Dependencies: crate::error, tokio
// ============================================================================

//! ## Overview
//! [`run_with_retry`] drives a fallible async task through at most
//! `max_attempts` attempts, sleeping `backoff_ms * 2^(attempt-1)` after the
//! `attempt`-th failure. The caller-supplied predicate decides which errors
//! retry; exhaustion and non-retriable errors return the last error unchanged
//! so classification survives the retry loop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;

use crate::error::GatewayError;

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Exponent cap keeping the backoff shift within `u64` range.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Retry configuration shared by every gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum total attempts, floored at one.
    pub max_attempts: u32,
    /// Base backoff in milliseconds before the first retry.
    pub backoff_ms: u64,
}

impl RetryPolicy {
    /// Creates a retry policy.
    #[must_use]
    pub const fn new(max_attempts: u32, backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            backoff_ms,
        }
    }

    /// Backoff applied after the 1-based `attempt`-th failure.
    #[must_use]
    pub const fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let exponent = if exponent > MAX_BACKOFF_EXPONENT { MAX_BACKOFF_EXPONENT } else { exponent };
        Duration::from_millis(self.backoff_ms.saturating_mul(1_u64 << exponent))
    }
}

// ============================================================================
// SECTION: Retry Loop
// ============================================================================

/// Runs `task` under the retry policy.
///
/// `task` receives the 1-based attempt number. Retries stop when the policy
/// is exhausted or `should_retry` rejects the error.
///
/// # Errors
///
/// Returns the last [`GatewayError`] unchanged.
pub async fn run_with_retry<T, P, F, Fut>(
    policy: &RetryPolicy,
    should_retry: P,
    mut task: F,
) -> Result<T, GatewayError>
where
    P: Fn(&GatewayError) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, GatewayError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match task(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts || !should_retry(&err) {
                    return Err(err);
                }
                tokio::time::sleep(policy.backoff_after(attempt)).await;
                attempt += 1;
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
