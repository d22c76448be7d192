// promo-engine-gateway/src/breaker.rs
// ============================================================================
// Module: Circuit Breaker
// Description: Consecutive-failure circuit breaker with a cooldown window.
// Purpose: Fail fast during upstream outages instead of queueing retries.
// Dependencies: promo-engine-core, crate::error, serde
// ============================================================================

//! ## Overview
//! The breaker is a pure state machine: every transition takes the current
//! [`Timestamp`] as an argument and no method reads a wall clock. The circuit
//! opens when consecutive failures reach the threshold and stays open for the
//! cooldown window. After the window elapses the next call is allowed
//! through; its success closes the circuit, its failure re-opens it at the
//! failure time.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::time::Timestamp;
use serde::Deserialize;
use serde::Serialize;

use crate::error::GatewayError;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Circuit breaker configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Milliseconds the circuit stays open once tripped.
    pub cooldown_ms: i64,
}

// ============================================================================
// SECTION: Circuit Breaker
// ============================================================================

/// Consecutive-failure circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    /// Breaker configuration.
    config: BreakerConfig,
    /// Failures since the last success.
    consecutive_failures: u32,
    /// Lifetime failure count.
    total_failures: u64,
    /// Lifetime success count.
    total_success: u64,
    /// When the circuit last opened; `None` while closed.
    opened_at: Option<Timestamp>,
    /// Message of the most recent failure.
    last_error: Option<String>,
}

impl CircuitBreaker {
    /// Creates a closed breaker.
    #[must_use]
    pub const fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            consecutive_failures: 0,
            total_failures: 0,
            total_success: 0,
            opened_at: None,
            last_error: None,
        }
    }

    /// Fails fast while the circuit is open.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CircuitOpen`] with the remaining cooldown.
    pub fn check_open(&self, now: Timestamp) -> Result<(), GatewayError> {
        let Some(opened_at) = self.opened_at else {
            return Ok(());
        };
        let opened_until = opened_at.plus_millis(self.config.cooldown_ms);
        if now < opened_until {
            return Err(GatewayError::CircuitOpen {
                remaining_ms: opened_until.millis_since(now),
            });
        }
        Ok(())
    }

    /// Records a successful call.
    ///
    /// Clears the consecutive-failure counter, and closes the circuit once
    /// the cooldown window has elapsed.
    pub fn record_success(&mut self, now: Timestamp) {
        self.total_success += 1;
        self.consecutive_failures = 0;
        if let Some(opened_at) = self.opened_at
            && now.millis_since(opened_at) >= self.config.cooldown_ms
        {
            self.opened_at = None;
        }
    }

    /// Records a failed call, opening the circuit at the threshold.
    pub fn record_failure(&mut self, now: Timestamp, message: impl Into<String>) {
        self.total_failures += 1;
        self.consecutive_failures += 1;
        self.last_error = Some(message.into());
        if self.consecutive_failures >= self.config.failure_threshold {
            self.opened_at = Some(now);
        }
    }

    /// Returns an observability snapshot of the breaker state.
    #[must_use]
    pub fn snapshot(&self) -> BreakerSnapshot {
        BreakerSnapshot {
            consecutive_failures: self.consecutive_failures,
            total_failures: self.total_failures,
            total_success: self.total_success,
            opened_at: self.opened_at,
            opened_until: self.opened_at.map(|at| at.plus_millis(self.config.cooldown_ms)),
            last_error: self.last_error.clone(),
        }
    }
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Serializable view of the breaker state for audit and health endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerSnapshot {
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Lifetime failure count.
    pub total_failures: u64,
    /// Lifetime success count.
    pub total_success: u64,
    /// When the circuit last opened; `None` while closed.
    pub opened_at: Option<Timestamp>,
    /// When the cooldown window elapses; `None` while closed.
    pub opened_until: Option<Timestamp>,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use promo_engine_core::time::Timestamp;

    use super::BreakerConfig;
    use super::CircuitBreaker;

    /// Millisecond timestamp shorthand.
    fn at(millis: i64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn circuit_opens_only_at_the_consecutive_threshold() {
        let mut breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 3,
            cooldown_ms: 1_000,
        });

        breaker.record_failure(at(0), "boom");
        breaker.record_failure(at(1), "boom");
        assert!(breaker.check_open(at(2)).is_ok());

        // A success resets the consecutive count.
        breaker.record_success(at(3));
        breaker.record_failure(at(4), "boom");
        breaker.record_failure(at(5), "boom");
        assert!(breaker.check_open(at(6)).is_ok());

        breaker.record_failure(at(7), "boom");
        assert!(breaker.check_open(at(8)).is_err());
    }

    #[test]
    fn success_after_the_cooldown_closes_the_circuit() {
        let mut breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            cooldown_ms: 1_000,
        });
        breaker.record_failure(at(100), "boom");
        assert!(breaker.check_open(at(1_099)).is_err());
        assert!(breaker.check_open(at(1_100)).is_ok());

        breaker.record_success(at(1_100));
        let snapshot = breaker.snapshot();
        assert_eq!(snapshot.opened_at, None);
        assert_eq!(snapshot.opened_until, None);
        assert_eq!(snapshot.consecutive_failures, 0);
        assert_eq!(snapshot.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn failure_during_the_probe_reopens_the_window() {
        let mut breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            cooldown_ms: 1_000,
        });
        breaker.record_failure(at(0), "boom");
        assert!(breaker.check_open(at(1_000)).is_ok());

        breaker.record_failure(at(1_000), "still down");
        assert!(breaker.check_open(at(1_500)).is_err());
        assert_eq!(breaker.snapshot().opened_until, Some(at(2_000)));
    }
}
