// promo-engine-core/src/core/time.rs
// ============================================================================
// Module: Promo Engine Time
// Description: Millisecond timestamps and injectable clocks.
// Purpose: Keep window arithmetic deterministic and testable.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! All time-dependent logic (budget pacing windows, frequency windows, circuit
//! breaker cooldowns) consumes an injected [`Clock`] rather than reading the
//! wall clock directly, so tests can drive window boundaries deterministically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from epoch milliseconds.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as epoch milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the saturating difference `self - earlier` in milliseconds.
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> i64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Returns the timestamp advanced by `millis`, saturating on overflow.
    #[must_use]
    pub const fn plus_millis(self, millis: i64) -> Self {
        Self(self.0.saturating_add(millis))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Clocks
// ============================================================================

/// Clock abstraction supplying the current timestamp.
pub trait Clock {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| i64::try_from(duration.as_millis()).unwrap_or(i64::MAX));
        Timestamp::from_millis(millis)
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current time protected by a mutex for shared advancement.
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Creates a manual clock starting at the given timestamp.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Advances the clock by the given number of milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = guard.plus_millis(millis);
        }
    }

    /// Sets the clock to an absolute timestamp.
    pub fn set(&self, now: Timestamp) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.lock().map_or(Timestamp::from_millis(0), |guard| *guard)
    }
}
