// promo-engine-gateway/src/queue.rs
// ============================================================================
// Module: Call Queue
// Description: Bounded-concurrency queue for upstream model calls.
// Purpose: Keep in-flight model calls within a collaborator-provided limit.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! The queue is a thin wrapper over a [`Semaphore`]: callers above the limit
//! wait in acquisition order rather than failing. The semaphore is never
//! closed, so acquisition cannot fail for the lifetime of the queue.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

// ============================================================================
// SECTION: Call Queue
// ============================================================================

/// Bounded-concurrency queue for model calls.
#[derive(Debug, Clone)]
pub struct CallQueue {
    /// Permits bounding concurrent in-flight calls.
    permits: Arc<Semaphore>,
}

impl CallQueue {
    /// Creates a queue admitting at most `max_concurrent` calls, floored at one.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Runs `future` once a permit is available.
    pub async fn run<T>(&self, future: impl Future<Output = T>) -> T {
        match self.permits.acquire().await {
            Ok(permit) => {
                let result = future.await;
                drop(permit);
                result
            }
            // The semaphore is never closed; run unbounded rather than stall.
            Err(_) => future.await,
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
