// promo-engine-gateway/src/client.rs
// ============================================================================
// Module: Model Gateway Client
// Description: Role-aware model gateway combining queue, retry, and breaker.
// Purpose: Give callers one resilient entry point for planner and chat calls.
// Dependencies: promo-engine-core, crate::{breaker,error,queue,retry}, async-trait, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`ModelGateway`] owns one shared breaker, retry policy, and call queue for
//! both model roles: planner calls run terse and cheap, chat calls run rich
//! and expensive, each with its own [`ModelCallConfig`]. A call flows queue →
//! retry loop → breaker gate → timed transport call, then records the outcome
//! on the breaker and parses the returned text as loose JSON. The transport
//! is a trait so tests drive the gateway with scripted stubs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use promo_engine_core::time::Clock;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::breaker::BreakerConfig;
use crate::breaker::BreakerSnapshot;
use crate::breaker::CircuitBreaker;
use crate::error::GatewayError;
use crate::queue::CallQueue;
use crate::retry::RetryPolicy;
use crate::retry::run_with_retry;

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Model role selecting a per-call configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelRole {
    /// Terse structured-output planning calls.
    Planner,
    /// Rich conversational calls.
    Chat,
}

/// One role-tagged message in a model conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMessage {
    /// Message author role, for example `system` or `user`.
    pub role: String,
    /// Message text.
    pub content: String,
}

impl ModelMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Per-role model call configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelCallConfig {
    /// Maximum tokens the model may generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Transport deadline in milliseconds.
    pub timeout_ms: u64,
}

/// Upstream model transport.
///
/// Failures carry human-readable messages; the retry layer classifies them
/// by text, so transports should preserve upstream status codes and
/// transport-level failure markers in the message.
#[async_trait]
pub trait ModelTransport {
    /// Sends role-tagged messages and returns the model's free-form text.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] when the call fails.
    async fn send(
        &self,
        role: ModelRole,
        config: &ModelCallConfig,
        messages: &[ModelMessage],
    ) -> Result<String, GatewayError>;
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Gateway configuration covering both roles and all resilience layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Planner-role call configuration.
    pub planner: ModelCallConfig,
    /// Chat-role call configuration.
    pub chat: ModelCallConfig,
    /// Retry policy shared by both roles.
    pub retry: RetryPolicy,
    /// Breaker configuration shared by both roles.
    pub breaker: BreakerConfig,
    /// Maximum concurrent in-flight model calls.
    pub max_concurrent_calls: usize,
}

/// Resilient model gateway over an injected transport and clock.
#[derive(Debug)]
pub struct ModelGateway<T, C> {
    /// Upstream transport.
    transport: T,
    /// Clock driving breaker transitions.
    clock: C,
    /// Planner-role call configuration.
    planner: ModelCallConfig,
    /// Chat-role call configuration.
    chat: ModelCallConfig,
    /// Retry policy shared by both roles.
    retry: RetryPolicy,
    /// Breaker shared by both roles.
    breaker: Mutex<CircuitBreaker>,
    /// Bounded-concurrency call queue shared by both roles.
    queue: CallQueue,
}

impl<T, C> ModelGateway<T, C>
where
    T: ModelTransport + Send + Sync,
    C: Clock + Send + Sync,
{
    /// Creates a gateway from its transport, clock, and configuration.
    #[must_use]
    pub fn new(transport: T, clock: C, config: GatewayConfig) -> Self {
        Self {
            transport,
            clock,
            planner: config.planner,
            chat: config.chat,
            retry: config.retry,
            breaker: Mutex::new(CircuitBreaker::new(config.breaker)),
            queue: CallQueue::new(config.max_concurrent_calls),
        }
    }

    /// Invokes the model under the full resilience stack.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CircuitOpen`] while the breaker is open,
    /// [`GatewayError::Upstream`] when retries are exhausted, and
    /// [`GatewayError::Parse`] when the model text carries no JSON.
    pub async fn invoke(
        &self,
        role: ModelRole,
        messages: &[ModelMessage],
    ) -> Result<Value, GatewayError> {
        let config = match role {
            ModelRole::Planner => &self.planner,
            ModelRole::Chat => &self.chat,
        };
        let text = self
            .queue
            .run(run_with_retry(&self.retry, GatewayError::is_retriable, |_attempt| {
                self.call_once(role, config, messages)
            }))
            .await?;
        parse_loose_json(&text)
    }

    /// Returns an observability snapshot of the shared breaker.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Upstream`] when the breaker lock is poisoned.
    pub fn breaker_snapshot(&self) -> Result<BreakerSnapshot, GatewayError> {
        let breaker = self
            .breaker
            .lock()
            .map_err(|_| GatewayError::Upstream("breaker mutex poisoned".to_string()))?;
        Ok(breaker.snapshot())
    }

    /// Runs one gated, timed transport call and records its outcome.
    async fn call_once(
        &self,
        role: ModelRole,
        config: &ModelCallConfig,
        messages: &[ModelMessage],
    ) -> Result<String, GatewayError> {
        self.check_breaker()?;
        let deadline = Duration::from_millis(config.timeout_ms);
        let outcome = tokio::time::timeout(deadline, self.transport.send(role, config, messages));
        match outcome.await {
            Ok(Ok(text)) => {
                self.record_success();
                Ok(text)
            }
            Ok(Err(err)) => {
                self.record_failure(&err);
                Err(err)
            }
            Err(_) => {
                let err = GatewayError::Upstream(format!(
                    "model call timeout after {}ms",
                    config.timeout_ms
                ));
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    /// Fails fast while the shared breaker is open.
    fn check_breaker(&self) -> Result<(), GatewayError> {
        let breaker = self
            .breaker
            .lock()
            .map_err(|_| GatewayError::Upstream("breaker mutex poisoned".to_string()))?;
        breaker.check_open(self.clock.now())
    }

    /// Records a success on the shared breaker, best effort on poisoning.
    fn record_success(&self) {
        if let Ok(mut breaker) = self.breaker.lock() {
            breaker.record_success(self.clock.now());
        }
    }

    /// Records a failure on the shared breaker, best effort on poisoning.
    fn record_failure(&self, err: &GatewayError) {
        if let Ok(mut breaker) = self.breaker.lock() {
            breaker.record_failure(self.clock.now(), err.to_string());
        }
    }
}

// ============================================================================
// SECTION: Loose JSON Parsing
// ============================================================================

/// Parses model text as JSON, falling back to the outermost brace slice.
///
/// Models wrap structured output in prose; when the whole string fails to
/// parse, the slice from the first `{` to the last `}` is tried instead.
///
/// # Errors
///
/// Returns [`GatewayError::Parse`] when no parseable JSON is found.
pub fn parse_loose_json(text: &str) -> Result<Value, GatewayError> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str(&text[start..=end])
    {
        return Ok(value);
    }
    Err(GatewayError::Parse(format!("no JSON object in model output ({} chars)", text.len())))
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

    use serde_json::json;

    use super::parse_loose_json;

    #[test]
    fn whole_string_json_parses_directly() {
        let value = parse_loose_json(r#"{"plan": "grant"}"#).expect("must parse");
        assert_eq!(value, json!({ "plan": "grant" }));
    }

    #[test]
    fn json_embedded_in_prose_parses_from_the_outermost_braces() {
        let text = "Sure! Here is the plan:\n{\"plan\": \"grant\", \"n\": 2}\nLet me know.";
        let value = parse_loose_json(text).expect("must parse");
        assert_eq!(value, json!({ "plan": "grant", "n": 2 }));
    }

    #[test]
    fn text_without_json_fails_with_a_parse_error() {
        let err = parse_loose_json("no structured output here").expect_err("must fail");
        assert!(err.to_string().contains("parse"));
    }
}
