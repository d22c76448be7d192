// promo-engine-plugins/src/actions.rs
// ============================================================================
// Module: Action Plugins
// Description: Built-in wallet grant, story injection, and no-op actions.
// Purpose: Execute compiled commands against host collaborators.
// Dependencies: promo-engine-core, serde, serde_json
// ============================================================================

//! ## Overview
//! Actions are the side-effecting tail of the pipeline. The wallet grant
//! derives a deterministic idempotency key from the event, policy, and
//! command parameters so redelivered events never double-grant. Story
//! injection attaches the policy's story payload with a generation timestamp.
//! Action errors become failed responses at the adapter; they never abort the
//! remaining commands.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use promo_engine_core::ActionCommand;
use promo_engine_core::ActionError;
use promo_engine_core::ActionPlugin;
use promo_engine_core::ActionResponse;
use promo_engine_core::GrantRequest;
use promo_engine_core::LedgerService;
use promo_engine_core::Policy;
use promo_engine_core::TriggerContext;
use promo_engine_core::time::Clock;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Wallet Grant Action
// ============================================================================

/// Wallet grant parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletGrantParams {
    /// Receiving wallet account.
    pub account: String,
    /// Grant amount; must be positive.
    pub amount: f64,
}

/// Action granting an amount to the target user's wallet.
pub struct WalletGrantAction {
    /// External ledger collaborator.
    ledger: Arc<dyn LedgerService + Send + Sync>,
}

impl WalletGrantAction {
    /// Creates the action over the host's ledger service.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerService + Send + Sync>) -> Self {
        Self {
            ledger,
        }
    }

    /// Derives the deterministic idempotency key for one grant.
    ///
    /// Redelivery of the same event for the same policy and parameters yields
    /// the same key, which the ledger deduplicates.
    #[must_use]
    pub fn idempotency_key(
        ctx: &TriggerContext,
        policy: &Policy,
        command: &ActionCommand,
        params: &WalletGrantParams,
    ) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            ctx.merchant.merchant_id,
            ctx.event_id,
            policy.policy_id,
            command.plugin,
            params.account,
            params.amount,
        )
    }
}

impl std::fmt::Debug for WalletGrantAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("WalletGrantAction").finish_non_exhaustive()
    }
}

impl ActionPlugin for WalletGrantAction {
    fn execute(
        &self,
        ctx: &TriggerContext,
        policy: &Policy,
        command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError> {
        let params: WalletGrantParams = serde_json::from_value(command.params.clone())
            .map_err(|err| ActionError::Validation(format!("invalid grant params: {err}")))?;
        let Some(user) = &ctx.user else {
            return Err(ActionError::Validation("wallet grant requires a target user".to_string()));
        };
        if params.amount <= 0.0 {
            return Err(ActionError::Validation(format!(
                "grant amount must be positive, got {}",
                params.amount
            )));
        }

        let request = GrantRequest {
            merchant_id: ctx.merchant.merchant_id.clone(),
            user_id: user.user_id.clone(),
            account: params.account.clone(),
            amount: params.amount,
            idempotency_key: Self::idempotency_key(ctx, policy, command, &params),
            metadata: json!({
                "policy_id": policy.policy_id,
                "event_id": ctx.event_id,
                "trace_id": ctx.trace_id,
                "channel": command.channel,
            }),
        };
        let receipt = self.ledger.grant(&request)?;
        Ok(ActionResponse::succeeded(
            &command.id,
            json!({
                "txn_id": receipt.txn_id,
                "account": params.account,
                "amount": params.amount,
            }),
        ))
    }
}

// ============================================================================
// SECTION: Story Inject Action
// ============================================================================

/// Action attaching the policy's story payload to the response.
pub struct StoryInjectAction {
    /// Clock stamping the generation time.
    clock: Arc<dyn Clock + Send + Sync>,
}

impl StoryInjectAction {
    /// Creates the action over the host's clock.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
        }
    }
}

impl std::fmt::Debug for StoryInjectAction {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.debug_struct("StoryInjectAction").finish_non_exhaustive()
    }
}

impl ActionPlugin for StoryInjectAction {
    fn execute(
        &self,
        _ctx: &TriggerContext,
        policy: &Policy,
        command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError> {
        let Some(story) = &policy.story else {
            return Ok(ActionResponse::succeeded(&command.id, Value::Null));
        };
        Ok(ActionResponse::succeeded(
            &command.id,
            json!({
                "story_id": story.story_id,
                "payload": story.payload,
                "generated_at": self.clock.now(),
            }),
        ))
    }
}

// ============================================================================
// SECTION: Noop Action
// ============================================================================

/// Action that always succeeds with no side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAction;

impl NoopAction {
    /// Creates the action plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ActionPlugin for NoopAction {
    fn execute(
        &self,
        _ctx: &TriggerContext,
        _policy: &Policy,
        command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError> {
        Ok(ActionResponse::succeeded(&command.id, Value::Null))
    }
}
