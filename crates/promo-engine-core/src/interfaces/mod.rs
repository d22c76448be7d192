// promo-engine-core/src/interfaces/mod.rs
// ============================================================================
// Module: Promo Engine Interfaces
// Description: Backend-agnostic interfaces for plugins, ledger, and storage.
// Purpose: Define the contract surfaces used by the evaluation runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how Promo Engine integrates with host services without
//! embedding backend-specific details. Expected domain outcomes (no-match,
//! blocked, missing plugin) surface as structured results; only store and
//! configuration failures surface as errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::core::ActionCommand;
use crate::core::ActionResponse;
use crate::core::BudgetState;
use crate::core::ConstraintResult;
use crate::core::ConstraintSpec;
use crate::core::FrequencyState;
use crate::core::InventoryState;
use crate::core::MerchantId;
use crate::core::ModelEstimate;
use crate::core::Policy;
use crate::core::ReservationToken;
use crate::core::ReserveOutcome;
use crate::core::ResourceKey;
use crate::core::ScoreResult;
use crate::core::TriggerContext;
use crate::core::UserId;
use crate::core::time::Clock;

// ============================================================================
// SECTION: Trigger and Segment Plugins
// ============================================================================

/// Trigger plugin matching incoming events against policy configuration.
pub trait TriggerPlugin {
    /// Returns true when the event matches the policy's trigger.
    fn matches(&self, policy: &Policy, ctx: &TriggerContext) -> bool;

    /// Returns how many simultaneous instances to evaluate for the event.
    ///
    /// The pipeline bounds the request by `program.max_instances` and floors
    /// both to at least one.
    fn requested_instances(&self, policy: &Policy, ctx: &TriggerContext) -> u32;
}

/// Segment plugin filtering candidates by audience membership.
pub trait SegmentPlugin {
    /// Returns true when the context's user belongs to the policy's segment.
    ///
    /// Non-matching candidates are dropped silently; no reason codes
    /// propagate upward from segment filtering.
    fn matches(&self, policy: &Policy, ctx: &TriggerContext) -> bool;
}

// ============================================================================
// SECTION: Constraint Plugin
// ============================================================================

/// Constraint plugin errors.
#[derive(Debug, Error)]
pub enum ConstraintError {
    /// Constraint parameters failed to parse; hard-fails the candidate only.
    #[error("invalid constraint params for {plugin}: {message}")]
    InvalidParams {
        /// Constraint plugin name.
        plugin: String,
        /// Parse failure description.
        message: String,
    },
    /// Resource store failure; fatal and propagated past the pipeline.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Resource constraint implementing the three-phase admission protocol.
///
/// `check` is a pure read of resource state. `reserve` commits the
/// consumption a passing check implied, re-validating capacity inside the
/// per-key critical section so the cap invariants hold under concurrent
/// admission. `release` is the exact inverse given the token `reserve`
/// returned and is a no-op when the underlying key no longer exists.
pub trait ConstraintPlugin {
    /// Checks whether current resource state admits the candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] on malformed parameters or store failure.
    fn check(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        spec: &ConstraintSpec,
        estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ConstraintResult, ConstraintError>;

    /// Commits the resource consumption implied by a passing check.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] on malformed parameters or store failure.
    fn reserve(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        spec: &ConstraintSpec,
        estimate: &ModelEstimate,
        store: &dyn ResourceStore,
        clock: &dyn Clock,
    ) -> Result<ReserveOutcome, ConstraintError>;

    /// Undoes a committed reservation given the token `reserve` returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConstraintError`] on store failure.
    fn release(
        &self,
        token: &ReservationToken,
        store: &dyn ResourceStore,
    ) -> Result<(), ConstraintError>;
}

// ============================================================================
// SECTION: Scorer Plugin
// ============================================================================

/// Scorer plugin errors.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Scorer reported an error.
    #[error("scorer error: {0}")]
    Scorer(String),
}

/// Scorer plugin computing the expected-utility annotation.
pub trait ScorerPlugin {
    /// Computes the utility estimate for an admitted candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ScoreError`] when the estimate cannot be scored.
    fn score(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        estimate: &ModelEstimate,
    ) -> Result<ScoreResult, ScoreError>;
}

// ============================================================================
// SECTION: Action Plugin
// ============================================================================

/// Action plugin errors.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Action input validation failed.
    #[error("action validation failed: {0}")]
    Validation(String),
    /// Ledger service failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Side-effecting action plugin invoked per compiled command.
pub trait ActionPlugin {
    /// Executes one compiled command.
    ///
    /// The adapter converts errors into failed responses and continues with
    /// the remaining commands; execution is best-effort, not all-or-nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when validation or a collaborator call fails.
    fn execute(
        &self,
        ctx: &TriggerContext,
        policy: &Policy,
        command: &ActionCommand,
    ) -> Result<ActionResponse, ActionError>;
}

// ============================================================================
// SECTION: Ledger Service
// ============================================================================

/// Ledger service errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Ledger rejected the grant.
    #[error("ledger rejected grant: {0}")]
    Rejected(String),
    /// Ledger transport failure.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Wallet grant request delivered to the external ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrantRequest {
    /// Merchant funding the grant.
    pub merchant_id: MerchantId,
    /// Receiving user.
    pub user_id: UserId,
    /// Receiving wallet account.
    pub account: String,
    /// Grant amount; must be positive.
    pub amount: f64,
    /// Idempotency key; repeated delivery must never double-grant.
    pub idempotency_key: String,
    /// Caller metadata recorded with the transaction.
    pub metadata: Value,
}

/// Receipt returned by the ledger for a committed grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantReceipt {
    /// Ledger transaction identifier.
    pub txn_id: String,
}

/// External ledger collaborator; must be idempotent on the idempotency key.
pub trait LedgerService {
    /// Grants an amount to a user's wallet account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the grant is rejected or the ledger is
    /// unreachable.
    fn grant(&self, request: &GrantRequest) -> Result<GrantReceipt, LedgerError>;
}

// ============================================================================
// SECTION: Resource Store
// ============================================================================

/// Resource store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("resource store io error: {0}")]
    Io(String),
    /// Store reported an error.
    #[error("resource store error: {0}")]
    Store(String),
}

/// Mutable keyed resource state behind per-key critical sections.
///
/// Each method resolves the entry for `key` (creating it lazily from the
/// supplied initial state) and runs `op` with exclusive access to it. The
/// store is the only shared mutable state in the engine; each constraint
/// plugin owns one namespace and must not touch another's.
pub trait ResourceStore {
    /// Runs `op` with exclusive access to the budget entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry cannot be accessed.
    fn with_budget(
        &self,
        key: &ResourceKey,
        init: BudgetState,
        op: &mut dyn FnMut(&mut BudgetState),
    ) -> Result<(), StoreError>;

    /// Runs `op` with exclusive access to the inventory entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry cannot be accessed.
    fn with_inventory(
        &self,
        key: &ResourceKey,
        init: InventoryState,
        op: &mut dyn FnMut(&mut InventoryState),
    ) -> Result<(), StoreError>;

    /// Runs `op` with exclusive access to the frequency entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the entry cannot be accessed.
    fn with_frequency(
        &self,
        key: &ResourceKey,
        op: &mut dyn FnMut(&mut FrequencyState),
    ) -> Result<(), StoreError>;
}
