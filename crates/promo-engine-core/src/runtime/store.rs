// promo-engine-core/src/runtime/store.rs
// ============================================================================
// Module: Promo Engine In-Memory Store
// Description: In-memory resource store and recording ledger.
// Purpose: Provide deterministic reference implementations without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemoryResourceStore`] implements [`ResourceStore`] with per-key
//! mutexes: a namespace-level lock resolves or creates the entry, and an
//! entry-level lock serializes the caller's critical section. Suitable for
//! single-process hosts and tests; a durable backend can replace it behind
//! the trait. [`InMemoryLedger`] is a recording ledger with idempotency-key
//! dedupe for tests and demos.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::BudgetState;
use crate::core::FrequencyState;
use crate::core::InventoryState;
use crate::core::ResourceKey;
use crate::interfaces::GrantReceipt;
use crate::interfaces::GrantRequest;
use crate::interfaces::LedgerError;
use crate::interfaces::LedgerService;
use crate::interfaces::ResourceStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Keyed Namespace
// ============================================================================

/// One resource namespace with per-key entry locks.
#[derive(Debug)]
struct Namespace<T> {
    /// Entry map protected by a namespace-level mutex.
    entries: Mutex<BTreeMap<String, Arc<Mutex<T>>>>,
}

impl<T> Default for Namespace<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }
}

impl<T> Namespace<T> {
    /// Resolves the entry for `key`, creating it from `init` when absent,
    /// and runs `op` under the entry lock.
    fn with_entry(
        &self,
        key: &ResourceKey,
        init: impl FnOnce() -> T,
        op: &mut dyn FnMut(&mut T),
    ) -> Result<(), StoreError> {
        let entry = {
            let mut guard = self
                .entries
                .lock()
                .map_err(|_| StoreError::Store("resource namespace mutex poisoned".to_string()))?;
            Arc::clone(
                guard
                    .entry(key.as_str().to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(init()))),
            )
        };
        let mut state = entry
            .lock()
            .map_err(|_| StoreError::Store("resource entry mutex poisoned".to_string()))?;
        op(&mut state);
        Ok(())
    }
}

// ============================================================================
// SECTION: In-Memory Resource Store
// ============================================================================

/// In-memory resource store for single-process hosts and tests.
#[derive(Debug, Default)]
pub struct InMemoryResourceStore {
    /// Budget namespace keyed by `merchant|policy`.
    budgets: Namespace<BudgetState>,
    /// Inventory namespace keyed by `merchant|policy|sku`.
    inventory: Namespace<InventoryState>,
    /// Frequency namespace keyed by `merchant|policy|user`.
    frequency: Namespace<FrequencyState>,
}

impl InMemoryResourceStore {
    /// Creates an empty in-memory resource store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a copy of the budget entry for `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the namespace lock is poisoned.
    pub fn budget_snapshot(&self, key: &ResourceKey) -> Result<Option<BudgetState>, StoreError> {
        let guard = self
            .budgets
            .entries
            .lock()
            .map_err(|_| StoreError::Store("resource namespace mutex poisoned".to_string()))?;
        let Some(entry) = guard.get(key.as_str()) else {
            return Ok(None);
        };
        let state = entry
            .lock()
            .map_err(|_| StoreError::Store("resource entry mutex poisoned".to_string()))?;
        Ok(Some(*state))
    }

    /// Reads a copy of the inventory entry for `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the namespace lock is poisoned.
    pub fn inventory_snapshot(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<InventoryState>, StoreError> {
        let guard = self
            .inventory
            .entries
            .lock()
            .map_err(|_| StoreError::Store("resource namespace mutex poisoned".to_string()))?;
        let Some(entry) = guard.get(key.as_str()) else {
            return Ok(None);
        };
        let state = entry
            .lock()
            .map_err(|_| StoreError::Store("resource entry mutex poisoned".to_string()))?;
        Ok(Some(*state))
    }

    /// Reads a copy of the frequency markers for `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the namespace lock is poisoned.
    pub fn frequency_snapshot(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<FrequencyState>, StoreError> {
        let guard = self
            .frequency
            .entries
            .lock()
            .map_err(|_| StoreError::Store("resource namespace mutex poisoned".to_string()))?;
        let Some(entry) = guard.get(key.as_str()) else {
            return Ok(None);
        };
        let state = entry
            .lock()
            .map_err(|_| StoreError::Store("resource entry mutex poisoned".to_string()))?;
        Ok(Some(state.clone()))
    }
}

impl ResourceStore for InMemoryResourceStore {
    fn with_budget(
        &self,
        key: &ResourceKey,
        init: BudgetState,
        op: &mut dyn FnMut(&mut BudgetState),
    ) -> Result<(), StoreError> {
        self.budgets.with_entry(key, || init, op)
    }

    fn with_inventory(
        &self,
        key: &ResourceKey,
        init: InventoryState,
        op: &mut dyn FnMut(&mut InventoryState),
    ) -> Result<(), StoreError> {
        self.inventory.with_entry(key, || init, op)
    }

    fn with_frequency(
        &self,
        key: &ResourceKey,
        op: &mut dyn FnMut(&mut FrequencyState),
    ) -> Result<(), StoreError> {
        self.frequency.with_entry(key, Vec::new, op)
    }
}

// ============================================================================
// SECTION: In-Memory Ledger
// ============================================================================

/// Recording ledger with idempotency-key dedupe for tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Committed grants keyed by idempotency key.
    grants: Mutex<BTreeMap<String, (GrantRequest, GrantReceipt)>>,
}

impl InMemoryLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of distinct committed grants.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger lock is poisoned.
    pub fn grant_count(&self) -> Result<usize, LedgerError> {
        let guard = self
            .grants
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;
        Ok(guard.len())
    }

    /// Returns the committed grant for an idempotency key, if any.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger lock is poisoned.
    pub fn grant_for(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<(GrantRequest, GrantReceipt)>, LedgerError> {
        let guard = self
            .grants
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;
        Ok(guard.get(idempotency_key).cloned())
    }
}

impl LedgerService for InMemoryLedger {
    fn grant(&self, request: &GrantRequest) -> Result<GrantReceipt, LedgerError> {
        if request.amount <= 0.0 {
            return Err(LedgerError::Rejected("grant amount must be positive".to_string()));
        }
        let mut guard = self
            .grants
            .lock()
            .map_err(|_| LedgerError::Unavailable("ledger mutex poisoned".to_string()))?;
        if let Some((_, receipt)) = guard.get(&request.idempotency_key) {
            return Ok(receipt.clone());
        }
        let receipt = GrantReceipt {
            txn_id: format!("txn-{}", guard.len() + 1),
        };
        guard.insert(request.idempotency_key.clone(), (request.clone(), receipt.clone()));
        Ok(receipt)
    }
}
