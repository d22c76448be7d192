// promo-engine-plugins/src/lib.rs
// ============================================================================
// Module: Promo Engine Built-in Plugins
// Description: Built-in trigger, segment, constraint, scorer, and action plugins.
// Purpose: Provide the standard plugin set and a registration helper.
// Dependencies: promo-engine-core
// ============================================================================

//! ## Overview
//! Built-in plugins implement the core plugin interfaces with plugin-specific
//! parameters parsed from loosely typed JSON into serde config structs. Hosts
//! register them wholesale through [`register_builtin_plugins`] or pick
//! individual plugins for custom registries.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod actions;
pub mod constraints;
pub mod scorer;
pub mod segments;
pub mod triggers;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use promo_engine_core::LedgerService;
use promo_engine_core::PluginRegistry;
use promo_engine_core::time::Clock;

pub use actions::NoopAction;
pub use actions::StoryInjectAction;
pub use actions::WalletGrantAction;
pub use constraints::AntiFraudConstraint;
pub use constraints::BudgetGuardConstraint;
pub use constraints::FrequencyCapConstraint;
pub use constraints::InventoryLockConstraint;
pub use constraints::KillSwitchConstraint;
pub use scorer::ExpectedUtilityScorer;
pub use segments::AllUsersSegment;
pub use segments::TagSegment;
pub use triggers::EventMatchTrigger;

// ============================================================================
// SECTION: Builtin Registration
// ============================================================================

/// Registers every built-in plugin under its canonical name.
pub fn register_builtin_plugins(
    registry: &mut PluginRegistry,
    ledger: Arc<dyn LedgerService + Send + Sync>,
    clock: Arc<dyn Clock + Send + Sync>,
) {
    registry.register_trigger("event_match", EventMatchTrigger::new());
    registry.register_segment("all_users", AllUsersSegment::new());
    registry.register_segment("tag_segment", TagSegment::new());
    registry.register_constraint("kill_switch", KillSwitchConstraint::new());
    registry.register_constraint("budget_guard", BudgetGuardConstraint::new());
    registry.register_constraint("inventory_lock", InventoryLockConstraint::new());
    registry.register_constraint("frequency_cap", FrequencyCapConstraint::new());
    registry.register_constraint("anti_fraud", AntiFraudConstraint::new());
    registry.register_scorer("expected_utility", ExpectedUtilityScorer::new());
    registry.register_action("wallet_grant", WalletGrantAction::new(ledger));
    registry.register_action("story_inject", StoryInjectAction::new(clock));
    registry.register_action("noop", NoopAction::new());
}
