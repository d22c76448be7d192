// promo-engine-core/src/runtime/registry.rs
// ============================================================================
// Module: Plugin Registry
// Description: Typed lookup tables of named plugins grouped by capability.
// Purpose: Route pipeline dispatch by plugin name with O(1)-ish lookups.
// Dependencies: crate::interfaces
// ============================================================================

//! ## Overview
//! The registry is a typed map per capability (trigger, segment, constraint,
//! scorer, action) from plugin name to implementation. Registration silently
//! overwrites; lookup returns `None` for absent names. Absence is a normal,
//! expected condition: callers answer it with a failure response carrying a
//! reason code, never a panic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::interfaces::ActionPlugin;
use crate::interfaces::ConstraintPlugin;
use crate::interfaces::ScorerPlugin;
use crate::interfaces::SegmentPlugin;
use crate::interfaces::TriggerPlugin;

// ============================================================================
// SECTION: Plugin Registry
// ============================================================================

/// Typed plugin registry grouped by capability.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    /// Trigger plugins keyed by name.
    triggers: BTreeMap<String, Arc<dyn TriggerPlugin + Send + Sync>>,
    /// Segment plugins keyed by name.
    segments: BTreeMap<String, Arc<dyn SegmentPlugin + Send + Sync>>,
    /// Constraint plugins keyed by name.
    constraints: BTreeMap<String, Arc<dyn ConstraintPlugin + Send + Sync>>,
    /// Scorer plugins keyed by name.
    scorers: BTreeMap<String, Arc<dyn ScorerPlugin + Send + Sync>>,
    /// Action plugins keyed by name.
    actions: BTreeMap<String, Arc<dyn ActionPlugin + Send + Sync>>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a trigger plugin; re-registration silently overwrites.
    pub fn register_trigger(
        &mut self,
        name: impl Into<String>,
        plugin: impl TriggerPlugin + Send + Sync + 'static,
    ) {
        self.triggers.insert(name.into(), Arc::new(plugin));
    }

    /// Registers a segment plugin; re-registration silently overwrites.
    pub fn register_segment(
        &mut self,
        name: impl Into<String>,
        plugin: impl SegmentPlugin + Send + Sync + 'static,
    ) {
        self.segments.insert(name.into(), Arc::new(plugin));
    }

    /// Registers a constraint plugin; re-registration silently overwrites.
    pub fn register_constraint(
        &mut self,
        name: impl Into<String>,
        plugin: impl ConstraintPlugin + Send + Sync + 'static,
    ) {
        self.constraints.insert(name.into(), Arc::new(plugin));
    }

    /// Registers a scorer plugin; re-registration silently overwrites.
    pub fn register_scorer(
        &mut self,
        name: impl Into<String>,
        plugin: impl ScorerPlugin + Send + Sync + 'static,
    ) {
        self.scorers.insert(name.into(), Arc::new(plugin));
    }

    /// Registers an action plugin; re-registration silently overwrites.
    pub fn register_action(
        &mut self,
        name: impl Into<String>,
        plugin: impl ActionPlugin + Send + Sync + 'static,
    ) {
        self.actions.insert(name.into(), Arc::new(plugin));
    }

    /// Looks up a trigger plugin by name.
    #[must_use]
    pub fn trigger(&self, name: &str) -> Option<Arc<dyn TriggerPlugin + Send + Sync>> {
        self.triggers.get(name).cloned()
    }

    /// Looks up a segment plugin by name.
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<Arc<dyn SegmentPlugin + Send + Sync>> {
        self.segments.get(name).cloned()
    }

    /// Looks up a constraint plugin by name.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<Arc<dyn ConstraintPlugin + Send + Sync>> {
        self.constraints.get(name).cloned()
    }

    /// Looks up a scorer plugin by name.
    #[must_use]
    pub fn scorer(&self, name: &str) -> Option<Arc<dyn ScorerPlugin + Send + Sync>> {
        self.scorers.get(name).cloned()
    }

    /// Looks up an action plugin by name.
    #[must_use]
    pub fn action(&self, name: &str) -> Option<Arc<dyn ActionPlugin + Send + Sync>> {
        self.actions.get(name).cloned()
    }
}
