// promo-engine-plugins/src/triggers.rs
// ============================================================================
// Module: Event Match Trigger
// Description: Trigger plugin matching event names and payload conditions.
// Purpose: Decide whether an incoming event activates a policy.
// Dependencies: promo-engine-core, serde_json
// ============================================================================

//! ## Overview
//! The event-match trigger compares the policy's expected event name against
//! the incoming event name, trimmed and case-insensitively, then evaluates
//! every configured equality condition against the event payload. Instance
//! expansion requests come from the trigger spec and are bounded by the
//! pipeline, not here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::Policy;
use promo_engine_core::TriggerContext;
use promo_engine_core::TriggerPlugin;
use serde_json::Value;

// ============================================================================
// SECTION: Event Match Trigger
// ============================================================================

/// Trigger plugin for normalized event-name and payload-condition matching.
#[derive(Debug, Default, Clone, Copy)]
pub struct EventMatchTrigger;

impl EventMatchTrigger {
    /// Creates the trigger plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl TriggerPlugin for EventMatchTrigger {
    fn matches(&self, policy: &Policy, ctx: &TriggerContext) -> bool {
        if !event_name_matches(&policy.trigger.event, &ctx.event.name) {
            return false;
        }
        policy
            .trigger
            .conditions
            .iter()
            .all(|condition| payload_field(&ctx.event.payload, &condition.field)
                .is_some_and(|value| value == &condition.equals))
    }

    fn requested_instances(&self, policy: &Policy, _ctx: &TriggerContext) -> u32 {
        policy.trigger.requested_instances
    }
}

// ============================================================================
// SECTION: Helper Functions
// ============================================================================

/// Compares event names trimmed and case-insensitively.
fn event_name_matches(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}

/// Reads one top-level field from the event payload.
fn payload_field<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    payload.as_object().and_then(|object| object.get(field))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
