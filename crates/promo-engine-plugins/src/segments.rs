// promo-engine-plugins/src/segments.rs
// ============================================================================
// Module: Segment Plugins
// Description: Audience segment plugins for candidate filtering.
// Purpose: Decide whether the event's user belongs to a policy's audience.
// Dependencies: promo-engine-core
// ============================================================================

//! ## Overview
//! Segment plugins answer a single membership question. Non-matching
//! candidates are dropped silently by the pipeline; segments never emit
//! reason codes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use promo_engine_core::Policy;
use promo_engine_core::SegmentPlugin;
use promo_engine_core::TriggerContext;

// ============================================================================
// SECTION: All Users Segment
// ============================================================================

/// Segment matching every user, including anonymous events.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllUsersSegment;

impl AllUsersSegment {
    /// Creates the segment plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SegmentPlugin for AllUsersSegment {
    fn matches(&self, _policy: &Policy, _ctx: &TriggerContext) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Tag Segment
// ============================================================================

/// Segment requiring the target user's tags to cover the required tags.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagSegment;

impl TagSegment {
    /// Creates the segment plugin.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SegmentPlugin for TagSegment {
    fn matches(&self, policy: &Policy, ctx: &TriggerContext) -> bool {
        let Some(user) = &ctx.user else {
            return false;
        };
        policy
            .segment
            .required_tags
            .iter()
            .all(|required| user.tags.iter().any(|tag| tag == required))
    }
}
