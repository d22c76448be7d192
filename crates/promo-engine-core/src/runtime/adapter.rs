// promo-engine-core/src/runtime/adapter.rs
// ============================================================================
// Module: Execution Adapter
// Description: Deterministic compilation and best-effort command execution.
// Purpose: Compile admitted policies into plans and execute them via actions.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The adapter runs the engine's second consistency policy: unlike resource
//! admission (all-or-nothing with rollback), command execution is best-effort
//! and reports everything. A missing action plugin or a failing plugin yields
//! a synthetic failure response and execution continues to the next command.
//! These two policies are deliberately separate code paths; do not unify them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::ActionCommand;
use crate::core::ActionResponse;
use crate::core::ConstraintResult;
use crate::core::ExecutionPlan;
use crate::core::ExecutionResult;
use crate::core::ExplainReport;
use crate::core::Policy;
use crate::core::ScoreResult;
use crate::core::TraceId;
use crate::core::TriggerContext;
use crate::runtime::registry::PluginRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Runtime tag recorded on every compiled plan.
const RUNTIME_TAG: &str = "promo-engine/0.1";

/// Default delivery channel when an action names none.
const DEFAULT_CHANNEL: &str = "default";

// ============================================================================
// SECTION: Execution Adapter
// ============================================================================

/// Compiles admitted policies into command plans and executes them.
#[derive(Clone)]
pub struct ExecutionAdapter {
    /// Registry resolving action plugins by name.
    registry: Arc<PluginRegistry>,
}

impl ExecutionAdapter {
    /// Creates an adapter over the given registry.
    #[must_use]
    pub const fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
        }
    }

    /// Compiles a policy's actions into an execution plan.
    ///
    /// Pure and deterministic: compiling the same policy twice with the same
    /// trace id yields identical commands.
    #[must_use]
    pub fn compile(policy: &Policy, trace_id: &TraceId) -> ExecutionPlan {
        let commands = policy
            .actions
            .iter()
            .enumerate()
            .map(|(index, action)| ActionCommand {
                id: format!("{}:action:{}", policy.policy_id, index + 1),
                plugin: action.plugin.clone(),
                channel: action
                    .channel
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
                params: action.params.clone(),
            })
            .collect();
        ExecutionPlan {
            runtime: RUNTIME_TAG.to_string(),
            trace_id: trace_id.clone(),
            commands,
        }
    }

    /// Executes every command in the plan, best-effort.
    ///
    /// Missing plugins and plugin errors become failed responses; the
    /// remaining commands still run. The aggregate `success` is true iff no
    /// response failed.
    #[must_use]
    pub fn execute(
        &self,
        ctx: &TriggerContext,
        policy: &Policy,
        plan: &ExecutionPlan,
    ) -> ExecutionResult {
        let mut responses = Vec::with_capacity(plan.commands.len());
        for command in &plan.commands {
            let response = match self.registry.action(&command.plugin) {
                Some(plugin) => plugin.execute(ctx, policy, command).unwrap_or_else(|err| {
                    ActionResponse::failed(command.id.clone(), err.to_string())
                }),
                None => ActionResponse::failed(
                    command.id.clone(),
                    format!("action plugin missing: {}", command.plugin),
                ),
            };
            responses.push(response);
        }
        ExecutionResult::from_responses(responses)
    }

    /// Assembles the audit-facing explanation for one candidate decision.
    ///
    /// Constraint reason codes precede scorer reason codes so audit logs
    /// read gating explanations first.
    #[must_use]
    pub fn explain(
        policy: &Policy,
        score: Option<&ScoreResult>,
        constraint: &ConstraintResult,
    ) -> ExplainReport {
        let mut reason_codes = constraint.reason_codes.clone();
        if let Some(score) = score {
            reason_codes.extend(score.reason_codes.iter().cloned());
        }
        ExplainReport {
            policy_id: policy.policy_id.clone(),
            reason_codes,
            risk_flags: constraint.risk_flags.clone(),
            expected_range: score.map(|score| score.expected_range),
        }
    }
}
