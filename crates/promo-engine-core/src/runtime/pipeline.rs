// promo-engine-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Policy Evaluation Pipeline
// Description: Trigger matching, candidate admission, scoring, and execution.
// Purpose: Decide per event which policies fire and execute them exactly once.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The pipeline is the single canonical evaluation path: trigger match,
//! candidate expansion, segment filtering, check-then-reserve admission with
//! reverse-order rollback, utility scoring, and delegation to the execution
//! adapter. Expected domain failures (no-match, blocked constraint, missing
//! plugin) surface as structured reports with reason codes; only resource
//! store failures propagate as errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Candidate;
use crate::core::ConstraintResult;
use crate::core::ExecutionResult;
use crate::core::ExplainReport;
use crate::core::Policy;
use crate::core::ReservationToken;
use crate::core::ScoreResult;
use crate::core::TriggerContext;
use crate::core::time::Clock;
use crate::interfaces::ConstraintError;
use crate::interfaces::ConstraintPlugin;
use crate::interfaces::ResourceStore;
use crate::interfaces::StoreError;
use crate::runtime::adapter::ExecutionAdapter;
use crate::runtime::registry::PluginRegistry;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Terminal outcome for one evaluated event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineOutcome {
    /// The event did not match the trigger, or no candidate survived the
    /// segment filter.
    NoMatch,
    /// Candidates were produced but none was executed.
    Blocked,
    /// At least one candidate executed.
    Executed,
}

/// Per-candidate evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReport {
    /// The candidate instance.
    pub candidate: Candidate,
    /// Whether the candidate passed admission and held its reservations.
    pub admitted: bool,
    /// Aggregated reason codes for a blocked candidate.
    pub reason_codes: Vec<String>,
    /// Aggregated risk flags from constraint checks.
    pub risk_flags: Vec<String>,
    /// Utility annotation when the candidate was scored.
    pub score: Option<ScoreResult>,
    /// Action execution result when the candidate was executed.
    pub execution: Option<ExecutionResult>,
    /// Audit-facing explanation for the decision.
    pub explain: ExplainReport,
}

/// Structured evaluation report for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Terminal outcome for the event.
    pub outcome: PipelineOutcome,
    /// Event-level reason codes (missing plugin configuration and the like).
    pub reason_codes: Vec<String>,
    /// Per-candidate reports in instance order.
    pub candidates: Vec<CandidateReport>,
}

impl EvaluationReport {
    /// Returns a no-match report.
    #[must_use]
    pub const fn no_match() -> Self {
        Self {
            outcome: PipelineOutcome::NoMatch,
            reason_codes: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Returns an event-level blocked report with one reason code.
    #[must_use]
    pub fn blocked(reason_code: impl Into<String>) -> Self {
        Self {
            outcome: PipelineOutcome::Blocked,
            reason_codes: vec![reason_code.into()],
            candidates: Vec::new(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pipeline execution errors.
///
/// Only infrastructure failures surface here; every expected domain outcome
/// is part of [`EvaluationReport`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Resource store failure during admission or rollback.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Policy Pipeline
// ============================================================================

/// Admission outcome for one candidate, private to the pipeline.
enum Admission {
    /// Every constraint passed and reserved.
    Admitted {
        /// Reservations held for the candidate, in reserve order.
        reservations: Vec<Reservation>,
    },
    /// A check or reserve failed; all prior reservations were rolled back.
    Blocked {
        /// Aggregated failing reason codes.
        reason_codes: Vec<String>,
        /// Aggregated risk flags.
        risk_flags: Vec<String>,
    },
}

/// One committed reservation together with the plugin that owns it.
struct Reservation {
    /// Owning constraint plugin.
    plugin: Arc<dyn ConstraintPlugin + Send + Sync>,
    /// Token returned by `reserve`.
    token: ReservationToken,
}

/// Policy evaluation pipeline.
pub struct PolicyPipeline<S, C> {
    /// Plugin registry consulted for every capability.
    registry: Arc<PluginRegistry>,
    /// Execution adapter compiling and running admitted policies.
    adapter: ExecutionAdapter,
    /// Shared resource store passed into every constraint call.
    store: S,
    /// Clock injected into window-sensitive constraints.
    clock: C,
}

impl<S, C> PolicyPipeline<S, C>
where
    S: ResourceStore,
    C: Clock,
{
    /// Creates a pipeline over the given registry, store, and clock.
    #[must_use]
    pub fn new(registry: Arc<PluginRegistry>, store: S, clock: C) -> Self {
        let adapter = ExecutionAdapter::new(Arc::clone(&registry));
        Self {
            registry,
            adapter,
            store,
            clock,
        }
    }

    /// Returns the resource store handle.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Evaluates one policy against one incoming event.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] when the resource store fails; every
    /// expected domain outcome is reported structurally instead.
    pub fn evaluate(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
    ) -> Result<EvaluationReport, PipelineError> {
        let Some(trigger) = self.registry.trigger(&policy.trigger.plugin) else {
            return Ok(EvaluationReport::blocked(format!(
                "trigger plugin missing: {}",
                policy.trigger.plugin
            )));
        };
        if !trigger.matches(policy, ctx) {
            return Ok(EvaluationReport::no_match());
        }

        let requested = trigger.requested_instances(policy, ctx).max(1);
        let allowed = policy.program.max_instances.max(1);
        let instances = requested.min(allowed);

        let Some(segment) = self.registry.segment(&policy.segment.plugin) else {
            return Ok(EvaluationReport::blocked(format!(
                "segment plugin missing: {}",
                policy.segment.plugin
            )));
        };
        if !segment.matches(policy, ctx) {
            // Segment exclusion is silent: no reason codes propagate upward.
            return Ok(EvaluationReport::no_match());
        }

        let mut candidates = Vec::with_capacity(instances as usize);
        for instance in 0..instances {
            let candidate = Candidate {
                instance,
            };
            let report = self.evaluate_candidate(policy, ctx, candidate)?;
            candidates.push(report);
        }

        let outcome = if candidates.iter().any(|report| report.execution.is_some()) {
            PipelineOutcome::Executed
        } else {
            PipelineOutcome::Blocked
        };
        Ok(EvaluationReport {
            outcome,
            reason_codes: Vec::new(),
            candidates,
        })
    }

    /// Runs admission, scoring, and execution for one candidate.
    fn evaluate_candidate(
        &self,
        policy: &Policy,
        ctx: &TriggerContext,
        candidate: Candidate,
    ) -> Result<CandidateReport, PipelineError> {
        let admission = self.admit(policy, ctx)?;
        let reservations = match admission {
            Admission::Admitted {
                reservations,
            } => reservations,
            Admission::Blocked {
                reason_codes,
                risk_flags,
            } => {
                let constraint = ConstraintResult {
                    ok: false,
                    reason_codes: reason_codes.clone(),
                    risk_flags: risk_flags.clone(),
                };
                return Ok(CandidateReport {
                    candidate,
                    admitted: false,
                    reason_codes,
                    risk_flags,
                    score: None,
                    execution: None,
                    explain: ExecutionAdapter::explain(policy, None, &constraint),
                });
            }
        };

        let score = match self.score(policy, ctx) {
            Ok(score) => score,
            Err(reason) => {
                // A scorer failure hard-fails this candidate only; its
                // reservations must not be abandoned silently.
                self.rollback(&reservations)?;
                let constraint = ConstraintResult {
                    ok: false,
                    reason_codes: vec![reason.clone()],
                    risk_flags: Vec::new(),
                };
                return Ok(CandidateReport {
                    candidate,
                    admitted: false,
                    reason_codes: vec![reason],
                    risk_flags: Vec::new(),
                    score: None,
                    execution: None,
                    explain: ExecutionAdapter::explain(policy, None, &constraint),
                });
            }
        };

        let plan = ExecutionAdapter::compile(policy, &ctx.trace_id);
        let execution = self.adapter.execute(ctx, policy, &plan);
        let constraint = ConstraintResult::passed();
        let explain = ExecutionAdapter::explain(policy, Some(&score), &constraint);
        Ok(CandidateReport {
            candidate,
            admitted: true,
            reason_codes: Vec::new(),
            risk_flags: Vec::new(),
            score: Some(score),
            execution: Some(execution),
            explain,
        })
    }

    /// Runs every constraint's check, then reserves in the same order,
    /// rolling back already-held reservations in reverse on a failed reserve.
    fn admit(&self, policy: &Policy, ctx: &TriggerContext) -> Result<Admission, PipelineError> {
        let mut reason_codes = Vec::new();
        let mut risk_flags = Vec::new();
        let mut plugins = Vec::with_capacity(policy.constraints.len());

        for spec in &policy.constraints {
            let Some(plugin) = self.registry.constraint(&spec.plugin) else {
                reason_codes.push(format!("constraint plugin missing: {}", spec.plugin));
                continue;
            };
            match plugin.check(policy, ctx, spec, &ctx.estimate, &self.store, &self.clock) {
                Ok(result) => {
                    if !result.ok {
                        reason_codes.extend(result.reason_codes);
                        risk_flags.extend(result.risk_flags);
                    }
                    plugins.push((plugin, spec));
                }
                Err(ConstraintError::InvalidParams {
                    ..
                }) => {
                    reason_codes.push(format!("constraint params invalid: {}", spec.plugin));
                }
                Err(ConstraintError::Store(err)) => return Err(err.into()),
            }
        }

        if !reason_codes.is_empty() {
            return Ok(Admission::Blocked {
                reason_codes,
                risk_flags,
            });
        }

        let mut reservations: Vec<Reservation> = Vec::with_capacity(plugins.len());
        for (plugin, spec) in plugins {
            let outcome =
                match plugin.reserve(policy, ctx, spec, &ctx.estimate, &self.store, &self.clock) {
                    Ok(outcome) => outcome,
                    Err(ConstraintError::InvalidParams {
                        plugin: name,
                        message,
                    }) => {
                        self.rollback(&reservations)?;
                        return Ok(Admission::Blocked {
                            reason_codes: vec![format!(
                                "constraint params invalid: {name}: {message}"
                            )],
                            risk_flags: Vec::new(),
                        });
                    }
                    Err(ConstraintError::Store(err)) => return Err(err.into()),
                };
            if !outcome.ok {
                self.rollback(&reservations)?;
                return Ok(Admission::Blocked {
                    reason_codes: outcome.reason_codes,
                    risk_flags: Vec::new(),
                });
            }
            if let Some(token) = outcome.reserved {
                reservations.push(Reservation {
                    plugin: Arc::clone(&plugin),
                    token,
                });
            }
        }

        Ok(Admission::Admitted {
            reservations,
        })
    }

    /// Releases held reservations in reverse reserve order.
    fn rollback(&self, reservations: &[Reservation]) -> Result<(), PipelineError> {
        for reservation in reservations.iter().rev() {
            match reservation.plugin.release(&reservation.token, &self.store) {
                Ok(()) | Err(ConstraintError::InvalidParams { .. }) => {}
                Err(ConstraintError::Store(err)) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Scores an admitted candidate; failures report a reason string.
    fn score(&self, policy: &Policy, ctx: &TriggerContext) -> Result<ScoreResult, String> {
        let Some(scorer) = self.registry.scorer(&policy.scoring.plugin) else {
            return Err(format!("scorer plugin missing: {}", policy.scoring.plugin));
        };
        scorer
            .score(policy, ctx, &ctx.estimate)
            .map_err(|err| format!("scorer failed: {err}"))
    }
}
