//! The single entry point for gating an operation.
//!
//! # Evaluation Flow
//!
//! 1. **Resolve** the rule for `(module, method)`.
//! 2. **Execute** it:
//!    - ALLOW proceeds.
//!    - DENY fails with [`ApprovalError::PolicyDenied`].
//!    - ASK goes to the [`Arbitrator`].
//! 3. **Report** the outcome, with its decision time, to the audit and
//!    stats sinks.

/// Audit record construction and sink delivery.
pub mod audit;
/// Result types.
pub mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use warden_audit::{AuditDecision, AuditSink, NullSink, StatsSink};
use warden_config::Config;

use crate::arbitrator::{Arbitrator, ArbitratorConfig, Judgment};
use crate::context::ExecutionContext;
use crate::error::{ApprovalError, ApprovalResult};
use crate::interceptor::audit::{deliver, elapsed_ms, outcome_record};
use crate::operation::OperationMap;
use crate::policy::{RuleAction, SecurityPolicy};
use crate::queue::ApprovalQueue;
use crate::reply::{ReplyDecision, ReplyOutcome};

/// Policy evaluation plus arbitration, with every outcome reported.
pub struct Interceptor {
    policy: SecurityPolicy,
    arbitrator: Arbitrator,
    operations: OperationMap,
    audit: Arc<dyn AuditSink>,
    stats: Arc<dyn StatsSink>,
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("policy", &self.policy)
            .field("arbitrator", &self.arbitrator)
            .field("operations", &self.operations.len())
            .finish_non_exhaustive()
    }
}

impl Interceptor {
    /// Interceptor with the built-in operation map and discarding sinks.
    #[must_use]
    pub fn new(policy: SecurityPolicy, arbitrator: Arbitrator) -> Self {
        Self {
            policy,
            arbitrator,
            operations: OperationMap::builtin(),
            audit: Arc::new(NullSink),
            stats: Arc::new(NullSink),
        }
    }

    /// Interceptor wired from a loaded configuration around an existing
    /// queue.
    #[must_use]
    pub fn from_config(config: &Config, queue: Arc<ApprovalQueue>) -> Self {
        let arbitrator = Arbitrator::new(queue, ArbitratorConfig::from(&config.approval));
        Self::new(SecurityPolicy::from(&config.policy), arbitrator)
            .with_operations(OperationMap::with_overrides(&config.operations))
    }

    /// Send audit records to `sink`.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = sink;
        self
    }

    /// Send decision counts to `sink`.
    #[must_use]
    pub fn with_stats_sink(mut self, sink: Arc<dyn StatsSink>) -> Self {
        self.stats = sink;
        self
    }

    /// Replace the tool name table.
    #[must_use]
    pub fn with_operations(mut self, operations: OperationMap) -> Self {
        self.operations = operations;
        self
    }

    /// Replace the arbitrator.
    #[must_use]
    pub fn with_arbitrator(mut self, arbitrator: Arbitrator) -> Self {
        self.arbitrator = arbitrator;
        self
    }

    /// The policy in force.
    #[must_use]
    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// The arbitrator used for ASK rules.
    #[must_use]
    pub fn arbitrator(&self) -> &Arbitrator {
        &self.arbitrator
    }

    /// The tool name table.
    #[must_use]
    pub fn operations(&self) -> &OperationMap {
        &self.operations
    }

    /// Decide whether an operation may proceed.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::PolicyDenied`] for a DENY rule or a terminal reject.
    /// - [`ApprovalError::ApprovalPending`] when a channel request was opened.
    /// - [`ApprovalError::NoApprovalChannel`] for an ASK with nobody to ask.
    pub async fn evaluate(
        &self,
        module: &str,
        method: &str,
        args: serde_json::Value,
        session_key: Option<&str>,
    ) -> ApprovalResult<InterceptResult> {
        let started = Instant::now();
        let rule = self.policy.lookup(module, method);
        debug!(module, method, action = %rule.action, "resolved rule");

        let ctx = ExecutionContext::new(module, method, args, rule, session_key);

        match ctx.rule.action {
            RuleAction::Allow => {
                let ms = elapsed_ms(started);
                self.report(&ctx, AuditDecision::Allowed, ms, None).await;
                Ok(Self::proceed(&ctx, InterceptProof::PolicyAllowed, ms))
            },
            RuleAction::Deny => {
                let reason = ctx.risk().to_owned();
                let ms = elapsed_ms(started);
                info!(operation = %ctx.operation(), %reason, "blocked by policy");
                self.report(&ctx, AuditDecision::Blocked, ms, Some(&reason)).await;
                Err(ApprovalError::PolicyDenied {
                    module: ctx.module,
                    method: ctx.method,
                    reason,
                })
            },
            RuleAction::Ask => self.arbitrate(ctx, started).await,
        }
    }

    /// Map a host tool name to its operation, then [`evaluate`](Self::evaluate).
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub async fn evaluate_tool(
        &self,
        tool_name: &str,
        args: serde_json::Value,
        session_key: Option<&str>,
    ) -> ApprovalResult<InterceptResult> {
        let op = self.operations.resolve(tool_name);
        debug!(tool = tool_name, operation = %op, "mapped tool");
        self.evaluate(&op.module, &op.method, args, session_key)
            .await
    }

    /// Parse and apply a human's reply for a session.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidReply`] if the text is not a known
    /// decision.
    pub fn reply(&self, session_key: &str, raw: &str) -> ApprovalResult<ReplyOutcome> {
        let decision: ReplyDecision = raw.parse()?;
        Ok(self.arbitrator.handle_reply(session_key, decision))
    }

    async fn arbitrate(
        &self,
        ctx: ExecutionContext,
        started: Instant,
    ) -> ApprovalResult<InterceptResult> {
        // The arbitrator takes the context by value; keep what the report
        // and the error need.
        let snapshot = ctx.clone();
        let judgment = self.arbitrator.judge(ctx).await;
        let ms = elapsed_ms(started);

        match judgment {
            Judgment::Approved(source) => {
                self.report(&snapshot, AuditDecision::Approved, ms, None).await;
                Ok(Self::proceed(
                    &snapshot,
                    InterceptProof::UserApproval { source },
                    ms,
                ))
            },
            Judgment::Rejected { reason } => {
                self.report(&snapshot, AuditDecision::Rejected, ms, Some(&reason)).await;
                Err(ApprovalError::PolicyDenied {
                    module: snapshot.module,
                    method: snapshot.method,
                    reason,
                })
            },
            Judgment::Pending { instructions } => {
                self.report(
                    &snapshot,
                    AuditDecision::Rejected,
                    ms,
                    Some("awaiting approval"),
                )
                .await;
                Err(ApprovalError::ApprovalPending {
                    module: snapshot.module,
                    method: snapshot.method,
                    instructions,
                })
            },
            Judgment::NoChannel => {
                self.report(
                    &snapshot,
                    AuditDecision::Rejected,
                    ms,
                    Some("no approval channel"),
                )
                .await;
                Err(ApprovalError::NoApprovalChannel {
                    module: snapshot.module,
                    method: snapshot.method,
                })
            },
        }
    }

    fn proceed(ctx: &ExecutionContext, proof: InterceptProof, ms: u64) -> InterceptResult {
        InterceptResult {
            module: ctx.module.clone(),
            method: ctx.method.clone(),
            proof,
            decision_time_ms: ms,
        }
    }

    async fn report(
        &self,
        ctx: &ExecutionContext,
        decision: AuditDecision,
        ms: u64,
        reason: Option<&str>,
    ) {
        let record = outcome_record(ctx, decision, ms, reason);
        deliver(&self.audit, &self.stats, &record).await;
    }
}
