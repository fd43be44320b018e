//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use warden_approval::{
    ApprovalPrompt, ApprovalQueue, Arbitrator, ArbitratorConfig, FixedPrompt, Interceptor,
    ManualClock, QueueConfig, RuleAction, SecurityPolicy, SecurityRule, StaticProbe,
};
use warden_audit::{AuditSink, DecisionStats, InMemoryAuditLog};

/// `{FileSystem: {read: ALLOW, delete: DENY}, default: ASK}`.
pub fn reference_policy() -> SecurityPolicy {
    SecurityPolicy::new(RuleAction::Ask)
        .with_rule("FileSystem", "read", SecurityRule::allow())
        .with_rule(
            "FileSystem",
            "delete",
            SecurityRule::deny("Deleting files is not permitted"),
        )
        .with_rule(
            "Shell",
            "bash",
            SecurityRule::ask("Runs arbitrary shell commands"),
        )
}

/// Where the arbitrator can reach a human.
#[derive(Debug, Clone, Copy)]
pub enum Environment {
    /// A terminal that always answers the same.
    Terminal { approve: bool },
    /// No terminal. Sessions use the channel flow.
    Detached,
}

/// A fully wired interceptor with observable collaborators.
pub struct Stack {
    pub interceptor: Interceptor,
    pub queue: Arc<ApprovalQueue>,
    pub clock: Arc<ManualClock>,
    pub audit: Arc<InMemoryAuditLog>,
    pub stats: Arc<DecisionStats>,
}

pub struct StackBuilder {
    policy: SecurityPolicy,
    environment: Environment,
    reply_tool_available: bool,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl StackBuilder {
    pub fn new() -> Self {
        Self {
            policy: reference_policy(),
            environment: Environment::Detached,
            reply_tool_available: false,
            audit_sink: None,
        }
    }

    pub fn policy(mut self, policy: SecurityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn reply_tool(mut self) -> Self {
        self.reply_tool_available = true;
        self
    }

    /// Send audit records somewhere other than the in-memory log.
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn build(self) -> Stack {
        let clock = Arc::new(ManualClock::starting_now());
        let queue = Arc::new(ApprovalQueue::with_clock(
            QueueConfig::default(),
            clock.clone(),
        ));

        let config = ArbitratorConfig {
            reply_tool_available: self.reply_tool_available,
            ..ArbitratorConfig::default()
        };
        let mut arbitrator = Arbitrator::new(queue.clone(), config);
        arbitrator = match self.environment {
            Environment::Terminal { approve } => {
                let prompt: Arc<dyn ApprovalPrompt> = if approve {
                    Arc::new(FixedPrompt::approving())
                } else {
                    Arc::new(FixedPrompt::rejecting())
                };
                arbitrator
                    .with_probe(Arc::new(StaticProbe(true)))
                    .with_prompt(prompt)
            },
            Environment::Detached => arbitrator.with_probe(Arc::new(StaticProbe(false))),
        };

        let audit = Arc::new(InMemoryAuditLog::new());
        let stats = Arc::new(DecisionStats::new());
        let audit_sink: Arc<dyn AuditSink> = match self.audit_sink {
            Some(sink) => sink,
            None => audit.clone(),
        };

        let interceptor = Interceptor::new(self.policy, arbitrator)
            .with_audit_sink(audit_sink)
            .with_stats_sink(stats.clone());

        Stack {
            interceptor,
            queue,
            clock,
            audit,
            stats,
        }
    }
}

/// A session key no other test shares.
pub fn unique_session() -> String {
    format!("session-{}", uuid::Uuid::new_v4())
}
