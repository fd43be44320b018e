//! Human arbitration for operations whose rule says ASK.
//!
//! The arbitrator picks one of three strategies per call:
//!
//! - **Interactive**: a terminal is attached. Ask through the
//!   [`ApprovalPrompt`] and return the answer. The queue is not touched.
//! - **Channel**: the call arrived on a messaging session. Consult the
//!   [`ApprovalQueue`] and, if nothing authorizes the call yet, open a
//!   pending request and hand back instructions for the human.
//! - **Headless**: neither. Reject.

use chrono::Duration;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use warden_config::ApprovalSection;

use crate::context::ExecutionContext;
use crate::prompt::{ApprovalPrompt, DialoguerPrompt};
use crate::queue::{ApprovalQueue, duration_from_secs};
use crate::reply::{ReplyDecision, ReplyOutcome, channel_instructions};

/// Default lifetime of an `allow` reply.
pub const DEFAULT_BLANKET_ALLOW: Duration = Duration::minutes(10);

/// Reports whether a human is sitting at a terminal.
pub trait EnvironmentProbe: Send + Sync {
    /// Whether an interactive prompt can be shown.
    fn is_interactive(&self) -> bool;
}

/// Probe that checks whether stdin and stderr are terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalProbe;

impl EnvironmentProbe for TerminalProbe {
    fn is_interactive(&self) -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }
}

/// Probe with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

impl EnvironmentProbe for StaticProbe {
    fn is_interactive(&self) -> bool {
        self.0
    }
}

/// Strategy chosen for one judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArbitrationMode {
    /// Ask on the terminal.
    Interactive,
    /// Ask through the messaging session.
    Channel {
        /// Session the approval is scoped to.
        session_key: String,
    },
    /// Nobody to ask.
    Headless,
}

impl ArbitrationMode {
    /// Terminal wins over a session; neither means headless.
    #[must_use]
    pub fn resolve(interactive: bool, session_key: Option<&str>) -> Self {
        if interactive {
            return Self::Interactive;
        }
        match session_key {
            Some(session) if !session.trim().is_empty() => Self::Channel {
                session_key: session.to_owned(),
            },
            _ => Self::Headless,
        }
    }
}

/// How an ASK came to be approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalSource {
    /// Approved at the terminal.
    Interactive,
    /// Covered by an `allow` reply.
    BlanketAllow,
    /// Approved by an explicit `yes` reply.
    ExplicitReply,
    /// The human approved by retrying inside the window.
    Retry,
}

/// Result of arbitration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgment {
    /// Proceed.
    Approved(ApprovalSource),
    /// Rejected by the human at the terminal.
    Rejected {
        /// Why.
        reason: String,
    },
    /// Waiting for the human. Relay the instructions.
    Pending {
        /// Reply protocol for the human.
        instructions: String,
    },
    /// No way to ask anyone.
    NoChannel,
}

impl Judgment {
    /// Whether the operation may proceed.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved(_))
    }
}

/// Construction-time arbitrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitratorConfig {
    /// Whether the host exposes a reply tool. Fixed for the process.
    pub reply_tool_available: bool,
    /// Name of the reply tool quoted in instructions.
    pub reply_tool_name: String,
    /// Lifetime of an `allow` reply.
    pub blanket_allow: Duration,
}

impl Default for ArbitratorConfig {
    fn default() -> Self {
        Self {
            reply_tool_available: false,
            reply_tool_name: "warden_reply".to_owned(),
            blanket_allow: DEFAULT_BLANKET_ALLOW,
        }
    }
}

impl From<&ApprovalSection> for ArbitratorConfig {
    fn from(section: &ApprovalSection) -> Self {
        Self {
            reply_tool_available: section.reply_tool_available,
            reply_tool_name: section.reply_tool_name.clone(),
            blanket_allow: duration_from_secs(section.blanket_allow_secs),
        }
    }
}

/// Chooses and runs the arbitration strategy for ASK decisions.
pub struct Arbitrator {
    queue: Arc<ApprovalQueue>,
    prompt: Arc<dyn ApprovalPrompt>,
    probe: Arc<dyn EnvironmentProbe>,
    config: ArbitratorConfig,
}

impl std::fmt::Debug for Arbitrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbitrator")
            .field("queue", &self.queue)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Arbitrator {
    /// Arbitrator that prompts with [`DialoguerPrompt`] whenever the
    /// process is attached to a terminal.
    #[must_use]
    pub fn new(queue: Arc<ApprovalQueue>, config: ArbitratorConfig) -> Self {
        Self {
            queue,
            prompt: Arc::new(DialoguerPrompt::new()),
            probe: Arc::new(TerminalProbe),
            config,
        }
    }

    /// Replace the terminal prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<dyn ApprovalPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the environment probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn EnvironmentProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// The shared queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<ApprovalQueue> {
        &self.queue
    }

    /// Settings.
    #[must_use]
    pub fn config(&self) -> &ArbitratorConfig {
        &self.config
    }

    /// Strategy for a call on `session_key`.
    #[must_use]
    pub fn mode_for(&self, session_key: Option<&str>) -> ArbitrationMode {
        ArbitrationMode::resolve(self.probe.is_interactive(), session_key)
    }

    /// Decide an ASK.
    pub async fn judge(&self, ctx: ExecutionContext) -> Judgment {
        match self.mode_for(ctx.session_key.as_deref()) {
            ArbitrationMode::Interactive => self.judge_interactive(&ctx).await,
            ArbitrationMode::Channel { session_key } => self.judge_channel(&session_key, &ctx),
            ArbitrationMode::Headless => {
                warn!(
                    operation = %ctx.operation(),
                    "approval required but no terminal or session is available; rejecting"
                );
                Judgment::NoChannel
            },
        }
    }

    async fn judge_interactive(&self, ctx: &ExecutionContext) -> Judgment {
        if self.prompt.confirm(ctx).await {
            info!(operation = %ctx.operation(), "approved at terminal");
            Judgment::Approved(ApprovalSource::Interactive)
        } else {
            info!(operation = %ctx.operation(), "rejected at terminal");
            Judgment::Rejected {
                reason: "rejected by user".to_owned(),
            }
        }
    }

    fn judge_channel(&self, session: &str, ctx: &ExecutionContext) -> Judgment {
        let (module, method) = (ctx.module.as_str(), ctx.method.as_str());

        if self.queue.has_blanket_allow(session, module, method) {
            debug!(session, operation = %ctx.operation(), "covered by blanket allow");
            return Judgment::Approved(ApprovalSource::BlanketAllow);
        }
        if self.queue.consume(session, module, method) {
            info!(session, operation = %ctx.operation(), "approved by reply");
            return Judgment::Approved(ApprovalSource::ExplicitReply);
        }
        if self.queue.consume_pending(session, module, method) {
            info!(session, operation = %ctx.operation(), "approved by retry");
            return Judgment::Approved(ApprovalSource::Retry);
        }

        let key = self.queue.request(session, module, method);
        info!(key = %key, "approval pending");
        Judgment::Pending {
            instructions: self.instructions(ctx),
        }
    }

    /// The text a channel-mode caller relays to the human.
    #[must_use]
    pub fn instructions(&self, ctx: &ExecutionContext) -> String {
        let tool = self
            .config
            .reply_tool_available
            .then_some(self.config.reply_tool_name.as_str());
        channel_instructions(
            ctx,
            tool,
            self.queue.config().retry_window,
            self.config.blanket_allow,
        )
    }

    /// Apply a human's reply to everything pending on a session.
    pub fn handle_reply(&self, session: &str, decision: ReplyDecision) -> ReplyOutcome {
        let outcome = match decision {
            ReplyDecision::Yes => match self.queue.approve(session) {
                0 => ReplyOutcome::NothingPending,
                count => ReplyOutcome::Approved { count },
            },
            ReplyDecision::No => match self.queue.deny(session) {
                0 => ReplyOutcome::NothingPending,
                count => ReplyOutcome::Denied { count },
            },
            ReplyDecision::Allow => {
                let operations = self.queue.pending_actions(session);
                if operations.is_empty() {
                    ReplyOutcome::NothingPending
                } else {
                    for (module, method) in &operations {
                        self.queue
                            .allow_for(session, module, method, self.config.blanket_allow);
                    }
                    self.queue.approve(session);
                    ReplyOutcome::AllowedFor {
                        operations,
                        duration: self.config.blanket_allow,
                    }
                }
            },
        };
        info!(session, %decision, outcome = %outcome, "handled approval reply");
        outcome
    }
}

#[cfg(test)]
#[path = "arbitrator_tests.rs"]
mod tests;
