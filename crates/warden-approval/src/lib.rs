//! Warden Approval - policy evaluation and human arbitration.
//!
//! Every operation an agent wants to perform is passed through the
//! [`Interceptor`], which resolves a rule for it and acts on the rule:
//!
//! - **ALLOW**: proceed.
//! - **DENY**: refuse with [`ApprovalError::PolicyDenied`].
//! - **ASK**: hand the operation to the [`Arbitrator`], which asks a human on
//!   the terminal, opens a request on the messaging session through the
//!   [`ApprovalQueue`], or refuses when there is nobody to ask.
//!
//! In channel mode the human's answer arrives on a later call, so the queue
//! keeps a short-lived pending entry per `session::module.method`. The human
//! either replies through the host's reply tool
//! ([`Interceptor::reply`]) or tells the agent to retry the same operation
//! inside the retry window.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use warden_approval::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let policy = SecurityPolicy::new(RuleAction::Ask)
//!     .with_rule("FileSystem", "read", SecurityRule::allow());
//! let queue = Arc::new(ApprovalQueue::default());
//! let arbitrator = Arbitrator::new(queue, ArbitratorConfig::default())
//!     .with_probe(Arc::new(StaticProbe(false)));
//! let interceptor = Interceptor::new(policy, arbitrator);
//!
//! assert!(interceptor.evaluate("FileSystem", "read", serde_json::json!([]), None).await.is_ok());
//!
//! let err = interceptor
//!     .evaluate("Shell", "bash", serde_json::json!({}), Some("chat-1"))
//!     .await
//!     .unwrap_err();
//! assert!(err.is_pending());
//!
//! // The human says yes; the retried call goes through.
//! interceptor.reply("chat-1", "yes").unwrap();
//! let retried = interceptor
//!     .evaluate("Shell", "bash", serde_json::json!({}), Some("chat-1"))
//!     .await;
//! assert!(retried.is_ok());
//! # });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

/// Mode selection and channel-mode judgment.
pub mod arbitrator;
/// Injectable time source.
pub mod clock;
/// Per-evaluation context.
pub mod context;
/// Error types and results for the approval module.
pub mod error;
pub mod interceptor;
/// Host tool name mapping.
pub mod operation;
pub mod policy;
/// Terminal approval prompt.
pub mod prompt;
pub mod queue;
/// Reply parsing and channel instructions.
pub mod reply;

pub use arbitrator::{
    ApprovalSource, ArbitrationMode, Arbitrator, ArbitratorConfig, EnvironmentProbe, Judgment,
    StaticProbe, TerminalProbe,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context::ExecutionContext;
pub use error::{ApprovalError, ApprovalResult};
pub use interceptor::{InterceptProof, InterceptResult, Interceptor};
pub use operation::{OperationId, OperationMap};
pub use policy::{RuleAction, SecurityPolicy, SecurityRule};
pub use prompt::{ApprovalPrompt, DialoguerPrompt, FixedPrompt};
pub use queue::{ApprovalEntry, ApprovalKey, ApprovalQueue, ApprovalStatus, QueueConfig};
pub use reply::{ReplyDecision, ReplyOutcome};
