//! Human replies on a messaging channel and the text that asks for them.

use chrono::Duration;
use std::fmt;
use std::str::FromStr;

use crate::context::ExecutionContext;
use crate::error::ApprovalError;

/// A human's answer to a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDecision {
    /// Approve everything pending for the session, once.
    Yes,
    /// Reject everything pending for the session.
    No,
    /// Approve, and keep approving the same operations for a while.
    Allow,
}

impl FromStr for ReplyDecision {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "approve" | "ok" => Ok(Self::Yes),
            "no" | "n" | "reject" | "deny" => Ok(Self::No),
            "allow" => Ok(Self::Allow),
            _ => Err(ApprovalError::InvalidReply {
                input: s.to_owned(),
            }),
        }
    }
}

impl fmt::Display for ReplyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yes => write!(f, "yes"),
            Self::No => write!(f, "no"),
            Self::Allow => write!(f, "allow"),
        }
    }
}

/// What a reply did to the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Pending operations were approved for one retry each.
    Approved {
        /// Number of operations approved.
        count: usize,
    },
    /// Pending operations were rejected.
    Denied {
        /// Number of operations rejected.
        count: usize,
    },
    /// Pending operations were approved and granted a blanket allow.
    AllowedFor {
        /// The `(module, method)` pairs covered.
        operations: Vec<(String, String)>,
        /// How long the grant lasts.
        duration: Duration,
    },
    /// The session had nothing pending.
    NothingPending,
}

impl fmt::Display for ReplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Approved { count } => write!(
                f,
                "Approved {count} pending operation(s). Retry them now to proceed."
            ),
            Self::Denied { count } => write!(f, "Rejected {count} pending operation(s)."),
            Self::AllowedFor {
                operations,
                duration,
            } => {
                let ops: Vec<String> = operations
                    .iter()
                    .map(|(module, method)| format!("{module}.{method}"))
                    .collect();
                write!(
                    f,
                    "Allowed {} for {}. Retry them now to proceed.",
                    ops.join(", "),
                    describe_duration(*duration)
                )
            },
            Self::NothingPending => write!(f, "There are no pending approvals for this session."),
        }
    }
}

/// `"10 minutes"`, `"1 minute"` or `"45 seconds"`.
#[must_use]
pub fn describe_duration(duration: Duration) -> String {
    let secs = duration.num_seconds();
    match (secs.checked_rem(60), secs.checked_div(60)) {
        (Some(0), Some(1)) => "1 minute".to_owned(),
        (Some(0), Some(mins)) if mins > 0 => format!("{mins} minutes"),
        _ if secs == 1 => "1 second".to_owned(),
        _ => format!("{secs} seconds"),
    }
}

/// Instructions relayed to the human when an operation is suspended.
///
/// With a reply tool the agent collects the answer and calls the tool;
/// without one, the human approves by having the agent retry the same
/// operation inside the retry window.
#[must_use]
pub fn channel_instructions(
    ctx: &ExecutionContext,
    reply_tool: Option<&str>,
    retry_window: Duration,
    blanket_allow: Duration,
) -> String {
    let header = format!(
        "Approval required for {} ({}).",
        ctx.operation(),
        ctx.risk()
    );
    match reply_tool {
        Some(tool) => format!(
            "{header} Ask the user to reply \"yes\" to approve once, \"no\" to reject, \
             or \"allow\" to approve it for {}. Then call the `{tool}` tool with their \
             answer and retry the operation if approved.",
            describe_duration(blanket_allow)
        ),
        None => format!(
            "{header} Ask the user to confirm. If they approve, retry this exact \
             operation within {} seconds. If they decline, do not retry.",
            retry_window.num_seconds()
        ),
    }
}
