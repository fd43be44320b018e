use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal outcome of one interceptor evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditDecision {
    /// Rule said ALLOW; executed without asking.
    Allowed,
    /// Rule said ASK and a human (or a standing grant) approved.
    Approved,
    /// Rule said ASK and the operation did not proceed.
    Rejected,
    /// Rule said DENY.
    Blocked,
}

impl AuditDecision {
    /// Whether the caller was told to proceed.
    #[must_use]
    pub fn is_permitted(self) -> bool {
        matches!(self, Self::Allowed | Self::Approved)
    }
}

impl fmt::Display for AuditDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Allowed => "ALLOWED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Blocked => "BLOCKED",
        };
        f.write_str(s)
    }
}

/// One line in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// When the decision was reached.
    pub timestamp: DateTime<Utc>,
    /// Policy module of the operation.
    pub module: String,
    /// Policy method of the operation.
    pub method: String,
    /// Arguments as supplied by the caller.
    pub args: serde_json::Value,
    /// What was decided.
    pub decision: AuditDecision,
    /// Wall time from evaluation start to decision.
    pub decision_time_ms: u64,
    /// Session or user the decision applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Why the operation was refused, when it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditRecord {
    /// Create a record stamped with the current time.
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        method: impl Into<String>,
        args: serde_json::Value,
        decision: AuditDecision,
        decision_time_ms: u64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            method: method.into(),
            args,
            decision,
            decision_time_ms,
            user_id: None,
            reason: None,
        }
    }

    /// Attach the session or user identifier.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attach a refusal reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
