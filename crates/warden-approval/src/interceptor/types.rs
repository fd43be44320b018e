use warden_audit::AuditDecision;

use crate::arbitrator::ApprovalSource;

/// The result of a successful evaluation: the caller may proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptResult {
    /// Policy module that was evaluated.
    pub module: String,
    /// Policy method that was evaluated.
    pub method: String,
    /// How the operation was authorized.
    pub proof: InterceptProof,
    /// Time from evaluation start to decision.
    pub decision_time_ms: u64,
}

impl InterceptResult {
    /// Audit decision this result was reported as.
    #[must_use]
    pub fn decision(&self) -> AuditDecision {
        match self.proof {
            InterceptProof::PolicyAllowed => AuditDecision::Allowed,
            InterceptProof::UserApproval { .. } => AuditDecision::Approved,
        }
    }
}

/// How an operation was authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptProof {
    /// The rule said ALLOW.
    PolicyAllowed,
    /// The rule said ASK and a human approved.
    UserApproval {
        /// Which kind of approval.
        source: ApprovalSource,
    },
}
