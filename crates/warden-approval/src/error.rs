/// Errors surfaced to the caller of the interceptor.
///
/// Every variant means "do not proceed". The `Display` text is what the
/// calling agent relays to the human, so it is kept stable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    /// A DENY rule matched, or a human rejected an ASK.
    #[error("blocked by policy: {module}.{method} - {reason}")]
    PolicyDenied {
        /// Policy module of the operation.
        module: String,
        /// Policy method of the operation.
        method: String,
        /// Rule description or rejection reason.
        reason: String,
    },

    /// An approval request is open on a messaging channel. The message is
    /// the reply protocol, verbatim.
    #[error("{instructions}")]
    ApprovalPending {
        /// Policy module of the operation.
        module: String,
        /// Policy method of the operation.
        method: String,
        /// How the human approves or rejects.
        instructions: String,
    },

    /// ASK with neither a terminal nor a session to ask through.
    #[error("approval required for {module}.{method} but no approval channel is available")]
    NoApprovalChannel {
        /// Policy module of the operation.
        module: String,
        /// Policy method of the operation.
        method: String,
    },

    /// A reply that is not one of `yes`, `no` or `allow`.
    #[error("unrecognized reply '{input}'; expected yes, no, or allow")]
    InvalidReply {
        /// The raw reply text.
        input: String,
    },
}

impl ApprovalError {
    /// Whether this is the channel-mode "ask the human and retry" signal.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::ApprovalPending { .. })
    }
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
