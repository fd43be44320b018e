//! Common imports for hosts embedding the interceptor.
//!
//! ```
//! use warden_approval::prelude::*;
//! ```

pub use crate::{
    ApprovalError, ApprovalPrompt, ApprovalQueue, ApprovalResult, Arbitrator, ArbitratorConfig,
    DialoguerPrompt, EnvironmentProbe, InterceptProof, InterceptResult, Interceptor, QueueConfig,
    ReplyDecision, ReplyOutcome, RuleAction, SecurityPolicy, SecurityRule, StaticProbe,
    TerminalProbe,
};
