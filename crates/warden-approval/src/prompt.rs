//! Terminal prompt for interactive mode.

use async_trait::async_trait;
use dialoguer::{Select, theme::ColorfulTheme};
use tracing::warn;

use crate::context::ExecutionContext;

/// Asks a human, synchronously from the caller's point of view.
#[async_trait]
pub trait ApprovalPrompt: Send + Sync {
    /// Show the operation and return `true` if the human approved it.
    ///
    /// Implementations must return `false` when they cannot ask.
    async fn confirm(&self, ctx: &ExecutionContext) -> bool;
}

/// Prompt on the controlling terminal with `dialoguer`.
///
/// The prompt blocks, so it runs on tokio's blocking pool. Any I/O error
/// while prompting counts as a rejection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoguerPrompt;

impl DialoguerPrompt {
    /// Create a new terminal prompt.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ApprovalPrompt for DialoguerPrompt {
    async fn confirm(&self, ctx: &ExecutionContext) -> bool {
        let operation = ctx.operation();
        let risk = ctx.risk().to_owned();
        let args = ctx.args_pretty();

        let task = tokio::task::spawn_blocking(move || {
            eprintln!();
            eprintln!("--- Approval Required ---");
            eprintln!("  Operation: {operation}");
            eprintln!("  Risk:      {risk}");
            eprintln!("  Arguments: {args}");
            eprintln!("-------------------------");

            Select::with_theme(&ColorfulTheme::default())
                .with_prompt("Allow this operation?")
                .items(&["Approve", "Reject"])
                .default(1)
                .interact()
        });

        match task.await {
            Ok(Ok(selection)) => selection == 0,
            Ok(Err(e)) => {
                warn!(error = %e, "terminal prompt failed; treating as reject");
                false
            },
            Err(e) => {
                warn!(error = %e, "terminal prompt task failed; treating as reject");
                false
            },
        }
    }
}

/// Prompt that always gives the same answer. For hosts that decide out of
/// band, and for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompt {
    approve: bool,
}

impl FixedPrompt {
    /// Always approve.
    #[must_use]
    pub fn approving() -> Self {
        Self { approve: true }
    }

    /// Always reject.
    #[must_use]
    pub fn rejecting() -> Self {
        Self { approve: false }
    }
}

#[async_trait]
impl ApprovalPrompt for FixedPrompt {
    async fn confirm(&self, _ctx: &ExecutionContext) -> bool {
        self.approve
    }
}
