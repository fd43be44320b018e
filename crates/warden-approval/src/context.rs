//! Per-evaluation context handed to the arbitrator.

use serde::Serialize;

use crate::policy::SecurityRule;

/// Everything the arbitrator needs to judge one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionContext {
    /// Policy module.
    pub module: String,
    /// Policy method.
    pub method: String,
    /// Operation arguments as given by the caller.
    pub args: serde_json::Value,
    /// The rule that matched.
    pub rule: SecurityRule,
    /// Messaging session the call arrived on, if any.
    pub session_key: Option<String>,
}

impl ExecutionContext {
    /// Build a context. Empty session keys count as no session.
    #[must_use]
    pub fn new(
        module: impl Into<String>,
        method: impl Into<String>,
        args: serde_json::Value,
        rule: SecurityRule,
        session_key: Option<&str>,
    ) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
            args,
            rule,
            session_key: session_key
                .filter(|s| !s.trim().is_empty())
                .map(str::to_owned),
        }
    }

    /// `module.method`.
    #[must_use]
    pub fn operation(&self) -> String {
        format!("{}.{}", self.module, self.method)
    }

    /// Risk description from the rule.
    #[must_use]
    pub fn risk(&self) -> &str {
        self.rule.description_or_default()
    }

    /// Arguments rendered for a human.
    #[must_use]
    pub fn args_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.args).unwrap_or_else(|_| self.args.to_string())
    }
}
