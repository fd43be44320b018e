//! Configuration struct definitions.
//!
//! Every section is `#[serde(default)]`, so a partially specified file
//! deserializes cleanly. Scalar defaults match the embedded `defaults.toml`;
//! the built-in policy rules only exist in that file.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level Warden configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy rules consulted for every intercepted operation.
    pub policy: PolicySection,
    /// Timing and capability settings for the approval queue.
    pub approval: ApprovalSection,
    /// Extra host tool name mappings, merged over the built-in table.
    pub operations: BTreeMap<String, OperationTarget>,
    /// Logging settings.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// PolicySection
// ---------------------------------------------------------------------------

/// What a rule tells the interceptor to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleActionSetting {
    /// Run the operation without asking.
    Allow,
    /// Refuse the operation outright.
    Deny,
    /// Suspend the operation until a human decides.
    #[default]
    Ask,
}

impl RuleActionSetting {
    /// Ordering by permissiveness: `deny` < `ask` < `allow`.
    ///
    /// Used by the workspace restriction pass to detect loosening.
    #[must_use]
    pub fn permissiveness(self) -> u8 {
        match self {
            Self::Deny => 0,
            Self::Ask => 1,
            Self::Allow => 2,
        }
    }

    /// Parse from the lowercase TOML spelling.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "allow" => Some(Self::Allow),
            "deny" => Some(Self::Deny),
            "ask" => Some(Self::Ask),
            _ => None,
        }
    }
}

impl fmt::Display for RuleActionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// A single `(module, method)` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSection {
    /// Decision for this operation.
    pub action: RuleActionSetting,
    /// Human-readable risk description shown in prompts and denials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Policy definition: a default action plus per-module method rules.
///
/// ```toml
/// [policy]
/// default_action = "ask"
///
/// [policy.modules.FileSystem.delete]
/// action = "deny"
/// description = "Deletion cannot be undone"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySection {
    /// Action applied when no rule matches.
    pub default_action: RuleActionSetting,
    /// Rules keyed by module name, then method name.
    pub modules: BTreeMap<String, BTreeMap<String, RuleSection>>,
}

// ---------------------------------------------------------------------------
// ApprovalSection
// ---------------------------------------------------------------------------

/// Approval queue timings and reply capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApprovalSection {
    /// Lifetime of a pending or approved entry, in seconds.
    pub ttl_secs: u64,
    /// Maximum age of a pending entry for a retry to count as approval.
    pub retry_window_secs: u64,
    /// Minimum interval between expiry sweeps.
    pub sweep_interval_secs: u64,
    /// Duration of an `allow` blanket grant.
    pub blanket_allow_secs: u64,
    /// Whether the host exposes an explicit reply tool.
    pub reply_tool_available: bool,
    /// Name of the reply tool, quoted in channel instructions.
    pub reply_tool_name: String,
}

impl Default for ApprovalSection {
    fn default() -> Self {
        Self {
            ttl_secs: 120,
            retry_window_secs: 60,
            sweep_interval_secs: 30,
            blanket_allow_secs: 600,
            reply_tool_available: false,
            reply_tool_name: "warden_reply".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Target of a host tool name mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationTarget {
    /// Policy module name (e.g. `Shell`).
    pub module: String,
    /// Policy method name (e.g. `bash`).
    pub method: String,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Base level filter (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Output format: `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Extra `EnvFilter` directives (e.g. `warden_approval=debug`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
