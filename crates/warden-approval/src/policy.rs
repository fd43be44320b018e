//! Security policy: per-operation rules with a policy-wide fallback.
//!
//! Rules are keyed by module, then method. `"*"` is an ordinary method key,
//! not a wildcard; callers that want a module catch-all look it up
//! explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use warden_config::{PolicySection, RuleActionSetting, RuleSection};

/// What a rule tells the interceptor to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleAction {
    /// Proceed without asking.
    Allow,
    /// Refuse outright.
    Deny,
    /// Suspend until a human decides.
    #[default]
    Ask,
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "ALLOW"),
            Self::Deny => write!(f, "DENY"),
            Self::Ask => write!(f, "ASK"),
        }
    }
}

impl From<RuleActionSetting> for RuleAction {
    fn from(setting: RuleActionSetting) -> Self {
        match setting {
            RuleActionSetting::Allow => Self::Allow,
            RuleActionSetting::Deny => Self::Deny,
            RuleActionSetting::Ask => Self::Ask,
        }
    }
}

/// A rule attached to one `(module, method)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRule {
    /// Decision for the operation.
    pub action: RuleAction,
    /// Risk description shown in prompts and used as the denial reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SecurityRule {
    /// Rule with the given action and description.
    #[must_use]
    pub fn new(action: RuleAction, description: impl Into<String>) -> Self {
        Self {
            action,
            description: Some(description.into()),
        }
    }

    /// Allow rule without a description.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            description: None,
        }
    }

    /// Deny rule.
    #[must_use]
    pub fn deny(description: impl Into<String>) -> Self {
        Self::new(RuleAction::Deny, description)
    }

    /// Ask rule.
    #[must_use]
    pub fn ask(description: impl Into<String>) -> Self {
        Self::new(RuleAction::Ask, description)
    }

    /// Description, or a generic placeholder.
    #[must_use]
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("No description")
    }
}

impl From<&RuleSection> for SecurityRule {
    fn from(section: &RuleSection) -> Self {
        Self {
            action: section.action.into(),
            description: section.description.clone(),
        }
    }
}

/// Policy consulted for every intercepted operation.
///
/// # Example
///
/// ```
/// use warden_approval::policy::{RuleAction, SecurityPolicy, SecurityRule};
///
/// let policy = SecurityPolicy::new(RuleAction::Ask)
///     .with_rule("FileSystem", "read", SecurityRule::allow())
///     .with_rule("FileSystem", "delete", SecurityRule::deny("Deletion is permanent"));
///
/// assert_eq!(policy.lookup("FileSystem", "read").action, RuleAction::Allow);
/// assert_eq!(policy.lookup("FileSystem", "delete").action, RuleAction::Deny);
/// assert_eq!(policy.lookup("Shell", "bash").action, RuleAction::Ask);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Action for operations without a specific rule.
    #[serde(default)]
    pub default_action: RuleAction,
    /// Rules keyed by module name, then method name.
    #[serde(default)]
    pub modules: HashMap<String, HashMap<String, SecurityRule>>,
}

impl SecurityPolicy {
    /// Empty policy with the given fallback action.
    #[must_use]
    pub fn new(default_action: RuleAction) -> Self {
        Self {
            default_action,
            modules: HashMap::new(),
        }
    }

    /// Add or replace a rule.
    #[must_use]
    pub fn with_rule(
        mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        rule: SecurityRule,
    ) -> Self {
        self.set_rule(module, method, rule);
        self
    }

    /// Add or replace a rule in place.
    pub fn set_rule(
        &mut self,
        module: impl Into<String>,
        method: impl Into<String>,
        rule: SecurityRule,
    ) {
        self.modules
            .entry(module.into())
            .or_default()
            .insert(method.into(), rule);
    }

    /// Resolve the rule for an operation. Never fails: operations without a
    /// specific rule get the default action.
    #[must_use]
    pub fn lookup(&self, module: &str, method: &str) -> SecurityRule {
        if let Some(rule) = self.modules.get(module).and_then(|m| m.get(method)) {
            return rule.clone();
        }
        SecurityRule::new(
            self.default_action,
            format!("No specific rule for {module}.{method}"),
        )
    }

    /// Number of explicit rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }
}

impl From<&PolicySection> for SecurityPolicy {
    fn from(section: &PolicySection) -> Self {
        let modules = section
            .modules
            .iter()
            .map(|(module, methods)| {
                let rules = methods
                    .iter()
                    .map(|(method, rule)| (method.clone(), SecurityRule::from(rule)))
                    .collect();
                (module.clone(), rules)
            })
            .collect();
        Self {
            default_action: section.default_action.into(),
            modules,
        }
    }
}
