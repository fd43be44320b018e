//! Host tool names to policy `(module, method)` pairs.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use warden_config::OperationTarget;

/// Module assigned to tool names with no mapping.
pub const UNKNOWN_MODULE: &str = "Unknown";

/// Built-in mappings for common agent tools.
const BUILTIN: &[(&str, &str, &str)] = &[
    ("bash", "Shell", "bash"),
    ("exec", "Shell", "exec"),
    ("process", "Shell", "process"),
    ("read", "FileSystem", "read"),
    ("write", "FileSystem", "write"),
    ("edit", "FileSystem", "write"),
    ("apply_patch", "FileSystem", "write"),
    ("delete", "FileSystem", "delete"),
    ("web_fetch", "Network", "fetch"),
    ("web_search", "Network", "search"),
    ("browser", "Browser", "navigate"),
    ("message", "Messaging", "send"),
    ("cron", "Scheduler", "schedule"),
];

/// A resolved `(module, method)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationId {
    /// Policy module.
    pub module: String,
    /// Policy method.
    pub method: String,
}

impl OperationId {
    /// Build an id.
    #[must_use]
    pub fn new(module: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.method)
    }
}

/// Table from host tool name to policy operation.
#[derive(Debug, Clone)]
pub struct OperationMap {
    entries: HashMap<String, OperationId>,
}

impl Default for OperationMap {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OperationMap {
    /// Map with no entries; every tool resolves to `Unknown`.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Map with the built-in tool names.
    #[must_use]
    pub fn builtin() -> Self {
        let mut map = Self::empty();
        for (tool, module, method) in BUILTIN {
            map.insert(*tool, *module, *method);
        }
        map
    }

    /// Built-in names extended or overridden by configured ones.
    #[must_use]
    pub fn with_overrides(overrides: &BTreeMap<String, OperationTarget>) -> Self {
        let mut map = Self::builtin();
        for (tool, target) in overrides {
            map.insert(tool.clone(), target.module.clone(), target.method.clone());
        }
        map
    }

    /// Add or replace a mapping.
    pub fn insert(
        &mut self,
        tool: impl Into<String>,
        module: impl Into<String>,
        method: impl Into<String>,
    ) {
        self.entries
            .insert(tool.into(), OperationId::new(module, method));
    }

    /// Resolve a tool name. Unmapped names become `Unknown.<tool>`.
    #[must_use]
    pub fn resolve(&self, tool: &str) -> OperationId {
        self.entries
            .get(tool)
            .cloned()
            .unwrap_or_else(|| OperationId::new(UNKNOWN_MODULE, tool))
    }

    /// Whether a tool name has an explicit mapping.
    #[must_use]
    pub fn contains(&self, tool: &str) -> bool {
        self.entries.contains_key(tool)
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
