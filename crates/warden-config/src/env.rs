//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only fill fields that no
//! config file set. Values that merely come from the embedded defaults can
//! be replaced.

use std::collections::HashMap;

use tracing::debug;

use crate::merge::{ConfigLayer, FieldSources, set_path};

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
}

/// All supported `WARDEN_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "WARDEN_LOG_LEVEL",
        field_path: "logging.level",
    },
    EnvMapping {
        var_name: "WARDEN_LOG_FORMAT",
        field_path: "logging.format",
    },
    EnvMapping {
        var_name: "WARDEN_DEFAULT_ACTION",
        field_path: "policy.default_action",
    },
    EnvMapping {
        var_name: "WARDEN_APPROVAL_TTL_SECS",
        field_path: "approval.ttl_secs",
    },
    EnvMapping {
        var_name: "WARDEN_RETRY_WINDOW_SECS",
        field_path: "approval.retry_window_secs",
    },
    EnvMapping {
        var_name: "WARDEN_REPLY_TOOL_AVAILABLE",
        field_path: "approval.reply_tool_available",
    },
];

/// Apply environment variable fallbacks to fields not set by a file layer.
///
/// Returns the number of env vars applied.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        let set_by_file = sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults);
        if set_by_file {
            continue;
        }

        if let Some(val) = env_vars.get(mapping.var_name) {
            debug!(
                var = mapping.var_name,
                field = mapping.field_path,
                "applying env var fallback"
            );
            let segments: Vec<&str> = mapping.field_path.split('.').collect();
            set_path(merged, &segments, coerce_to_toml_value(val));
            sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
            count = count.saturating_add(1);
        }
    }

    count
}

/// Coerce a raw env string into the closest TOML scalar.
fn coerce_to_toml_value(val: &str) -> toml::Value {
    if let Ok(i) = val.parse::<i64>() {
        return toml::Value::Integer(i);
    }
    match val.to_ascii_lowercase().as_str() {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => toml::Value::String(val.to_owned()),
    }
}

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_env_fills_default_field() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"info\"").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::Defaults);

        let env = make_env(&[("WARDEN_LOG_LEVEL", "debug")]);
        let applied = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(applied, 1);
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
        assert_eq!(
            sources.get("logging.level"),
            Some(&ConfigLayer::Environment)
        );
    }

    #[test]
    fn test_env_does_not_override_file() {
        let mut merged: toml::Value = toml::from_str("[logging]\nlevel = \"warn\"").unwrap();
        let mut sources = FieldSources::new();
        sources.insert("logging.level".to_owned(), ConfigLayer::User);

        let env = make_env(&[("WARDEN_LOG_LEVEL", "trace")]);
        let applied = apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(applied, 0);
        assert_eq!(merged["logging"]["level"].as_str(), Some("warn"));
    }

    #[test]
    fn test_env_coerces_integers_and_bools() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut sources = FieldSources::new();
        let env = make_env(&[
            ("WARDEN_APPROVAL_TTL_SECS", "300"),
            ("WARDEN_REPLY_TOOL_AVAILABLE", "TRUE"),
        ]);

        apply_env_fallbacks(&mut merged, &mut sources, &env);

        assert_eq!(merged["approval"]["ttl_secs"].as_integer(), Some(300));
        assert_eq!(
            merged["approval"]["reply_tool_available"].as_bool(),
            Some(true)
        );
    }
}
