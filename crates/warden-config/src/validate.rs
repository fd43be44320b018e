//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges and that cross-field invariants hold.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Upper bound for any approval timing (one day).
const MAX_TIMING_SECS: u64 = 86_400;

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_policy(config)?;
    validate_approval(config)?;
    validate_operations(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validation_error(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate_policy(config: &Config) -> ConfigResult<()> {
    for (module, methods) in &config.policy.modules {
        if module.trim().is_empty() {
            return Err(validation_error(
                "policy.modules",
                "module names must not be empty",
            ));
        }
        if methods.keys().any(|m| m.trim().is_empty()) {
            return Err(validation_error(
                format!("policy.modules.{module}"),
                "method names must not be empty",
            ));
        }
    }
    Ok(())
}

fn validate_approval(config: &Config) -> ConfigResult<()> {
    let a = &config.approval;

    for (field, value) in [
        ("approval.ttl_secs", a.ttl_secs),
        ("approval.retry_window_secs", a.retry_window_secs),
        ("approval.sweep_interval_secs", a.sweep_interval_secs),
        ("approval.blanket_allow_secs", a.blanket_allow_secs),
    ] {
        if value == 0 || value > MAX_TIMING_SECS {
            return Err(validation_error(
                field,
                format!("must be between 1 and {MAX_TIMING_SECS} seconds"),
            ));
        }
    }

    // A retry window longer than the TTL can never be reached: the entry
    // expires first.
    if a.retry_window_secs > a.ttl_secs {
        return Err(validation_error(
            "approval.retry_window_secs",
            format!(
                "retry window {}s exceeds entry ttl {}s",
                a.retry_window_secs, a.ttl_secs
            ),
        ));
    }

    if a.reply_tool_available && a.reply_tool_name.trim().is_empty() {
        return Err(validation_error(
            "approval.reply_tool_name",
            "a reply tool name is required when reply_tool_available is set",
        ));
    }

    Ok(())
}

fn validate_operations(config: &Config) -> ConfigResult<()> {
    for (tool, target) in &config.operations {
        if target.module.trim().is_empty() || target.method.trim().is_empty() {
            return Err(validation_error(
                format!("operations.{tool}"),
                "module and method must both be set",
            ));
        }
    }
    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;
    if !matches!(
        l.level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        return Err(validation_error(
            "logging.level",
            format!(
                "unsupported level '{}'; expected one of: trace, debug, info, warn, error",
                l.level
            ),
        ));
    }
    if !matches!(l.format.as_str(), "pretty" | "compact" | "json" | "full") {
        return Err(validation_error(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: pretty, compact, json, full",
                l.format
            ),
        ));
    }
    Ok(())
}
