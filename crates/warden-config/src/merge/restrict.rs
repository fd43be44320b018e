use tracing::warn;

use super::path::{get_path, set_path};
use crate::types::RuleActionSetting;

/// Enforce that the workspace layer can only **tighten** policy.
///
/// Call this after merging the workspace layer but before deserialization.
/// `baseline` is the merged tree *before* the workspace layer was applied.
pub fn enforce_restrictions(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace_layer: &toml::Value,
) {
    let baseline_default = read_action(baseline, &["policy", "default_action"])
        .unwrap_or_default();

    // Default action: never more permissive than the baseline.
    if let Some(ws_default) = read_action(workspace_layer, &["policy", "default_action"])
        && ws_default.permissiveness() > baseline_default.permissiveness()
    {
        warn!(
            field = "policy.default_action",
            requested = %ws_default,
            kept = %baseline_default,
            "workspace config cannot loosen the default action; ignoring"
        );
        set_path(
            merged,
            &["policy", "default_action"],
            toml::Value::String(baseline_default.to_string()),
        );
    }

    enforce_rule_actions(merged, baseline, workspace_layer, baseline_default);

    // Timings that widen the approval surface: can only decrease.
    for key in ["ttl_secs", "retry_window_secs", "blanket_allow_secs"] {
        clamp_max_int(merged, baseline, workspace_layer, &["approval", key]);
    }

    // Tool name mappings decide which rule an operation hits; a workspace
    // remap could route `bash` onto an allowed method.
    if get_path(workspace_layer, &["operations"]).is_some() {
        warn!(
            field = "operations",
            "workspace config cannot change operation mappings; ignoring"
        );
        let restored = get_path(baseline, &["operations"])
            .cloned()
            .unwrap_or_else(|| toml::Value::Table(toml::map::Map::new()));
        set_path(merged, &["operations"], restored);
    }
}

/// Revert any workspace rule that is looser than what the baseline would
/// have resolved for the same `(module, method)`.
fn enforce_rule_actions(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace_layer: &toml::Value,
    baseline_default: RuleActionSetting,
) {
    let Some(ws_modules) =
        get_path(workspace_layer, &["policy", "modules"]).and_then(|v| v.as_table())
    else {
        return;
    };

    for (module, methods) in ws_modules {
        let Some(methods) = methods.as_table() else {
            continue;
        };
        for method in methods.keys() {
            let path = ["policy", "modules", module.as_str(), method.as_str(), "action"];
            let Some(ws_action) = read_action(workspace_layer, &path) else {
                continue;
            };
            let baseline_action = read_action(baseline, &path).unwrap_or(baseline_default);
            if ws_action.permissiveness() > baseline_action.permissiveness() {
                warn!(
                    module = %module,
                    method = %method,
                    requested = %ws_action,
                    kept = %baseline_action,
                    "workspace config cannot loosen a policy rule; ignoring"
                );
                set_path(merged, &path, toml::Value::String(baseline_action.to_string()));
            }
        }
    }
}

/// Clamp an integer so the workspace layer can only lower it.
fn clamp_max_int(
    merged: &mut toml::Value,
    baseline: &toml::Value,
    workspace_layer: &toml::Value,
    path: &[&str],
) {
    let Some(ws_val) = get_path(workspace_layer, path).and_then(toml::Value::as_integer) else {
        return;
    };
    let Some(base_val) = get_path(baseline, path).and_then(toml::Value::as_integer) else {
        return;
    };
    if ws_val > base_val {
        warn!(
            field = %path.join("."),
            requested = ws_val,
            kept = base_val,
            "workspace config can only lower this value; clamping"
        );
        set_path(merged, path, toml::Value::Integer(base_val));
    }
}

fn read_action(root: &toml::Value, path: &[&str]) -> Option<RuleActionSetting> {
    get_path(root, path)
        .and_then(toml::Value::as_str)
        .and_then(RuleActionSetting::parse)
}
