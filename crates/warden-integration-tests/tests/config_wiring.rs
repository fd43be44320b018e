//! Building an interceptor from layered config files.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use warden_approval::{
    ApprovalError, ApprovalQueue, Arbitrator, ArbitratorConfig, Interceptor, QueueConfig,
    RuleAction, StaticProbe,
};
use warden_config::Config;
use warden_config::merge::ConfigLayer;
use warden_telemetry::{LogConfig, LogFormat};

fn write(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn build(config: &Config) -> Interceptor {
    let queue = Arc::new(ApprovalQueue::new(QueueConfig::from(&config.approval)));
    let arbitrator = Arbitrator::new(Arc::clone(&queue), ArbitratorConfig::from(&config.approval))
        .with_probe(Arc::new(StaticProbe(false)));
    Interceptor::from_config(config, queue).with_arbitrator(arbitrator)
}

#[tokio::test]
async fn test_user_config_drives_policy_and_tool_names() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    write(
        &home.path().join("config.toml"),
        r#"
        [policy.modules.Cloud.deploy]
        action = "deny"
        description = "Deploys go through CI"

        [operations.ship]
        module = "Cloud"
        method = "deploy"

        [approval]
        reply_tool_available = true
        reply_tool_name = "approve_operation"
        "#,
    )?;

    let resolved = Config::load_with_home(None, home.path())?;
    assert_eq!(
        resolved.source_of("approval.reply_tool_name"),
        Some(&ConfigLayer::User)
    );
    let interceptor = build(&resolved.config);

    // Built-in defaults survive alongside the user's rules.
    assert_eq!(
        interceptor.policy().lookup("FileSystem", "read").action,
        RuleAction::Allow
    );
    assert!(
        interceptor
            .evaluate_tool("read", json!({"path": "x"}), None)
            .await
            .is_ok()
    );

    let err = interceptor
        .evaluate_tool("ship", json!({"env": "prod"}), Some("chat"))
        .await
        .unwrap_err();
    assert!(matches!(
        &err,
        ApprovalError::PolicyDenied { module, reason, .. }
            if module == "Cloud" && reason == "Deploys go through CI"
    ));

    let pending = interceptor
        .evaluate_tool("bash", json!({"command": "ls"}), Some("chat"))
        .await
        .unwrap_err();
    assert!(pending.to_string().contains("`approve_operation`"));
    Ok(())
}

#[tokio::test]
async fn test_workspace_config_only_tightens() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    let workspace = tempfile::tempdir()?;
    write(
        &workspace.path().join(".warden").join("config.toml"),
        r#"
        [policy.modules.FileSystem.read]
        action = "deny"
        description = "This repository holds secrets"

        [policy.modules.Shell.bash]
        action = "allow"
        "#,
    )?;

    let resolved = Config::load_with_home(Some(workspace.path()), home.path())?;
    let interceptor = build(&resolved.config);

    assert!(matches!(
        interceptor
            .evaluate("FileSystem", "read", json!([]), None)
            .await,
        Err(ApprovalError::PolicyDenied { .. })
    ));
    // The attempt to loosen Shell.bash was reverted to ASK.
    assert_eq!(
        interceptor.policy().lookup("Shell", "bash").action,
        RuleAction::Ask
    );
    assert!(matches!(
        interceptor.evaluate("Shell", "bash", json!([]), None).await,
        Err(ApprovalError::NoApprovalChannel { .. })
    ));
    Ok(())
}

#[test]
fn test_logging_section_feeds_telemetry() -> anyhow::Result<()> {
    let home = tempfile::tempdir()?;
    write(
        &home.path().join("config.toml"),
        "[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
    )?;
    let resolved = Config::load_with_home(None, home.path())?;
    let log = LogConfig::from(&resolved.config.logging);
    assert_eq!(log.level, "debug");
    assert_eq!(log.format, LogFormat::Json);
    Ok(())
}
