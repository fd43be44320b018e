//! End-to-end rule execution: ALLOW, DENY and ASK in each environment.

mod common;

use common::{Environment, StackBuilder};
use serde_json::json;
use warden_approval::{ApprovalError, ApprovalSource, InterceptProof};
use warden_audit::AuditDecision;

#[tokio::test]
async fn test_reference_policy_headless() {
    let stack = StackBuilder::new().build();

    // ALLOW succeeds without touching the queue.
    let read = stack
        .interceptor
        .evaluate("FileSystem", "read", json!([]), None)
        .await
        .unwrap();
    assert_eq!(read.proof, InterceptProof::PolicyAllowed);
    assert!(stack.queue.is_empty());

    // DENY fails with the rule description.
    let delete = stack
        .interceptor
        .evaluate("FileSystem", "delete", json!([]), None)
        .await
        .unwrap_err();
    assert!(matches!(
        &delete,
        ApprovalError::PolicyDenied { reason, .. } if reason == "Deleting files is not permitted"
    ));

    // ASK with nobody to ask.
    let unknown = stack
        .interceptor
        .evaluate("Unknown", "x", json!([]), None)
        .await
        .unwrap_err();
    assert_eq!(
        unknown,
        ApprovalError::NoApprovalChannel {
            module: "Unknown".to_owned(),
            method: "x".to_owned(),
        }
    );
    assert!(stack.queue.is_empty());

    let snapshot = stack.stats.snapshot();
    assert_eq!(snapshot.allowed.count, 1);
    assert_eq!(snapshot.blocked.count, 1);
    assert_eq!(snapshot.rejected.count, 1);
    assert_eq!(snapshot.approved.count, 0);
}

#[tokio::test]
async fn test_deny_rule_is_not_arbitrated_even_with_a_terminal() {
    let stack = StackBuilder::new()
        .environment(Environment::Terminal { approve: true })
        .build();

    let err = stack
        .interceptor
        .evaluate("FileSystem", "delete", json!({"path": "/etc/passwd"}), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::PolicyDenied { .. }));
    assert_eq!(stack.audit.with_decision(AuditDecision::Blocked).len(), 1);
}

#[tokio::test]
async fn test_terminal_approves_ask() {
    let stack = StackBuilder::new()
        .environment(Environment::Terminal { approve: true })
        .build();

    let result = stack
        .interceptor
        .evaluate("Shell", "bash", json!({"command": "cargo fmt"}), Some("chat-1"))
        .await
        .unwrap();
    assert_eq!(
        result.proof,
        InterceptProof::UserApproval {
            source: ApprovalSource::Interactive
        }
    );
    // The terminal takes precedence over the session; no queue entry.
    assert!(stack.queue.is_empty());
}

#[tokio::test]
async fn test_terminal_reject_reports_rejected() {
    let stack = StackBuilder::new()
        .environment(Environment::Terminal { approve: false })
        .build();

    let err = stack
        .interceptor
        .evaluate("Shell", "bash", json!({}), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApprovalError::PolicyDenied { .. }));

    let rejected = stack.audit.with_decision(AuditDecision::Rejected);
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason.as_deref(), Some("rejected by user"));
}

#[tokio::test]
async fn test_tool_names_resolve_through_the_operation_map() {
    let stack = StackBuilder::new().build();

    assert!(
        stack
            .interceptor
            .evaluate_tool("read", json!({"path": "Cargo.toml"}), None)
            .await
            .is_ok()
    );
    assert!(matches!(
        stack
            .interceptor
            .evaluate_tool("delete", json!({"path": "Cargo.toml"}), None)
            .await,
        Err(ApprovalError::PolicyDenied { .. })
    ));

    let records = stack.audit.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].module, "FileSystem");
    assert_eq!(records[1].method, "delete");
}
