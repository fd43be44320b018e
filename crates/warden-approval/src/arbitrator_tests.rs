use super::*;
use crate::clock::{Clock, ManualClock};
use crate::policy::SecurityRule;
use crate::prompt::FixedPrompt;
use crate::queue::QueueConfig;
use serde_json::json;

fn setup(reply_tool_available: bool) -> (Arbitrator, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_now());
    let queue = Arc::new(ApprovalQueue::with_clock(
        QueueConfig::default(),
        clock.clone(),
    ));
    let config = ArbitratorConfig {
        reply_tool_available,
        ..ArbitratorConfig::default()
    };
    let arbitrator = Arbitrator::new(queue, config).with_probe(Arc::new(StaticProbe(false)));
    (arbitrator, clock)
}

fn ctx(session: Option<&str>) -> ExecutionContext {
    ExecutionContext::new(
        "Shell",
        "bash",
        json!({"command": "make deploy"}),
        SecurityRule::ask("Runs arbitrary commands"),
        session,
    )
}

// ---------------------------------------------------------------------------
// Mode resolution
// ---------------------------------------------------------------------------

#[test]
fn test_mode_resolution() {
    assert_eq!(
        ArbitrationMode::resolve(true, Some("s")),
        ArbitrationMode::Interactive
    );
    assert_eq!(
        ArbitrationMode::resolve(false, Some("s")),
        ArbitrationMode::Channel {
            session_key: "s".to_owned()
        }
    );
    assert_eq!(
        ArbitrationMode::resolve(false, Some("")),
        ArbitrationMode::Headless
    );
    assert_eq!(ArbitrationMode::resolve(false, None), ArbitrationMode::Headless);
}

#[test]
fn test_default_arbitrator_prompts_at_a_terminal() {
    let queue = Arc::new(ApprovalQueue::new(QueueConfig::default()));
    let arbitrator = Arbitrator::new(queue, ArbitratorConfig::default())
        .with_probe(Arc::new(StaticProbe(true)));

    assert_eq!(arbitrator.mode_for(None), ArbitrationMode::Interactive);
    assert_eq!(arbitrator.mode_for(Some("s")), ArbitrationMode::Interactive);
}

#[test]
fn test_session_without_terminal_uses_channel() {
    let (arbitrator, _) = setup(false);
    assert_eq!(
        arbitrator.mode_for(Some("s")),
        ArbitrationMode::Channel {
            session_key: "s".to_owned()
        }
    );
    assert_eq!(arbitrator.mode_for(None), ArbitrationMode::Headless);
}

// ---------------------------------------------------------------------------
// Interactive
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_interactive_approve_skips_queue() {
    let (arbitrator, _) = setup(false);
    let arbitrator = arbitrator
        .with_probe(Arc::new(StaticProbe(true)))
        .with_prompt(Arc::new(FixedPrompt::approving()));

    let judgment = arbitrator.judge(ctx(Some("s"))).await;
    assert_eq!(judgment, Judgment::Approved(ApprovalSource::Interactive));
    assert!(arbitrator.queue().is_empty());
}

#[tokio::test]
async fn test_interactive_reject() {
    let (arbitrator, _) = setup(false);
    let arbitrator = arbitrator
        .with_probe(Arc::new(StaticProbe(true)))
        .with_prompt(Arc::new(FixedPrompt::rejecting()));

    let judgment = arbitrator.judge(ctx(None)).await;
    assert!(matches!(judgment, Judgment::Rejected { .. }));
    assert!(!judgment.is_approved());
}

// ---------------------------------------------------------------------------
// Headless
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_headless_rejects_without_queue_entries() {
    let (arbitrator, _) = setup(true);
    assert_eq!(arbitrator.judge(ctx(None)).await, Judgment::NoChannel);
    assert!(arbitrator.queue().is_empty());
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_channel_first_call_is_pending() {
    let (arbitrator, _) = setup(false);
    let judgment = arbitrator.judge(ctx(Some("s"))).await;
    let Judgment::Pending { instructions } = &judgment else {
        panic!("expected pending, got {judgment:?}");
    };
    assert!(instructions.contains("within 60 seconds"));
    assert!(arbitrator.queue().has_pending("s"));
}

#[tokio::test]
async fn test_channel_retry_inside_window_approves() {
    let (arbitrator, clock) = setup(false);
    arbitrator.judge(ctx(Some("s"))).await;
    clock.advance_secs(30);
    assert_eq!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Approved(ApprovalSource::Retry)
    );
    // The approval was consumed.
    assert!(matches!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Pending { .. }
    ));
}

#[tokio::test]
async fn test_channel_stale_retry_reopens_request() {
    let (arbitrator, clock) = setup(false);
    arbitrator.judge(ctx(Some("s"))).await;
    clock.advance_secs(61);
    assert!(matches!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Pending { .. }
    ));
    let entry = arbitrator.queue().entry("s", "Shell", "bash").unwrap();
    assert_eq!(entry.age(clock.now()).num_seconds(), 0);
}

#[tokio::test]
async fn test_channel_explicit_reply_then_retry() {
    let (arbitrator, _) = setup(true);
    let Judgment::Pending { instructions } = arbitrator.judge(ctx(Some("s"))).await else {
        panic!("expected pending");
    };
    assert!(instructions.contains("`warden_reply`"));

    assert_eq!(
        arbitrator.handle_reply("s", ReplyDecision::Yes),
        ReplyOutcome::Approved { count: 1 }
    );
    assert_eq!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Approved(ApprovalSource::ExplicitReply)
    );
}

#[tokio::test]
async fn test_channel_denied_reply_then_retry_is_pending_again() {
    let (arbitrator, _) = setup(true);
    arbitrator.judge(ctx(Some("s"))).await;
    assert_eq!(
        arbitrator.handle_reply("s", ReplyDecision::No),
        ReplyOutcome::Denied { count: 1 }
    );
    assert!(matches!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Pending { .. }
    ));
}

#[tokio::test]
async fn test_allow_reply_installs_blanket_grant() {
    let (arbitrator, clock) = setup(true);
    arbitrator.judge(ctx(Some("s"))).await;

    let outcome = arbitrator.handle_reply("s", ReplyDecision::Allow);
    assert_eq!(
        outcome,
        ReplyOutcome::AllowedFor {
            operations: vec![("Shell".to_owned(), "bash".to_owned())],
            duration: DEFAULT_BLANKET_ALLOW,
        }
    );

    for _ in 0..3 {
        assert_eq!(
            arbitrator.judge(ctx(Some("s"))).await,
            Judgment::Approved(ApprovalSource::BlanketAllow)
        );
    }

    clock.advance_secs(601);
    assert!(matches!(
        arbitrator.judge(ctx(Some("s"))).await,
        Judgment::Pending { .. }
    ));
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let (arbitrator, _) = setup(true);
    arbitrator.judge(ctx(Some("a"))).await;
    arbitrator.handle_reply("a", ReplyDecision::Yes);
    assert!(matches!(
        arbitrator.judge(ctx(Some("b"))).await,
        Judgment::Pending { .. }
    ));
}

#[test]
fn test_reply_with_nothing_pending() {
    let (arbitrator, _) = setup(true);
    for decision in [ReplyDecision::Yes, ReplyDecision::No, ReplyDecision::Allow] {
        assert_eq!(
            arbitrator.handle_reply("s", decision),
            ReplyOutcome::NothingPending
        );
    }
}

#[test]
fn test_config_from_section() {
    let section = ApprovalSection {
        reply_tool_available: true,
        reply_tool_name: "approve_op".to_owned(),
        blanket_allow_secs: 120,
        ..ApprovalSection::default()
    };
    let config = ArbitratorConfig::from(&section);
    assert!(config.reply_tool_available);
    assert_eq!(config.reply_tool_name, "approve_op");
    assert_eq!(config.blanket_allow, Duration::minutes(2));
}
