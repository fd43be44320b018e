use std::sync::Arc;
use std::time::Instant;

use tracing::error;
use warden_audit::{AuditDecision, AuditRecord, AuditSink, StatsSink};

use crate::context::ExecutionContext;

/// Milliseconds since `started`, saturating.
pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Build the audit record for a terminal outcome.
#[must_use]
pub fn outcome_record(
    ctx: &ExecutionContext,
    decision: AuditDecision,
    decision_time_ms: u64,
    reason: Option<&str>,
) -> AuditRecord {
    let mut record = AuditRecord::new(
        ctx.module.clone(),
        ctx.method.clone(),
        ctx.args.clone(),
        decision,
        decision_time_ms,
    );
    if let Some(session) = &ctx.session_key {
        record = record.with_user_id(session.clone());
    }
    if let Some(reason) = reason {
        record = record.with_reason(reason);
    }
    record
}

/// Deliver a record to both sinks. Failures are logged, never surfaced.
pub(crate) async fn deliver(
    audit: &Arc<dyn AuditSink>,
    stats: &Arc<dyn StatsSink>,
    record: &AuditRecord,
) {
    if let Err(e) = audit.record(record).await {
        error!(
            error = %e,
            module = %record.module,
            method = %record.method,
            decision = %record.decision,
            "failed to write audit record"
        );
    }
    if let Err(e) = stats
        .increment(record.decision, record.decision_time_ms)
        .await
    {
        error!(error = %e, decision = %record.decision, "failed to update decision stats");
    }
}
