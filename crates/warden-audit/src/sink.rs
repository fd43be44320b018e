use async_trait::async_trait;

use crate::error::AuditResult;
use crate::record::{AuditDecision, AuditRecord};

/// Append-only destination for [`AuditRecord`]s.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written. Callers treat
    /// this as non-fatal.
    async fn record(&self, record: &AuditRecord) -> AuditResult<()>;
}

/// Counter sink for decision statistics.
#[async_trait]
pub trait StatsSink: Send + Sync {
    /// Count one decision and its latency.
    ///
    /// # Errors
    ///
    /// Returns an error if the increment could not be stored.
    async fn increment(&self, decision: AuditDecision, decision_time_ms: u64) -> AuditResult<()>;
}

/// Sink that accepts and discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl AuditSink for NullSink {
    async fn record(&self, _record: &AuditRecord) -> AuditResult<()> {
        Ok(())
    }
}

#[async_trait]
impl StatsSink for NullSink {
    async fn increment(&self, _decision: AuditDecision, _decision_time_ms: u64) -> AuditResult<()> {
        Ok(())
    }
}
