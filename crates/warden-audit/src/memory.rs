use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::AuditResult;
use crate::record::{AuditDecision, AuditRecord};
use crate::sink::AuditSink;

/// Audit sink that keeps records in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.lock().clone()
    }

    /// Records with the given decision.
    #[must_use]
    pub fn with_decision(&self, decision: AuditDecision) -> Vec<AuditRecord> {
        self.lock()
            .iter()
            .filter(|r| r.decision == decision)
            .cloned()
            .collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<AuditRecord>> {
        self.records.lock().unwrap_or_else(|e| {
            tracing::warn!("InMemoryAuditLog lock poisoned, recovering");
            e.into_inner()
        })
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn record(&self, record: &AuditRecord) -> AuditResult<()> {
        self.lock().push(record.clone());
        Ok(())
    }
}
