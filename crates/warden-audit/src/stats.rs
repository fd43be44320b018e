//! In-process decision counters.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AuditResult;
use crate::record::AuditDecision;
use crate::sink::StatsSink;

/// Count and cumulative latency for one decision kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DecisionCount {
    /// Number of decisions.
    pub count: u64,
    /// Sum of decision times.
    pub total_time_ms: u64,
}

impl DecisionCount {
    /// Mean decision time, or 0 when nothing was counted.
    #[must_use]
    pub fn average_ms(&self) -> u64 {
        self.total_time_ms.checked_div(self.count).unwrap_or(0)
    }
}

/// Point-in-time copy of [`DecisionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Rule ALLOW.
    pub allowed: DecisionCount,
    /// ASK, approved.
    pub approved: DecisionCount,
    /// ASK, not approved.
    pub rejected: DecisionCount,
    /// Rule DENY.
    pub blocked: DecisionCount,
}

impl StatsSnapshot {
    /// Total number of decisions across all kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        [self.allowed, self.approved, self.rejected, self.blocked]
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.count))
    }
}

/// Thread-safe decision counters.
#[derive(Debug, Default)]
pub struct DecisionStats {
    counts: Mutex<HashMap<AuditDecision, DecisionCount>>,
}

impl DecisionStats {
    /// Create zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the current counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let counts = self.counts.lock().unwrap_or_else(|e| {
            tracing::warn!("DecisionStats lock poisoned, recovering");
            e.into_inner()
        });
        let get = |d: AuditDecision| counts.get(&d).copied().unwrap_or_default();
        StatsSnapshot {
            allowed: get(AuditDecision::Allowed),
            approved: get(AuditDecision::Approved),
            rejected: get(AuditDecision::Rejected),
            blocked: get(AuditDecision::Blocked),
        }
    }
}

#[async_trait]
impl StatsSink for DecisionStats {
    async fn increment(&self, decision: AuditDecision, decision_time_ms: u64) -> AuditResult<()> {
        let mut counts = self.counts.lock().unwrap_or_else(|e| {
            tracing::warn!("DecisionStats lock poisoned, recovering");
            e.into_inner()
        });
        let entry = counts.entry(decision).or_default();
        entry.count = entry.count.saturating_add(1);
        entry.total_time_ms = entry.total_time_ms.saturating_add(decision_time_ms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_and_average() {
        let stats = DecisionStats::new();
        stats.increment(AuditDecision::Approved, 100).await.unwrap();
        stats.increment(AuditDecision::Approved, 300).await.unwrap();
        stats.increment(AuditDecision::Blocked, 0).await.unwrap();

        let snap = stats.snapshot();
        assert_eq!(snap.approved.count, 2);
        assert_eq!(snap.approved.average_ms(), 200);
        assert_eq!(snap.blocked.count, 1);
        assert_eq!(snap.allowed, DecisionCount::default());
        assert_eq!(snap.total(), 3);
    }

    #[test]
    fn test_average_of_empty_is_zero() {
        assert_eq!(DecisionCount::default().average_ms(), 0);
    }
}
