//! Time-windowed approval state machine for channel mode.
//!
//! A channel has no persistent connection back to the human, so a suspended
//! decision has to survive between two separate invocations of the same
//! operation. Entries are keyed by `session::module.method`:
//!
//! ```text
//!              request()                approve(session)
//!   (absent) ───────────▶ Pending ───────────────────────▶ Approved
//!       ▲                  │  │                               │
//!       │  consume_pending │  │ deny(session)                 │ consume()
//!       └──────────────────┘  └──────────▶ (absent) ◀─────────┘
//! ```
//!
//! Terminal states are represented by absence. Every entry carries an
//! `expires_at`; an entry with `now >= expires_at` is treated as absent on
//! every read path whether or not the sweep has removed it yet.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use warden_config::ApprovalSection;

use crate::clock::{Clock, SystemClock};

/// Default lifetime of a pending or approved entry.
pub const DEFAULT_TTL: Duration = Duration::seconds(120);
/// Default maximum age of a pending entry for retry-as-approval.
pub const DEFAULT_RETRY_WINDOW: Duration = Duration::seconds(60);
/// Default minimum interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::seconds(30);

/// Convert whole seconds from config into a duration, saturating.
pub(crate) fn duration_from_secs(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}

fn deadline(now: DateTime<Utc>, lifetime: Duration) -> DateTime<Utc> {
    now.checked_add_signed(lifetime)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Queue timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Lifetime of pending and approved entries.
    pub ttl: Duration,
    /// Maximum age of a pending entry that a retry may consume.
    pub retry_window: Duration,
    /// Minimum interval between opportunistic sweeps.
    pub sweep_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            retry_window: DEFAULT_RETRY_WINDOW,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl From<&ApprovalSection> for QueueConfig {
    fn from(section: &ApprovalSection) -> Self {
        Self {
            ttl: duration_from_secs(section.ttl_secs),
            retry_window: duration_from_secs(section.retry_window_secs),
            sweep_interval: duration_from_secs(section.sweep_interval_secs),
        }
    }
}

/// Composite queue key: `session::module.method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApprovalKey(String);

impl ApprovalKey {
    /// Build the key for an operation within a session.
    #[must_use]
    pub fn new(session_key: &str, module: &str, method: &str) -> Self {
        Self(format!("{session_key}::{module}.{method}"))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ApprovalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a live entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStatus {
    /// Waiting for a human decision.
    Pending,
    /// Approved and waiting to be consumed by the retried operation.
    Approved,
}

/// One suspended operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEntry {
    /// Session the request belongs to.
    pub session_key: String,
    /// Policy module.
    pub module: String,
    /// Policy method.
    pub method: String,
    /// Current state.
    pub status: ApprovalStatus,
    /// When the request was first made. Not reset by duplicate requests.
    pub created_at: DateTime<Utc>,
    /// When the entry stops counting.
    pub expires_at: DateTime<Utc>,
}

impl ApprovalEntry {
    /// Whether the entry has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time since the request was made.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    fn is_live_pending(&self, now: DateTime<Utc>) -> bool {
        self.status == ApprovalStatus::Pending && !self.is_expired(now)
    }
}

#[derive(Debug)]
struct QueueState {
    entries: HashMap<ApprovalKey, ApprovalEntry>,
    blanket: HashMap<ApprovalKey, DateTime<Utc>>,
    last_sweep: DateTime<Utc>,
}

impl QueueState {
    /// Drop expired entries and grants. Returns how many were removed.
    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len().saturating_add(self.blanket.len());
        self.entries.retain(|_, e| !e.is_expired(now));
        self.blanket.retain(|_, expires_at| now < *expires_at);
        self.last_sweep = now;
        before.saturating_sub(self.entries.len().saturating_add(self.blanket.len()))
    }

    fn maybe_sweep(&mut self, now: DateTime<Utc>, interval: Duration) {
        if now.signed_duration_since(self.last_sweep) >= interval {
            let removed = self.sweep(now);
            if removed > 0 {
                debug!(removed, "swept expired approval entries");
            }
        }
    }
}

/// In-memory approval queue shared by every channel-mode judgment.
///
/// One instance is created at startup and injected into the
/// [`Arbitrator`](crate::arbitrator::Arbitrator). All operations take a
/// single lock around the whole state.
///
/// # Example
///
/// ```
/// use warden_approval::queue::ApprovalQueue;
///
/// let queue = ApprovalQueue::default();
/// queue.request("chat-1", "Shell", "bash");
/// assert!(queue.has_pending("chat-1"));
///
/// assert_eq!(queue.approve("chat-1"), 1);
/// assert!(queue.consume("chat-1", "Shell", "bash"));
/// assert!(!queue.consume("chat-1", "Shell", "bash"));
/// ```
pub struct ApprovalQueue {
    config: QueueConfig,
    clock: Arc<dyn Clock>,
    state: Mutex<QueueState>,
}

impl fmt::Debug for ApprovalQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalQueue")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Default for ApprovalQueue {
    fn default() -> Self {
        Self::new(QueueConfig::default())
    }
}

impl ApprovalQueue {
    /// Queue backed by the system clock.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Queue backed by the given clock.
    #[must_use]
    pub fn with_clock(config: QueueConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        Self {
            config,
            clock,
            state: Mutex::new(QueueState {
                entries: HashMap::new(),
                blanket: HashMap::new(),
                last_sweep: now,
            }),
        }
    }

    /// Queue timings.
    #[must_use]
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("approval queue lock was poisoned; recovering state");
            poisoned.into_inner()
        })
    }

    /// Record that an operation is waiting for a decision.
    ///
    /// A live pending entry still inside the retry window absorbs the call,
    /// keeping its `created_at`. Anything else (no entry, an approved or
    /// expired entry, or a pending entry past the window) is replaced by a
    /// fresh pending entry.
    pub fn request(&self, session_key: &str, module: &str, method: &str) -> ApprovalKey {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        let mut state = self.lock();
        state.maybe_sweep(now, self.config.sweep_interval);

        if let Some(existing) = state.entries.get(&key)
            && existing.is_live_pending(now)
            && existing.age(now) <= self.config.retry_window
        {
            debug!(key = %key, "approval already pending");
            return key;
        }

        state.entries.insert(
            key.clone(),
            ApprovalEntry {
                session_key: session_key.to_owned(),
                module: module.to_owned(),
                method: method.to_owned(),
                status: ApprovalStatus::Pending,
                created_at: now,
                expires_at: deadline(now, self.config.ttl),
            },
        );
        debug!(key = %key, "approval requested");
        key
    }

    /// Consume an explicitly approved entry. Single use.
    pub fn consume(&self, session_key: &str, module: &str, method: &str) -> bool {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        let mut state = self.lock();

        let approved = state
            .entries
            .get(&key)
            .is_some_and(|e| e.status == ApprovalStatus::Approved && !e.is_expired(now));
        if approved {
            state.entries.remove(&key);
            debug!(key = %key, "consumed explicit approval");
        }
        approved
    }

    /// Treat a retry as approval if the pending entry is still fresh.
    ///
    /// A stale pending entry is left in place; the caller's following
    /// [`request`](Self::request) replaces it.
    pub fn consume_pending(&self, session_key: &str, module: &str, method: &str) -> bool {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        let mut state = self.lock();

        let fresh = state
            .entries
            .get(&key)
            .is_some_and(|e| e.is_live_pending(now) && e.age(now) <= self.config.retry_window);
        if fresh {
            state.entries.remove(&key);
            debug!(key = %key, "retry accepted as approval");
        }
        fresh
    }

    /// Approve every live pending entry of a session. Each approved entry
    /// gets a fresh TTL. Returns how many entries changed.
    pub fn approve(&self, session_key: &str) -> usize {
        let now = self.clock.now();
        let expires_at = deadline(now, self.config.ttl);
        let mut state = self.lock();
        state.maybe_sweep(now, self.config.sweep_interval);

        let mut count: usize = 0;
        for entry in state.entries.values_mut() {
            if entry.session_key == session_key && entry.is_live_pending(now) {
                entry.status = ApprovalStatus::Approved;
                entry.expires_at = expires_at;
                count = count.saturating_add(1);
            }
        }
        debug!(session = session_key, count, "approved pending entries");
        count
    }

    /// Drop every pending entry of a session. Returns how many live entries
    /// were dropped.
    pub fn deny(&self, session_key: &str) -> usize {
        let now = self.clock.now();
        let mut state = self.lock();
        state.maybe_sweep(now, self.config.sweep_interval);

        let mut count: usize = 0;
        state.entries.retain(|_, e| {
            let remove = e.session_key == session_key && e.status == ApprovalStatus::Pending;
            if remove && !e.is_expired(now) {
                count = count.saturating_add(1);
            }
            !remove
        });
        debug!(session = session_key, count, "denied pending entries");
        count
    }

    /// Whether the session has any live pending entry.
    #[must_use]
    pub fn has_pending(&self, session_key: &str) -> bool {
        let now = self.clock.now();
        self.lock()
            .entries
            .values()
            .any(|e| e.session_key == session_key && e.is_live_pending(now))
    }

    /// Operations the session is currently waiting on, sorted.
    #[must_use]
    pub fn pending_actions(&self, session_key: &str) -> Vec<(String, String)> {
        let now = self.clock.now();
        let mut actions: Vec<(String, String)> = self
            .lock()
            .entries
            .values()
            .filter(|e| e.session_key == session_key && e.is_live_pending(now))
            .map(|e| (e.module.clone(), e.method.clone()))
            .collect();
        actions.sort();
        actions
    }

    /// Snapshot of the live entry for an operation.
    #[must_use]
    pub fn entry(&self, session_key: &str, module: &str, method: &str) -> Option<ApprovalEntry> {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        self.lock()
            .entries
            .get(&key)
            .filter(|e| !e.is_expired(now))
            .cloned()
    }

    /// Install or replace a time-boxed grant for one operation.
    pub fn allow_for(&self, session_key: &str, module: &str, method: &str, duration: Duration) {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        debug!(key = %key, secs = duration.num_seconds(), "blanket allow granted");
        self.lock().blanket.insert(key, deadline(now, duration));
    }

    /// Whether a live grant covers the operation. Expired grants are
    /// evicted.
    pub fn has_blanket_allow(&self, session_key: &str, module: &str, method: &str) -> bool {
        let now = self.clock.now();
        let key = ApprovalKey::new(session_key, module, method);
        let mut state = self.lock();

        match state.blanket.get(&key).copied() {
            Some(expires_at) if now < expires_at => true,
            Some(_) => {
                state.blanket.remove(&key);
                debug!(key = %key, "blanket allow expired");
                false
            },
            None => false,
        }
    }

    /// Remove all expired entries and grants now, regardless of the sweep
    /// interval. Returns how many were removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        self.lock().sweep(now)
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
