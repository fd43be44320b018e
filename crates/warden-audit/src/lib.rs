//! Warden Audit - where interceptor decisions are recorded.
//!
//! This crate provides:
//! - [`AuditRecord`] and [`AuditDecision`], the shape of one decision
//! - The [`AuditSink`] and [`StatsSink`] traits the interceptor reports to
//! - [`JsonlAuditLog`], an append-only JSON lines file
//! - [`InMemoryAuditLog`] and [`DecisionStats`] for tests and embedding
//! - [`NullSink`] for hosts that do not collect either
//!
//! Sinks are fallible, but the interceptor never lets a sink failure change
//! a decision: errors are logged and dropped on the caller side.
//!
//! # Example
//!
//! ```
//! use warden_audit::{AuditDecision, AuditRecord, AuditSink, InMemoryAuditLog};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let log = InMemoryAuditLog::new();
//! let record = AuditRecord::new(
//!     "FileSystem",
//!     "read",
//!     serde_json::json!([]),
//!     AuditDecision::Allowed,
//!     0,
//! );
//! log.record(&record).await.unwrap();
//! assert_eq!(log.len(), 1);
//! # });
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod jsonl;
mod memory;
mod record;
mod sink;
mod stats;

pub use error::{AuditError, AuditResult};
pub use jsonl::JsonlAuditLog;
pub use memory::InMemoryAuditLog;
pub use record::{AuditDecision, AuditRecord};
pub use sink::{AuditSink, NullSink, StatsSink};
pub use stats::{DecisionCount, DecisionStats, StatsSnapshot};
