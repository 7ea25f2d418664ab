//! # filum-harness
//!
//! Conformance tooling for the filum stream library: JSON fixture sets
//! describing element-granular round trips, a runner that executes them
//! against real files through [`filum_fd::File`], digest verification,
//! structured JSONL logging, and report generation. The `harness`
//! binary drives it all from the command line.

pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;

use thiserror::Error;

/// Tooling-level failure (distinct from the stream's own error type,
/// which the runner records per case rather than propagating).
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fixture {name}: {reason}")]
    BadFixture { name: String, reason: String },
}
