//! Typed failures for probing and result forwarding.

use thiserror::Error;

/// Validation and engine errors surfaced synchronously to the submitter.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("empty target host")]
    EmptyHost,

    #[error("invalid port range {start}-{end} (expected 1 <= start <= end)")]
    InvalidRange { start: u16, end: u16 },
}

/// Forwarding failures, kept distinct so job status text can tell a failed
/// delivery apart from a failed scan.
#[derive(Error, Debug)]
pub enum ForwardError {
    /// The scan's raw output was not a well-formed result record. Treated as
    /// an execution-class failure by the job manager, never retried.
    #[error("malformed scan output: {0}")]
    Parse(#[from] serde_json::Error),

    /// The reporting endpoint could not be reached at the transport level.
    #[error("resource access error while posting scan result: {0}")]
    Transport(#[source] reqwest::Error),

    /// The reporting endpoint answered with a non-success status.
    #[error("server error while posting scan result: HTTP {0}")]
    Status(reqwest::StatusCode),
}
