use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// One reachable port, enriched with its service label.
///
/// Only open ports ever produce a record; closed or unreachable ports leave
/// no trace in a scan result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortProbeResult {
    pub port: u16,
    pub service: String,
}

/// Inclusive port range to probe. Construct via [`ScanRange::new`] so the
/// `1 <= start <= end` invariant holds; the engine never clamps or reorders.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRange {
    pub start: u16,
    pub end: u16,
}

impl ScanRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ProbeError> {
        if start == 0 || start > end {
            return Err(ProbeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of ports covered; at least 1 by construction.
    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }
}

/// Body of a synchronous scan request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub target_ip: String,
    #[serde(default = "default_start_port")]
    pub start_port: u16,
    #[serde(default = "default_end_port")]
    pub end_port: u16,
}

fn default_start_port() -> u16 {
    1
}

fn default_end_port() -> u16 {
    1024
}

/// Body of an asynchronous scan submission: a report identifier for the
/// downstream reporting service and an opaque target/option string handed
/// to the executor.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub report_id: i64,
    pub option: String,
}

/// Structured decode of a scan execution's raw JSON output, and the exact
/// wire shape forwarded to the reporting endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScanResultRecord {
    pub report_id: i64,
    pub host: String,
    pub message: String,
    pub error: Option<String>,
    pub scan_range: ScanRange,
    pub open_ports: Vec<PortProbeResult>,
}
