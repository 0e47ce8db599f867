//! The execution seam between the job manager and whatever produces scan
//! output: an external scanner binary, or the in-process probe engine.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

use crate::scanner::{self, ProbeOpts};
use crate::types::{ScanRange, ScanResultRecord};

/// Captured execution output: stdout with stderr merged in, plus the exit
/// indicator (0 = success).
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub output: String,
    pub exit_code: i32,
}

impl ExecOutput {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Narrow port over a scan mechanism. Implementations must write a single
/// JSON [`ScanResultRecord`] into the returned output on success.
///
/// An `Err` from [`run`](ScanExecutor::run) means the execution itself could
/// not happen (launch or I/O failure); a scan that ran but failed reports
/// through a non-zero `exit_code` instead.
#[async_trait]
pub trait ScanExecutor: Send + Sync {
    async fn run(&self, report_id: i64, option: &str) -> Result<ExecOutput>;
}

/// Runs an independently-built scanner executable with the positional
/// protocol `<bin> <report_id> <option> <start> <end> <timeout_ms>`.
pub struct SubprocessExecutor {
    bin: PathBuf,
    range: ScanRange,
    timeout_ms: u64,
}

impl SubprocessExecutor {
    pub fn new(bin: PathBuf, range: ScanRange, timeout_ms: u64) -> Self {
        Self { bin, range, timeout_ms }
    }
}

#[async_trait]
impl ScanExecutor for SubprocessExecutor {
    async fn run(&self, report_id: i64, option: &str) -> Result<ExecOutput> {
        let mut child = Command::new(&self.bin)
            .arg(report_id.to_string())
            .arg(option)
            .arg(self.range.start.to_string())
            .arg(self.range.end.to_string())
            .arg(self.timeout_ms.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to launch scanner binary {}", self.bin.display()))?;

        let stdout = child.stdout.take().context("child stdout not captured")?;
        let stderr = child.stderr.take().context("child stderr not captured")?;

        // Drain stderr concurrently so a chatty child never blocks on a full
        // pipe while we read stdout.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = BufReader::new(stderr).read_to_string(&mut buf).await;
            buf
        });

        let mut merged = String::new();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await.context("failed reading scanner output")? {
            tracing::info!(report_id, "{line}");
            merged.push_str(&line);
            merged.push('\n');
        }

        let status = child.wait().await.context("failed waiting for scanner process")?;
        merged.push_str(&stderr_task.await.unwrap_or_default());

        Ok(ExecOutput {
            output: merged,
            exit_code: status.code().unwrap_or(-1),
        })
    }
}

/// Satisfies the executor contract with the in-process probe engine; the
/// opaque option string is the target host.
pub struct InProcessExecutor {
    range: ScanRange,
    opts: ProbeOpts,
}

impl InProcessExecutor {
    pub fn new(range: ScanRange, opts: ProbeOpts) -> Self {
        Self { range, opts }
    }
}

#[async_trait]
impl ScanExecutor for InProcessExecutor {
    async fn run(&self, report_id: i64, option: &str) -> Result<ExecOutput> {
        let open_ports = scanner::scan_range(option, self.range, &self.opts)
            .await
            .context("probe engine failed")?;

        let record = ScanResultRecord {
            report_id,
            host: option.trim().to_string(),
            message: "Scan complete".to_string(),
            error: None,
            scan_range: self.range,
            open_ports,
        };
        let output = serde_json::to_string(&record).context("failed encoding scan record")?;

        Ok(ExecOutput { output, exit_code: 0 })
    }
}
