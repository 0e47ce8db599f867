use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use port_probe_rs::executor::{InProcessExecutor, ScanExecutor, SubprocessExecutor};
use port_probe_rs::forwarder::ResultForwarder;
use port_probe_rs::jobs::JobManager;
use port_probe_rs::scanner::{self, ProbeOpts};
use port_probe_rs::server::{self, AppState};
use port_probe_rs::types::ScanRange;

/// port-probe-rs — async TCP port probe service with job-based scan
/// orchestration and HTTP result forwarding.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "port-probe-rs",
    version,
    about = "Async TCP port probe service with job-based scan orchestration and HTTP result forwarding.",
    long_about = None
)]
struct Cli {
    /// Address to serve the scan API on.
    #[arg(long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Base URL of the external reporting service.
    #[arg(long = "report-url", env = "REPORT_API_URL", default_value = "http://localhost:9000")]
    report_url: String,

    /// Path to an external scanner binary for job scans. If omitted, jobs
    /// use the in-process probe engine.
    #[arg(long = "scanner-bin")]
    scanner_bin: Option<PathBuf>,

    /// Max concurrent TCP connect probes per scan.
    #[arg(long, default_value_t = 50)]
    workers: usize,

    /// Per-probe connect timeout in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 500)]
    timeout_ms: u64,

    /// First port of the range job scans cover.
    #[arg(long = "job-start-port", default_value_t = 1)]
    job_start_port: u16,

    /// Last port of the range job scans cover.
    #[arg(long = "job-end-port", default_value_t = 10_000)]
    job_end_port: u16,

    /// Per-probe timeout handed to the external scanner binary, in ms.
    #[arg(long = "job-timeout-ms", default_value_t = 200)]
    job_timeout_ms: u64,

    /// Run one scan against this host, print the results as JSON, and exit
    /// instead of serving.
    #[arg(long)]
    target: Option<String>,

    /// First port for a one-shot --target scan.
    #[arg(long = "start-port", default_value_t = 1)]
    start_port: u16,

    /// Last port for a one-shot --target scan.
    #[arg(long = "end-port", default_value_t = 1024)]
    end_port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let probe = ProbeOpts {
        workers: cli.workers,
        connect_timeout: Duration::from_millis(cli.timeout_ms),
        ..ProbeOpts::default()
    };

    // One-shot CLI scan surface.
    if let Some(target) = cli.target.as_deref() {
        let range = ScanRange::new(cli.start_port, cli.end_port)?;
        let results = scanner::scan_range(target, range, &probe).await?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let job_range = ScanRange::new(cli.job_start_port, cli.job_end_port)?;
    let executor: Arc<dyn ScanExecutor> = match cli.scanner_bin {
        Some(bin) => {
            tracing::info!(bin = %bin.display(), "using external scanner binary for jobs");
            Arc::new(SubprocessExecutor::new(bin, job_range, cli.job_timeout_ms))
        }
        None => Arc::new(InProcessExecutor::new(job_range, probe.clone())),
    };

    let forwarder = ResultForwarder::new(&cli.report_url);
    let state = AppState {
        jobs: Arc::new(JobManager::new(executor, forwarder)),
        probe,
    };

    server::spawn_server(&cli.bind, state).await
}
