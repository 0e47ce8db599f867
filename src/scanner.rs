use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{self, Instant};

use crate::error::ProbeError;
use crate::services::service_name;
use crate::types::{PortProbeResult, ScanRange};

/// Tuning knobs for one probe-engine invocation.
#[derive(Debug, Clone)]
pub struct ProbeOpts {
    /// Maximum number of connect attempts in flight at once.
    pub workers: usize,
    /// Per-probe TCP connect timeout.
    pub connect_timeout: Duration,
    /// Hard deadline for draining in-flight probes after all were submitted.
    pub drain_deadline: Duration,
}

impl Default for ProbeOpts {
    fn default() -> Self {
        Self {
            workers: 50,
            connect_timeout: Duration::from_millis(500),
            drain_deadline: Duration::from_secs(60),
        }
    }
}

/// Shared probe counters, mainly so tests can observe the concurrency bound.
#[derive(Clone, Debug, Default)]
pub struct ProbeMetrics {
    in_flight: Arc<AtomicU64>,
    max_in_flight: Arc<AtomicU64>,
}

impl ProbeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// High-water mark of simultaneously running probes.
    pub fn max_in_flight(&self) -> u64 {
        self.max_in_flight.load(Ordering::Relaxed)
    }

    fn enter(&self) {
        let cur = self.in_flight.fetch_add(1, Ordering::Relaxed) + 1;
        self.max_in_flight.fetch_max(cur, Ordering::Relaxed);
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Probe every port in `range` on `host` for TCP reachability.
///
/// - Concurrency is bounded by a `Semaphore` sized to `opts.workers`; the
///   pool is private to this call and fully drained before return.
/// - Each probe is bounded by `opts.connect_timeout`; a connect error or
///   timeout means closed/unreachable and produces no result.
/// - Reachable ports are enriched with their service label. Result order
///   follows probe completion and carries no meaning.
pub async fn scan_range(
    host: &str,
    range: ScanRange,
    opts: &ProbeOpts,
) -> Result<Vec<PortProbeResult>, ProbeError> {
    scan_range_with_metrics(host, range, opts, ProbeMetrics::new()).await
}

/// Variant taking caller-owned [`ProbeMetrics`] for instrumented tests.
pub async fn scan_range_with_metrics(
    host: &str,
    range: ScanRange,
    opts: &ProbeOpts,
    metrics: ProbeMetrics,
) -> Result<Vec<PortProbeResult>, ProbeError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ProbeError::EmptyHost);
    }
    let host: Arc<str> = Arc::from(host);

    let sem = Arc::new(Semaphore::new(opts.workers.max(1)));
    let mut set: JoinSet<Option<PortProbeResult>> = JoinSet::new();
    let connect_timeout = opts.connect_timeout;

    for port in range.start..=range.end {
        // Acquiring before spawn keeps the number of live tasks bounded too.
        let permit = sem
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore in scope");
        let host = host.clone();
        let metrics = metrics.clone();

        set.spawn(async move {
            let _permit = permit; // keep permit until the probe completes
            metrics.enter();
            let connected = matches!(
                time::timeout(connect_timeout, TcpStream::connect((&*host, port))).await,
                Ok(Ok(_))
            );
            metrics.exit();
            connected.then(|| PortProbeResult {
                port,
                service: service_name(port).to_string(),
            })
        });
    }

    // Drain all probes; past the deadline, abandon whatever is still running
    // so no probe task outlives this call.
    let deadline = Instant::now() + opts.drain_deadline;
    let mut results = Vec::new();
    loop {
        let joined = match time::timeout_at(deadline, set.join_next()).await {
            Ok(j) => j,
            Err(_) => {
                tracing::warn!(
                    abandoned = set.len(),
                    host = %host,
                    "drain deadline reached, abandoning in-flight probes"
                );
                set.abort_all();
                break;
            }
        };
        match joined {
            Some(Ok(Some(hit))) => results.push(hit),
            Some(_) => {}
            None => break,
        }
    }

    tracing::debug!(
        host = %host,
        start = range.start,
        end = range.end,
        open = results.len(),
        "scan finished"
    );
    Ok(results)
}
