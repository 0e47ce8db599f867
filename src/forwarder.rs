use reqwest::header::ACCEPT;

use crate::error::ForwardError;
use crate::types::ScanResultRecord;

/// Delivers parsed scan results to the external reporting service.
///
/// One call is one delivery attempt: no queuing, no caching, no retries.
/// Retry policy, if wanted, belongs to a higher layer.
#[derive(Clone)]
pub struct ResultForwarder {
    client: reqwest::Client,
    endpoint: String,
}

impl ResultForwarder {
    /// `base_url` is the reporting service root; the report path is fixed.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/report/scanPorts", base_url.trim_end_matches('/')),
        }
    }

    /// Parse `raw` as a [`ScanResultRecord`] and POST it to the reporting
    /// endpoint as JSON.
    ///
    /// Failure classes stay distinct so job status text can tell them apart:
    /// malformed output is [`ForwardError::Parse`], an unreachable endpoint is
    /// [`ForwardError::Transport`], and a non-2xx response is
    /// [`ForwardError::Status`].
    pub async fn forward(&self, raw: &str) -> Result<ScanResultRecord, ForwardError> {
        let record: ScanResultRecord = serde_json::from_str(raw.trim())?;

        tracing::info!(
            report_id = record.report_id,
            host = %record.host,
            open = record.open_ports.len(),
            "forwarding scan result"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .json(&record)
            .send()
            .await
            .map_err(ForwardError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwardError::Status(status));
        }
        Ok(record)
    }
}
