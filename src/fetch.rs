use crate::config::SheetInfo;
use crate::error::{LocalizationError, Result};
use crate::retry::{with_retry_if, RetryConfig};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Downloads sheet exports, one request at a time.
#[derive(Debug, Clone)]
pub struct SheetFetcher {
    client: reqwest::Client,
    retry: RetryConfig,
    poll_interval: Duration,
}

impl SheetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            retry: RetryConfig::sheet_fetch(),
            poll_interval: Duration::from_millis(200),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// How often `progress` is called while a request is in flight.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Fetch the export of `sheet` from `url`.
    ///
    /// While the request (including retries) is pending, `progress` is called
    /// every poll interval with the sheet name and the time spent so far.
    pub async fn fetch(
        &self,
        sheet: &SheetInfo,
        url: &str,
        progress: &mut dyn FnMut(&str, Duration),
    ) -> Result<String> {
        info!("Start loading {}", sheet.name);
        let started = Instant::now();
        let operation_name = format!("Sheet {}", sheet.name);

        let request = with_retry_if(
            &self.retry,
            &operation_name,
            || self.fetch_once(url),
            LocalizationError::is_transient,
        );
        tokio::pin!(request);

        let mut ticker = tokio::time::interval(self.poll_interval);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                result = &mut request => {
                    if let Ok(body) = &result {
                        debug!(
                            "Loaded {} ({} bytes in {:?})",
                            sheet.name,
                            body.len(),
                            started.elapsed()
                        );
                    }
                    return result;
                }
                _ = ticker.tick() => progress(&sheet.name, started.elapsed()),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocalizationError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
