// src/health/checker.rs
use super::error::CheckError;
use super::expectation::Expectation;
use super::status::{CheckReport, ProbeResult};
use crate::config::TargetConfig;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use url::Url;

/// Sends a single GET to one endpoint and judges the answer.
///
/// Holds no mutable state: every call to [`HealthChecker::check`] is an
/// independent request.
pub struct HealthChecker {
    endpoint: Url,
    timeout: Duration,
    expect: Expectation,
    client: Client,
}

struct RawResponse {
    status_code: u16,
    body: Vec<u8>,
    elapsed: Duration,
}

impl HealthChecker {
    pub fn new(target: &TargetConfig, expect: Expectation) -> Result<Self> {
        let endpoint = target.endpoint()?;

        let mut builder = Client::builder().timeout(target.timeout());
        if !target.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint,
            timeout: target.timeout(),
            expect,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch and decode the endpoint without judging it.
    pub async fn probe(&self) -> Result<ProbeResult, CheckError> {
        let raw = self.fetch().await?;
        ProbeResult::decode(raw.status_code, &raw.body, raw.elapsed)
    }

    /// Full check: status code first, then body decoding, then the field.
    pub async fn check(&self) -> Result<ProbeResult, CheckError> {
        let raw = self.fetch().await?;
        self.expect.verify_status(raw.status_code)?;

        let result = ProbeResult::decode(raw.status_code, &raw.body, raw.elapsed)?;
        self.expect.verify_body(result.body())?;
        Ok(result)
    }

    /// Run [`HealthChecker::check`] and summarize it as a report.
    pub async fn run(&self) -> CheckReport {
        let checked_at = Utc::now();
        let start = Instant::now();

        let outcome = self.check().await;
        // A decoded response carries its own round-trip time
        let elapsed = match &outcome {
            Ok(result) => result.elapsed(),
            Err(_) => start.elapsed(),
        };

        match &outcome {
            Ok(result) => info!(
                endpoint = %self.endpoint,
                status_code = result.status_code(),
                response_time_ms = elapsed.as_millis() as u64,
                "Health check passed"
            ),
            Err(e) => warn!(
                endpoint = %self.endpoint,
                kind = e.kind().as_str(),
                "Health check failed: {}",
                e
            ),
        }

        CheckReport::from_outcome(
            self.endpoint.as_str(),
            &self.expect,
            &outcome,
            elapsed,
            checked_at,
        )
    }

    async fn fetch(&self) -> Result<RawResponse, CheckError> {
        let start = Instant::now();
        debug!("GET {}", self.endpoint);

        let result = timeout(self.timeout, async {
            let response = self.client.get(self.endpoint.clone()).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
        .await;

        let (status, body) = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if e.is_timeout() => return Err(self.timed_out()),
            Ok(Err(e)) => {
                return Err(CheckError::Connection {
                    url: self.endpoint.to_string(),
                    source: e,
                })
            }
            Err(_) => return Err(self.timed_out()),
        };

        let elapsed = start.elapsed();
        debug!(
            "Received HTTP {} ({} bytes) in {:?}",
            status,
            body.len(),
            elapsed
        );

        Ok(RawResponse {
            status_code: status.as_u16(),
            body: body.to_vec(),
            elapsed,
        })
    }

    fn timed_out(&self) -> CheckError {
        CheckError::Timeout {
            url: self.endpoint.to_string(),
            timeout: self.timeout,
        }
    }
}
