// src/health/status.rs
use super::error::{CheckError, FailureKind};
use super::expectation::Expectation;
use crate::config::OutputFormat;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// A decoded response. Read-only once received.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    status_code: u16,
    body: Map<String, Value>,
    elapsed: Duration,
}

impl ProbeResult {
    pub fn decode(status_code: u16, bytes: &[u8], elapsed: Duration) -> Result<Self, CheckError> {
        match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(body) => Ok(Self {
                status_code,
                body,
                elapsed,
            }),
            other => Err(CheckError::NotAnObject(json_type(&other))),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Pass,
    Fail,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Pass => f.write_str("PASS"),
            HealthStatus::Fail => f.write_str("FAIL"),
        }
    }
}

/// Outcome of one check, in the shape it is printed and exported.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub endpoint: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub status_code: Option<u16>,
    pub observed_value: Option<Value>,
    pub response_time_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn from_outcome(
        endpoint: &str,
        expect: &Expectation,
        outcome: &Result<ProbeResult, CheckError>,
        elapsed: Duration,
        checked_at: DateTime<Utc>,
    ) -> Self {
        // The status code is compared before the body is decoded, so any
        // body-level failure implies the expected code was received.
        let (status_code, observed_value) = match outcome {
            Ok(result) => (
                Some(result.status_code()),
                result.get(&expect.field).cloned(),
            ),
            Err(CheckError::StatusMismatch { actual, .. }) => (Some(*actual), None),
            Err(CheckError::ValueMismatch { actual, .. }) => {
                (Some(expect.status_code), Some(actual.clone()))
            }
            Err(err) if err.kind() == FailureKind::Connection => (None, None),
            Err(_) => (Some(expect.status_code), None),
        };

        Self {
            endpoint: endpoint.to_string(),
            status: if outcome.is_ok() {
                HealthStatus::Pass
            } else {
                HealthStatus::Fail
            },
            failure: outcome.as_ref().err().map(CheckError::kind),
            error: outcome.as_ref().err().map(ToString::to_string),
            status_code,
            observed_value,
            response_time_ms: elapsed.as_millis() as u64,
            checked_at,
        }
    }

    pub fn passed(&self) -> bool {
        self.status == HealthStatus::Pass
    }

    pub fn exit_code(&self) -> u8 {
        self.failure.map_or(0, |kind| kind.exit_code())
    }

    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_string()),
        }
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, self.status_code) {
            (Some(error), _) => write!(f, "{} {}: {}", self.status, self.endpoint, error),
            (None, Some(code)) => write!(
                f,
                "{} {} (status {}, {} ms)",
                self.status, self.endpoint, code, self.response_time_ms
            ),
            (None, None) => write!(f, "{} {}", self.status, self.endpoint),
        }
    }
}
