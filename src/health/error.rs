// src/health/error.rs
use serde::Serialize;
use std::time::Duration;

/// Coarse classification of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Connection,
    Parse,
    Assertion,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connection => "connection",
            FailureKind::Parse => "parse",
            FailureKind::Assertion => "assertion",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            FailureKind::Assertion => 1,
            FailureKind::Connection => 2,
            FailureKind::Parse => 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("could not reach {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no response from {url} within {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response body is not a JSON object (found {0})")]
    NotAnObject(&'static str),

    #[error("status code mismatch: expected {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("field `{field}` missing from response body: expected {expected:?}")]
    MissingField { field: String, expected: String },

    #[error("field `{field}` mismatch: expected {expected:?}, got {actual}")]
    ValueMismatch {
        field: String,
        expected: String,
        actual: serde_json::Value,
    },
}

impl CheckError {
    pub fn kind(&self) -> FailureKind {
        match self {
            CheckError::Connection { .. } | CheckError::Timeout { .. } => FailureKind::Connection,
            CheckError::InvalidJson(_) | CheckError::NotAnObject(_) => FailureKind::Parse,
            CheckError::StatusMismatch { .. }
            | CheckError::MissingField { .. }
            | CheckError::ValueMismatch { .. } => FailureKind::Assertion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_report_expected_and_actual() {
        let err = CheckError::StatusMismatch {
            expected: 200,
            actual: 500,
        };
        assert_eq!(err.to_string(), "status code mismatch: expected 200, got 500");
        assert_eq!(err.kind(), FailureKind::Assertion);

        let err = CheckError::ValueMismatch {
            field: "status".into(),
            expected: "OK".into(),
            actual: serde_json::json!("FAIL"),
        };
        assert_eq!(
            err.to_string(),
            r#"field `status` mismatch: expected "OK", got "FAIL""#
        );
    }

    #[test]
    fn kinds_map_to_distinct_exit_codes() {
        let parse = CheckError::NotAnObject("array");
        assert_eq!(parse.kind(), FailureKind::Parse);
        assert_eq!(parse.kind().exit_code(), 3);

        let timeout = CheckError::Timeout {
            url: "http://localhost:5000/api".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timeout.kind(), FailureKind::Connection);
        assert_eq!(timeout.kind().exit_code(), 2);
        assert_eq!(FailureKind::Assertion.exit_code(), 1);
    }
}
