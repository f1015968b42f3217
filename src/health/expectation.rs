// src/health/expectation.rs
use super::error::CheckError;
use crate::config::ExpectConfig;
use serde_json::{Map, Value};

/// What a healthy response looks like: one status code and one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub status_code: u16,
    pub field: String,
    pub value: String,
}

impl Default for Expectation {
    fn default() -> Self {
        ExpectConfig::default().into()
    }
}

impl From<ExpectConfig> for Expectation {
    fn from(config: ExpectConfig) -> Self {
        Self {
            status_code: config.status_code,
            field: config.field,
            value: config.value,
        }
    }
}

impl Expectation {
    pub fn verify_status(&self, actual: u16) -> Result<(), CheckError> {
        if actual == self.status_code {
            Ok(())
        } else {
            Err(CheckError::StatusMismatch {
                expected: self.status_code,
                actual,
            })
        }
    }

    /// Only the configured key is inspected; a non-string value never matches.
    pub fn verify_body(&self, body: &Map<String, Value>) -> Result<(), CheckError> {
        match body.get(&self.field) {
            None => Err(CheckError::MissingField {
                field: self.field.clone(),
                expected: self.value.clone(),
            }),
            Some(Value::String(actual)) if *actual == self.value => Ok(()),
            Some(actual) => Err(CheckError::ValueMismatch {
                field: self.field.clone(),
                expected: self.value.clone(),
                actual: actual.clone(),
            }),
        }
    }
}
