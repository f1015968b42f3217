// src/health/mod.rs
mod checker;
mod error;
mod expectation;
mod status;

pub use checker::HealthChecker;
pub use error::{CheckError, FailureKind};
pub use expectation::Expectation;
pub use status::{CheckReport, HealthStatus, ProbeResult};
