// src/metrics/collector.rs
use crate::health::{CheckReport, FailureKind};
use anyhow::{Context, Result};
use prometheus::{Encoder, GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};
use std::path::Path;

const FAILURE_KINDS: [FailureKind; 3] = [
    FailureKind::Connection,
    FailureKind::Parse,
    FailureKind::Assertion,
];

/// Gauges describing the outcome of the last check, labelled by endpoint.
pub struct ProbeMetrics {
    registry: Registry,
    pub probe_success: IntGaugeVec,
    pub probe_http_status_code: IntGaugeVec,
    pub probe_duration_seconds: GaugeVec,
    pub probe_failure: IntGaugeVec,
}

impl ProbeMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let probe_success = IntGaugeVec::new(
            Opts::new("probe_success", "Whether the health check passed (1=pass, 0=fail)"),
            &["endpoint"],
        )?;
        registry.register(Box::new(probe_success.clone()))?;

        let probe_http_status_code = IntGaugeVec::new(
            Opts::new(
                "probe_http_status_code",
                "HTTP status code of the response (0 when none was received)",
            ),
            &["endpoint"],
        )?;
        registry.register(Box::new(probe_http_status_code.clone()))?;

        let probe_duration_seconds = GaugeVec::new(
            Opts::new("probe_duration_seconds", "Duration of the health check in seconds"),
            &["endpoint"],
        )?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;

        let probe_failure = IntGaugeVec::new(
            Opts::new("probe_failure", "Failure kind of the health check (1 for the failing kind)"),
            &["endpoint", "kind"],
        )?;
        registry.register(Box::new(probe_failure.clone()))?;

        Ok(Self {
            registry,
            probe_success,
            probe_http_status_code,
            probe_duration_seconds,
            probe_failure,
        })
    }

    pub fn record(&self, report: &CheckReport) {
        let endpoint = report.endpoint.as_str();

        self.probe_success
            .with_label_values(&[endpoint])
            .set(if report.passed() { 1 } else { 0 });

        self.probe_http_status_code
            .with_label_values(&[endpoint])
            .set(report.status_code.map_or(0, i64::from));

        self.probe_duration_seconds
            .with_label_values(&[endpoint])
            .set(report.response_time_ms as f64 / 1000.0);

        for kind in FAILURE_KINDS {
            let value = if report.failure == Some(kind) { 1 } else { 0 };
            self.probe_failure
                .with_label_values(&[endpoint, kind.as_str()])
                .set(value);
        }
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("Failed to encode metrics")?;
        Ok(buffer)
    }
}

/// Write the report as a Prometheus textfile, replacing `path` atomically.
pub fn write_textfile(path: &Path, report: &CheckReport) -> Result<()> {
    let metrics = ProbeMetrics::new()?;
    metrics.record(report);
    let contents = metrics.gather()?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    std::fs::write(tmp, contents)
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(e).with_context(|| format!("Failed to move metrics into {}", path.display()));
    }

    tracing::debug!("Wrote probe metrics to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{CheckError, Expectation, ProbeResult};
    use chrono::Utc;
    use std::time::Duration;

    const ENDPOINT: &str = "http://localhost:5000/api";

    fn report(outcome: Result<ProbeResult, CheckError>) -> CheckReport {
        CheckReport::from_outcome(
            ENDPOINT,
            &Expectation::default(),
            &outcome,
            Duration::from_millis(250),
            Utc::now(),
        )
    }

    #[test]
    fn passing_check_exports_success() {
        let outcome = ProbeResult::decode(200, br#"{"status": "OK"}"#, Duration::ZERO);
        let metrics = ProbeMetrics::new().unwrap();
        metrics.record(&report(outcome));

        let text = String::from_utf8(metrics.gather().unwrap()).unwrap();
        assert!(text.contains(r#"probe_success{endpoint="http://localhost:5000/api"} 1"#));
        assert!(text.contains(r#"probe_http_status_code{endpoint="http://localhost:5000/api"} 200"#));
        assert!(text.contains(r#"probe_duration_seconds{endpoint="http://localhost:5000/api"} 0.25"#));
        assert!(text.contains(
            r#"probe_failure{endpoint="http://localhost:5000/api",kind="assertion"} 0"#
        ));
    }

    #[test]
    fn failing_check_marks_its_kind() {
        let outcome = Err(CheckError::NotAnObject("string"));
        let metrics = ProbeMetrics::new().unwrap();
        metrics.record(&report(outcome));

        assert_eq!(
            metrics.probe_success.with_label_values(&[ENDPOINT]).get(),
            0
        );
        assert_eq!(
            metrics.probe_failure.with_label_values(&[ENDPOINT, "parse"]).get(),
            1
        );
        assert_eq!(
            metrics
                .probe_failure
                .with_label_values(&[ENDPOINT, "connection"])
                .get(),
            0
        );
    }

    #[test]
    fn textfile_is_written() {
        let dir = std::env::temp_dir().join(format!("health-probe-metrics-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("probe.prom");

        let outcome = Err(CheckError::StatusMismatch {
            expected: 200,
            actual: 502,
        });
        write_textfile(&path, &report(outcome)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("probe_http_status_code"));
        assert!(text.contains(" 502"));
        assert!(!dir.join("probe.prom.tmp").exists());
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = std::env::temp_dir().join(format!("health-probe-rename-{}", std::process::id()));
        // A non-empty directory at the target path makes the rename fail
        let target = dir.join("busy.prom");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let outcome = Err(CheckError::NotAnObject("null"));
        assert!(write_textfile(&target, &report(outcome)).is_err());
        assert!(!dir.join("busy.prom.tmp").exists());
    }
}
