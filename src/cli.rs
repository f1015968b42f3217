// src/cli.rs
use crate::config::{self, OutputFormat, ProbeConfig};
use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "health-probe")]
#[command(about = "Smoke-test an HTTP health endpoint", long_about = None)]
pub struct Cli {
    /// Config file (YAML, JSON or TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the service, e.g. http://localhost:5000
    #[arg(short, long)]
    pub url: Option<String>,

    /// Path of the health endpoint
    #[arg(long)]
    pub path: Option<String>,

    #[arg(long)]
    pub expect_status: Option<u16>,

    /// JSON field to inspect
    #[arg(long)]
    pub field: Option<String>,

    /// Value the field must equal
    #[arg(long)]
    pub expect_value: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the outcome as a Prometheus textfile
    #[arg(long)]
    pub metrics_file: Option<PathBuf>,

    /// Honour HTTP_PROXY/HTTPS_PROXY
    #[arg(long)]
    pub use_proxy: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Layer flags over file and environment settings, then validate.
    pub fn resolve_config(&self) -> Result<ProbeConfig> {
        config::load_config(self.config.as_deref(), |config| self.apply(config))
    }

    pub fn apply(&self, config: &mut ProbeConfig) {
        if let Some(url) = &self.url {
            config.target.base_url = url.clone();
        }
        if let Some(path) = &self.path {
            config.target.path = path.clone();
        }
        if let Some(timeout) = self.timeout {
            config.target.timeout_secs = timeout;
        }
        if self.use_proxy {
            config.target.use_proxy = true;
        }
        if let Some(status) = self.expect_status {
            config.expect.status_code = status;
        }
        if let Some(field) = &self.field {
            config.expect.field = field.clone();
        }
        if let Some(value) = &self.expect_value {
            config.expect.value = value.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(path) = &self.metrics_file {
            config.output.metrics_file = Some(path.clone());
        }
    }

    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "health_probe=warn",
            1 => "health_probe=info",
            _ => "health_probe=debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_leave_config_untouched() {
        let cli = Cli::try_parse_from(["health-probe"]).unwrap();
        let mut config = ProbeConfig::default();
        cli.apply(&mut config);
        assert_eq!(config, ProbeConfig::default());
        assert_eq!(cli.log_directive(), "health_probe=warn");
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "health-probe",
            "--url",
            "http://10.1.2.3:8080",
            "--path",
            "/healthz",
            "--expect-status",
            "204",
            "--field",
            "state",
            "--expect-value",
            "up",
            "--timeout",
            "2",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();

        let mut config = ProbeConfig::default();
        cli.apply(&mut config);

        assert_eq!(
            config.target.endpoint().unwrap().as_str(),
            "http://10.1.2.3:8080/healthz"
        );
        assert_eq!(config.target.timeout_secs, 2);
        assert_eq!(config.expect.status_code, 204);
        assert_eq!(config.expect.field, "state");
        assert_eq!(config.expect.value, "up");
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(cli.log_directive(), "health_probe=debug");
    }

    #[test]
    fn flags_take_precedence_over_config_file() {
        let dir = std::env::temp_dir().join(format!("health-probe-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("layered.yaml");
        std::fs::write(
            &path,
            "target:\n  base_url: http://file-host:1000\n  timeout_secs: 7\nexpect:\n  value: healthy\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "health-probe",
            "--config",
            path.to_str().unwrap(),
            "--url",
            "http://flag-host:2000",
            "--expect-value",
            "up",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.target.base_url, "http://flag-host:2000");
        assert_eq!(config.expect.value, "up");
        // Untouched by flags, so the file wins over defaults
        assert_eq!(config.target.timeout_secs, 7);
    }

    #[test]
    fn invalid_flag_values_fail_validation() {
        let cli = Cli::try_parse_from(["health-probe", "--timeout", "0"]).unwrap();
        assert!(cli.resolve_config().is_err());
    }

    #[test]
    fn unknown_format_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["health-probe", "--format", "xml"]).is_err());
    }
}
