// src/config/models.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Root configuration for a single health probe.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub target: TargetConfig,
    pub expect: ExpectConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    pub base_url: String,
    pub path: String,
    pub timeout_secs: u64,
    /// Route the probe through HTTP(S)_PROXY when set.
    pub use_proxy: bool,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            path: "/api".to_string(),
            timeout_secs: 10,
            use_proxy: false,
        }
    }
}

impl TargetConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The URL that gets probed. An absolute `path` replaces any path on `base_url`.
    pub fn endpoint(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("invalid base_url {:?}", self.base_url))?;
        Ok(base.join(&self.path)?)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExpectConfig {
    pub status_code: u16,
    pub field: String,
    pub value: String,
}

impl Default for ExpectConfig {
    fn default() -> Self {
        Self {
            status_code: 200,
            field: "status".to_string(),
            value: "OK".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub metrics_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.target.path.starts_with('/') {
            bail!("path must start with '/', got {:?}", self.target.path);
        }
        if self.target.path.starts_with("//") {
            bail!("path {:?} would replace the host of base_url", self.target.path);
        }
        let endpoint = self.target.endpoint()?;
        let scheme = endpoint.scheme();
        if scheme != "http" && scheme != "https" {
            bail!("base_url must use http or https, got {scheme}");
        }
        if endpoint.host_str().is_none() {
            bail!("base_url {} has no host", self.target.base_url);
        }
        if self.target.timeout_secs == 0 {
            bail!("timeout_secs must be greater than zero");
        }
        if !(100..=599).contains(&self.expect.status_code) {
            bail!(
                "expected status code {} is not a valid HTTP status",
                self.expect.status_code
            );
        }
        if self.expect.field.trim().is_empty() {
            bail!("expected field name must not be empty");
        }
        Ok(())
    }
}
