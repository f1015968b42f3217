// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use std::path::Path;

/// Prefix for environment overrides, e.g. `HEALTH_PROBE_TARGET__BASE_URL`.
pub const ENV_PREFIX: &str = "HEALTH_PROBE";

/// Load configuration from an optional file (YAML, JSON or TOML) plus
/// environment overrides, let `overrides` adjust it, then validate it.
pub fn load_config<F>(path: Option<&Path>, overrides: F) -> Result<ProbeConfig>
where
    F: FnOnce(&mut ProbeConfig),
{
    let mut config = load_layers(path, ENV_PREFIX)?;
    overrides(&mut config);
    config.validate()?;
    Ok(config)
}

/// Merge defaults, the config file and `<env_prefix>_*` variables without validating.
pub fn load_layers(path: Option<&Path>, env_prefix: &str) -> Result<ProbeConfig> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        tracing::debug!("Loading configuration from: {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("_")
            .separator("__"),
    );

    let layered = builder.build().context("Failed to read configuration")?;
    let config: ProbeConfig = layered
        .try_deserialize()
        .context("Failed to parse configuration")?;
    Ok(config)
}
