use std::fs;
use std::path::Path;

use anyhow::Context;
use crawler_engine::EngineConfig;
use engine_logging::engine_info;

use crate::cli::Cli;

/// Reads a RON config file; no path means built-in defaults.
pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: EngineConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    engine_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

pub(crate) fn apply_overrides(config: &mut EngineConfig, cli: &Cli) {
    if let Some(max_urls) = cli.max_urls {
        config.budget.max_urls = max_urls;
    }
    if let Some(max_redirects) = cli.max_redirects {
        config.budget.max_redirects_per_chain = max_redirects;
    }
    if let Some(max_body_bytes) = cli.max_body_bytes {
        config.fetch.max_body_bytes = max_body_bytes;
    }
    if let Some(ms) = cli.connect_timeout_ms {
        config.fetch.connect_timeout_ms = ms;
    }
    if let Some(ms) = cli.read_timeout_ms {
        config.fetch.read_timeout_ms = ms;
    }
}
