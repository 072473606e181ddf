pub mod analyze;
pub mod init_config;
pub mod visualize;

use std::path::Path;

use flowpulse_common::config::{LoggingConfig, PipelineConfig};

/// Configuration from `path`, or from the standard location when unset.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(PipelineConfig::load()),
    }
}

/// Logging settings of `config`, raised to `debug` by `--verbose`.
pub fn logging_config(config: &PipelineConfig, verbose: bool) -> LoggingConfig {
    let mut logging = config.logging.clone();
    if verbose {
        logging.level = "debug".to_string();
    }
    logging
}
