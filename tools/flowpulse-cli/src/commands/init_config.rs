//! Write a default configuration file.

use std::path::PathBuf;

use flowpulse_common::config::{config_file_path, PipelineConfig};

pub fn run(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    PipelineConfig::default()
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Default configuration written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        run(Some(path.clone()), false).unwrap();
        assert_eq!(
            PipelineConfig::load_from(&path).unwrap(),
            PipelineConfig::default()
        );

        std::fs::write(&path, "{}").unwrap();
        let err = run(Some(path.clone()), false).unwrap_err();
        assert!(err.to_string().contains("--force"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        run(Some(path.clone()), true).unwrap();
        assert_eq!(
            PipelineConfig::load_from(&path).unwrap(),
            PipelineConfig::default()
        );
    }
}
