// bicflow-core/src/infrastructure/config/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::configuration::{CommitPolicy, PipelineConfig};
use crate::domain::error::DomainError;
use crate::error::BicflowError;
use crate::infrastructure::error::InfrastructureError;

const CONFIG_CANDIDATES: [&str; 2] = ["bicflow.yaml", "bicflow.yml"];

pub const ENV_DATABASE: &str = "BICFLOW_DATABASE";
pub const ENV_COMMIT_POLICY: &str = "BICFLOW_COMMIT_POLICY";
pub const ENV_LEMMATIZE: &str = "BICFLOW_LEMMATIZE";

// --- LOADER ---

/// Loads `bicflow.yaml` (or `.yml`) from a directory, applies environment
/// overrides and validates the result.
#[instrument(skip(dir))]
pub fn load_pipeline_config(dir: &Path) -> Result<PipelineConfig, BicflowError> {
    let path = find_config(dir)?;
    load_pipeline_config_file(&path)
}

pub fn load_pipeline_config_file(path: &Path) -> Result<PipelineConfig, BicflowError> {
    info!(path = ?path, "Loading pipeline configuration");
    let content = fs::read_to_string(path).map_err(|e| {
        InfrastructureError::ConfigError(format!("Failed to read {:?}: {}", path, e))
    })?;
    let config: PipelineConfig =
        serde_yaml::from_str(&content).map_err(InfrastructureError::YamlError)?;
    finish(config)
}

/// Same as `load_pipeline_config`, but a directory without a config file
/// yields the defaults (still subject to environment overrides).
pub fn load_or_default(dir: &Path) -> Result<PipelineConfig, BicflowError> {
    match find_config(dir) {
        Ok(path) => load_pipeline_config_file(&path),
        Err(InfrastructureError::ConfigNotFound(_)) => {
            info!("No bicflow.yaml found, using defaults");
            finish(PipelineConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn finish(mut config: PipelineConfig) -> Result<PipelineConfig, BicflowError> {
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.check()?;
    Ok(config)
}

fn find_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
        .ok_or_else(|| {
            InfrastructureError::ConfigNotFound(format!(
                "No configuration file found in {:?}. Checked: {:?}",
                root, CONFIG_CANDIDATES
            ))
        })
}

// --- LAYERING ---

/// Environment overrides (`BICFLOW_DATABASE`, `BICFLOW_COMMIT_POLICY`,
/// `BICFLOW_LEMMATIZE`). `lookup` is `std::env::var` outside of tests.
pub fn apply_env_overrides<F>(config: &mut PipelineConfig, lookup: F) -> Result<(), DomainError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup(ENV_DATABASE) {
        info!(old = ?config.persistence.database, new = ?val, "Overriding database via ENV");
        config.persistence.database = val;
    }
    if let Some(val) = lookup(ENV_COMMIT_POLICY) {
        let policy: CommitPolicy = val.parse()?;
        info!(old = %config.persistence.commit_policy, new = %policy, "Overriding commit policy via ENV");
        config.persistence.commit_policy = policy;
    }
    if let Some(val) = lookup(ENV_LEMMATIZE) {
        config.text.lemmatize = parse_flag(&val).ok_or_else(|| {
            DomainError::InvalidConfig(format!(
                "{} must be true/false/1/0, got '{}'",
                ENV_LEMMATIZE, val
            ))
        })?;
    }
    Ok(())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_directory() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("bicflow.yml"),
            "columns:\n  change_message: BFC_message\ntext:\n  url_placeholder: link\n",
        )?;

        let config = load_pipeline_config(dir.path())?;
        assert_eq!(config.columns.change_message, "BFC_message");
        assert_eq!(config.text.url_placeholder, "link");
        Ok(())
    }

    #[test]
    fn test_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let err = load_pipeline_config(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BicflowError::Infrastructure(InfrastructureError::ConfigNotFound(_))
        ));

        let config = load_or_default(dir.path())?;
        assert_eq!(config.columns.title, "title");
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("bicflow.yaml"), "text:\n  url_placeholder: \"<URL>\"\n")?;
        let err = load_pipeline_config(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BicflowError::Domain(DomainError::InvalidConfig(_))
        ));

        fs::write(dir.path().join("bicflow.yaml"), "persistence: [oops\n")?;
        let err = load_pipeline_config(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BicflowError::Infrastructure(InfrastructureError::YamlError(_))
        ));
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config = PipelineConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_DATABASE, ":memory:"),
                (ENV_COMMIT_POLICY, "batch"),
                (ENV_LEMMATIZE, "0"),
            ]),
        )?;
        assert_eq!(config.persistence.database, ":memory:");
        assert_eq!(config.persistence.commit_policy, CommitPolicy::Batch);
        assert!(!config.text.lemmatize);
        Ok(())
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = PipelineConfig::default();
        assert!(apply_env_overrides(&mut config, env(&[(ENV_COMMIT_POLICY, "never")])).is_err());
        assert!(apply_env_overrides(&mut config, env(&[(ENV_LEMMATIZE, "maybe")])).is_err());
    }
}
