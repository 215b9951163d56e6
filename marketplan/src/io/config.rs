//! Planner configuration stored under `.marketplan/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::store::is_safe_id;

/// Planner configuration (TOML).
///
/// Meant to be edited by hand. Every field has a default, so an empty or
/// partial file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlannerConfig {
    /// Namespace for stored plans; lets several front ends share one store.
    pub app_id: String,
    pub model: ModelConfig,
    pub persistence: PersistenceConfig,
    pub identity: IdentityConfig,
}

/// Hosted model endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub endpoint: String,
    pub model: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Client-side timeout for one generation call.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PersistenceConfig {
    pub backend: StoreBackend,
    /// Root of the file store. Relative paths resolve against the project root.
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct IdentityConfig {
    /// Fixed user id; empty means "resolve from the environment".
    pub user_id: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            app_id: "marketing-plan-builder-app".to_string(),
            model: ModelConfig::default(),
            persistence: PersistenceConfig::default(),
            identity: IdentityConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            dir: PathBuf::from(".marketplan/plans"),
        }
    }
}

/// Ids end up as path components in the file store.
fn check_id(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(anyhow!("{name} must not be empty"));
    }
    if !is_safe_id(value) {
        return Err(anyhow!("{name} must not contain path separators"));
    }
    Ok(())
}

impl PlannerConfig {
    pub fn validate(&self) -> Result<()> {
        check_id("app_id", &self.app_id)?;
        if !self.identity.user_id.is_empty() {
            check_id("identity.user_id", &self.identity.user_id)?;
        }
        if !self.model.endpoint.starts_with("http://")
            && !self.model.endpoint.starts_with("https://")
        {
            return Err(anyhow!("model.endpoint must be an http(s) URL"));
        }
        if self.model.model.trim().is_empty() {
            return Err(anyhow!("model.model must not be empty"));
        }
        if self.model.timeout_secs == 0 {
            return Err(anyhow!("model.timeout_secs must be > 0"));
        }
        if self.persistence.backend == StoreBackend::File
            && self.persistence.dir.as_os_str().is_empty()
        {
            return Err(anyhow!("persistence.dir must be set for the file backend"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `PlannerConfig::default()`.
pub fn load_config(path: &Path) -> Result<PlannerConfig> {
    if !path.exists() {
        let cfg = PlannerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: PlannerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &PlannerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, PlannerConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested/config.toml");
        let mut cfg = PlannerConfig::default();
        cfg.persistence.backend = StoreBackend::File;
        cfg.identity.user_id = "owner-1".to_string();
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "app_id = \"shop\"\n[model]\ntimeout_secs = 5\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.app_id, "shop");
        assert_eq!(cfg.model.timeout_secs, 5);
        assert_eq!(cfg.model.model, ModelConfig::default().model);
        assert_eq!(cfg.persistence.backend, StoreBackend::Memory);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = PlannerConfig::default();
        cfg.model.timeout_secs = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = PlannerConfig::default();
        cfg.app_id = "../etc".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = PlannerConfig::default();
        cfg.model.endpoint = "localhost:8080".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = PlannerConfig::default();
        cfg.persistence.backend = StoreBackend::File;
        cfg.persistence.dir = PathBuf::new();
        assert!(cfg.validate().is_err());
    }
}
