use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub customers_csv: PathBuf,
    pub documents_json: PathBuf,
    pub model_path: PathBuf,
    pub users_csv: PathBuf,
    #[serde(default = "default_id_column")]
    pub id_column: String,
    #[serde(default = "default_drop_incomplete_rows")]
    pub drop_incomplete_rows: bool,
}

fn default_id_column() -> String {
    "customerID".to_string()
}
fn default_drop_incomplete_rows() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_k1")]
    pub k1: f64,
    #[serde(default = "default_b")]
    pub b: f64,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k1: default_k1(),
            b: default_b(),
            fallback_message: default_fallback_message(),
        }
    }
}

fn default_k1() -> f64 {
    1.2
}
fn default_b() -> f64 {
    0.75
}
fn default_fallback_message() -> String {
    "I couldn't find relevant information about that.".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl RetrievalConfig {
    pub fn bm25_params(&self) -> churnwise_core::retrieve::Bm25Params {
        churnwise_core::retrieve::Bm25Params {
            k1: self.k1,
            b: self.b,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !(self.retrieval.k1 > 0.0 && self.retrieval.k1.is_finite()) {
            anyhow::bail!("retrieval.k1 must be > 0");
        }
        if !(0.0..=1.0).contains(&self.retrieval.b) {
            anyhow::bail!("retrieval.b must be in [0.0, 1.0]");
        }
        if self.retrieval.fallback_message.trim().is_empty() {
            anyhow::bail!("retrieval.fallback_message must not be empty");
        }
        if self.data.id_column.trim().is_empty() {
            anyhow::bail!("data.id_column must not be empty");
        }
        Ok(())
    }

    /// Resolve relative data paths against `base` (the config file's directory).
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [
            &mut self.data.customers_csv,
            &mut self.data.documents_json,
            &mut self.data.model_path,
            &mut self.data.users_csv,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    config.validate()?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve_paths(base);

    Ok(config)
}
