use std::path::PathBuf;

use anyhow::Context;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Server configuration, read from `moneta.toml` (override the path with
/// `MONETA_CONFIG`). Every field has a default so the file is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub database_path: PathBuf,
    pub rate: RateConfig,
}

/// Where the CAD/USD rate comes from: an HTTP endpoint returning
/// `{"rate": ...}` when `url` is set, otherwise the fixed value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RateConfig {
    pub fixed: Option<Decimal>,
    pub url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            database_path: PathBuf::from("moneta.db"),
            rate: RateConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path =
            std::env::var("MONETA_CONFIG").unwrap_or_else(|_| "moneta.toml".to_string());

        let mut config = match std::fs::read_to_string(&path) {
            Ok(text) => {
                toml::from_str(&text).with_context(|| format!("parsing {path}"))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ServerConfig::default(),
            Err(e) => return Err(e).with_context(|| format!("reading {path}")),
        };

        if let Ok(db) = std::env::var("MONETA_DB") {
            config.database_path = PathBuf::from(db);
        }

        Ok(config)
    }
}
