use crate::error::{ConfigErrorKind, InfraError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: String,              // e.g. "https://www.bungie.net"
    pub api_key: String,               // application key, sent as X-API-Key
    pub access_token: Option<String>,  // bearer token for private components and actions
    pub language: String,              // e.g. "en"
    pub manifest_path: PathBuf,        // local definitions database
    pub http_addr: String,             // e.g. "127.0.0.1:4040"
    pub bootstrap_timeout_ms: u64,     // manifest lookup race
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: "https://www.bungie.net".to_string(),
            api_key: String::new(),
            access_token: None,
            language: "en".to_string(),
            manifest_path: PathBuf::from("manifest.sqlite3"),
            http_addr: "127.0.0.1:4040".to_string(),
            bootstrap_timeout_ms: 4000,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InfraError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|e| InfraError::Config {
            path: path.to_path_buf(),
            source: ConfigErrorKind::Read(e),
        })?;
        Self::parse(&data).map_err(|e| InfraError::Config {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(data: &str) -> Result<Self, ConfigErrorKind> {
        toml::from_str(data).map_err(ConfigErrorKind::Parse)
    }

    pub fn from_env() -> Result<Self, InfraError> {
        let _ = dotenvy::from_filename(".env");
        let defaults = Self::default();

        let bootstrap_timeout_ms = match std::env::var("BNET_BOOTSTRAP_TIMEOUT_MS") {
            Ok(v) => v.parse().map_err(|e: std::num::ParseIntError| {
                InfraError::Env(ConfigErrorKind::InvalidEnv("BNET_BOOTSTRAP_TIMEOUT_MS".into(), e.to_string()))
            })?,
            Err(_) => defaults.bootstrap_timeout_ms,
        };

        let cfg = Self {
            api_base: std::env::var("BNET_BASE_URL").unwrap_or(defaults.api_base),
            api_key: std::env::var("BNET_API_KEY").unwrap_or_default(),
            access_token: std::env::var("BNET_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()),
            language: std::env::var("DELIVERATOR_LANGUAGE").unwrap_or(defaults.language),
            manifest_path: std::env::var("DELIVERATOR_MANIFEST")
                .map(PathBuf::from)
                .unwrap_or(defaults.manifest_path),
            http_addr: std::env::var("HTTP_ADDR").unwrap_or(defaults.http_addr),
            bootstrap_timeout_ms,
        };

        Ok(cfg)
    }

    pub fn bootstrap_timeout(&self) -> Duration {
        Duration::from_millis(self.bootstrap_timeout_ms)
    }
}
