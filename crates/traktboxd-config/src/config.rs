use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Letterboxd rejects import files much larger than this many rows
pub const DEFAULT_CHUNK_LIMIT: usize = 1900;

pub const DEFAULT_TRAKT_API_URL: &str = "https://api.trakt.tv";

/// History requests allowed in flight at once during one export
pub const DEFAULT_HISTORY_CONCURRENCY: usize = 4;

const PLACEHOLDER_CLIENT_ID: &str = "YOUR_CLIENT_ID";

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub trakt: TraktConfig,
    #[serde(default = "default_export_config")]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TraktConfig {
    pub client_id: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Where export files are written; defaults to the data directory
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default = "default_chunk_limit")]
    pub chunk_limit: usize,
    /// Upper bound on history requests in flight during one export
    #[serde(default = "default_history_concurrency")]
    pub history_concurrency: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    pub file: Option<PathBuf>,
}

fn default_api_url() -> String {
    DEFAULT_TRAKT_API_URL.to_string()
}

fn default_chunk_limit() -> usize {
    DEFAULT_CHUNK_LIMIT
}

fn default_history_concurrency() -> usize {
    DEFAULT_HISTORY_CONCURRENCY
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_export_config() -> ExportConfig {
    ExportConfig {
        output_dir: None,
        chunk_limit: default_chunk_limit(),
        history_concurrency: default_history_concurrency(),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trakt: TraktConfig {
                client_id: PLACEHOLDER_CLIENT_ID.to_string(),
                api_url: default_api_url(),
            },
            export: default_export_config(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults. Environment
    /// overrides are applied either way.
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            Self::load_from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `TRAKT_CLIENT_ID` takes precedence over the file
    pub fn apply_env_overrides(&mut self) {
        if let Ok(client_id) = std::env::var("TRAKT_CLIENT_ID") {
            if !client_id.trim().is_empty() {
                self.trakt.client_id = client_id.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.is_trakt_configured() {
            return Err(anyhow::anyhow!(
                "Trakt client_id is not configured (run 'traktboxd config trakt' or set TRAKT_CLIENT_ID)"
            ));
        }
        if !self.trakt.api_url.starts_with("http://") && !self.trakt.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!("Invalid Trakt api_url: {}", self.trakt.api_url));
        }
        if self.export.chunk_limit == 0 {
            return Err(anyhow::anyhow!("export.chunk_limit must be greater than zero"));
        }
        if self.export.history_concurrency == 0 {
            return Err(anyhow::anyhow!("export.history_concurrency must be greater than zero"));
        }
        Ok(())
    }

    pub fn is_trakt_configured(&self) -> bool {
        let client_id = self.trakt.client_id.trim();
        !client_id.is_empty() && client_id != PLACEHOLDER_CLIENT_ID
    }
}
