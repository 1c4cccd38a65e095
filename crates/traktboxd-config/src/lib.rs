pub mod config;
pub mod paths;

pub use config::{default_export_config, Config, ExportConfig, LoggingConfig, TraktConfig, DEFAULT_CHUNK_LIMIT, DEFAULT_HISTORY_CONCURRENCY, DEFAULT_TRAKT_API_URL};
pub use paths::{container_base_path, PathManager};
