// Configuration module entry point
// Loads application configuration and holds per-process runtime state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

/// Default config file is "config.toml" when no path specified
const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (extension optional)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CLIPSTREAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("performance.listen_backlog", 1024)?
            .set_default("media.root", "videos/processed")?
            .set_default("media.sample", "videos/sample.mp4")?
            .set_default("media.extension", "mp4")?
            .set_default("media.thumbnail_extension", "jpg")?
            .set_default("media.download_prefix", "viral-clip-")?
            .set_default("media.buffer_size", 65_536)? // 64KB
            .set_default("media.cache_max_age", 3600)?
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.media.buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "media.buffer_size must be greater than zero".to_string(),
            ));
        }
        if self.media.extension.is_empty() || self.media.thumbnail_extension.is_empty() {
            return Err(config::ConfigError::Message(
                "media extensions must not be empty".to_string(),
            ));
        }
        if self.performance.listen_backlog <= 0 {
            return Err(config::ConfigError::Message(
                "performance.listen_backlog must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
