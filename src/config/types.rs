// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub media: MediaConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds allowed for a client to send a complete request head
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
    pub listen_backlog: i32,
}

/// Media delivery configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory holding processed media, looked up as `<root>/<id>.<extension>`
    pub root: PathBuf,
    /// Resource served when the requested one is absent
    pub sample: PathBuf,
    pub extension: String,
    pub thumbnail_extension: String,
    /// Prefix of the suggested filename on the download route
    pub download_prefix: String,
    /// Read buffer size for file streaming, in bytes
    pub buffer_size: usize,
    /// `max-age` advertised on streamed responses, in seconds
    pub cache_max_age: u32,
}
