//! Logger module
//!
//! Provides logging utilities for the media server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Stream abort and client disconnect reporting

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use std::net::SocketAddr;
use writer::ACCESS_TARGET;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        &config.logging.level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Media server listening on http://{addr}");
    tracing::info!(
        root = %config.media.root.display(),
        sample = %config.media.sample.display(),
        extension = %config.media.extension,
        "Serving processed media"
    );
    tracing::info!(
        buffer_size = config.media.buffer_size,
        cache_max_age = config.media.cache_max_age,
        max_connections = ?config.performance.max_connections,
        workers = ?config.server.workers,
        "Streaming configuration"
    );
    if let Some(ref path) = config.logging.access_log_file {
        tracing::info!("Access log: {path}");
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("Connection accepted from {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    tracing::debug!("Connection closed with error: {err}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_fallback(id: &str, sample: &std::path::Path) {
    tracing::info!("Media '{id}' not found, serving sample {}", sample.display());
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.render(format));
}

/// Stream failed after the response head was sent; the connection is being dropped
pub fn log_stream_aborted(resource: &str, delivered: u64, err: &std::io::Error) {
    tracing::error!(
        resource,
        delivered,
        "Media stream aborted after response head, closing connection: {err}"
    );
}

/// Body dropped before completion, usually a client disconnect or seek
pub fn log_client_gone(resource: &str, delivered: u64, remaining: u64) {
    tracing::debug!(
        resource,
        delivered,
        remaining,
        "Client stopped reading, media stream closed"
    );
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(
        active_connections,
        "Shutdown requested, no longer accepting connections"
    );
}
