// Application state module
// Read-only per-process state shared by every connection

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::logger::AccessLogFormat;
use crate::media::{RangeStreamer, Resolver, StreamConfig};

/// Application state
pub struct AppState {
    pub config: Config,
    /// Playback and download resolution, with sample fallback
    pub videos: Resolver,
    /// Thumbnail resolution, no fallback
    pub thumbnails: Resolver,
    pub streamer: RangeStreamer,
    pub access_log_format: AccessLogFormat,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let media = &config.media;
        let videos = Resolver::new(&media.root, &media.extension).with_fallback(&media.sample);
        let thumbnails = Resolver::new(&media.root, &media.thumbnail_extension);
        let streamer = RangeStreamer::new(StreamConfig {
            buffer_size: media.buffer_size,
            cache_max_age: media.cache_max_age,
        });

        Self {
            config: config.clone(),
            videos,
            thumbnails,
            streamer,
            access_log_format: AccessLogFormat::parse(&config.logging.access_log_format),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
