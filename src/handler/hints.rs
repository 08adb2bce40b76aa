//! Client classification
//!
//! Derives [`ClientHints`] from request metadata. This is substring sniffing of the
//! `User-Agent`, kept out of the media core because it only ever adds headers.

use crate::media::ClientHints;
use hyper::header::{HeaderMap, USER_AGENT};

const SESSION_PARAM: &str = "playbackSessionId";

pub fn classify(headers: &HeaderMap, query: Option<&str>) -> ClientHints {
    let ua = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    ClientHints {
        safari_like: ua.contains("Safari") && !ua.contains("Chrome"),
        ios_like: ua.contains("iPhone") || ua.contains("iPad"),
        playback_session: query.and_then(session_param),
    }
}

/// Client-supplied session marker, ignored unless it is plain visible ASCII
fn session_param(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SESSION_PARAM)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty() && value.bytes().all(|b| b.is_ascii_graphic()))
        .map(ToString::to_string)
}
