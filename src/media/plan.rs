//! Response planning
//!
//! Turns a resolved resource and a range outcome into the status line and headers of the
//! response, before any byte of the resource is read.

use super::error::MediaError;
use super::resolver::MediaResource;
use crate::http::{RangeOutcome, RangeRequest};
use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::StatusCode;

/// Request-derived client traits that only ever add headers
///
/// Classification happens in the handler layer; the planner trusts these flags as given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientHints {
    /// Safari without Chrome: add `X-Content-Type-Options: nosniff`
    pub safari_like: bool,
    /// iPhone/iPad: add a playback session marker, prefer inline downloads
    pub ios_like: bool,
    /// Session marker supplied by the client, if any
    pub playback_session: Option<String>,
}

impl ClientHints {
    /// Session marker to advertise, defaulting to the current Unix time in milliseconds
    pub fn session_id(&self) -> String {
        self.playback_session
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string())
    }
}

/// How the resource is delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Playback, honouring byte ranges
    Stream { cache_max_age: u32 },
    /// Whole-file download suggesting `filename`
    Download { filename: String },
    /// Whole-file, cacheable, no client adaptation (thumbnails)
    Plain { cache_max_age: u32 },
}

/// Status and headers of a media response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    pub status: StatusCode,
    /// Byte range to send; `None` means the whole resource
    pub range: Option<RangeRequest>,
    pub size: u64,
    pub content_type: &'static str,
    pub delivery: Delivery,
}

impl ResponsePlan {
    /// Plan a response, rejecting unsatisfiable ranges
    ///
    /// Only [`Delivery::Stream`] negotiates ranges; the other deliveries always send the
    /// whole resource with 200 whatever the client asked for.
    pub fn new(
        resource: &MediaResource,
        outcome: RangeOutcome,
        delivery: Delivery,
    ) -> Result<Self, MediaError> {
        let range = match (&delivery, outcome) {
            (Delivery::Stream { .. }, RangeOutcome::Partial(range)) => Some(range),
            (Delivery::Stream { .. }, RangeOutcome::Malformed) => {
                return Err(MediaError::MalformedRange {
                    size: resource.size,
                })
            }
            _ => None,
        };

        Ok(Self {
            status: if range.is_some() {
                StatusCode::PARTIAL_CONTENT
            } else {
                StatusCode::OK
            },
            range,
            size: resource.size,
            content_type: resource.content_type,
            delivery,
        })
    }

    /// First byte offset to send
    pub fn start(&self) -> u64 {
        self.range.map_or(0, |r| r.start)
    }

    /// Number of bytes the body will carry
    pub fn content_length(&self) -> u64 {
        self.range.map_or(self.size, |r| r.chunk_size())
    }

    /// Response headers, including client-adaptive ones
    pub fn headers(&self, hints: &ClientHints) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            hyper::header::CONTENT_LENGTH,
            HeaderValue::from(self.content_length()),
        );
        headers.insert(
            hyper::header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        headers.insert(
            hyper::header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );

        match &self.delivery {
            Delivery::Stream { cache_max_age } | Delivery::Plain { cache_max_age } => {
                if matches!(self.delivery, Delivery::Stream { .. }) {
                    headers.insert(
                        hyper::header::ACCEPT_RANGES,
                        HeaderValue::from_static("bytes"),
                    );
                }
                insert_str(
                    &mut headers,
                    hyper::header::CACHE_CONTROL,
                    &format!("public, max-age={cache_max_age}"),
                );
            }
            Delivery::Download { filename } => {
                let disposition = if hints.ios_like { "inline" } else { "attachment" };
                insert_str(
                    &mut headers,
                    hyper::header::CONTENT_DISPOSITION,
                    &format!("{disposition}; filename=\"{filename}\""),
                );
            }
        }

        if let Some(range) = self.range {
            insert_str(
                &mut headers,
                hyper::header::CONTENT_RANGE,
                &range.content_range(self.size),
            );
        }

        if matches!(self.delivery, Delivery::Plain { .. }) {
            return headers;
        }

        if hints.safari_like {
            headers.insert(
                hyper::header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
        }
        if hints.ios_like && matches!(self.delivery, Delivery::Stream { .. }) {
            insert_str(
                &mut headers,
                HeaderName::from_static("x-playback-session-id"),
                &hints.session_id(),
            );
        }

        headers
    }
}

/// Insert a dynamic header value, skipping values that are not valid header text
fn insert_str(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => tracing::warn!(header = %name, value, "dropping invalid header value"),
    }
}
