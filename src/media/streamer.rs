//! Range streamer
//!
//! Builds complete media responses: plans status and headers, opens the resource at the
//! requested offset and hands hyper a flow-controlled body.

use super::error::MediaError;
use super::plan::{ClientHints, Delivery, ResponsePlan};
use super::resolver::MediaResource;
use super::source::ByteSource;
use crate::http::{empty_body, RangeOutcome, ResponseBody};
use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::Response;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeek};

/// Streaming parameters, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Read buffer size in bytes; one chunk is at most this large
    pub buffer_size: usize,
    /// `max-age` advertised on playback responses
    pub cache_max_age: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            cache_max_age: 3600,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RangeStreamer {
    config: StreamConfig,
}

impl RangeStreamer {
    pub const fn new(config: StreamConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> StreamConfig {
        self.config
    }

    /// Delivery used by the playback endpoint
    pub const fn playback(&self) -> Delivery {
        Delivery::Stream {
            cache_max_age: self.config.cache_max_age,
        }
    }

    /// Build the response for `resource`, reading from the filesystem
    ///
    /// `Err` is only returned while the response can still carry an error status: for an
    /// unsatisfiable range, or when opening, seeking or the first read fails.
    pub async fn build_response(
        &self,
        resource: &MediaResource,
        outcome: RangeOutcome,
        hints: &ClientHints,
        delivery: Delivery,
        is_head: bool,
    ) -> Result<Response<ResponseBody>, MediaError> {
        let plan = ResponsePlan::new(resource, outcome, delivery)?;
        if is_head {
            return Ok(assemble(&plan, hints, empty_body()));
        }

        let file = File::open(&resource.path).await?;
        self.respond_from(file, &plan, hints, &resource.id).await
    }

    /// Build the response body from an arbitrary seekable reader
    pub async fn respond_from<R>(
        &self,
        reader: R,
        plan: &ResponsePlan,
        hints: &ClientHints,
        label: &str,
    ) -> Result<Response<ResponseBody>, MediaError>
    where
        R: AsyncRead + AsyncSeek + Unpin + Send + 'static,
    {
        let source = ByteSource::open(
            reader,
            plan.start(),
            plan.content_length(),
            self.config.buffer_size,
            label,
        )
        .await?;

        let body = StreamBody::new(source.map_ok(Frame::data)).boxed_unsync();
        Ok(assemble(plan, hints, body))
    }
}

/// Status line and headers are final from here on
fn assemble(
    plan: &ResponsePlan,
    hints: &ClientHints,
    body: ResponseBody,
) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = plan.status;
    *response.headers_mut() = plan.headers(hints);
    response
}
