//! Media endpoints
//!
//! Playback, download and thumbnail handlers. Each resolves the identifier, plans the response
//! and hands over to the range streamer; failures that can still change the status line are
//! mapped to error responses here.

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, RangeOutcome, ResponseBody};
use crate::logger;
use crate::media::{Delivery, MediaError};
use hyper::{Response, StatusCode};

/// `GET /videos/{id}`: full or partial playback
pub async fn serve_video(
    ctx: &RequestContext<'_>,
    state: &AppState,
    id: &str,
) -> Response<ResponseBody> {
    let resource = match state.videos.resolve(id).await {
        Ok(r) => r,
        Err(e) => return error_response(&e, ctx.is_head),
    };
    if resource.is_fallback {
        logger::log_fallback(id, &resource.path);
    }

    let outcome = range_outcome(ctx, resource.size);
    state
        .streamer
        .build_response(
            &resource,
            outcome,
            &ctx.hints,
            state.streamer.playback(),
            ctx.is_head,
        )
        .await
        .unwrap_or_else(|e| error_response(&e, ctx.is_head))
}

/// `GET /download/{id}`: whole-file download, range header ignored
pub async fn serve_download(
    ctx: &RequestContext<'_>,
    state: &AppState,
    id: &str,
) -> Response<ResponseBody> {
    let resource = match state.videos.resolve(id).await {
        Ok(r) => r,
        Err(e) => return error_response(&e, ctx.is_head),
    };
    if resource.is_fallback {
        logger::log_fallback(id, &resource.path);
    }

    let filename = format!(
        "{}{}.{}",
        state.config.media.download_prefix,
        id,
        state.videos.extension()
    );
    state
        .streamer
        .build_response(
            &resource,
            RangeOutcome::Full,
            &ctx.hints,
            Delivery::Download { filename },
            ctx.is_head,
        )
        .await
        .unwrap_or_else(|e| error_response(&e, ctx.is_head))
}

/// `GET /thumbnails/{id}`: preview image, no fallback
pub async fn serve_thumbnail(
    ctx: &RequestContext<'_>,
    state: &AppState,
    id: &str,
) -> Response<ResponseBody> {
    let resource = match state.thumbnails.resolve(id).await {
        Ok(r) => r,
        Err(e) => return error_response(&e, ctx.is_head),
    };

    let delivery = Delivery::Plain {
        cache_max_age: state.streamer.config().cache_max_age,
    };
    state
        .streamer
        .build_response(&resource, RangeOutcome::Full, &ctx.hints, delivery, ctx.is_head)
        .await
        .unwrap_or_else(|e| error_response(&e, ctx.is_head))
}

/// An unreadable header is as unsatisfiable as an unparsable one
fn range_outcome(ctx: &RequestContext<'_>, size: u64) -> RangeOutcome {
    match &ctx.range_header {
        None => RangeOutcome::Full,
        Some(Ok(header)) => http::parse_range_header(Some(header), size),
        Some(Err(_)) => RangeOutcome::Malformed,
    }
}

fn error_response(err: &MediaError, is_head: bool) -> Response<ResponseBody> {
    match err {
        MediaError::MalformedRange { size } => http::build_416_response(*size, is_head),
        MediaError::Stream { .. } => {
            logger::log_error(&format!("Media stream failed before first byte: {err}"));
            http::build_error_response(StatusCode::INTERNAL_SERVER_ERROR, is_head)
        }
        MediaError::InvalidIdentifier(_) | MediaError::NotFound(_) => {
            http::build_error_response(err.status(), is_head)
        }
    }
}
