//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation, route matching,
//! dispatching and access logging.

use crate::config::AppState;
use crate::handler::{hints, media};
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::media::ClientHints;
use hyper::header::{HeaderName, ToStrError, CONTENT_LENGTH, RANGE, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{HeaderMap, Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

const VIDEOS_PREFIX: &str = "/videos/";
const DOWNLOAD_PREFIX: &str = "/download/";
const THUMBNAILS_PREFIX: &str = "/thumbnails/";
const STATUS_PATH: &str = "/api/status";

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    /// `Range` header; `Err` when present but not visible ASCII
    pub range_header: Option<Result<String, ToStrError>>,
    pub hints: ClientHints,
}

/// Main entry point for HTTP request handling
///
/// Generic over the request body: media requests never read it, so it is dropped up front.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();

    // 1. Check HTTP method
    let response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            // 2. Extract range and client traits, then dispatch
            let ctx = RequestContext {
                path: parts.uri.path(),
                is_head: parts.method == Method::HEAD,
                range_header: parts
                    .headers
                    .get(RANGE)
                    .map(|v| v.to_str().map(ToString::to_string)),
                hints: hints::classify(&parts.headers, parts.uri.query()),
            };
            route_request(&ctx, &state).await
        }
    };

    if state.cached_access_log.load(Ordering::Relaxed) {
        log_access(&parts, &response, remote_addr, started, &state);
    }

    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ResponseBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Route request based on path
async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<ResponseBody> {
    if ctx.path == STATUS_PATH {
        return serve_status(ctx.is_head);
    }
    if let Some(id) = ctx.path.strip_prefix(VIDEOS_PREFIX) {
        return media::serve_video(ctx, state, id).await;
    }
    if let Some(id) = ctx.path.strip_prefix(DOWNLOAD_PREFIX) {
        return media::serve_download(ctx, state, id).await;
    }
    if let Some(id) = ctx.path.strip_prefix(THUMBNAILS_PREFIX) {
        return media::serve_thumbnail(ctx, state, id).await;
    }
    http::build_404_response(ctx.is_head)
}

/// Liveness document
fn serve_status(is_head: bool) -> Response<ResponseBody> {
    let body = serde_json::json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
    });
    http::build_json_response(&body, is_head)
}

fn header_string(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn log_access(
    req: &Parts,
    response: &Response<ResponseBody>,
    remote_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.range = header_string(&req.headers, &RANGE);
    entry.referer = header_string(&req.headers, &REFERER);
    entry.user_agent = header_string(&req.headers, &USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;

    const PEER: &str = "127.0.0.1:50000";

    struct Fixture {
        _dir: tempfile::TempDir,
        state: Arc<AppState>,
        clip: Vec<u8>,
        sample: Vec<u8>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("processed");
        std::fs::create_dir_all(&root).unwrap();

        let clip: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        let sample: Vec<u8> = (0..300u32).map(|i| (i % 7) as u8).collect();
        std::fs::write(root.join("clip-1.mp4"), &clip).unwrap();
        std::fs::write(root.join("clip-1.jpg"), b"jpeg-bytes").unwrap();
        std::fs::write(dir.path().join("sample.mp4"), &sample).unwrap();

        let mut config = Config::load_from("tests-no-such-config").unwrap();
        config.media.root = root;
        config.media.sample = dir.path().join("sample.mp4");
        config.logging.access_log = false;

        Fixture {
            state: Arc::new(AppState::new(&config)),
            _dir: dir,
            clip,
            sample,
        }
    }

    fn get(path: &str) -> hyper::http::request::Builder {
        Request::builder().method(Method::GET).uri(path)
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<ResponseBody> {
        handle_request(req, Arc::clone(state), PEER.parse().unwrap())
            .await
            .unwrap()
    }

    async fn body_of(resp: Response<ResponseBody>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    fn header<'a>(resp: &'a Response<ResponseBody>, name: &str) -> Option<&'a str> {
        resp.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[tokio::test]
    async fn test_video_full() {
        let f = fixture();
        let resp = send(&f.state, get("/videos/clip-1").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-length"), Some("1000"));
        assert_eq!(header(&resp, "accept-ranges"), Some("bytes"));
        assert_eq!(header(&resp, "content-type"), Some("video/mp4"));
        assert_eq!(body_of(resp).await, f.clip);
    }

    #[tokio::test]
    async fn test_video_partial() {
        let f = fixture();
        let req = get("/videos/clip-1")
            .header("range", "bytes=200-499")
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&resp, "content-range"), Some("bytes 200-499/1000"));
        assert_eq!(header(&resp, "content-length"), Some("300"));
        assert_eq!(body_of(resp).await, &f.clip[200..500]);
    }

    #[tokio::test]
    async fn test_video_unsatisfiable_range() {
        let f = fixture();
        let req = get("/videos/clip-1")
            .header("range", "bytes=1000-")
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&resp, "content-range"), Some("bytes */1000"));
    }

    #[tokio::test]
    async fn test_video_unreadable_range_is_unsatisfiable() {
        let f = fixture();
        let req = get("/videos/clip-1")
            .header(
                RANGE,
                hyper::header::HeaderValue::from_bytes(b"bytes=\xff-9").unwrap(),
            )
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(header(&resp, "content-range"), Some("bytes */1000"));
    }

    #[tokio::test]
    async fn test_video_fallback_to_sample() {
        let f = fixture();
        let resp = send(&f.state, get("/videos/missing").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-length"), Some("300"));
        assert_eq!(body_of(resp).await, f.sample);
    }

    #[tokio::test]
    async fn test_video_not_found_without_sample() {
        let f = fixture();
        std::fs::remove_file(&f.state.config.media.sample).unwrap();
        let resp = send(&f.state, get("/videos/missing").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_identifier() {
        let f = fixture();
        for path in ["/videos/..%2Fsecret", "/videos/a/../b", "/videos/", "/download/.hidden"] {
            let resp = send(&f.state, get(path).body(()).unwrap()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
        }
    }

    #[tokio::test]
    async fn test_ios_session_header() {
        let f = fixture();
        let req = get("/videos/clip-1?playbackSessionId=S-1")
            .header("user-agent", "Mozilla/5.0 (iPhone) AppleWebKit Safari/604.1")
            .header("range", "bytes=0-1")
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::PARTIAL_CONTENT);
        assert_eq!(header(&resp, "x-playback-session-id"), Some("S-1"));
        assert_eq!(header(&resp, "x-content-type-options"), Some("nosniff"));
    }

    #[tokio::test]
    async fn test_download() {
        let f = fixture();
        let req = get("/download/clip-1")
            .header("range", "bytes=0-9")
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            header(&resp, "content-disposition"),
            Some("attachment; filename=\"viral-clip-clip-1.mp4\"")
        );
        assert_eq!(body_of(resp).await, f.clip);
    }

    #[tokio::test]
    async fn test_download_falls_back_to_sample() {
        let f = fixture();
        let resp = send(&f.state, get("/download/missing").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            header(&resp, "content-disposition"),
            Some("attachment; filename=\"viral-clip-missing.mp4\"")
        );
        assert_eq!(body_of(resp).await, f.sample);
    }

    #[tokio::test]
    async fn test_thumbnail() {
        let f = fixture();
        let resp = send(&f.state, get("/thumbnails/clip-1").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-type"), Some("image/jpeg"));
        assert_eq!(body_of(resp).await, b"jpeg-bytes");

        let resp = send(&f.state, get("/thumbnails/missing").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let f = fixture();
        let req = Request::builder()
            .method(Method::HEAD)
            .uri("/videos/clip-1")
            .body(())
            .unwrap();
        let resp = send(&f.state, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "content-length"), Some("1000"));
        assert!(body_of(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let f = fixture();
        let resp = send(&f.state, get(STATUS_PATH).body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body_of(resp).await).unwrap();
        assert_eq!(value["status"], "online");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_methods_and_unknown_paths() {
        let f = fixture();
        let post = Request::builder()
            .method(Method::POST)
            .uri("/videos/clip-1")
            .body(())
            .unwrap();
        let resp = send(&f.state, post).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&resp, "allow"), Some(http::response::ALLOWED_METHODS));

        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/videos/clip-1")
            .body(())
            .unwrap();
        assert_eq!(send(&f.state, options).await.status(), StatusCode::NO_CONTENT);

        let resp = send(&f.state, get("/elsewhere").body(()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
