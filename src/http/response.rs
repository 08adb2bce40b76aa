//! HTTP response building module
//!
//! Status-code responses with small in-memory bodies. Streamed media bodies are built by
//! `media::streamer` but share the same [`ResponseBody`] type.

use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::io;

/// Body type of every response the server produces
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

pub const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// In-memory body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into()).map_err(|never| match never {}).boxed_unsync()
}

pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new().map_err(|never| match never {}).boxed_unsync()
}

/// Plain-text error response; HEAD requests get the headers only
pub fn build_error_response(status: StatusCode, is_head: bool) -> Response<ResponseBody> {
    let message = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let content_length = message.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(message)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", content_length)
        .header("Access-Control-Allow-Origin", "*")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            fallback_response(status)
        })
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<ResponseBody> {
    build_error_response(StatusCode::NOT_FOUND, is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    let mut resp = build_error_response(StatusCode::METHOD_NOT_ALLOWED, false);
    resp.headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static(ALLOWED_METHODS));
    resp
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(size: u64, is_head: bool) -> Response<ResponseBody> {
    let mut resp = build_error_response(StatusCode::RANGE_NOT_SATISFIABLE, is_head);
    if let Ok(value) = hyper::header::HeaderValue::from_str(&format!("bytes */{size}")) {
        resp.headers_mut().insert("Content-Range", value);
    }
    resp.headers_mut()
        .insert("Accept-Ranges", hyper::header::HeaderValue::from_static("bytes"));
    resp
}

/// Build OPTIONS response (CORS preflight)
pub fn build_options_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", ALLOWED_METHODS)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", ALLOWED_METHODS)
        .header("Access-Control-Allow-Headers", "Content-Type, Range")
        .header(
            "Access-Control-Expose-Headers",
            "Content-Length, Content-Range, Accept-Ranges",
        )
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            fallback_response(StatusCode::NO_CONTENT)
        })
}

/// Build JSON response from a serializable value
pub fn build_json_response(value: &serde_json::Value, is_head: bool) -> Response<ResponseBody> {
    let content = value.to_string();
    let content_length = content.len();
    let body = if is_head {
        empty_body()
    } else {
        full_body(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", "*")
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            fallback_response(StatusCode::INTERNAL_SERVER_ERROR)
        })
}

fn fallback_response(status: StatusCode) -> Response<ResponseBody> {
    let mut resp = Response::new(empty_body());
    *resp.status_mut() = status;
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_string(resp: Response<ResponseBody>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_404_body() {
        let resp = build_404_response(false);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["Content-Length"], "13");
        assert_eq!(body_string(resp).await, "404 Not Found");
    }

    #[tokio::test]
    async fn test_head_error_has_no_body() {
        let resp = build_404_response(true);
        assert_eq!(resp.headers()["Content-Length"], "13");
        assert!(body_string(resp).await.is_empty());
    }

    #[test]
    fn test_416_reports_size() {
        let resp = build_416_response(1000, false);
        assert_eq!(resp.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(resp.headers()["Content-Range"], "bytes */1000");
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["Allow"], ALLOWED_METHODS);
    }

    #[test]
    fn test_options_cors() {
        let resp = build_options_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["Access-Control-Allow-Origin"], "*");
        assert!(resp.headers()["Access-Control-Allow-Headers"]
            .to_str()
            .unwrap()
            .contains("Range"));
    }

    #[tokio::test]
    async fn test_json_response() {
        let resp = build_json_response(&serde_json::json!({"status": "online"}), false);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        assert_eq!(body_string(resp).await, r#"{"status":"online"}"#);
    }
}
