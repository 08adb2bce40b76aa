//! HTTP protocol layer module
//!
//! Range parsing, content types and status-code responses, decoupled from media resolution.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, RangeOutcome, RangeRequest};
pub use response::{
    build_404_response, build_405_response, build_416_response, build_error_response,
    build_json_response, build_options_response, empty_body, ResponseBody,
};
