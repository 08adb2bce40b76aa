//! Request handler module
//!
//! Responsible for request routing dispatch, client classification and the media endpoints.

mod hints;
mod media;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
