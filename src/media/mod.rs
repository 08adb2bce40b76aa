//! Media delivery core
//!
//! Resolution of identifiers to files, response planning, and range streaming. A request moves
//! through resolve → plan → stream; the first two stages report failures as [`MediaError`] and
//! the last one as errors on the body stream once the response head is out.

mod error;
mod plan;
mod resolver;
mod source;
mod streamer;

pub use error::MediaError;
pub use plan::{ClientHints, Delivery};
pub use resolver::Resolver;
pub use streamer::{RangeStreamer, StreamConfig};
