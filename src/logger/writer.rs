//! Log writer module
//!
//! Installs the global `tracing` subscriber: diagnostics go to stderr or the error log file,
//! access lines (target [`ACCESS_TARGET`]) go undecorated to stdout or the access log file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::{filter_fn, EnvFilter};
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Target used for access log events
pub const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG`, when set, overrides `level`. Returns an error if a log file cannot be opened
/// or a subscriber is already installed.
pub fn init(
    level: &str,
    access_log_file: Option<&str>,
    error_log_file: Option<&str>,
) -> io::Result<()> {
    let base = std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string());
    let filter = EnvFilter::try_new(format!("{base},{ACCESS_TARGET}=off"))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    let diagnostics = fmt::layer()
        .with_writer(make_writer(error_log_file, Target::Stderr)?)
        .with_ansi(error_log_file.is_none())
        .with_filter(filter);

    let access = fmt::layer()
        .with_writer(make_writer(access_log_file, Target::Stdout)?)
        .with_ansi(false)
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET));

    tracing_subscriber::registry()
        .with(diagnostics)
        .with(access)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))
}

enum Target {
    Stdout,
    Stderr,
}

fn make_writer(path: Option<&str>, fallback: Target) -> io::Result<BoxMakeWriter> {
    Ok(match path {
        Some(p) => BoxMakeWriter::new(Mutex::new(open_log_file(p)?)),
        None => match fallback {
            Target::Stdout => BoxMakeWriter::new(io::stdout),
            Target::Stderr => BoxMakeWriter::new(io::stderr),
        },
    })
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}
