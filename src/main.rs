use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod config;
mod handler;
mod http;
mod logger;
mod media;
mod server;

/// Longest wait for in-flight streams after the accept loop stops
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path)?,
        None => config::Config::load()?,
    };
    logger::init(&cfg)?;

    // Tokio runtime, worker count from config or CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        tracing::info!("Using {workers} worker threads");
    } else {
        tracing::info!("Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.performance.listen_backlog)?;

    let state = Arc::new(config::AppState::new(&cfg));
    let connections = Arc::new(AtomicUsize::new(0));
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&addr, &cfg);

    server::start_server_loop(
        listener,
        state,
        Arc::clone(&connections),
        Arc::clone(&signals.shutdown),
    )
    .await;

    wait_for_connections(&connections, SHUTDOWN_GRACE).await;
    Ok(())
}

/// Let active connections finish, up to `grace`
async fn wait_for_connections(connections: &AtomicUsize, grace: Duration) {
    let deadline = Instant::now() + grace;
    while connections.load(Ordering::SeqCst) > 0 {
        if Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown grace period elapsed with {} connections still open",
                connections.load(Ordering::SeqCst)
            ));
            return;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    tracing::info!("All connections closed");
}
