use clap::Parser;
use std::sync::Arc;
use std::time::Duration;

use gallery_events::config::{self, AppState, Config};
use gallery_events::logger;
use gallery_events::server::{self, SignalHandler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    logger::init(&cfg)?;

    // Worker thread count follows `server.workers`, defaulting to CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

/// Gallery and events web service
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path, without extension
    #[clap(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    let state = Arc::new(AppState::open(&cfg)?);
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    let result = local
        .run_until(server::start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&signals.shutdown),
        ))
        .await;

    // Let in-flight connections finish, bounded by the write timeout
    let drain = Duration::from_secs(cfg.performance.write_timeout);
    if tokio::time::timeout(drain, local).await.is_err() {
        logger::log_warning("[Shutdown] Dropping connections still open after drain timeout");
    }

    state.close();
    logger::log_info("[Shutdown] Server stopped");
    result.map_err(Into::into)
}
