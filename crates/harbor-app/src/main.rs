mod broadcast;
mod calendar_tasks;
mod cli;
mod dispatch;
mod protocol;
mod server;
mod session;

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use harbor_config::HarborConfig;

use broadcast::Broadcaster;
use calendar_tasks::CalendarService;
use server::RelayEvent;
use session::SessionBridge;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Config loads before logging init so the configured directive can
    // serve as the filter fallback; the load outcome is logged after.
    let (mut config, config_warning) = load_config_or_default(&args);

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.directive.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive)),
        )
        .init();

    tracing::info!("Harbor v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(warning) = config_warning {
        tracing::warn!("{warning}");
    }

    // CLI overrides
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.directory {
        config.shell.working_directory = Some(dir);
    }

    let broadcaster = Broadcaster::new();
    let bridge = SessionBridge::new(
        session::launch_from_config(&config),
        session::viewport_from_config(&config),
        broadcaster.clone(),
    );
    let calendar = Arc::new(CalendarService::new(
        config.calendar.clone(),
        broadcaster.clone(),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind relay listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "relay listening");

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    tokio::spawn(server::run(listener, broadcaster.clone(), event_tx));

    drive(bridge, event_rx, calendar, broadcaster).await;
    tracing::info!("shutdown complete");
}

/// The bridge's single-threaded cooperative loop: pump PTY output on a
/// tick, apply renderer events as they arrive, end everything on ctrl-c.
async fn drive(
    mut bridge: SessionBridge,
    mut events: mpsc::UnboundedReceiver<RelayEvent>,
    calendar: Arc<CalendarService>,
    broadcaster: Broadcaster,
) {
    let mut tick = tokio::time::interval(Duration::from_millis(15));
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = tick.tick() => bridge.poll(),

            event = events.recv() => match event {
                Some(RelayEvent::Message(msg)) => {
                    dispatch::dispatch(msg, &mut bridge, &calendar, &broadcaster);
                }
                Some(RelayEvent::Disconnected) => {
                    tracing::info!("renderer gone, ending session");
                    bridge.end_session();
                }
                None => break, // relay task gone
            },

            _ = &mut shutdown => {
                tracing::info!("received ctrl-c, shutting down");
                break;
            }
        }
    }

    bridge.end_session();
}

fn load_config_or_default(args: &cli::Args) -> (HarborConfig, Option<String>) {
    let result = match &args.config {
        Some(path) => harbor_config::load_from_path(std::path::Path::new(path)),
        None => harbor_config::load_config(),
    };
    match result {
        Ok(config) => (config, None),
        Err(e) => (
            HarborConfig::default(),
            Some(format!("config load failed, using defaults: {e}")),
        ),
    }
}
