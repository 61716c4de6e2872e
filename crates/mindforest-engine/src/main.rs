//! Garden engine binary for Mindforest.
//!
//! Wires together configuration, persistence, the growth loop, wisdom
//! extraction, and the HTTP API, then runs until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `mindforest-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Connect to `PostgreSQL` and run migrations (if configured)
//! 4. Restore the user's garden, or start an empty one
//! 5. Configure the wisdom extractor from the environment
//! 6. Start the API server and the growth loop
//! 7. Wait for `Ctrl-C`, then stop both and flush the garden

mod error;
mod persist_callback;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use mindforest_core::{Clock, Garden, MindforestConfig, SystemClock, run_ticks};
use mindforest_db::{GardenStore, Mirror, PostgresConfig, PostgresPool};
use mindforest_extractor::{ExtractorConfig, create_extractor};
use mindforest_observer::{AppState, ServerConfig, start_server};
use mindforest_species::SpeciesCatalog;
use tokio::sync::{Mutex, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::persist_callback::PersistCallback;

/// Default configuration file, relative to the working directory.
const CONFIG_PATH: &str = "mindforest-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any initialization step fails or a background
/// task dies.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!(
        user_id = %config.session.user_id,
        base_stage_duration_ms = config.growth.base_stage_duration_ms,
        tick_interval_ms = config.growth.tick_interval_ms,
        "mindforest-engine starting"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let user_id = config.session.user_id;

    // 3. Connect to PostgreSQL.
    let pool = match PostgresConfig::from_infrastructure(&config.infrastructure) {
        Some(pg_config) => Some(PostgresPool::open(&pg_config).await?),
        None => {
            warn!("No postgres_url configured, garden will not be persisted");
            None
        }
    };

    // 4. Restore the garden.
    let settings = config.growth.settings();
    let garden = match &pool {
        Some(pool) => {
            let snapshot = GardenStore::new(pool.pool())
                .load_snapshot(user_id, SpeciesCatalog::standard())
                .await?;
            Garden::restore(
                snapshot,
                settings,
                config.market.fruits.clone(),
                clock.now_ms(),
            )
        }
        None => Garden::new(settings, config.market.fruits.clone()),
    };
    let garden = Arc::new(Mutex::new(garden));
    let mirror = pool
        .clone()
        .map_or_else(|| Mirror::disabled(user_id), |p| Mirror::new(p, user_id));

    // 5. Configure wisdom extraction.
    let mut app_state = AppState::new(Arc::clone(&garden), Arc::clone(&clock), mirror.clone());
    match ExtractorConfig::from_env().and_then(|c| create_extractor(&c)) {
        Ok(extractor) => {
            info!(backend = extractor.name(), "Wisdom extractor configured");
            app_state = app_state.with_extractor(Arc::new(extractor));
        }
        Err(e) => warn!(error = %e, "Wisdom extractor unavailable, reflections disabled"),
    }

    // 6. Start the API server and the growth loop.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server_config = ServerConfig {
        host: config.infrastructure.observer_host.clone(),
        port: config.infrastructure.observer_port,
    };
    let server_rx = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        start_server(&server_config, Arc::new(app_state), server_rx).await
    });

    let loop_garden = Arc::clone(&garden);
    let loop_clock = Arc::clone(&clock);
    let loop_mirror = mirror.clone();
    let tick_interval = Duration::from_millis(config.growth.tick_interval_ms);
    let growth = tokio::spawn(async move {
        let mut callback = PersistCallback::new(loop_mirror);
        run_ticks(loop_garden, loop_clock, tick_interval, shutdown_rx, &mut callback).await
    });

    // 7. Wait for Ctrl-C, then shut down.
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
    info!("Shutdown requested");
    if shutdown_tx.send(true).is_err() {
        warn!("Background tasks already stopped");
    }

    let summary = growth.await.map_err(|e| EngineError::Task {
        message: format!("growth loop: {e}"),
    })?;
    server.await.map_err(|e| EngineError::Task {
        message: format!("api server: {e}"),
    })??;

    // The final full write queues behind every in-flight mirror write, so
    // nothing older can land after it.
    let snapshot = garden.lock().await.snapshot();
    mirror.snapshot(snapshot);
    mirror.flush().await;
    if let Some(pool) = &pool {
        pool.close().await;
    }

    info!(
        ticks = summary.ticks,
        transitions = summary.transitions,
        "mindforest-engine shutdown complete"
    );
    Ok(())
}

/// Load configuration from `MINDFOREST_CONFIG` or `mindforest-config.yaml`.
///
/// A missing file yields defaults, still subject to environment overrides.
fn load_config() -> Result<MindforestConfig, EngineError> {
    let path = std::env::var("MINDFOREST_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_owned());
    let path = Path::new(&path);
    if path.exists() {
        Ok(MindforestConfig::from_file(path)?)
    } else {
        Ok(MindforestConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `logging.level`; `logging.json` selects the JSON
/// formatter.
fn init_logging(config: &MindforestConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    let result = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}
