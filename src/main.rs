//! Bracket Vote Back binary entrypoint wiring the REST API to the configured bracket store.

use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bracket_vote_back::{
    config::AppConfig,
    dao::bracket_store::memory::{MemoryBracketStore, MemorySeed},
    routes,
    state::{AppState, SharedState},
};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let app_state = AppState::new(config);

    let backend = env::var("BRACKET_STORE").unwrap_or_else(|_| "mongo".into());
    match backend.as_str() {
        "memory" => install_memory_store(&app_state).await?,
        "mongo" => spawn_mongo_supervisor(app_state.clone())?,
        other => anyhow::bail!("unsupported BRACKET_STORE backend `{other}`"),
    }

    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, backend = %backend, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install an in-process store, optionally seeded from `BRACKET_SEED_PATH`.
async fn install_memory_store(state: &SharedState) -> anyhow::Result<()> {
    let store = match env::var("BRACKET_SEED_PATH").ok().map(PathBuf::from) {
        Some(path) => {
            let seed = MemorySeed::from_file(&path)
                .with_context(|| format!("loading seed file {}", path.display()))?;
            info!(path = %path.display(), "seeding in-memory bracket store");
            MemoryBracketStore::from_seed(seed).await
        }
        None => {
            warn!("BRACKET_SEED_PATH not set; in-memory store starts empty");
            MemoryBracketStore::new()
        }
    };

    state.set_bracket_store(Arc::new(store)).await;
    Ok(())
}

#[cfg(feature = "mongo-store")]
fn spawn_mongo_supervisor(state: SharedState) -> anyhow::Result<()> {
    use bracket_vote_back::{
        dao::{
            bracket_store::{
                BracketStore,
                mongodb::{MongoBracketStore, MongoConfig},
            },
            storage::StorageError,
        },
        services::storage_supervisor,
    };

    tokio::spawn(storage_supervisor::run(state, || async {
        let config = MongoConfig::from_env().await.map_err(StorageError::from)?;
        let store = MongoBracketStore::connect(config)
            .await
            .map_err(StorageError::from)?;
        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn BracketStore>)
    }));
    Ok(())
}

#[cfg(not(feature = "mongo-store"))]
fn spawn_mongo_supervisor(_state: SharedState) -> anyhow::Result<()> {
    anyhow::bail!("built without the `mongo-store` feature; set BRACKET_STORE=memory")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "SIGTERM handler unavailable; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
