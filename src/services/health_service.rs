use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the store and report whether the service can answer bracket requests.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.bracket_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
                return HealthResponse::degraded();
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded().await {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::bracket_store::memory::MemoryBracketStore, state::AppState,
    };

    #[tokio::test]
    async fn reports_degraded_without_a_store() {
        let state = AppState::new(AppConfig::default());
        assert_eq!(health_status(&state).await, HealthResponse::degraded());
    }

    #[tokio::test]
    async fn follows_the_store_health_check() {
        let store = MemoryBracketStore::new();
        let state = AppState::with_store(AppConfig::default(), Arc::new(store.clone())).await;
        assert_eq!(health_status(&state).await, HealthResponse::ok());

        store.set_offline(true);
        assert_eq!(health_status(&state).await, HealthResponse::degraded());
    }
}
