use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{config::AppConfig, dao::bracket_store::BracketStore, error::ServiceError};

pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle and the degraded flag.
///
/// Holds no bracket data; every request reads fresh rows through the store.
pub struct AppState {
    bracket_store: RwLock<Option<Arc<dyn BracketStore>>>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            bracket_store: RwLock::new(None),
            degraded: degraded_tx,
            config,
        })
    }

    /// Build a state with `store` already installed.
    pub async fn with_store(config: AppConfig, store: Arc<dyn BracketStore>) -> SharedState {
        let state = Self::new(config);
        state.set_bracket_store(store).await;
        state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn bracket_store(&self) -> Option<Arc<dyn BracketStore>> {
        let guard = self.bracket_store.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`Self::bracket_store`] but fails with [`ServiceError::Degraded`] when absent.
    pub async fn require_bracket_store(&self) -> Result<Arc<dyn BracketStore>, ServiceError> {
        if *self.degraded.borrow() {
            return Err(ServiceError::Degraded);
        }
        self.bracket_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new store implementation and leave degraded mode.
    pub async fn set_bracket_store(&self, store: Arc<dyn BracketStore>) {
        {
            let mut guard = self.bracket_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_bracket_store(&self) {
        {
            let mut guard = self.bracket_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::bracket_store::memory::MemoryBracketStore;

    #[tokio::test]
    async fn starts_degraded_until_a_store_is_installed() {
        let state = AppState::new(AppConfig::default());
        assert!(state.is_degraded().await);
        assert!(matches!(
            state.require_bracket_store().await,
            Err(ServiceError::Degraded)
        ));

        state
            .set_bracket_store(Arc::new(MemoryBracketStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(state.require_bracket_store().await.is_ok());

        state.clear_bracket_store().await;
        assert!(state.is_degraded().await);
        assert!(state.bracket_store().await.is_none());
    }
}
