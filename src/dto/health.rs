use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
}

impl HealthResponse {
    /// The store answered its health check.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }

    /// Whether this reports a reachable store.
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// No store installed, or the installed one is failing.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
        }
    }
}
