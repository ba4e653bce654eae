use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dao::models::{TournamentEntity, TournamentStatus};

use super::format_system_time;

/// One row of the tournament listing.
#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSummary {
    pub id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
    /// Absent once the tournament is completed.
    pub current_round: Option<u32>,
    pub total_entrants: u32,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<TournamentEntity> for TournamentSummary {
    fn from(value: TournamentEntity) -> Self {
        let current_round = match value.status {
            TournamentStatus::Completed => None,
            TournamentStatus::Open | TournamentStatus::Voting => Some(value.current_round),
        };
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            current_round,
            total_entrants: value.total_entrants,
            created_at: format_system_time(value.created_at),
        }
    }
}
