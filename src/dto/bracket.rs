use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    bracket::{BracketView, EntrantView, MatchupState, MatchupView, RoundView},
    dao::models::TournamentStatus,
};

use super::format_system_time;

/// Bracket view-model served to the presentation layer.
#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BracketResponse {
    pub id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
    /// Round accepting votes; absent once the tournament is completed.
    pub current_round: Option<u32>,
    pub total_entrants: u32,
    pub created_at: String,
    /// Rounds ordered by round number.
    pub rounds: Vec<RoundResponse>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoundResponse {
    pub round_number: u32,
    /// e.g. "Quarter-Finals".
    pub label: String,
    /// Matchups of this round currently open for voting.
    pub voteable_count: usize,
    pub matchups: Vec<MatchupResponse>,
}

#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MatchupStateDto {
    Undecided,
    Open,
    Decided,
}

impl From<MatchupState> for MatchupStateDto {
    fn from(value: MatchupState) -> Self {
        match value {
            MatchupState::Undecided => Self::Undecided,
            MatchupState::Open => Self::Open,
            MatchupState::Decided => Self::Decided,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchupResponse {
    pub id: Uuid,
    pub match_index: u32,
    #[serde(rename = "is_active")]
    pub is_active: bool,
    pub state: MatchupStateDto,
    pub voteable: bool,
    /// `null` while the slot is still to be decided.
    pub entrant1: Option<EntrantResponse>,
    pub entrant2: Option<EntrantResponse>,
    #[serde(rename = "winner_id")]
    pub winner_id: Option<Uuid>,
    pub total_votes: usize,
    /// Entrant id to voter display names; only present once the matchup is decided.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub voters_by_entrant: Option<IndexMap<Uuid, Vec<String>>>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EntrantResponse {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "image_url", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub seed: u32,
    /// Votes for this entrant in this matchup only.
    pub votes_in_match: usize,
}

impl From<BracketView> for BracketResponse {
    fn from(value: BracketView) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            current_round: value.current_round,
            total_entrants: value.total_entrants,
            created_at: format_system_time(value.created_at),
            rounds: value.rounds.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<RoundView> for RoundResponse {
    fn from(value: RoundView) -> Self {
        let voteable_count = value.voteable_count();
        Self {
            round_number: value.round_number,
            label: value.label,
            voteable_count,
            matchups: value.matchups.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<MatchupView> for MatchupResponse {
    fn from(value: MatchupView) -> Self {
        let state = value.state();
        Self {
            id: value.id,
            match_index: value.match_index,
            is_active: value.is_active,
            state: state.into(),
            voteable: state == MatchupState::Open,
            entrant1: value.entrant1.map(Into::into),
            entrant2: value.entrant2.map(Into::into),
            winner_id: value.winner_id,
            total_votes: value.total_votes,
            voters_by_entrant: value.voters_by_entrant,
        }
    }
}

impl From<EntrantView> for EntrantResponse {
    fn from(value: EntrantView) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image_url: value.image_url,
            seed: value.seed,
            votes_in_match: value.votes_in_match,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use serde_json::json;

    use super::*;

    #[test]
    fn undecided_matchup_serializes_without_voters() {
        let matchup = MatchupView {
            id: Uuid::nil(),
            round_number: 2,
            match_index: 4,
            is_active: false,
            entrant1: None,
            entrant2: None,
            winner_id: None,
            total_votes: 0,
            voters_by_entrant: None,
        };

        let value = serde_json::to_value(MatchupResponse::from(matchup)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": Uuid::nil(),
                "matchIndex": 4,
                "is_active": false,
                "state": "undecided",
                "voteable": false,
                "entrant1": null,
                "entrant2": null,
                "winner_id": null,
                "totalVotes": 0,
            })
        );
    }

    #[test]
    fn completed_bracket_omits_current_round_value() {
        let view = BracketView {
            id: Uuid::nil(),
            name: "Cup".into(),
            status: TournamentStatus::Completed,
            current_round: None,
            total_entrants: 8,
            created_at: SystemTime::UNIX_EPOCH,
            rounds: Vec::new(),
        };

        let value = serde_json::to_value(BracketResponse::from(view)).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["currentRound"], serde_json::Value::Null);
        assert_eq!(value["createdAt"], "1970-01-01T00:00:00Z");
    }
}
