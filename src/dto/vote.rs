use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{bracket::BracketResponse, validation::validate_selection_count},
    services::{bracket_service::TournamentPage, vote_service::SubmitOutcome},
};

/// Matchup id to chosen entrant id, as submitted by a voter.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitVotesRequest {
    #[validate(custom(function = "validate_selection_count"))]
    #[schema(value_type = Object)]
    pub selections: BTreeMap<Uuid, Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitVotesResponse {
    pub success: bool,
    /// Number of (voter, matchup) pairs written.
    pub recorded: usize,
}

impl From<SubmitOutcome> for SubmitVotesResponse {
    fn from(value: SubmitOutcome) -> Self {
        Self {
            success: true,
            recorded: value.recorded,
        }
    }
}

/// A voter's stored picks for one tournament.
#[derive(Debug, Serialize, ToSchema)]
pub struct SelectionsResponse {
    #[schema(value_type = Object)]
    pub selections: BTreeMap<Uuid, Uuid>,
}

/// Bracket plus the requesting voter's picks, read from the same vote rows.
#[derive(Debug, Serialize, ToSchema)]
pub struct TournamentPageResponse {
    pub bracket: BracketResponse,
    #[schema(value_type = Object)]
    pub selections: BTreeMap<Uuid, Uuid>,
}

impl From<TournamentPage> for TournamentPageResponse {
    fn from(value: TournamentPage) -> Self {
        Self {
            bracket: value.bracket.into(),
            selections: value.selections,
        }
    }
}
