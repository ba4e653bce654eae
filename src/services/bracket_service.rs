//! Read paths of the bracket engine. Every call rebuilds its answer from fresh store rows.

use std::{fmt::Display, sync::Arc};

use tracing::warn;
use uuid::Uuid;

use crate::{
    bracket::{
        self, BracketView, Selections, aggregate_voters, distinct_voter_ids, voter_selections,
    },
    dao::{
        bracket_store::BracketStore,
        models::{EntrantEntity, MatchupEntity, TournamentEntity, VoteEntity},
        storage::StorageResult,
    },
    error::ServiceError,
    state::SharedState,
};

/// Bracket view-model together with the requesting voter's stored picks.
#[derive(Debug, Clone)]
pub struct TournamentPage {
    pub bracket: BracketView,
    pub selections: Selections,
}

/// Rows backing one bracket read.
struct BracketRows {
    tournament: TournamentEntity,
    matchups: Vec<MatchupEntity>,
    entrants: Vec<EntrantEntity>,
    votes: Vec<VoteEntity>,
}

/// Every tournament, newest first.
pub async fn list_tournament_summaries(
    state: &SharedState,
) -> Result<Vec<TournamentEntity>, ServiceError> {
    let store = state.require_bracket_store().await?;
    let mut tournaments = store.list_tournaments().await?;
    tournaments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tournaments)
}

/// Assemble the full bracket of `tournament_id`.
pub async fn fetch_bracket(
    state: &SharedState,
    tournament_id: Uuid,
) -> Result<BracketView, ServiceError> {
    let store = state.require_bracket_store().await?;
    let rows = load_rows(&store, tournament_id).await?;
    assemble_rows(state, &store, rows).await
}

/// Stored picks of `voter_id` in `tournament_id`; empty for anonymous readers.
pub async fn fetch_voter_selections(
    state: &SharedState,
    tournament_id: Uuid,
    voter_id: Option<Uuid>,
) -> Result<Selections, ServiceError> {
    let Some(voter_id) = voter_id else {
        return Ok(Selections::new());
    };

    let store = state.require_bracket_store().await?;
    let matchups = or_empty(
        store.list_matchups(tournament_id).await,
        "matchups",
        tournament_id,
    );
    if matchups.is_empty() {
        return Ok(Selections::new());
    }

    let votes = or_empty(
        store
            .list_voter_votes(voter_id, matchup_ids(&matchups))
            .await,
        "voter votes",
        tournament_id,
    );
    Ok(voter_selections(&votes, Some(voter_id)))
}

/// Bracket and voter selections computed from a single read of the vote rows.
pub async fn fetch_tournament_page(
    state: &SharedState,
    tournament_id: Uuid,
    voter_id: Option<Uuid>,
) -> Result<TournamentPage, ServiceError> {
    let store = state.require_bracket_store().await?;
    let rows = load_rows(&store, tournament_id).await?;
    let selections = voter_selections(&rows.votes, voter_id);
    let bracket = assemble_rows(state, &store, rows).await?;

    Ok(TournamentPage {
        bracket,
        selections,
    })
}

/// Read the tournament anchor, its matchups and entrants concurrently, then its votes.
///
/// Only a failed or empty tournament read aborts; the other reads degrade to empty lists.
async fn load_rows(
    store: &Arc<dyn BracketStore>,
    tournament_id: Uuid,
) -> Result<BracketRows, ServiceError> {
    let (tournament, matchups, entrants) = futures::join!(
        store.find_tournament(tournament_id),
        store.list_matchups(tournament_id),
        store.list_entrants(tournament_id),
    );

    let tournament = tournament?.ok_or_else(|| {
        ServiceError::NotFound(format!("tournament `{tournament_id}`"))
    })?;
    let matchups = or_empty(matchups, "matchups", tournament_id);
    let entrants = or_empty(entrants, "entrants", tournament_id);

    let votes = if matchups.is_empty() {
        Vec::new()
    } else {
        or_empty(
            store.list_votes(matchup_ids(&matchups)).await,
            "votes",
            tournament_id,
        )
    };

    Ok(BracketRows {
        tournament,
        matchups,
        entrants,
        votes,
    })
}

async fn assemble_rows(
    state: &SharedState,
    store: &Arc<dyn BracketStore>,
    rows: BracketRows,
) -> Result<BracketView, ServiceError> {
    let tournament_id = rows.tournament.id;
    let voter_ids = distinct_voter_ids(&rows.votes);
    let profiles = if voter_ids.is_empty() {
        Vec::new()
    } else {
        or_empty(
            store.find_voter_profiles(voter_ids).await,
            "voter profiles",
            tournament_id,
        )
    };

    let voters = aggregate_voters(
        &rows.votes,
        &profiles,
        state.config().unknown_voter_name(),
    );
    let bracket = bracket::assemble(rows.tournament, rows.matchups, &rows.entrants, &voters)?;
    Ok(bracket)
}

fn matchup_ids(matchups: &[MatchupEntity]) -> Vec<Uuid> {
    matchups.iter().map(|matchup| matchup.id).collect()
}

/// Secondary reads enrich the bracket; a failure is logged and treated as "no rows".
fn or_empty<T>(
    result: StorageResult<Vec<T>>,
    what: &str,
    tournament_id: impl Display,
) -> Vec<T> {
    result.unwrap_or_else(|err| {
        warn!(error = %err, %tournament_id, "failed to load {what}; continuing without them");
        Vec::new()
    })
}
