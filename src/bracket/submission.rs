//! Integrity checks applied to a voter's submitted selections before they are written.

use std::{collections::HashMap, time::SystemTime};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    bracket::selections::Selections,
    dao::models::{MatchupEntity, VoteEntity},
};

/// Reasons a batch of selections is refused. The whole batch is refused on the first one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("matchup `{0}` does not exist")]
    UnknownMatchup(Uuid),
    #[error("entrant `{entrant_id}` is not part of matchup `{matchup_id}`")]
    EntrantNotInMatchup { matchup_id: Uuid, entrant_id: Uuid },
    #[error("matchup `{0}` is not open for voting")]
    MatchupClosed(Uuid),
}

/// Check every selection against the referenced matchup rows.
///
/// `matchups` must contain at least the rows whose ids appear in `selections`; extra rows are
/// ignored. Selections are checked in matchup id order.
pub fn validate_selections(
    selections: &Selections,
    matchups: &[MatchupEntity],
) -> Result<(), SelectionError> {
    let by_id: HashMap<Uuid, &MatchupEntity> =
        matchups.iter().map(|matchup| (matchup.id, matchup)).collect();

    for (&matchup_id, &entrant_id) in selections {
        let matchup = by_id
            .get(&matchup_id)
            .ok_or(SelectionError::UnknownMatchup(matchup_id))?;
        if !matchup.has_entrant(entrant_id) {
            return Err(SelectionError::EntrantNotInMatchup {
                matchup_id,
                entrant_id,
            });
        }
        if !matchup.is_voteable() {
            return Err(SelectionError::MatchupClosed(matchup_id));
        }
    }
    Ok(())
}

/// One vote row per selection, all stamped with `voted_at`.
pub fn build_votes(
    voter_id: Uuid,
    selections: &Selections,
    voted_at: SystemTime,
) -> Vec<VoteEntity> {
    selections
        .iter()
        .map(|(&matchup_id, &entrant_id)| VoteEntity {
            voter_id,
            matchup_id,
            entrant_id,
            voted_at,
        })
        .collect()
}
