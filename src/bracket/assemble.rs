//! Joins stored rows into the round-grouped bracket view-model.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use uuid::Uuid;

use crate::{
    bracket::{
        aggregate::{VoterNames, VotersByMatchup, tally},
        view::{BracketView, EntrantView, MatchupView, RoundView},
    },
    dao::models::{EntrantEntity, MatchupEntity, TournamentEntity, TournamentStatus},
};

/// Stored rows that contradict the bracket invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("matchup `{matchup_id}` names winner `{winner_id}`, which is not one of its entrants")]
    WinnerNotInMatchup { matchup_id: Uuid, winner_id: Uuid },
}

/// Join a tournament's matchups, entrants and aggregated votes into a [`BracketView`].
///
/// Rounds come out sorted by round number and matchups by `match_index`, whatever order the
/// rows were passed in. Entrant slots that are empty or reference an unknown entrant resolve to
/// `None`. Vote tallies are informational; the winner is whatever the matchup row says, and a
/// winner outside the matchup's pair fails the whole assembly.
pub fn assemble(
    tournament: TournamentEntity,
    matchups: Vec<MatchupEntity>,
    entrants: &[EntrantEntity],
    voters: &VotersByMatchup,
) -> Result<BracketView, AssembleError> {
    let entrants_by_id: HashMap<Uuid, &EntrantEntity> =
        entrants.iter().map(|entrant| (entrant.id, entrant)).collect();

    let mut grouped: BTreeMap<u32, Vec<MatchupEntity>> = BTreeMap::new();
    for matchup in matchups {
        grouped.entry(matchup.round_number).or_default().push(matchup);
    }

    let rounds = grouped
        .into_iter()
        .map(|(round_number, mut matchups)| -> Result<RoundView, AssembleError> {
            matchups.sort_by_key(|matchup| matchup.match_index);
            let label = round_label(round_number, matchups.len());
            let matchups = matchups
                .into_iter()
                .map(|matchup| assemble_matchup(matchup, &entrants_by_id, voters))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RoundView {
                round_number,
                label,
                matchups,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let current_round = match tournament.status {
        TournamentStatus::Completed => None,
        TournamentStatus::Open | TournamentStatus::Voting => Some(tournament.current_round),
    };

    Ok(BracketView {
        id: tournament.id,
        name: tournament.name,
        status: tournament.status,
        current_round,
        total_entrants: tournament.total_entrants,
        created_at: tournament.created_at,
        rounds,
    })
}

fn assemble_matchup(
    matchup: MatchupEntity,
    entrants_by_id: &HashMap<Uuid, &EntrantEntity>,
    voters: &VotersByMatchup,
) -> Result<MatchupView, AssembleError> {
    let resolve = |slot: Option<Uuid>| {
        slot.and_then(|id| entrants_by_id.get(&id))
            .map(|entrant| EntrantView {
                id: entrant.id,
                name: entrant.name.clone(),
                image_url: entrant.image_url.clone(),
                seed: entrant.seed,
                votes_in_match: tally(voters, matchup.id, entrant.id),
            })
    };
    let entrant1 = resolve(matchup.entrant1_id);
    let entrant2 = resolve(matchup.entrant2_id);

    if let Some(winner_id) = matchup.winner_id.filter(|id| !matchup.has_entrant(*id)) {
        return Err(AssembleError::WinnerNotInMatchup {
            matchup_id: matchup.id,
            winner_id,
        });
    }

    // Rows naming an entrant outside the pair are stale and ignored.
    let pair_voters: VoterNames = voters
        .get(&matchup.id)
        .map(|by_entrant| {
            by_entrant
                .iter()
                .filter(|(entrant_id, _)| matchup.has_entrant(**entrant_id))
                .map(|(entrant_id, names)| (*entrant_id, names.clone()))
                .collect()
        })
        .unwrap_or_default();
    let total_votes = pair_voters.values().map(Vec::len).sum();
    // Voter identities stay hidden until the matchup is decided.
    let voters_by_entrant = matchup.winner_id.map(|_| pair_voters);

    Ok(MatchupView {
        id: matchup.id,
        round_number: matchup.round_number,
        match_index: matchup.match_index,
        is_active: matchup.is_active,
        entrant1,
        entrant2,
        winner_id: matchup.winner_id,
        total_votes,
        voters_by_entrant,
    })
}

/// Human label for a round, derived from how many matchups it holds.
pub fn round_label(round_number: u32, matchup_count: usize) -> String {
    match matchup_count {
        1 => "Final".into(),
        2 => "Semi-Finals".into(),
        4 => "Quarter-Finals".into(),
        count if count >= 8 && count.is_power_of_two() => format!("Round of {}", count * 2),
        _ => format!("Round {round_number}"),
    }
}
