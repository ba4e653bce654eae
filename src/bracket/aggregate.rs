//! Groups raw vote rows into voter display names per matchup and entrant.

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use uuid::Uuid;

use crate::dao::models::{VoteEntity, VoterProfileEntity};

/// Entrant id to the display names of the voters who picked it, in store order.
pub type VoterNames = IndexMap<Uuid, Vec<String>>;

/// Matchup id to [`VoterNames`].
pub type VotersByMatchup = HashMap<Uuid, VoterNames>;

/// Distinct voter ids in order of first appearance.
///
/// Only these need an identity lookup; voters without votes never get resolved.
pub fn distinct_voter_ids(votes: &[VoteEntity]) -> Vec<Uuid> {
    votes
        .iter()
        .map(|vote| vote.voter_id)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Build `matchup -> entrant -> [voter name]` from vote rows.
///
/// Voters missing from `profiles`, or without a display name, show up as `placeholder`.
pub fn aggregate_voters(
    votes: &[VoteEntity],
    profiles: &[VoterProfileEntity],
    placeholder: &str,
) -> VotersByMatchup {
    let names: HashMap<Uuid, &str> = profiles
        .iter()
        .filter_map(|profile| {
            profile
                .display_name
                .as_deref()
                .map(|name| (profile.id, name))
        })
        .collect();

    let mut by_matchup = VotersByMatchup::new();
    for vote in votes {
        let name = names.get(&vote.voter_id).copied().unwrap_or(placeholder);
        by_matchup
            .entry(vote.matchup_id)
            .or_default()
            .entry(vote.entrant_id)
            .or_default()
            .push(name.to_owned());
    }
    by_matchup
}

/// Votes for `entrant_id` in `matchup_id`, zero when nobody picked it.
pub fn tally(voters: &VotersByMatchup, matchup_id: Uuid, entrant_id: Uuid) -> usize {
    voters
        .get(&matchup_id)
        .and_then(|entrants| entrants.get(&entrant_id))
        .map_or(0, Vec::len)
}
