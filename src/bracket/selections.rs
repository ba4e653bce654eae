//! A voter's own picks, projected from the same vote rows the aggregator reads.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::{bracket::view::RoundView, dao::models::VoteEntity};

/// Matchup id to chosen entrant id.
pub type Selections = BTreeMap<Uuid, Uuid>;

/// Restrict `votes` to `voter_id`. An anonymous reader has no selections.
pub fn voter_selections(votes: &[VoteEntity], voter_id: Option<Uuid>) -> Selections {
    let Some(voter_id) = voter_id else {
        return Selections::new();
    };

    votes
        .iter()
        .filter(|vote| vote.voter_id == voter_id)
        .map(|vote| (vote.matchup_id, vote.entrant_id))
        .collect()
}

/// Whether the working selection of any voteable matchup in `round` differs from what is stored.
///
/// Matchups that are closed, decided or still waiting on entrants never count as changed.
pub fn selections_changed(round: &RoundView, working: &Selections, persisted: &Selections) -> bool {
    round
        .matchups
        .iter()
        .filter(|matchup| matchup.is_voteable())
        .any(|matchup| working.get(&matchup.id) != persisted.get(&matchup.id))
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::bracket::view::{EntrantView, MatchupView};

    fn entrant(id: Uuid) -> EntrantView {
        EntrantView {
            id,
            name: "entrant".into(),
            image_url: None,
            seed: 1,
            votes_in_match: 0,
        }
    }

    fn matchup(pair: (Uuid, Uuid), is_active: bool, winner_id: Option<Uuid>) -> MatchupView {
        MatchupView {
            id: Uuid::new_v4(),
            round_number: 1,
            match_index: 0,
            is_active,
            entrant1: Some(entrant(pair.0)),
            entrant2: Some(entrant(pair.1)),
            winner_id,
            total_votes: 0,
            voters_by_entrant: None,
        }
    }

    #[test]
    fn filters_to_one_voter() {
        let (me, other) = (Uuid::new_v4(), Uuid::new_v4());
        let (m1, m2, a, b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let vote = |voter_id, matchup_id, entrant_id| VoteEntity {
            voter_id,
            matchup_id,
            entrant_id,
            voted_at: SystemTime::now(),
        };
        let votes = vec![vote(me, m1, a), vote(other, m1, b), vote(other, m2, a)];

        let mine = voter_selections(&votes, Some(me));
        assert_eq!(mine, Selections::from([(m1, a)]));
        assert!(voter_selections(&votes, None).is_empty());
    }

    #[test]
    fn only_voteable_matchups_count_as_changed() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let open = matchup((a, b), true, None);
        let decided = matchup((a, b), false, Some(a));
        let round = RoundView {
            round_number: 1,
            label: "Semi-Finals".into(),
            matchups: vec![open.clone(), decided.clone()],
        };
        let persisted = Selections::from([(open.id, a), (decided.id, a)]);

        let unchanged = Selections::from([(open.id, a), (decided.id, b)]);
        assert!(!selections_changed(&round, &unchanged, &persisted));

        let changed = Selections::from([(open.id, b)]);
        assert!(selections_changed(&round, &changed, &persisted));

        let first_pick = Selections::from([(open.id, a)]);
        assert!(selections_changed(&round, &first_pick, &Selections::new()));
    }
}
