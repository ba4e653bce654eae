use std::time::SystemTime;

use tracing::debug;
use uuid::Uuid;

use crate::{
    bracket::{Selections, build_votes, validate_selections},
    error::ServiceError,
    state::SharedState,
};

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Number of (voter, matchup) rows written.
    pub recorded: usize,
}

/// Record `selections` for `voter_id`, replacing any earlier pick on the same matchups.
///
/// The voter must resolve to a known profile and every pick must name one of the two entrants
/// of an open matchup. Nothing is written unless the whole batch is accepted, and the batch is
/// written with a single upsert.
pub async fn submit_selections(
    state: &SharedState,
    voter_id: Option<Uuid>,
    selections: Selections,
) -> Result<SubmitOutcome, ServiceError> {
    let voter_id = voter_id.ok_or(ServiceError::Unauthenticated)?;
    let store = state.require_bracket_store().await?;

    let profiles = store.find_voter_profiles(vec![voter_id]).await?;
    if !profiles.iter().any(|profile| profile.id == voter_id) {
        return Err(ServiceError::Unauthenticated);
    }

    if selections.is_empty() {
        return Ok(SubmitOutcome { recorded: 0 });
    }

    let matchups = store
        .find_matchups(selections.keys().copied().collect())
        .await?;
    validate_selections(&selections, &matchups)?;

    let votes = build_votes(voter_id, &selections, SystemTime::now());
    let recorded = votes.len();
    store.upsert_votes(votes).await?;

    debug!(%voter_id, recorded, "recorded vote selections");
    Ok(SubmitOutcome { recorded })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bracket::SelectionError,
        config::AppConfig,
        services::{bracket_service, fixtures::Bracket},
        state::AppState,
    };

    #[tokio::test]
    async fn records_selections_and_shows_them_in_the_bracket() {
        let bracket = Bracket::new();
        let state = bracket.state().await;
        let voter = bracket.voters[0].id;

        let outcome = submit_selections(
            &state,
            Some(voter),
            Selections::from([
                (bracket.semi1.id, bracket.entrants[0].id),
                (bracket.semi2.id, bracket.entrants[3].id),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(outcome, SubmitOutcome { recorded: 2 });

        let page =
            bracket_service::fetch_tournament_page(&state, bracket.tournament.id, Some(voter))
                .await
                .unwrap();
        assert_eq!(page.selections.len(), 2);
        let semi = page.bracket.matchup(bracket.semi1.id).unwrap();
        assert_eq!(semi.entrant1.as_ref().unwrap().votes_in_match, 1);
    }

    #[tokio::test]
    async fn identical_resubmission_leaves_votes_unchanged() {
        let bracket = Bracket::new();
        let state = bracket.state().await;
        let voter = Some(bracket.voters[1].id);
        let selections = Selections::from([
            (bracket.semi1.id, bracket.entrants[0].id),
            (bracket.semi2.id, bracket.entrants[2].id),
        ]);
        let picks = |votes: Vec<crate::dao::models::VoteEntity>| {
            votes
                .into_iter()
                .map(|vote| (vote.voter_id, vote.matchup_id, vote.entrant_id))
                .collect::<Vec<_>>()
        };

        submit_selections(&state, voter, selections.clone()).await.unwrap();
        let first = picks(bracket.store.votes().await);
        submit_selections(&state, voter, selections).await.unwrap();
        let second = picks(bracket.store.votes().await);

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn resubmitting_overwrites_the_previous_pick() {
        let bracket = Bracket::new();
        let state = bracket.state().await;
        let voter = Some(bracket.voters[1].id);

        for entrant in [0, 1] {
            let selections = Selections::from([(bracket.semi1.id, bracket.entrants[entrant].id)]);
            submit_selections(&state, voter, selections).await.unwrap();
        }

        let votes = bracket.store.votes().await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].entrant_id, bracket.entrants[1].id);
    }

    #[tokio::test]
    async fn missing_or_unknown_voter_is_unauthenticated() {
        let bracket = Bracket::new();
        let state = bracket.state().await;
        let selections = Selections::from([(bracket.semi1.id, bracket.entrants[0].id)]);

        let err = submit_selections(&state, None, selections.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));

        let err = submit_selections(&state, Some(Uuid::new_v4()), selections)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));

        assert!(bracket.store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn empty_selections_write_nothing() {
        let bracket = Bracket::new();
        let state = bracket.state().await;

        let outcome = submit_selections(&state, Some(bracket.voters[0].id), Selections::new())
            .await
            .unwrap();

        assert_eq!(outcome.recorded, 0);
        assert!(bracket.store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn one_bad_selection_rejects_the_whole_batch() {
        let bracket = Bracket::new();
        let state = bracket.state().await;
        let voter = Some(bracket.voters[0].id);
        let valid = (bracket.semi1.id, bracket.entrants[0].id);

        let cases = [
            (
                (bracket.semi2.id, bracket.entrants[0].id),
                SelectionError::EntrantNotInMatchup {
                    matchup_id: bracket.semi2.id,
                    entrant_id: bracket.entrants[0].id,
                },
            ),
            (
                (bracket.final_match.id, bracket.entrants[0].id),
                SelectionError::EntrantNotInMatchup {
                    matchup_id: bracket.final_match.id,
                    entrant_id: bracket.entrants[0].id,
                },
            ),
        ];
        for (invalid, expected) in cases {
            let err = submit_selections(&state, voter, Selections::from([valid, invalid]))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(ref inner) if *inner == expected));
        }

        let unknown = Uuid::new_v4();
        let err = submit_selections(&state, voter, Selections::from([(unknown, Uuid::new_v4())]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(SelectionError::UnknownMatchup(id)) if id == unknown
        ));

        assert!(bracket.store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn decided_matchups_no_longer_accept_votes() {
        let bracket = Bracket::new();
        bracket.decide(&bracket.semi1, 0);
        let state = bracket.state().await;

        let err = submit_selections(
            &state,
            Some(bracket.voters[0].id),
            Selections::from([(bracket.semi1.id, bracket.entrants[1].id)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation(SelectionError::MatchupClosed(id)) if id == bracket.semi1.id
        ));
    }

    #[tokio::test]
    async fn store_failure_surfaces_and_keeps_previous_votes() {
        let bracket = Bracket::new();
        bracket.vote(0, &bracket.semi1, 0).await;
        bracket.store.set_reject_writes(true);
        let state = bracket.state().await;

        let err = submit_selections(
            &state,
            Some(bracket.voters[0].id),
            Selections::from([(bracket.semi1.id, bracket.entrants[1].id)]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ServiceError::Store(_)));
        let votes = bracket.store.votes().await;
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].entrant_id, bracket.entrants[0].id);
    }

    #[tokio::test]
    async fn degraded_mode_refuses_votes() {
        let state = AppState::new(AppConfig::default());

        let err = submit_selections(&state, Some(Uuid::new_v4()), Selections::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
