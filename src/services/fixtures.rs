//! Shared rows for service tests: a four-entrant bracket with two open semi-finals and a final
//! waiting on them.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::{
        bracket_store::{BracketStore, memory::MemoryBracketStore},
        models::{
            EntrantEntity, MatchupEntity, TournamentEntity, TournamentStatus, VoteEntity,
            VoterProfileEntity,
        },
        storage::{StorageError, StorageResult},
    },
    state::{AppState, SharedState},
};

pub struct Bracket {
    pub store: MemoryBracketStore,
    pub tournament: TournamentEntity,
    /// Seeds 1 to 4.
    pub entrants: [EntrantEntity; 4],
    /// Entrants 1 and 2.
    pub semi1: MatchupEntity,
    /// Entrants 3 and 4.
    pub semi2: MatchupEntity,
    pub final_match: MatchupEntity,
    /// Voters with display names "Ana" and "Ben"; the third has none.
    pub voters: [VoterProfileEntity; 3],
}

impl Bracket {
    pub fn new() -> Self {
        let store = MemoryBracketStore::new();
        let tournament = TournamentEntity {
            id: Uuid::new_v4(),
            name: "Best Snack".into(),
            status: TournamentStatus::Voting,
            current_round: 1,
            total_entrants: 4,
            created_at: SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        };
        let entrants: [EntrantEntity; 4] = ["Chips", "Pretzels", "Popcorn", "Nachos"]
            .into_iter()
            .zip(1..)
            .map(|(name, seed)| EntrantEntity {
                id: Uuid::new_v4(),
                tournament_id: tournament.id,
                name: name.into(),
                image_url: None,
                seed,
            })
            .collect::<Vec<_>>()
            .try_into()
            .unwrap();
        let [e1, e2, e3, e4] = &entrants;

        let semi1 = matchup(&tournament, 1, 0, Some(e1.id), Some(e2.id), true);
        let semi2 = matchup(&tournament, 1, 1, Some(e3.id), Some(e4.id), true);
        let final_match = matchup(&tournament, 2, 2, None, None, false);

        let voters = [Some("Ana"), Some("Ben"), None].map(|name| VoterProfileEntity {
            id: Uuid::new_v4(),
            display_name: name.map(str::to_owned),
        });

        store.insert_tournament(tournament.clone());
        for entrant in &entrants {
            store.insert_entrant(entrant.clone());
        }
        for matchup in [&semi1, &semi2, &final_match] {
            store.insert_matchup(matchup.clone());
        }
        for voter in &voters {
            store.insert_voter(voter.clone());
        }

        Self {
            store,
            tournament,
            entrants,
            semi1,
            semi2,
            final_match,
            voters,
        }
    }

    pub async fn state(&self) -> SharedState {
        AppState::with_store(AppConfig::default(), Arc::new(self.store.clone())).await
    }

    pub async fn vote(&self, voter: usize, matchup: &MatchupEntity, entrant: usize) {
        self.store
            .insert_vote(VoteEntity {
                voter_id: self.voters[voter].id,
                matchup_id: matchup.id,
                entrant_id: self.entrants[entrant].id,
                voted_at: SystemTime::now(),
            })
            .await;
    }

    /// Close `matchup` with `entrant` as winner.
    pub fn decide(&self, matchup: &MatchupEntity, entrant: usize) {
        self.store.insert_matchup(MatchupEntity {
            is_active: false,
            winner_id: Some(self.entrants[entrant].id),
            ..matchup.clone()
        });
    }
}

pub fn matchup(
    tournament: &TournamentEntity,
    round_number: u32,
    match_index: u32,
    entrant1_id: Option<Uuid>,
    entrant2_id: Option<Uuid>,
    is_active: bool,
) -> MatchupEntity {
    MatchupEntity {
        id: Uuid::new_v4(),
        tournament_id: tournament.id,
        round_number,
        match_index,
        entrant1_id,
        entrant2_id,
        is_active,
        winner_id: None,
    }
}

/// Delegates to a [`MemoryBracketStore`] but fails every secondary read.
#[derive(Clone)]
pub struct FlakyReads(pub MemoryBracketStore);

fn flaky<T: Send + 'static>() -> BoxFuture<'static, StorageResult<T>> {
    Box::pin(async { Err(StorageError::rejected("read timed out")) })
}

impl BracketStore for FlakyReads {
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        self.0.find_tournament(id)
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        self.0.list_tournaments()
    }

    fn list_matchups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        self.0.list_matchups(tournament_id)
    }

    fn find_matchups(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        self.0.find_matchups(ids)
    }

    fn list_entrants(&self, _: Uuid) -> BoxFuture<'static, StorageResult<Vec<EntrantEntity>>> {
        flaky()
    }

    fn list_votes(&self, _: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        flaky()
    }

    fn list_voter_votes(
        &self,
        _: Uuid,
        _: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        flaky()
    }

    fn find_voter_profiles(
        &self,
        _: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoterProfileEntity>>> {
        flaky()
    }

    fn upsert_votes(&self, votes: Vec<VoteEntity>) -> BoxFuture<'static, StorageResult<()>> {
        self.0.upsert_votes(votes)
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.0.health_check()
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        self.0.try_reconnect()
    }
}
