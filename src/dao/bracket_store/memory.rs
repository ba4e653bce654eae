//! Process-local [`BracketStore`] used by tests and local development.
//!
//! Votes live in an insertion-ordered map so reads return them in the order they were first
//! written, the way a relational table returns rows without an explicit sort. Overwriting a vote
//! keeps its position.

use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use dashmap::DashMap;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    bracket_store::BracketStore,
    models::{EntrantEntity, MatchupEntity, TournamentEntity, VoteEntity, VoterProfileEntity},
    storage::{StorageError, StorageResult},
};

/// In-memory [`BracketStore`] implementation.
#[derive(Clone, Default)]
pub struct MemoryBracketStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    tournaments: DashMap<Uuid, TournamentEntity>,
    entrants: DashMap<Uuid, EntrantEntity>,
    matchups: DashMap<Uuid, MatchupEntity>,
    voters: DashMap<Uuid, VoterProfileEntity>,
    votes: RwLock<IndexMap<(Uuid, Uuid), VoteEntity>>,
    reject_writes: AtomicBool,
    offline: AtomicBool,
}

/// Rows loaded into a [`MemoryBracketStore`] at startup.
#[derive(Debug, Default, Deserialize)]
pub struct MemorySeed {
    #[serde(default)]
    pub tournaments: Vec<TournamentEntity>,
    #[serde(default)]
    pub entrants: Vec<EntrantEntity>,
    #[serde(default)]
    pub matchups: Vec<MatchupEntity>,
    #[serde(default)]
    pub voters: Vec<VoterProfileEntity>,
    #[serde(default)]
    pub votes: Vec<VoteEntity>,
}

/// Failures raised while reading a seed file.
#[derive(Debug, Error)]
pub enum MemorySeedError {
    #[error("failed to read seed file `{path}`")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file `{path}`")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl MemorySeed {
    /// Read a JSON seed file from disk.
    pub fn from_file(path: &Path) -> Result<Self, MemorySeedError> {
        let contents = fs::read_to_string(path).map_err(|source| MemorySeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| MemorySeedError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl MemoryBracketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `seed`.
    pub async fn from_seed(seed: MemorySeed) -> Self {
        let store = Self::new();
        for tournament in seed.tournaments {
            store.insert_tournament(tournament);
        }
        for entrant in seed.entrants {
            store.insert_entrant(entrant);
        }
        for matchup in seed.matchups {
            store.insert_matchup(matchup);
        }
        for voter in seed.voters {
            store.insert_voter(voter);
        }
        for vote in seed.votes {
            store.insert_vote(vote).await;
        }
        store
    }

    pub fn insert_tournament(&self, tournament: TournamentEntity) {
        self.inner.tournaments.insert(tournament.id, tournament);
    }

    pub fn insert_entrant(&self, entrant: EntrantEntity) {
        self.inner.entrants.insert(entrant.id, entrant);
    }

    /// Insert or replace a matchup, e.g. to emulate bracket progression.
    pub fn insert_matchup(&self, matchup: MatchupEntity) {
        self.inner.matchups.insert(matchup.id, matchup);
    }

    pub fn insert_voter(&self, voter: VoterProfileEntity) {
        self.inner.voters.insert(voter.id, voter);
    }

    /// Write a single vote, bypassing the batch path.
    pub async fn insert_vote(&self, vote: VoteEntity) {
        let mut votes = self.inner.votes.write().await;
        votes.insert((vote.voter_id, vote.matchup_id), vote);
    }

    /// Every stored vote in store order.
    pub async fn votes(&self) -> Vec<VoteEntity> {
        self.inner.votes.read().await.values().cloned().collect()
    }

    /// Make every subsequent write fail with [`StorageError::Rejected`].
    pub fn set_reject_writes(&self, reject: bool) {
        self.inner.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Make health checks fail until [`Self::try_reconnect`] succeeds.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }
}

impl MemoryInner {
    fn matchups_where(&self, keep: impl Fn(&MatchupEntity) -> bool) -> Vec<MatchupEntity> {
        self.matchups
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    async fn votes_where(&self, keep: impl Fn(&VoteEntity) -> bool) -> Vec<VoteEntity> {
        let votes = self.votes.read().await;
        votes.values().filter(|vote| keep(vote)).cloned().collect()
    }
}

impl BracketStore for MemoryBracketStore {
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .tournaments
                .get(&id)
                .map(|entry| entry.value().clone()))
        })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .tournaments
                .iter()
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn list_matchups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut matchups = store
                .inner
                .matchups_where(|matchup| matchup.tournament_id == tournament_id);
            matchups.sort_by_key(|matchup| matchup.match_index);
            Ok(matchups)
        })
    }

    fn find_matchups(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.matchups_where(|matchup| ids.contains(&matchup.id))) })
    }

    fn list_entrants(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntrantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .entrants
                .iter()
                .filter(|entry| entry.value().tournament_id == tournament_id)
                .map(|entry| entry.value().clone())
                .collect())
        })
    }

    fn list_votes(
        &self,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .votes_where(|vote| matchup_ids.contains(&vote.matchup_id))
                .await)
        })
    }

    fn list_voter_votes(
        &self,
        voter_id: Uuid,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .inner
                .votes_where(|vote| {
                    vote.voter_id == voter_id && matchup_ids.contains(&vote.matchup_id)
                })
                .await)
        })
    }

    fn find_voter_profiles(
        &self,
        voter_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoterProfileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(voter_ids
                .iter()
                .filter_map(|id| store.inner.voters.get(id).map(|entry| entry.value().clone()))
                .collect())
        })
    }

    fn upsert_votes(&self, votes: Vec<VoteEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.inner.reject_writes.load(Ordering::SeqCst) {
                return Err(StorageError::rejected("vote writes are disabled"));
            }

            // One write lock for the whole batch keeps it all-or-nothing for readers.
            let mut stored = store.inner.votes.write().await;
            for vote in votes {
                stored.insert((vote.voter_id, vote.matchup_id), vote);
            }
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            if store.inner.offline.load(Ordering::SeqCst) {
                Err(StorageError::rejected("memory store is offline"))
            } else {
                Ok(())
            }
        })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.offline.store(false, Ordering::SeqCst);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;

    fn vote(voter_id: Uuid, matchup_id: Uuid, entrant_id: Uuid) -> VoteEntity {
        VoteEntity {
            voter_id,
            matchup_id,
            entrant_id,
            voted_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_in_place() {
        let store = MemoryBracketStore::new();
        let (v1, v2, m) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .upsert_votes(vec![vote(v1, m, a), vote(v2, m, a)])
            .await
            .unwrap();
        store.upsert_votes(vec![vote(v1, m, b)]).await.unwrap();

        let votes = store.votes().await;
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].voter_id, v1);
        assert_eq!(votes[0].entrant_id, b);
        assert_eq!(votes[1].voter_id, v2);
    }

    #[tokio::test]
    async fn rejected_writes_leave_votes_untouched() {
        let store = MemoryBracketStore::new();
        store.set_reject_writes(true);

        let err = store
            .upsert_votes(vec![vote(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())])
            .await
            .unwrap_err();

        assert_eq!(err.message(), "vote writes are disabled");
        assert!(store.votes().await.is_empty());
    }

    #[tokio::test]
    async fn list_matchups_orders_by_match_index() {
        let store = MemoryBracketStore::new();
        let tournament_id = Uuid::new_v4();
        for match_index in [7, 2, 5] {
            store.insert_matchup(MatchupEntity {
                id: Uuid::new_v4(),
                tournament_id,
                round_number: 1,
                match_index,
                entrant1_id: None,
                entrant2_id: None,
                is_active: false,
                winner_id: None,
            });
        }

        let indexes: Vec<u32> = store
            .list_matchups(tournament_id)
            .await
            .unwrap()
            .into_iter()
            .map(|matchup| matchup.match_index)
            .collect();
        assert_eq!(indexes, vec![2, 5, 7]);
    }

    #[tokio::test]
    async fn demo_seed_loads() {
        let seed: MemorySeed =
            serde_json::from_str(include_str!("../../../demos/seed.json")).unwrap();
        let store = MemoryBracketStore::from_seed(seed).await;

        let tournaments = store.list_tournaments().await.unwrap();
        assert_eq!(tournaments.len(), 1);
        let matchups = store.list_matchups(tournaments[0].id).await.unwrap();
        assert_eq!(matchups.len(), 3);
        assert!(matchups[0].is_voteable());
        assert!(!matchups[2].is_voteable());
    }
}
