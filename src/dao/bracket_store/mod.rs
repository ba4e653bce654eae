pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{
    EntrantEntity, MatchupEntity, TournamentEntity, VoteEntity, VoterProfileEntity,
};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for tournaments, brackets and votes.
///
/// Every read returns fresh rows; implementations must not cache.
pub trait BracketStore: Send + Sync {
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>>;
    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>>;
    /// Matchups of a tournament ordered by `match_index` ascending.
    fn list_matchups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>>;
    /// Matchups whose id is in `ids`, in no particular order.
    fn find_matchups(&self, ids: Vec<Uuid>)
    -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>>;
    fn list_entrants(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntrantEntity>>>;
    /// Votes cast on any of `matchup_ids`, in store order.
    fn list_votes(
        &self,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;
    /// Votes of one voter restricted to `matchup_ids`.
    fn list_voter_votes(
        &self,
        voter_id: Uuid,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>>;
    fn find_voter_profiles(
        &self,
        voter_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoterProfileEntity>>>;
    /// Insert or replace every vote keyed by (voter, matchup) as a single unit.
    fn upsert_votes(&self, votes: Vec<VoteEntity>) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
