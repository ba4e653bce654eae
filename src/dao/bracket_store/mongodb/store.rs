use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{Document, doc},
    options::IndexOptions,
};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        ENTRANT_COLLECTION, MATCHUP_COLLECTION, MongoEntrantDocument, MongoMatchupDocument,
        MongoTournamentDocument, MongoVoteDocument, MongoVoterDocument, TOURNAMENT_COLLECTION,
        VOTE_COLLECTION, VOTER_COLLECTION, doc_id, field_in, uuid_as_binary,
    },
};
use crate::dao::{
    bracket_store::BracketStore,
    models::{EntrantEntity, MatchupEntity, TournamentEntity, VoteEntity, VoterProfileEntity},
    storage::StorageResult,
};

/// MongoDB-backed [`BracketStore`].
///
/// Vote batches are written inside a multi-document transaction, so the deployment must be a
/// replica set (a single-node replica set is enough).
#[derive(Clone)]
pub struct MongoBracketStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) = establish_connection(&self.config).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoBracketStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) = establish_connection(&config).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        let indexes: [(&'static str, &'static str, Document, bool); 4] = [
            (
                VOTE_COLLECTION,
                "voter_id,matchup_id",
                doc! {"voter_id": 1, "matchup_id": 1},
                true,
            ),
            (
                MATCHUP_COLLECTION,
                "tournament_id,match_index",
                doc! {"tournament_id": 1, "match_index": 1},
                false,
            ),
            (
                ENTRANT_COLLECTION,
                "tournament_id",
                doc! {"tournament_id": 1},
                false,
            ),
            (
                TOURNAMENT_COLLECTION,
                "created_at",
                doc! {"created_at": -1},
                false,
            ),
        ];

        for (collection, index, keys, unique) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(
                    IndexOptions::builder()
                        .name(Some(format!("{collection}_{}_idx", index.replace(',', "_"))))
                        .unique(Some(unique))
                        .build(),
                )
                .build();

            database
                .collection::<Document>(collection)
                .create_index(model)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index,
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn collection<D>(&self, name: &str) -> Collection<D>
    where
        D: Send + Sync,
    {
        self.database().await.collection::<D>(name)
    }

    /// Run a `find`, convert every document and keep the cursor order.
    async fn fetch<D, E>(
        &self,
        collection: &'static str,
        filter: Document,
        sort: Option<Document>,
    ) -> MongoResult<Vec<E>>
    where
        D: DeserializeOwned + Send + Sync,
        E: TryFrom<D, Error = MongoDaoError>,
    {
        let coll = self.collection::<D>(collection).await;
        let mut find = coll.find(filter);
        if let Some(sort) = sort {
            find = find.sort(sort);
        }

        let documents: Vec<D> = find
            .await
            .map_err(|source| MongoDaoError::Query { collection, source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::Query { collection, source })?;

        documents.into_iter().map(E::try_from).collect()
    }

    async fn find_tournament(&self, id: Uuid) -> MongoResult<Option<TournamentEntity>> {
        let document = self
            .collection::<MongoTournamentDocument>(TOURNAMENT_COLLECTION)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadTournament { id, source })?;

        document.map(TournamentEntity::try_from).transpose()
    }

    async fn list_tournaments(&self) -> MongoResult<Vec<TournamentEntity>> {
        self.fetch::<MongoTournamentDocument, _>(
            TOURNAMENT_COLLECTION,
            doc! {},
            Some(doc! {"created_at": -1}),
        )
        .await
        .map_err(|err| match err {
            MongoDaoError::Query { source, .. } => MongoDaoError::ListTournaments { source },
            other => other,
        })
    }

    async fn upsert_votes(&self, votes: Vec<VoteEntity>) -> MongoResult<()> {
        if votes.is_empty() {
            return Ok(());
        }

        let count = votes.len();
        let fail = |source| MongoDaoError::UpsertVotes { count, source };
        let (client, collection) = {
            let guard = self.inner.state.read().await;
            (
                guard.client.clone(),
                guard
                    .database
                    .collection::<MongoVoteDocument>(VOTE_COLLECTION),
            )
        };

        let mut session = client.start_session().await.map_err(fail)?;
        session.start_transaction().await.map_err(fail)?;
        for vote in votes {
            let document: MongoVoteDocument = vote.into();
            collection
                .replace_one(document.conflict_key(), &document)
                .upsert(true)
                .session(&mut session)
                .await
                .map_err(fail)?;
        }
        // Dropping the session without committing aborts the transaction.
        session.commit_transaction().await.map_err(fail)?;

        Ok(())
    }
}

impl BracketStore for MongoBracketStore {
    fn find_tournament(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_tournament(id).await.map_err(Into::into) })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, StorageResult<Vec<TournamentEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_tournaments().await.map_err(Into::into) })
    }

    fn list_matchups(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .fetch::<MongoMatchupDocument, _>(
                    MATCHUP_COLLECTION,
                    doc! {"tournament_id": uuid_as_binary(tournament_id)},
                    Some(doc! {"match_index": 1}),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn find_matchups(
        &self,
        ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<MatchupEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .fetch::<MongoMatchupDocument, _>(MATCHUP_COLLECTION, field_in("_id", &ids), None)
                .await
                .map_err(Into::into)
        })
    }

    fn list_entrants(
        &self,
        tournament_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<EntrantEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .fetch::<MongoEntrantDocument, _>(
                    ENTRANT_COLLECTION,
                    doc! {"tournament_id": uuid_as_binary(tournament_id)},
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_votes(
        &self,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .fetch::<MongoVoteDocument, _>(
                    VOTE_COLLECTION,
                    field_in("matchup_id", &matchup_ids),
                    None,
                )
                .await
                .map_err(Into::into)
        })
    }

    fn list_voter_votes(
        &self,
        voter_id: Uuid,
        matchup_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut filter = field_in("matchup_id", &matchup_ids);
            filter.insert("voter_id", uuid_as_binary(voter_id));
            store
                .fetch::<MongoVoteDocument, _>(VOTE_COLLECTION, filter, None)
                .await
                .map_err(Into::into)
        })
    }

    fn find_voter_profiles(
        &self,
        voter_ids: Vec<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<VoterProfileEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .fetch::<MongoVoterDocument, _>(VOTER_COLLECTION, field_in("_id", &voter_ids), None)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_votes(&self, votes: Vec<VoteEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_votes(votes).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
