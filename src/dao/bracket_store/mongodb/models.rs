//! Document shapes stored in MongoDB and their conversions to storage entities.
//!
//! Identifiers are stored as BSON binaries with the UUID subtype so `$in` filters built from
//! [`uuid_as_binary`] match them exactly.

use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::dao::models::{
    EntrantEntity, MatchupEntity, TournamentEntity, TournamentStatus, VoteEntity,
    VoterProfileEntity,
};

pub const TOURNAMENT_COLLECTION: &str = "tournaments";
pub const ENTRANT_COLLECTION: &str = "entrants";
pub const MATCHUP_COLLECTION: &str = "matchups";
pub const VOTE_COLLECTION: &str = "votes";
pub const VOTER_COLLECTION: &str = "voters";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTournamentDocument {
    #[serde(rename = "_id")]
    id: Binary,
    name: String,
    status: TournamentStatus,
    current_round: u32,
    total_entrants: u32,
    created_at: DateTime,
}

impl TryFrom<MongoTournamentDocument> for TournamentEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoTournamentDocument) -> MongoResult<Self> {
        Ok(Self {
            id: binary_as_uuid(&value.id, TOURNAMENT_COLLECTION, "_id")?,
            name: value.name,
            status: value.status,
            current_round: value.current_round,
            total_entrants: value.total_entrants,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoEntrantDocument {
    #[serde(rename = "_id")]
    id: Binary,
    tournament_id: Binary,
    name: String,
    #[serde(default)]
    image_url: Option<String>,
    seed: u32,
}

impl TryFrom<MongoEntrantDocument> for EntrantEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoEntrantDocument) -> MongoResult<Self> {
        Ok(Self {
            id: binary_as_uuid(&value.id, ENTRANT_COLLECTION, "_id")?,
            tournament_id: binary_as_uuid(
                &value.tournament_id,
                ENTRANT_COLLECTION,
                "tournament_id",
            )?,
            name: value.name,
            image_url: value.image_url,
            seed: value.seed,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMatchupDocument {
    #[serde(rename = "_id")]
    id: Binary,
    tournament_id: Binary,
    round_number: u32,
    match_index: u32,
    #[serde(default)]
    entrant1_id: Option<Binary>,
    #[serde(default)]
    entrant2_id: Option<Binary>,
    #[serde(default)]
    is_active: bool,
    #[serde(default)]
    winner_id: Option<Binary>,
}

impl TryFrom<MongoMatchupDocument> for MatchupEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoMatchupDocument) -> MongoResult<Self> {
        let optional = |binary: &Option<Binary>, field| {
            binary
                .as_ref()
                .map(|binary| binary_as_uuid(binary, MATCHUP_COLLECTION, field))
                .transpose()
        };

        Ok(Self {
            id: binary_as_uuid(&value.id, MATCHUP_COLLECTION, "_id")?,
            tournament_id: binary_as_uuid(
                &value.tournament_id,
                MATCHUP_COLLECTION,
                "tournament_id",
            )?,
            round_number: value.round_number,
            match_index: value.match_index,
            entrant1_id: optional(&value.entrant1_id, "entrant1_id")?,
            entrant2_id: optional(&value.entrant2_id, "entrant2_id")?,
            is_active: value.is_active,
            winner_id: optional(&value.winner_id, "winner_id")?,
        })
    }
}

/// Vote row; unique on (`voter_id`, `matchup_id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoVoteDocument {
    voter_id: Binary,
    matchup_id: Binary,
    entrant_id: Binary,
    voted_at: DateTime,
}

impl MongoVoteDocument {
    /// Filter selecting the single row a vote replaces.
    pub fn conflict_key(&self) -> Document {
        doc! { "voter_id": self.voter_id.clone(), "matchup_id": self.matchup_id.clone() }
    }
}

impl From<VoteEntity> for MongoVoteDocument {
    fn from(value: VoteEntity) -> Self {
        Self {
            voter_id: uuid_as_binary(value.voter_id),
            matchup_id: uuid_as_binary(value.matchup_id),
            entrant_id: uuid_as_binary(value.entrant_id),
            voted_at: DateTime::from_system_time(value.voted_at),
        }
    }
}

impl TryFrom<MongoVoteDocument> for VoteEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoVoteDocument) -> MongoResult<Self> {
        Ok(Self {
            voter_id: binary_as_uuid(&value.voter_id, VOTE_COLLECTION, "voter_id")?,
            matchup_id: binary_as_uuid(&value.matchup_id, VOTE_COLLECTION, "matchup_id")?,
            entrant_id: binary_as_uuid(&value.entrant_id, VOTE_COLLECTION, "entrant_id")?,
            voted_at: value.voted_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoVoterDocument {
    #[serde(rename = "_id")]
    id: Binary,
    #[serde(default)]
    display_name: Option<String>,
}

impl TryFrom<MongoVoterDocument> for VoterProfileEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoVoterDocument) -> MongoResult<Self> {
        Ok(Self {
            id: binary_as_uuid(&value.id, VOTER_COLLECTION, "_id")?,
            display_name: value.display_name,
        })
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

fn binary_as_uuid(
    binary: &Binary,
    collection: &'static str,
    field: &'static str,
) -> MongoResult<Uuid> {
    Uuid::from_slice(&binary.bytes).map_err(|_| MongoDaoError::MalformedId { collection, field })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

/// `{ field: { $in: [...] } }` over UUID binaries.
pub fn field_in(field: &str, ids: &[Uuid]) -> Document {
    let values: Vec<Binary> = ids.iter().copied().map(uuid_as_binary).collect();
    let mut filter = Document::new();
    filter.insert(field, doc! { "$in": values });
    filter
}
