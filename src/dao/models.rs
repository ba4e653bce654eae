use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a tournament as persisted by the storage layer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    /// Entrants are being gathered; no round accepts votes yet.
    Open,
    /// At least one round is accepting votes.
    Voting,
    /// A champion has been decided.
    Completed,
}

/// Tournament row anchoring every bracket read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TournamentEntity {
    /// Primary key of the tournament.
    pub id: Uuid,
    /// Display name of the tournament.
    pub name: String,
    /// Current lifecycle status.
    pub status: TournamentStatus,
    /// Round currently accepting votes. Only meaningful while not completed.
    pub current_round: u32,
    /// Number of entrants seeded into the bracket.
    pub total_entrants: u32,
    /// Creation timestamp, used to order tournament listings.
    pub created_at: SystemTime,
}

/// Competitor placed into a bracket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrantEntity {
    /// Primary key of the entrant.
    pub id: Uuid,
    /// Owning tournament.
    pub tournament_id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional image reference rendered next to the name.
    #[serde(default)]
    pub image_url: Option<String>,
    /// 1-based competitive rank, immutable once assigned.
    pub seed: u32,
}

/// One pairwise contest of a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchupEntity {
    /// Primary key of the matchup.
    pub id: Uuid,
    /// Owning tournament.
    pub tournament_id: Uuid,
    /// 1-based round number, increasing toward the final.
    pub round_number: u32,
    /// Sort key within and across rounds; not necessarily contiguous.
    pub match_index: u32,
    /// First slot, empty until filled by bracket progression.
    #[serde(default)]
    pub entrant1_id: Option<Uuid>,
    /// Second slot, empty until filled by bracket progression.
    #[serde(default)]
    pub entrant2_id: Option<Uuid>,
    /// Whether the matchup is open for voting right now.
    pub is_active: bool,
    /// Terminal winner, one of the matchup's own entrants once set.
    #[serde(default)]
    pub winner_id: Option<Uuid>,
}

impl MatchupEntity {
    /// Whether `entrant_id` occupies one of the two slots of this matchup.
    pub fn has_entrant(&self, entrant_id: Uuid) -> bool {
        self.entrant1_id == Some(entrant_id) || self.entrant2_id == Some(entrant_id)
    }

    /// Active, entrant-complete and undecided.
    pub fn is_voteable(&self) -> bool {
        self.is_active
            && self.entrant1_id.is_some()
            && self.entrant2_id.is_some()
            && self.winner_id.is_none()
    }
}

/// A voter's pick for one matchup. Keyed by (`voter_id`, `matchup_id`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteEntity {
    /// Voter who cast the vote.
    pub voter_id: Uuid,
    /// Matchup the vote applies to.
    pub matchup_id: Uuid,
    /// Chosen entrant, one of the matchup's two entrants.
    pub entrant_id: Uuid,
    /// Last time this vote was written.
    pub voted_at: SystemTime,
}

/// Identity metadata for a voter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoterProfileEntity {
    /// Stable voter identifier.
    pub id: Uuid,
    /// Name shown next to decided matchups, if the voter set one.
    #[serde(default)]
    pub display_name: Option<String>,
}
