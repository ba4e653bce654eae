//! Read-side bracket view-model handed to the DTO layer.

use std::time::SystemTime;

use uuid::Uuid;

use crate::{bracket::VoterNames, dao::models::TournamentStatus};

/// Fully assembled, round-grouped read projection of one tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BracketView {
    pub id: Uuid,
    pub name: String,
    pub status: TournamentStatus,
    /// `None` once the tournament is completed.
    pub current_round: Option<u32>,
    pub total_entrants: u32,
    pub created_at: SystemTime,
    /// Ordered by `round_number` ascending.
    pub rounds: Vec<RoundView>,
}

impl BracketView {
    pub fn round(&self, round_number: u32) -> Option<&RoundView> {
        self.rounds
            .iter()
            .find(|round| round.round_number == round_number)
    }

    pub fn matchup(&self, matchup_id: Uuid) -> Option<&MatchupView> {
        self.rounds
            .iter()
            .flat_map(|round| round.matchups.iter())
            .find(|matchup| matchup.id == matchup_id)
    }
}

/// Matchups sharing a round number, ordered by `match_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub round_number: u32,
    pub label: String,
    pub matchups: Vec<MatchupView>,
}

impl RoundView {
    /// Number of matchups a voter can currently pick in.
    pub fn voteable_count(&self) -> usize {
        self.matchups
            .iter()
            .filter(|matchup| matchup.is_voteable())
            .count()
    }
}

/// Voting state of a matchup as seen by readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchupState {
    /// Not open for voting and no winner yet, e.g. waiting on a previous round.
    Undecided,
    /// Active, both entrants known, no winner.
    Open,
    /// Winner set; terminal.
    Decided,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchupView {
    pub id: Uuid,
    pub round_number: u32,
    pub match_index: u32,
    pub is_active: bool,
    /// `None` renders as "TBD".
    pub entrant1: Option<EntrantView>,
    pub entrant2: Option<EntrantView>,
    pub winner_id: Option<Uuid>,
    pub total_votes: usize,
    /// Voter names grouped by chosen entrant. Only present once the matchup is decided.
    pub voters_by_entrant: Option<VoterNames>,
}

impl MatchupView {
    pub fn state(&self) -> MatchupState {
        if self.winner_id.is_some() {
            MatchupState::Decided
        } else if self.is_active && self.entrant1.is_some() && self.entrant2.is_some() {
            MatchupState::Open
        } else {
            MatchupState::Undecided
        }
    }

    pub fn is_voteable(&self) -> bool {
        self.state() == MatchupState::Open
    }
}

/// Entrant resolved into one matchup slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrantView {
    pub id: Uuid,
    pub name: String,
    pub image_url: Option<String>,
    pub seed: u32,
    /// Votes for this entrant in this matchup only.
    pub votes_in_match: usize,
}
