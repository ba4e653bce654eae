//! Bracket state engine: pure functions turning stored rows into the bracket view-model.
//!
//! Nothing in here performs I/O or keeps state between calls; services feed it fresh rows on
//! every request.

pub mod aggregate;
pub mod assemble;
pub mod selections;
pub mod submission;
pub mod view;

pub use aggregate::{VoterNames, VotersByMatchup, aggregate_voters, distinct_voter_ids};
pub use assemble::{AssembleError, assemble, round_label};
pub use selections::{Selections, selections_changed, voter_selections};
pub use submission::{SelectionError, build_votes, validate_selections};
pub use view::{BracketView, EntrantView, MatchupState, MatchupView, RoundView};
