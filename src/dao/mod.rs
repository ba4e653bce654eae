/// Tournament, matchup, entrant and vote storage operations.
pub mod bracket_store;
/// Database model definitions.
pub mod models;
/// Storage abstraction layer for database operations.
pub mod storage;
