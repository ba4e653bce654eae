/// Bracket reads: tournament listing, bracket view-model and voter selections.
pub mod bracket_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Vote submission.
pub mod vote_service;

#[cfg(test)]
mod fixtures;
