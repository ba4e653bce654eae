use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::vote::{SubmitVotesRequest, SubmitVotesResponse},
    error::AppError,
    routes::RequiredVoter,
    services::vote_service,
    state::SharedState,
};

/// Vote submission endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/votes", post(submit_votes))
}

#[utoipa::path(
    post,
    path = "/votes",
    tag = "votes",
    request_body = SubmitVotesRequest,
    params(("X-Voter-Id" = Uuid, Header, description = "Identifier of the signed-in voter")),
    responses(
        (status = 200, description = "Selections recorded", body = SubmitVotesResponse),
        (status = 400, description = "A selection does not match an open matchup"),
        (status = 401, description = "Missing or unknown voter")
    )
)]
/// Record the voter's picks, replacing earlier picks on the same matchups.
pub async fn submit_votes(
    State(state): State<SharedState>,
    RequiredVoter(voter): RequiredVoter,
    Valid(Json(payload)): Valid<Json<SubmitVotesRequest>>,
) -> Result<Json<SubmitVotesResponse>, AppError> {
    let outcome =
        vote_service::submit_selections(&state, Some(voter), payload.selections).await?;
    Ok(Json(outcome.into()))
}
