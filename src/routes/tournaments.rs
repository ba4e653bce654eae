use axum::{
    Json, Router,
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::{
        bracket::BracketResponse,
        tournament::TournamentSummary,
        vote::{SelectionsResponse, TournamentPageResponse},
    },
    error::AppError,
    routes::voter_id,
    services::bracket_service,
    state::SharedState,
};

/// Read-only tournament and bracket endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/tournaments", get(list_tournaments))
        .route("/tournaments/{id}", get(get_bracket))
        .route("/tournaments/{id}/selections", get(get_selections))
        .route("/tournaments/{id}/page", get(get_page))
}

#[utoipa::path(
    get,
    path = "/tournaments",
    tag = "tournaments",
    responses((status = 200, description = "Tournaments, newest first", body = [TournamentSummary]))
)]
/// List every tournament ordered by creation time, newest first.
pub async fn list_tournaments(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TournamentSummary>>, AppError> {
    let tournaments = bracket_service::list_tournament_summaries(&state).await?;
    Ok(Json(tournaments.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}",
    tag = "tournaments",
    params(("id" = Uuid, Path, description = "Tournament identifier")),
    responses(
        (status = 200, description = "Assembled bracket", body = BracketResponse),
        (status = 404, description = "Unknown tournament")
    )
)]
/// Return the full bracket of a tournament.
pub async fn get_bracket(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BracketResponse>, AppError> {
    let bracket = bracket_service::fetch_bracket(&state, id).await?;
    Ok(Json(bracket.into()))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/selections",
    tag = "tournaments",
    params(
        ("id" = Uuid, Path, description = "Tournament identifier"),
        ("X-Voter-Id" = Option<Uuid>, Header, description = "Voter identifier; omit for anonymous readers")
    ),
    responses((status = 200, description = "Stored picks of the voter", body = SelectionsResponse))
)]
/// Return the requesting voter's stored picks for a tournament.
pub async fn get_selections(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SelectionsResponse>, AppError> {
    let voter = voter_id(&headers)?;
    let selections = bracket_service::fetch_voter_selections(&state, id, voter).await?;
    Ok(Json(SelectionsResponse { selections }))
}

#[utoipa::path(
    get,
    path = "/tournaments/{id}/page",
    tag = "tournaments",
    params(
        ("id" = Uuid, Path, description = "Tournament identifier"),
        ("X-Voter-Id" = Option<Uuid>, Header, description = "Voter identifier; omit for anonymous readers")
    ),
    responses(
        (status = 200, description = "Bracket and the voter's picks", body = TournamentPageResponse),
        (status = 404, description = "Unknown tournament")
    )
)]
/// Return the bracket together with the requesting voter's picks.
pub async fn get_page(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<TournamentPageResponse>, AppError> {
    let voter = voter_id(&headers)?;
    let page = bracket_service::fetch_tournament_page(&state, id, voter).await?;
    Ok(Json(page.into()))
}
