use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Bracket Vote Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::tournaments::list_tournaments,
        crate::routes::tournaments::get_bracket,
        crate::routes::tournaments::get_selections,
        crate::routes::tournaments::get_page,
        crate::routes::votes::submit_votes,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::tournament::TournamentSummary,
            crate::dto::bracket::BracketResponse,
            crate::dto::bracket::RoundResponse,
            crate::dto::bracket::MatchupResponse,
            crate::dto::bracket::EntrantResponse,
            crate::dto::bracket::MatchupStateDto,
            crate::dto::vote::SelectionsResponse,
            crate::dto::vote::TournamentPageResponse,
            crate::dto::vote::SubmitVotesRequest,
            crate::dto::vote::SubmitVotesResponse,
            crate::dao::models::TournamentStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tournaments", description = "Tournament listings and bracket views"),
        (name = "votes", description = "Vote submission"),
    )
)]
pub struct ApiDoc;
