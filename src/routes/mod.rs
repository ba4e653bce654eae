use axum::{
    Router,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

use crate::{error::AppError, state::SharedState};

pub mod docs;
pub mod health;
pub mod tournaments;
pub mod votes;

/// Header carrying the already-authenticated voter identifier.
pub const VOTER_ID_HEADER: &str = "x-voter-id";

/// Every route of the service, bound to `state`.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(tournaments::router())
        .merge(votes::router())
        .merge(docs::router())
        .with_state(state)
}

/// Read the optional voter identity. A present but malformed header is rejected.
fn voter_id(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(VOTER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized("malformed voter header `X-Voter-Id`".into()))
}

/// Voter identity for write endpoints.
///
/// Extracted from the request head, so a missing or malformed `X-Voter-Id` is refused with 401
/// before the body is parsed or validated.
pub struct RequiredVoter(pub Uuid);

impl<S: Send + Sync> FromRequestParts<S> for RequiredVoter {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        voter_id(&parts.headers)?
            .map(RequiredVoter)
            .ok_or_else(|| AppError::Unauthorized("you must be signed in to vote".into()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, Request};

    use super::*;

    #[test]
    fn absent_voter_header_is_anonymous() {
        assert_eq!(voter_id(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn parses_voter_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(VOTER_ID_HEADER, HeaderValue::from_str(&id.to_string()).unwrap());

        assert_eq!(voter_id(&headers).unwrap(), Some(id));
    }

    #[test]
    fn malformed_voter_header_is_unauthorized() {
        let mut headers = HeaderMap::new();
        headers.insert(VOTER_ID_HEADER, HeaderValue::from_static("not-a-uuid"));

        assert!(matches!(voter_id(&headers), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn openapi_lists_every_route() {
        use utoipa::OpenApi;

        let doc = crate::services::documentation::ApiDoc::openapi();
        for path in [
            "/healthcheck",
            "/tournaments",
            "/tournaments/{id}",
            "/tournaments/{id}/selections",
            "/tournaments/{id}/page",
            "/votes",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[tokio::test]
    async fn write_endpoints_require_a_voter() {
        let (mut parts, _) = Request::builder().body(()).unwrap().into_parts();
        let rejection = RequiredVoter::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AppError::Unauthorized(_)));

        let id = Uuid::new_v4();
        let (mut parts, _) = Request::builder()
            .header(VOTER_ID_HEADER, id.to_string())
            .body(())
            .unwrap()
            .into_parts();
        let RequiredVoter(voter) = RequiredVoter::from_request_parts(&mut parts, &())
            .await
            .ok()
            .unwrap();
        assert_eq!(voter, id);
    }
}
