/**
 * Authentication Extractor
 *
 * Every chat route needs the verified identity of the requester. `AuthUser`
 * reads a JWT from the `Authorization: Bearer` header or, for EventSource
 * clients that cannot set headers, from a `token` query parameter.
 */
use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::auth::sessions::user_id_from_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Verified user ID of the requester
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn query_token(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).or_else(|| query_token(parts)).ok_or_else(|| {
            tracing::warn!(path = %parts.uri.path(), "Missing authentication token");
            BackendError::unauthorized("Unauthorized - No Token Provided")
        })?;

        let user_id = user_id_from_token(&token, &state.jwt_secret).map_err(|e| {
            tracing::warn!(path = %parts.uri.path(), "Invalid token: {}", e);
            BackendError::unauthorized("Unauthorized - Invalid Token")
        })?;

        Ok(AuthUser(user_id))
    }
}
