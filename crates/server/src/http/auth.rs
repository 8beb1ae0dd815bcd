use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use db::models::user::User;
use utils_core::response::ApiResponse;

use crate::AppState;

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (prefix, rest) = trimmed.split_once(' ')?;
    if !prefix.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error("Unauthorized")),
    )
        .into_response()
}

/// Resolves the bearer token to a [`User`] and stores it as a request
/// extension for the handlers downstream.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
    else {
        return unauthorized();
    };

    let claims = match state.tokens().verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!("rejected bearer token: {e}");
            return unauthorized();
        }
    };

    let user = match User::find_by_id(&state.db().pool, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!("token subject {} no longer exists", claims.sub);
            return unauthorized();
        }
        Err(e) => {
            tracing::error!("failed to load authenticated user: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Internal server error")),
            )
                .into_response();
        }
    };

    req.extensions_mut().insert(user);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_case_insensitive() {
        assert_eq!(parse_authorization_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("bearer abc"), Some("abc"));
        assert_eq!(parse_authorization_bearer("BEARER  abc "), Some("abc"));
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert_eq!(parse_authorization_bearer("abc"), None);
        assert_eq!(parse_authorization_bearer("Basic abc"), None);
        assert_eq!(parse_authorization_bearer("Bearer "), None);
    }
}
