use super::JwtVerifier;
use crate::server::ErrorResponse;
use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Verifies the bearer token and attaches the resulting
/// [`Claims`](super::Claims) to the request extensions.
pub async fn authenticate(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(request.headers()) else {
        return unauthorized("Authorization header is missing");
    };

    match verifier.verify(token) {
        Ok(claims) => {
            debug!("Authenticated user {} ({})", claims.username, claims.sub);
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            debug!("Rejected bearer token: {}", e);
            unauthorized("Invalid token")
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}
