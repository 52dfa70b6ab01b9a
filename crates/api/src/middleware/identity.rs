//! Identity middleware for protected routes.
//!
//! Authentication lives in an upstream identity provider; by contract it
//! injects `X-User-Id` and `X-User-Role` headers that this service trusts.
//! The middleware mirrors the actor into the users table so owner roles
//! can be resolved locally, and stores an [`Actor`] in request extensions.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_db::UserRepository;

use crate::AppState;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";
const USER_NAME_HEADER: &str = "x-user-name";

/// The authenticated actor for the current request.
#[derive(Debug, Clone)]
pub struct Actor {
    /// The actor's user id.
    pub id: Uuid,
    /// The actor's role.
    pub role: Role,
    /// The actor's username.
    pub username: String,
}

/// Identity middleware validating the trusted identity headers.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();

    let Some(id) = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
    else {
        return unauthorized("missing_identity", "X-User-Id header is required");
    };

    let Some(role) = headers
        .get(USER_ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(Role::parse)
    else {
        return unauthorized("missing_identity", "X-User-Role header is required");
    };

    let username = headers
        .get(USER_NAME_HEADER)
        .and_then(|h| h.to_str().ok())
        .map_or_else(|| id.to_string(), ToString::to_string);

    // Mirror the actor so workflow repositories can resolve owner roles.
    let users = UserRepository::new(state.db.clone());
    if let Err(e) = users.upsert_from_identity(id, &username, role).await {
        tracing::error!(error = %e, "failed to mirror identity");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "IDENTITY_MIRROR_FAILED",
                "message": "Could not persist actor identity"
            })),
        )
            .into_response();
    }

    request.extensions_mut().insert(Actor { id, role, username });
    next.run(request).await
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<Self>().cloned().ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "missing_identity",
                    "message": "Request did not pass identity middleware"
                })),
            )
                .into_response()
        })
    }
}
