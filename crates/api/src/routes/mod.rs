//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{AppState, middleware::identity::identity_middleware};

pub mod audit;
pub mod equipment;
pub mod expenses;
pub mod health;
pub mod rates;
pub mod tally;
pub mod vouchers;
pub mod wallet;

/// Creates the API router with protected routes behind the identity
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(wallet::routes())
        .merge(expenses::routes())
        .merge(vouchers::routes())
        .merge(equipment::routes())
        .merge(rates::routes())
        .merge(tally::routes())
        .merge(audit::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            identity_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Builds a JSON error response in the shared shape.
pub(crate) fn error_response(
    status_code: u16,
    error_code: &str,
    message: impl std::fmt::Display,
) -> Response {
    let status =
        StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": error_code,
            "message": message.to_string(),
        })),
    )
        .into_response()
}

/// Builds the 403 response for a capability the actor's role lacks.
pub(crate) fn forbidden(action: &str) -> Response {
    error_response(
        403,
        "INSUFFICIENT_ROLE",
        format!("Role is not permitted to {action}"),
    )
}
