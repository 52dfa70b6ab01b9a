//! Audit trail routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_core::audit::{DEFAULT_KEEP_COUNT, SubjectKind};
use portledger_db::AuditRepository;

use crate::middleware::Actor;
use crate::routes::{error_response, forbidden};
use crate::AppState;

/// Creates the audit trail routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/audit-logs/{subject_kind}/{subject_id}", get(list_for_subject))
        .route("/audit-logs/cleanup", post(cleanup))
}

/// Request body for the retention cleanup.
#[derive(Debug, Deserialize)]
pub struct CleanupRequest {
    /// Entries to keep per subject; defaults to 10.
    pub keep_count: Option<usize>,
}

async fn list_for_subject(
    State(state): State<AppState>,
    actor: Actor,
    Path((subject_kind, subject_id)): Path<(String, Uuid)>,
) -> Response {
    if !matches!(actor.role, Role::Admin | Role::Manager) {
        return forbidden("view_audit_trail");
    }

    let Some(subject_kind) = SubjectKind::parse(&subject_kind) else {
        return error_response(
            400,
            "VALIDATION_ERROR",
            format!("Unknown subject kind {subject_kind}"),
        );
    };

    let audit = AuditRepository::new(state.db.clone());
    match audit.list_for_subject(subject_kind, subject_id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(500, "DATABASE_ERROR", e),
    }
}

async fn cleanup(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CleanupRequest>,
) -> Response {
    if actor.role != Role::Admin {
        return forbidden("cleanup_audit_trail");
    }

    let keep_count = body.keep_count.unwrap_or(DEFAULT_KEEP_COUNT);
    let audit = AuditRepository::new(state.db.clone());
    match audit.cleanup(keep_count).await {
        Ok(deleted) => Json(json!({
            "deleted": deleted,
            "keep_count": keep_count,
        }))
        .into_response(),
        Err(e) => error_response(500, "DATABASE_ERROR", e),
    }
}
