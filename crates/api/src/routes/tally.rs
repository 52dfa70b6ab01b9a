//! Tally log routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;

use portledger_core::access::Capability;
use portledger_db::TallyRepository;
use portledger_db::entities::sea_orm_active_enums::TallyEntryKind;
use portledger_db::repositories::tally::{CreateTallyEntryInput, TallyFilter};
use portledger_shared::types::{PageRequest, PageResponse};

use crate::middleware::Actor;
use crate::routes::{error_response, forbidden};
use crate::AppState;

/// Creates the tally log routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tally-logs", get(list_tally_logs))
        .route("/tally-logs", post(create_tally_entry))
}

/// Query parameters for listing tally entries.
#[derive(Debug, Deserialize)]
pub struct ListTallyQuery {
    /// Filter by entry kind (expense, voucher, revenue, manual).
    pub entry_kind: Option<String>,
    /// Entries logged at or after this time.
    pub from: Option<DateTime<FixedOffset>>,
    /// Entries logged at or before this time.
    pub to: Option<DateTime<FixedOffset>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListTallyQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for a manual or revenue tally entry.
#[derive(Debug, Deserialize)]
pub struct CreateTallyRequest {
    /// Entry kind; only manual and revenue are accepted.
    pub entry_kind: String,
    /// The external voucher number.
    pub tally_voucher_number: String,
    /// Entry amount.
    pub amount: Decimal,
    /// Description.
    pub description: String,
}

fn parse_kind(s: &str) -> Option<TallyEntryKind> {
    match s {
        "expense" => Some(TallyEntryKind::Expense),
        "voucher" => Some(TallyEntryKind::Voucher),
        "revenue" => Some(TallyEntryKind::Revenue),
        "manual" => Some(TallyEntryKind::Manual),
        _ => None,
    }
}

async fn list_tally_logs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListTallyQuery>,
) -> Response {
    if !actor.role.can(Capability::LogTally) {
        return forbidden(Capability::LogTally.as_str());
    }

    let entry_kind = match query.entry_kind.as_deref() {
        None => None,
        Some(s) => match parse_kind(s) {
            Some(kind) => Some(kind),
            None => {
                return error_response(400, "VALIDATION_ERROR", format!("Unknown entry kind {s}"));
            }
        },
    };

    let filter = TallyFilter {
        entry_kind,
        from: query.from,
        to: query.to,
    };

    let page = query.page_request();
    let tally = TallyRepository::new(state.db.clone());
    match tally.list(&filter, &page).await {
        Ok((items, total)) => Json(PageResponse::new(items, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn create_tally_entry(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateTallyRequest>,
) -> Response {
    if !actor.role.can(Capability::LogTally) {
        return forbidden(Capability::LogTally.as_str());
    }

    let Some(entry_kind) = parse_kind(&body.entry_kind) else {
        return error_response(
            400,
            "VALIDATION_ERROR",
            format!("Unknown entry kind {}", body.entry_kind),
        );
    };

    let input = CreateTallyEntryInput {
        entry_kind,
        tally_voucher_number: body.tally_voucher_number,
        amount: body.amount,
        description: body.description,
        logged_by: actor.id,
    };

    let tally = TallyRepository::new(state.db.clone());
    match tally.create_manual(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}
