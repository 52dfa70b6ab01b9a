//! Wallet balance, ledger history, and top-up routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use portledger_core::access::Capability;
use portledger_core::ledger::{EntryDirection, PostingInput, SourceKind};
use portledger_db::repositories::ledger::LedgerEntryFilter;
use portledger_db::repositories::topup::CreateTopUpInput;
use portledger_db::{LedgerRepository, TopUpRepository, UserRepository};
use portledger_shared::types::{PageRequest, PageResponse, UserId};

use crate::middleware::Actor;
use crate::routes::{error_response, forbidden};
use crate::AppState;

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/balance", get(get_balance))
        .route("/wallet/entries", get(list_entries))
        .route("/wallet/topups", post(create_topup))
        .route("/wallet/adjustments", post(create_adjustment))
}

/// Query parameters for the balance endpoint.
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    /// User to read; defaults to the actor. Supervisors can only read
    /// their own balance.
    pub user_id: Option<Uuid>,
}

/// Query parameters for listing ledger entries.
#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    /// Restrict to one owner; supervisors are always restricted to
    /// themselves.
    pub user_id: Option<Uuid>,
    /// Entries posted at or after this time.
    pub from: Option<DateTime<FixedOffset>>,
    /// Entries posted at or before this time.
    pub to: Option<DateTime<FixedOffset>>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl EntriesQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for a manual balance adjustment.
#[derive(Debug, Deserialize)]
pub struct CreateAdjustmentRequest {
    /// The wallet owner to adjust.
    pub user_id: Uuid,
    /// Adjustment direction (credit, debit).
    pub direction: String,
    /// Adjustment amount.
    pub amount: Decimal,
    /// Why the balance is being corrected.
    pub description: String,
}

/// Request body for a wallet top-up.
#[derive(Debug, Deserialize)]
pub struct CreateTopUpRequest {
    /// The wallet owner to credit.
    pub user_id: Uuid,
    /// Amount to credit.
    pub amount: Decimal,
    /// Payment method (imps, neft, cash, cheque, others).
    pub payment_method: String,
    /// Optional bank reference number.
    pub reference_number: Option<String>,
    /// Optional remarks.
    pub remarks: Option<String>,
}

async fn get_balance(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<BalanceQuery>,
) -> Response {
    if !actor.role.can(Capability::ViewWallet) {
        return forbidden(Capability::ViewWallet.as_str());
    }

    // Supervisors read only their own wallet.
    let subject = match query.user_id {
        Some(user_id) if user_id != actor.id => {
            if actor.role == portledger_core::access::Role::Supervisor {
                return forbidden(Capability::ViewWallet.as_str());
            }
            user_id
        }
        _ => actor.id,
    };

    let ledger = LedgerRepository::new(state.db.clone());
    match ledger.get_balance(subject).await {
        Ok(balance) => (
            StatusCode::OK,
            Json(json!({
                "user_id": subject,
                "balance": balance,
                "as_of": Utc::now(),
            })),
        )
            .into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn list_entries(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<EntriesQuery>,
) -> Response {
    if !actor.role.can(Capability::ViewWallet) {
        return forbidden(Capability::ViewWallet.as_str());
    }

    let owner_id = if actor.role == portledger_core::access::Role::Supervisor {
        Some(actor.id)
    } else {
        query.user_id
    };

    let filter = LedgerEntryFilter {
        owner_id,
        from: query.from,
        to: query.to,
    };

    let page = query.page_request();
    let ledger = LedgerRepository::new(state.db.clone());
    match ledger.list_entries(&filter, &page).await {
        Ok((entries, total)) => Json(PageResponse::new(entries, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn create_topup(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateTopUpRequest>,
) -> Response {
    if !actor.role.can(Capability::TopUpWallet) {
        return forbidden(Capability::TopUpWallet.as_str());
    }

    let topups = TopUpRepository::new(state.db.clone());
    let input = CreateTopUpInput {
        user_id: body.user_id,
        amount: body.amount,
        payment_method: body.payment_method,
        reference_number: body.reference_number,
        remarks: body.remarks,
        topped_up_by: actor.id,
    };

    match topups.create(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn create_adjustment(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateAdjustmentRequest>,
) -> Response {
    if !actor.role.can(Capability::TopUpWallet) {
        return forbidden(Capability::TopUpWallet.as_str());
    }

    let Some(direction) = EntryDirection::parse(&body.direction) else {
        return error_response(
            400,
            "VALIDATION_ERROR",
            format!("Direction must be credit or debit, got {}", body.direction),
        );
    };

    let users = UserRepository::new(state.db.clone());
    let owner = match users.find(body.user_id).await {
        Ok(owner) => owner,
        Err(e) => return error_response(404, "OWNER_NOT_FOUND", e),
    };

    let posting = PostingInput {
        owner: UserId::from_uuid(body.user_id),
        owner_role: owner.role.to_core(),
        direction,
        amount: body.amount,
        source_kind: SourceKind::Adjustment,
        source_ref: None,
        posted_by: UserId::from_uuid(actor.id),
        description: Some(body.description),
    };

    let ledger = LedgerRepository::new(state.db.clone());
    match ledger.post(&posting).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}
