//! Digital voucher routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_db::VoucherRepository;
use portledger_db::entities::sea_orm_active_enums::VoucherStatus;
use portledger_db::repositories::voucher::{BulkLogItem, CreateVoucherInput, VoucherFilter};
use portledger_shared::types::{PageRequest, PageResponse};

use crate::middleware::Actor;
use crate::routes::error_response;
use crate::routes::expenses::BulkReviewResponse;
use crate::AppState;

/// Creates the voucher routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vouchers", post(create_voucher))
        .route("/vouchers", get(list_vouchers))
        .route("/vouchers/{voucher_id}", get(get_voucher))
        .route("/vouchers/{voucher_id}/review", patch(review_voucher))
        .route("/vouchers/bulk-review", post(bulk_review_vouchers))
}

/// Request body for creating a voucher.
#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    /// When the spend happened.
    pub date_time: DateTime<FixedOffset>,
    /// Expense category (fuel, maintenance, travel, ...).
    pub category: String,
    /// Voucher amount.
    pub amount: Decimal,
    /// Opaque reference to the supporting bill document.
    pub document_ref: String,
    /// Optional remarks.
    pub remarks: Option<String>,
}

/// Query parameters for listing vouchers.
#[derive(Debug, Deserialize)]
pub struct ListVouchersQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListVouchersQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for a review action.
#[derive(Debug, Deserialize)]
pub struct ReviewVoucherRequest {
    /// One of approve, decline, log.
    pub action: String,
    /// Optional approver comments.
    pub comments: Option<String>,
    /// External voucher number (log only).
    pub tally_reference: Option<String>,
}

/// Request body for a bulk review.
#[derive(Debug, Deserialize)]
pub struct BulkReviewVouchersRequest {
    /// One of approve, log.
    pub action: String,
    /// The vouchers to approve (approve action).
    #[serde(default)]
    pub voucher_ids: Vec<Uuid>,
    /// The vouchers to log, each with its external number (log action).
    #[serde(default)]
    pub items: Vec<BulkLogItemRequest>,
    /// Optional approver comments (approve only).
    pub comments: Option<String>,
}

/// One voucher to log in a bulk request.
#[derive(Debug, Deserialize)]
pub struct BulkLogItemRequest {
    /// The voucher id.
    pub id: Uuid,
    /// The external voucher number.
    pub tally_reference: String,
}

async fn create_voucher(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateVoucherRequest>,
) -> Response {
    let input = CreateVoucherInput {
        owner_id: actor.id,
        owner_role: actor.role,
        date_time: body.date_time,
        category: body.category,
        amount: body.amount,
        document_ref: body.document_ref,
        remarks: body.remarks,
    };

    let vouchers = VoucherRepository::new(state.db.clone());
    match vouchers.create(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn list_vouchers(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListVouchersQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match portledger_core::workflow::VoucherStatus::parse(s) {
            Some(status) => Some(VoucherStatus::from_core(status)),
            None => {
                return error_response(400, "VALIDATION_ERROR", format!("Unknown status {s}"));
            }
        },
    };

    // Supervisors see only their own vouchers.
    let owner_id = (actor.role == Role::Supervisor).then_some(actor.id);
    let filter = VoucherFilter { owner_id, status };

    let page = query.page_request();
    let vouchers = VoucherRepository::new(state.db.clone());
    match vouchers.list(&filter, &page).await {
        Ok((items, total)) => Json(PageResponse::new(items, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn get_voucher(
    State(state): State<AppState>,
    actor: Actor,
    Path(voucher_id): Path<Uuid>,
) -> Response {
    let vouchers = VoucherRepository::new(state.db.clone());
    match vouchers.find(voucher_id).await {
        Ok(model) => {
            if actor.role == Role::Supervisor && model.owner_id != actor.id {
                return error_response(404, "VOUCHER_NOT_FOUND", "Voucher not found");
            }
            Json(model).into_response()
        }
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn review_voucher(
    State(state): State<AppState>,
    actor: Actor,
    Path(voucher_id): Path<Uuid>,
    Json(body): Json<ReviewVoucherRequest>,
) -> Response {
    let vouchers = VoucherRepository::new(state.db.clone());

    let result = match body.action.as_str() {
        "approve" => {
            vouchers
                .approve(voucher_id, actor.id, actor.role, body.comments)
                .await
        }
        "decline" => {
            vouchers
                .decline(voucher_id, actor.id, actor.role, body.comments)
                .await
        }
        "log" => {
            vouchers
                .log(
                    voucher_id,
                    actor.id,
                    actor.role,
                    body.tally_reference.unwrap_or_default(),
                )
                .await
        }
        other => {
            return error_response(
                400,
                "VALIDATION_ERROR",
                format!("Action must be approve, decline, or log, got {other}"),
            );
        }
    };

    match result {
        Ok(model) => Json(model).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn bulk_review_vouchers(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<BulkReviewVouchersRequest>,
) -> Response {
    let vouchers = VoucherRepository::new(state.db.clone());

    let result = match body.action.as_str() {
        "approve" => {
            vouchers
                .bulk_approve(&body.voucher_ids, actor.id, actor.role, body.comments)
                .await
        }
        "log" => {
            let items: Vec<BulkLogItem> = body
                .items
                .into_iter()
                .map(|item| BulkLogItem {
                    id: item.id,
                    voucher_number: item.tally_reference,
                })
                .collect();
            vouchers.bulk_log(&items, actor.id, actor.role).await
        }
        other => {
            return error_response(
                400,
                "VALIDATION_ERROR",
                format!("Action must be approve or log, got {other}"),
            );
        }
    };

    Json(BulkReviewResponse::from(result)).into_response()
}
