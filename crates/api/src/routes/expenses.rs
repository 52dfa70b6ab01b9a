//! Port expense routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use portledger_core::access::Role;
use portledger_core::workflow::ExpenseCharges;
use portledger_core::workflow::expense::DEFAULT_GATE_CHARGE;
use portledger_db::ExpenseRepository;
use portledger_db::entities::sea_orm_active_enums::ExpenseStatus;
use portledger_db::repositories::BulkReviewResult;
use portledger_db::repositories::expense::{CreateExpenseInput, ExpenseFilter};
use portledger_shared::types::{PageRequest, PageResponse};

use crate::middleware::Actor;
use crate::routes::error_response;
use crate::AppState;

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", post(create_expense))
        .route("/expenses", get(list_expenses))
        .route("/expenses/{expense_id}", get(get_expense))
        .route("/expenses/{expense_id}/review", patch(review_expense))
        .route("/expenses/bulk-review", post(bulk_review_expenses))
}

/// Request body for creating a port expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// When the gate movement happened.
    pub date_time: DateTime<FixedOffset>,
    /// Vehicle description.
    pub vehicle: String,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Gate identifier.
    pub gate: String,
    /// Movement direction (in/out).
    #[serde(default = "default_in_out")]
    pub in_out: String,
    /// Free-text description.
    pub description: String,
    /// CISF charge; defaults to the standard gate charge.
    pub cisf_amount: Option<Decimal>,
    /// Port trust charge; defaults to the standard gate charge.
    pub kpt_amount: Option<Decimal>,
    /// Customs charge; defaults to the standard gate charge.
    pub customs_amount: Option<Decimal>,
    /// Days of road tax to charge.
    #[serde(default)]
    pub road_tax_days: u32,
    /// Explicit road tax amount, overriding the per-day derivation.
    pub road_tax_amount: Option<Decimal>,
    /// Ad-hoc charges.
    pub other_charges: Option<Decimal>,
    /// Opaque reference to the receipt photo.
    pub photo_ref: Option<String>,
}

fn default_in_out() -> String {
    "in".to_string()
}

/// Query parameters for listing expenses.
#[derive(Debug, Deserialize)]
pub struct ListExpensesQuery {
    /// Filter by status.
    pub status: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListExpensesQuery {
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
pub struct ReviewExpenseRequest {
    /// One of approve, reject, finalize.
    pub action: String,
    /// Optional reviewer comments.
    pub comments: Option<String>,
}

/// Request body for a bulk review.
#[derive(Debug, Deserialize)]
pub struct BulkReviewExpensesRequest {
    /// One of approve, finalize.
    pub action: String,
    /// The expenses to transition.
    pub expense_ids: Vec<Uuid>,
    /// Optional reviewer comments (approve only).
    pub comments: Option<String>,
}

/// Response for a bulk review.
#[derive(Debug, Serialize)]
pub struct BulkReviewResponse {
    /// Per-item outcomes, in input order.
    pub results: Vec<BulkReviewItemResponse>,
    /// Number of successful transitions.
    pub success_count: usize,
    /// Number of failed transitions.
    pub failure_count: usize,
}

/// Per-item outcome in a bulk review.
#[derive(Debug, Serialize)]
pub struct BulkReviewItemResponse {
    /// The record id.
    pub id: Uuid,
    /// Whether the transition succeeded.
    pub success: bool,
    /// Error message if it failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<BulkReviewResult> for BulkReviewResponse {
    fn from(result: BulkReviewResult) -> Self {
        Self {
            results: result
                .results
                .into_iter()
                .map(|item| BulkReviewItemResponse {
                    id: item.id,
                    success: item.success,
                    error: item.error,
                })
                .collect(),
            success_count: result.success_count,
            failure_count: result.failure_count,
        }
    }
}

async fn create_expense(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateExpenseRequest>,
) -> Response {
    let charges = ExpenseCharges {
        cisf: body.cisf_amount.unwrap_or(DEFAULT_GATE_CHARGE),
        kpt: body.kpt_amount.unwrap_or(DEFAULT_GATE_CHARGE),
        customs: body.customs_amount.unwrap_or(DEFAULT_GATE_CHARGE),
        road_tax_days: body.road_tax_days,
        road_tax_override: body.road_tax_amount,
        other: body.other_charges.unwrap_or(Decimal::ZERO),
    };

    let input = CreateExpenseInput {
        owner_id: actor.id,
        owner_role: actor.role,
        date_time: body.date_time,
        vehicle: body.vehicle,
        vehicle_number: body.vehicle_number,
        gate: body.gate,
        in_out: body.in_out,
        description: body.description,
        charges,
        photo_ref: body.photo_ref,
    };

    let expenses = ExpenseRepository::new(state.db.clone());
    match expenses.create(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn list_expenses(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListExpensesQuery>,
) -> Response {
    let status = match query.status.as_deref() {
        None => None,
        Some(s) => match portledger_core::workflow::ExpenseStatus::parse(s) {
            Some(status) => Some(ExpenseStatus::from_core(status)),
            None => {
                return error_response(400, "VALIDATION_ERROR", format!("Unknown status {s}"));
            }
        },
    };

    // Supervisors see only their own expenses.
    let owner_id = (actor.role == Role::Supervisor).then_some(actor.id);
    let filter = ExpenseFilter { owner_id, status };

    let page = query.page_request();
    let expenses = ExpenseRepository::new(state.db.clone());
    match expenses.list(&filter, &page).await {
        Ok((items, total)) => Json(PageResponse::new(items, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn get_expense(
    State(state): State<AppState>,
    actor: Actor,
    Path(expense_id): Path<Uuid>,
) -> Response {
    let expenses = ExpenseRepository::new(state.db.clone());
    match expenses.find(expense_id).await {
        Ok(model) => {
            if actor.role == Role::Supervisor && model.owner_id != actor.id {
                return error_response(404, "EXPENSE_NOT_FOUND", "Expense not found");
            }
            Json(model).into_response()
        }
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn review_expense(
    State(state): State<AppState>,
    actor: Actor,
    Path(expense_id): Path<Uuid>,
    Json(body): Json<ReviewExpenseRequest>,
) -> Response {
    let expenses = ExpenseRepository::new(state.db.clone());

    let result = match body.action.as_str() {
        "approve" => {
            expenses
                .approve(expense_id, actor.id, actor.role, body.comments)
                .await
        }
        "reject" => {
            expenses
                .reject(expense_id, actor.id, actor.role, body.comments)
                .await
        }
        "finalize" => expenses.finalize(expense_id, actor.id, actor.role).await,
        other => {
            return error_response(
                400,
                "VALIDATION_ERROR",
                format!("Action must be approve, reject, or finalize, got {other}"),
            );
        }
    };

    match result {
        Ok(model) => Json(model).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn bulk_review_expenses(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<BulkReviewExpensesRequest>,
) -> Response {
    let expenses = ExpenseRepository::new(state.db.clone());

    let result = match body.action.as_str() {
        "approve" => {
            expenses
                .bulk_approve(&body.expense_ids, actor.id, actor.role, body.comments)
                .await
        }
        "finalize" => {
            expenses
                .bulk_finalize(&body.expense_ids, actor.id, actor.role)
                .await
        }
        other => {
            return error_response(
                400,
                "VALIDATION_ERROR",
                format!("Action must be approve or finalize, got {other}"),
            );
        }
    };

    Json(BulkReviewResponse::from(result)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charges_default_to_standard_gate_charge() {
        let body: CreateExpenseRequest = serde_json::from_value(serde_json::json!({
            "date_time": "2026-03-14T08:00:00+05:30",
            "vehicle": "Trailer",
            "vehicle_number": "ka-05-mx-1234",
            "gate": "north_gate",
            "description": "Inbound container movement",
            "road_tax_days": 1
        }))
        .unwrap();

        let charges = ExpenseCharges {
            cisf: body.cisf_amount.unwrap_or(DEFAULT_GATE_CHARGE),
            kpt: body.kpt_amount.unwrap_or(DEFAULT_GATE_CHARGE),
            customs: body.customs_amount.unwrap_or(DEFAULT_GATE_CHARGE),
            road_tax_days: body.road_tax_days,
            road_tax_override: body.road_tax_amount,
            other: body.other_charges.unwrap_or(Decimal::ZERO),
        };

        assert_eq!(charges.total(), Decimal::from(200));
        assert_eq!(body.in_out, "in");
    }

    #[test]
    fn test_unknown_review_action_is_rejected() {
        let body: ReviewExpenseRequest = serde_json::from_value(serde_json::json!({
            "action": "void"
        }))
        .unwrap();
        assert!(!matches!(
            body.action.as_str(),
            "approve" | "reject" | "finalize"
        ));
    }
}
