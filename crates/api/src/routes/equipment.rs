//! Equipment usage routes.

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

use portledger_core::access::Capability;
use portledger_core::equipment::ContractType;
use portledger_db::EquipmentRepository;
use portledger_db::entities::sea_orm_active_enums::UsageStatus;
use portledger_db::repositories::equipment::{EndUsageInput, StartUsageInput, UsageFilter};
use portledger_shared::types::{PageRequest, PageResponse};

use crate::middleware::Actor;
use crate::routes::{error_response, forbidden};
use crate::AppState;

/// Creates the equipment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/equipment", post(start_usage))
        .route("/equipment", get(list_usage))
        .route("/equipment/{usage_id}/end", patch(end_usage))
}

/// Request body for starting a usage record.
#[derive(Debug, Deserialize)]
pub struct StartUsageRequest {
    /// The counterparty hiring out the equipment.
    pub party_id: Uuid,
    /// The vehicle type.
    pub vehicle_type_id: Uuid,
    /// The work type.
    pub work_type_id: Uuid,
    /// Vehicle registration number.
    pub vehicle_number: String,
    /// Billing contract type.
    pub contract_type: String,
    /// When usage started.
    pub start_time: DateTime<FixedOffset>,
    /// A pre-agreed rate; ignored for supervisors.
    pub rate: Option<Decimal>,
    /// Optional comments.
    pub comments: Option<String>,
}

/// Query parameters for listing usage records.
#[derive(Debug, Deserialize)]
pub struct ListUsageQuery {
    /// Filter by status (running, completed).
    pub status: Option<String>,
    /// Only running records.
    #[serde(default)]
    pub running_only: bool,
    /// Restrict to one counterparty.
    pub party_id: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListUsageQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Request body for ending a usage record.
#[derive(Debug, Deserialize)]
pub struct EndUsageRequest {
    /// When usage ended; defaults to now.
    pub end_time: Option<DateTime<FixedOffset>>,
    /// Explicit quantity (required for tonnes contracts).
    pub quantity: Option<Decimal>,
    /// Closing comments.
    pub comments: Option<String>,
}

async fn start_usage(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<StartUsageRequest>,
) -> Response {
    if !actor.role.can(Capability::ManageEquipment) {
        return forbidden(Capability::ManageEquipment.as_str());
    }

    let Some(contract_type) = ContractType::parse(&body.contract_type) else {
        return error_response(
            400,
            "VALIDATION_ERROR",
            format!("Unknown contract type {}", body.contract_type),
        );
    };

    // Billing fields are manager territory; supervisor submissions start
    // unpriced and pick a rate up from the rate table at completion.
    let rate = if actor.role.can(Capability::ConfigureRates) {
        body.rate
    } else {
        None
    };

    let input = StartUsageInput {
        party_id: body.party_id,
        vehicle_type_id: body.vehicle_type_id,
        work_type_id: body.work_type_id,
        vehicle_number: body.vehicle_number,
        contract_type,
        start_time: body.start_time,
        rate,
        comments: body.comments,
        created_by: actor.id,
    };

    let equipment = EquipmentRepository::new(state.db.clone());
    match equipment.start(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn list_usage(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListUsageQuery>,
) -> Response {
    if !actor.role.can(Capability::ManageEquipment) {
        return forbidden(Capability::ManageEquipment.as_str());
    }

    let status = if query.running_only {
        Some(UsageStatus::Running)
    } else {
        match query.status.as_deref() {
            None => None,
            Some("running") => Some(UsageStatus::Running),
            Some("completed") => Some(UsageStatus::Completed),
            Some(other) => {
                return error_response(
                    400,
                    "VALIDATION_ERROR",
                    format!("Unknown status {other}"),
                );
            }
        }
    };

    let filter = UsageFilter {
        status,
        party_id: query.party_id,
    };

    let page = query.page_request();
    let equipment = EquipmentRepository::new(state.db.clone());
    match equipment.list(&filter, &page).await {
        Ok((items, total)) => Json(PageResponse::new(items, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn end_usage(
    State(state): State<AppState>,
    actor: Actor,
    Path(usage_id): Path<Uuid>,
    Json(body): Json<EndUsageRequest>,
) -> Response {
    if !actor.role.can(Capability::ManageEquipment) {
        return forbidden(Capability::ManageEquipment.as_str());
    }

    let input = EndUsageInput {
        end_time: body.end_time,
        quantity: body.quantity,
        comments: body.comments,
        ended_by: actor.id,
    };

    let equipment = EquipmentRepository::new(state.db.clone());
    match equipment.end(usage_id, input).await {
        Ok(model) => Json(model).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}
