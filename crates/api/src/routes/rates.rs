//! Equipment rate rule routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use portledger_core::access::Capability;
use portledger_core::equipment::ContractType;
use portledger_db::RateRepository;
use portledger_db::repositories::rate::{CreateRateRuleInput, RateFilter};
use portledger_shared::types::{PageRequest, PageResponse};

use crate::middleware::Actor;
use crate::routes::{error_response, forbidden};
use crate::AppState;

/// Creates the rate rule routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/equipment-rates", post(create_rate))
        .route("/equipment-rates", get(list_rates))
}

/// Request body for creating a rate rule.
#[derive(Debug, Deserialize)]
pub struct CreateRateRequest {
    /// The counterparty.
    pub party_id: Uuid,
    /// The vehicle type.
    pub vehicle_type_id: Uuid,
    /// The work type.
    pub work_type_id: Uuid,
    /// Billing contract type.
    pub contract_type: String,
    /// The unit rate.
    pub rate: Decimal,
    /// First date the rate applies.
    pub effective_date: NaiveDate,
}

/// Query parameters for listing rate rules.
#[derive(Debug, Deserialize)]
pub struct ListRatesQuery {
    /// Restrict to one counterparty.
    pub party_id: Option<Uuid>,
    /// Restrict to one contract type.
    pub contract_type: Option<String>,
    /// Include inactive rules.
    #[serde(default)]
    pub include_inactive: bool,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub per_page: Option<u32>,
}

impl ListRatesQuery {
    fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

async fn create_rate(
    State(state): State<AppState>,
    actor: Actor,
    Json(body): Json<CreateRateRequest>,
) -> Response {
    if !actor.role.can(Capability::ConfigureRates) {
        return forbidden(Capability::ConfigureRates.as_str());
    }

    let Some(contract_type) = ContractType::parse(&body.contract_type) else {
        return error_response(
            400,
            "VALIDATION_ERROR",
            format!("Unknown contract type {}", body.contract_type),
        );
    };

    let input = CreateRateRuleInput {
        party_id: body.party_id,
        vehicle_type_id: body.vehicle_type_id,
        work_type_id: body.work_type_id,
        contract_type,
        rate: body.rate,
        effective_date: body.effective_date,
        created_by: actor.id,
    };

    let rates = RateRepository::new(state.db.clone());
    match rates.create(input).await {
        Ok(model) => (StatusCode::CREATED, Json(model)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}

async fn list_rates(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<ListRatesQuery>,
) -> Response {
    if !actor.role.can(Capability::ConfigureRates) {
        return forbidden(Capability::ConfigureRates.as_str());
    }

    let contract_type = match query.contract_type.as_deref() {
        None => None,
        Some(s) => match ContractType::parse(s) {
            Some(contract) => Some(contract),
            None => {
                return error_response(
                    400,
                    "VALIDATION_ERROR",
                    format!("Unknown contract type {s}"),
                );
            }
        },
    };

    let filter = RateFilter {
        party_id: query.party_id,
        contract_type,
        include_inactive: query.include_inactive,
    };

    let page = query.page_request();
    let rates = RateRepository::new(state.db.clone());
    match rates.list(&filter, &page).await {
        Ok((items, total)) => Json(PageResponse::new(items, &page, total)).into_response(),
        Err(e) => error_response(e.status_code(), e.error_code(), e),
    }
}
