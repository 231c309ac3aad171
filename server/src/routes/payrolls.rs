use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use entity::payroll::Payroll;
use entity::user::Role;
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/issue", post(issue))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    employee_id: Option<String>,
    year: Option<i32>,
    month: Option<u32>,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Payroll>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state.store.payrolls.filter(|payroll| {
        employee_id.is_none_or(|id| payroll.employee_id == id)
            && query.year.is_none_or(|year| payroll.year == year)
            && query.month.is_none_or(|month| payroll.month == month)
    });
    rows.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayrollPayload {
    employee_id: String,
    year: i32,
    month: u32,
    gross_cents: i64,
    deductions_cents: i64,
}

impl PayrollPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if !(1..=12).contains(&self.month) {
            errors.push("month", "must be between 1 and 12");
        }
        if !(2000..=2100).contains(&self.year) {
            errors.push("year", "must be between 2000 and 2100");
        }
        if self.gross_cents < 0 {
            errors.push("grossCents", "must not be negative");
        }
        if self.deductions_cents < 0 {
            errors.push("deductionsCents", "must not be negative");
        } else if self.deductions_cents > self.gross_cents {
            errors.push("deductionsCents", "must not exceed the gross amount");
        }
        errors.into_result()
    }
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<PayrollPayload>,
) -> ApiResult<(StatusCode, Json<Payroll>)> {
    user.require(Role::HrManager)?;
    payload.validate()?;
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    let duplicate = state.store.payrolls.any(|p| {
        p.employee_id == employee_id && p.year == payload.year && p.month == payload.month
    });
    if duplicate {
        return Err(ApiError::invalid(
            "month",
            "payroll already exists for this period",
        ));
    }
    let now = Utc::now();
    let payroll = state.store.payrolls.insert(Payroll {
        id: Uuid::new_v4(),
        employee_id,
        year: payload.year,
        month: payload.month,
        gross_cents: payload.gross_cents,
        deductions_cents: payload.deductions_cents,
        net_cents: payload.gross_cents - payload.deductions_cents,
        issued_at: None,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(payroll)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Payroll>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .payrolls
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("payroll"))
}

fn fetch_unissued(state: &AppState, id: Uuid) -> Result<Payroll, ApiError> {
    let payroll = state
        .store
        .payrolls
        .get(id)
        .ok_or(ApiError::NotFound("payroll"))?;
    if payroll.issued_at.is_some() {
        return Err(ApiError::bad_request("payroll has already been issued"));
    }
    Ok(payroll)
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PayrollPayload>,
) -> ApiResult<Json<Payroll>> {
    user.require(Role::HrManager)?;
    let id = parse_uuid("id", &id)?;
    payload.validate()?;
    let current = fetch_unissued(&state, id)?;
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if employee_id != current.employee_id {
        return Err(ApiError::invalid("employeeId", "cannot be reassigned"));
    }
    let duplicate = state.store.payrolls.any(|p| {
        p.id != id
            && p.employee_id == employee_id
            && p.year == payload.year
            && p.month == payload.month
    });
    if duplicate {
        return Err(ApiError::invalid(
            "month",
            "payroll already exists for this period",
        ));
    }
    let updated = state
        .store
        .payrolls
        .update(id, |payroll| {
            payroll.year = payload.year;
            payroll.month = payload.month;
            payroll.gross_cents = payload.gross_cents;
            payroll.deductions_cents = payload.deductions_cents;
            payroll.net_cents = payload.gross_cents - payload.deductions_cents;
            payroll.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("payroll"))?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require(Role::HrManager)?;
    let id = parse_uuid("id", &id)?;
    fetch_unissued(&state, id)?;
    state.store.payrolls.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Payroll>> {
    user.require(Role::HrManager)?;
    let id = parse_uuid("id", &id)?;
    fetch_unissued(&state, id)?;
    let updated = state
        .store
        .payrolls
        .update(id, |payroll| {
            payroll.issued_at = Some(Utc::now());
            payroll.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("payroll"))?;
    Ok(Json(updated))
}
