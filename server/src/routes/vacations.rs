use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use entity::leave::{Vacation, VacationStatus, span_days};
use entity::user::Role;
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/summary", get(summary))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/start", post(start))
        .route("/{id}/cancel", post(cancel))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    employee_id: Option<String>,
    status: Option<VacationStatus>,
}

impl ListQuery {
    fn matches(&self, employee_id: Option<Uuid>, vacation: &Vacation) -> bool {
        employee_id.is_none_or(|id| vacation.employee_id == id)
            && self.status.is_none_or(|s| vacation.status == s)
    }
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Vacation>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .vacations
        .filter(|vacation| query.matches(employee_id, vacation));
    rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VacationPayload {
    employee_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl VacationPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.end_date < self.start_date {
            errors.push("endDate", "must not precede the start date");
        }
        errors.into_result()
    }
}

/// Overlapping vacations for one employee are a data-entry mistake.
fn overlaps(state: &AppState, payload: &VacationPayload, employee_id: Uuid, skip: Option<Uuid>) -> bool {
    state.store.vacations.any(|v| {
        v.employee_id == employee_id
            && Some(v.id) != skip
            && v.status != VacationStatus::Canceled
            && v.start_date <= payload.end_date
            && v.end_date >= payload.start_date
    })
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<VacationPayload>,
) -> ApiResult<(StatusCode, Json<Vacation>)> {
    payload.validate()?;
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    if overlaps(&state, &payload, employee_id, None) {
        return Err(ApiError::invalid(
            "startDate",
            "overlaps an existing vacation",
        ));
    }
    let now = Utc::now();
    let vacation = state.store.vacations.insert(Vacation {
        id: Uuid::new_v4(),
        employee_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        days: span_days(payload.start_date, payload.end_date),
        status: VacationStatus::Planned,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(vacation)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vacation>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .vacations
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("vacation"))
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<VacationPayload>,
) -> ApiResult<Json<Vacation>> {
    let id = parse_uuid("id", &id)?;
    payload.validate()?;
    let current = state
        .store
        .vacations
        .get(id)
        .ok_or(ApiError::NotFound("vacation"))?;
    if current.status != VacationStatus::Planned {
        return Err(ApiError::bad_request("only planned vacations can be edited"));
    }
    if overlaps(&state, &payload, current.employee_id, Some(id)) {
        return Err(ApiError::invalid(
            "startDate",
            "overlaps an existing vacation",
        ));
    }
    let updated = state
        .store
        .vacations
        .update(id, |vacation| {
            vacation.start_date = payload.start_date;
            vacation.end_date = payload.end_date;
            vacation.days = span_days(payload.start_date, payload.end_date);
            vacation.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("vacation"))?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    let current = state
        .store
        .vacations
        .get(id)
        .ok_or(ApiError::NotFound("vacation"))?;
    if current.status != VacationStatus::Planned {
        return Err(ApiError::bad_request(
            "only planned vacations can be deleted",
        ));
    }
    state.store.vacations.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn start(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vacation>> {
    transition(&state, &user, &id, VacationStatus::InProgress)
}

async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vacation>> {
    transition(&state, &user, &id, VacationStatus::Canceled)
}

fn transition(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
    target: VacationStatus,
) -> ApiResult<Json<Vacation>> {
    user.require(Role::Supervisor)?;
    let id = parse_uuid("id", raw_id)?;
    let current = state
        .store
        .vacations
        .get(id)
        .ok_or(ApiError::NotFound("vacation"))?;
    if current.status != VacationStatus::Planned {
        return Err(ApiError::bad_request("vacation is not planned"));
    }
    let updated = state
        .store
        .vacations
        .update(id, |vacation| {
            vacation.status = target;
            vacation.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("vacation"))?;
    Ok(Json(updated))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VacationSummary {
    planned: usize,
    in_progress: usize,
    canceled: usize,
    total: usize,
}

async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<VacationSummary>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let rows = state
        .store
        .vacations
        .filter(|vacation| query.matches(employee_id, vacation));
    let count = |status: VacationStatus| rows.iter().filter(|v| v.status == status).count();
    Ok(Json(VacationSummary {
        planned: count(VacationStatus::Planned),
        in_progress: count(VacationStatus::InProgress),
        canceled: count(VacationStatus::Canceled),
        total: rows.len(),
    }))
}
