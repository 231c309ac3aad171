use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use entity::certification::FinancialCertification;
use entity::user::Role;
use platform_api::{ApiError, ApiResult};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).delete(remove))
        .route("/{id}/issue", post(issue))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    employee_id: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<FinancialCertification>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .certifications
        .filter(|cert| employee_id.is_none_or(|id| cert.employee_id == id));
    rows.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CertificationPayload {
    employee_id: String,
    purpose: String,
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CertificationPayload>,
) -> ApiResult<(StatusCode, Json<FinancialCertification>)> {
    if payload.purpose.trim().is_empty() {
        return Err(ApiError::invalid("purpose", "must not be empty"));
    }
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    let now = Utc::now();
    let cert = state.store.certifications.insert(FinancialCertification {
        id: Uuid::new_v4(),
        employee_id,
        purpose: payload.purpose.trim().to_string(),
        requested_at: now,
        issued_at: None,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(cert)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FinancialCertification>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .certifications
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("certification"))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    let current = state
        .store
        .certifications
        .get(id)
        .ok_or(ApiError::NotFound("certification"))?;
    if current.issued_at.is_some() {
        return Err(ApiError::bad_request(
            "issued certifications cannot be deleted",
        ));
    }
    state.store.certifications.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<FinancialCertification>> {
    user.require(Role::Supervisor)?;
    let id = parse_uuid("id", &id)?;
    let current = state
        .store
        .certifications
        .get(id)
        .ok_or(ApiError::NotFound("certification"))?;
    if current.issued_at.is_some() {
        return Err(ApiError::bad_request(
            "certification has already been issued",
        ));
    }
    let updated = state
        .store
        .certifications
        .update(id, |cert| {
            cert.issued_at = Some(Utc::now());
            cert.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("certification"))?;
    Ok(Json(updated))
}
