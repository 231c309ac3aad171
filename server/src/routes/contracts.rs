use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use entity::contract::{ContractRequest, ContractStatus};
use entity::reference::categories;
use entity::user::Role;
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid, sanitize_optional};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).delete(remove))
        .route("/{id}/issue", post(issue))
        .route("/{id}/reject", post(reject))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    employee_id: Option<String>,
    status: Option<ContractStatus>,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ContractRequest>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state.store.contract_requests.filter(|request| {
        employee_id.is_none_or(|id| request.employee_id == id)
            && query.status.is_none_or(|s| request.status == s)
    });
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractPayload {
    employee_id: String,
    contract_type_id: String,
    #[serde(default = "default_copies")]
    copies: u32,
    notes: Option<String>,
}

fn default_copies() -> u32 {
    1
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<ContractPayload>,
) -> ApiResult<(StatusCode, Json<ContractRequest>)> {
    let mut errors = FieldErrors::new();
    if payload.copies == 0 {
        errors.push("copies", "must be at least 1");
    }
    if payload.copies > 10 {
        errors.push("copies", "must be at most 10");
    }
    errors.into_result()?;

    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    let contract_type_id = parse_uuid("contractTypeId", &payload.contract_type_id)?;
    let known = state.store.reference_types.any(|r| {
        r.id == contract_type_id && r.category == categories::CONTRACT_TYPE && r.is_active
    });
    if !known {
        return Err(ApiError::invalid("contractTypeId", "unknown contract type"));
    }

    let now = Utc::now();
    let request = state.store.contract_requests.insert(ContractRequest {
        id: Uuid::new_v4(),
        employee_id,
        contract_type_id,
        copies: payload.copies,
        notes: sanitize_optional(payload.notes),
        status: ContractStatus::Pending,
        decided_by: None,
        decided_at: None,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(request)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ContractRequest>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .contract_requests
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("contract request"))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    let current = state
        .store
        .contract_requests
        .get(id)
        .ok_or(ApiError::NotFound("contract request"))?;
    if current.status != ContractStatus::Pending {
        return Err(ApiError::bad_request(
            "only pending contract requests can be deleted",
        ));
    }
    state.store.contract_requests.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn issue(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ContractRequest>> {
    decide(&state, &user, &id, ContractStatus::Issued)
}

async fn reject(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ContractRequest>> {
    decide(&state, &user, &id, ContractStatus::Rejected)
}

fn decide(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
    verdict: ContractStatus,
) -> ApiResult<Json<ContractRequest>> {
    user.require(Role::Supervisor)?;
    let id = parse_uuid("id", raw_id)?;
    let current = state
        .store
        .contract_requests
        .get(id)
        .ok_or(ApiError::NotFound("contract request"))?;
    if current.status != ContractStatus::Pending {
        return Err(ApiError::bad_request("contract request is not pending"));
    }
    let updated = state
        .store
        .contract_requests
        .update(id, |request| {
            request.status = verdict;
            request.decided_by = Some(user.user_id);
            request.decided_at = Some(Utc::now());
            request.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("contract request"))?;
    Ok(Json(updated))
}
