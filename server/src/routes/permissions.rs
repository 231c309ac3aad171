use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveTime, Utc};
use entity::leave::{Permission, PermissionStatus};
use entity::reference::categories;
use entity::user::Role;
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid, sanitize_optional};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/summary", get(summary))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/approve", post(approve))
        .route("/{id}/reject", post(reject))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    employee_id: Option<String>,
    status: Option<PermissionStatus>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl ListQuery {
    fn matches(&self, employee_id: Option<Uuid>, permission: &Permission) -> bool {
        employee_id.is_none_or(|id| permission.employee_id == id)
            && self.status.is_none_or(|s| permission.status == s)
            && self.from.is_none_or(|from| permission.date >= from)
            && self.to.is_none_or(|to| permission.date <= to)
    }
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Permission>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .permissions
        .filter(|permission| query.matches(employee_id, permission));
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionPayload {
    employee_id: String,
    kind_id: String,
    date: NaiveDate,
    start_time: Option<NaiveTime>,
    end_time: Option<NaiveTime>,
    reason: Option<String>,
}

impl PermissionPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end <= start {
                errors.push("endTime", "must be after the start time");
            }
        }
        errors.into_result()
    }
}

fn resolve_kind(state: &AppState, raw: &str) -> Result<Uuid, ApiError> {
    let kind_id = parse_uuid("kindId", raw)?;
    let known = state.store.reference_types.any(|r| {
        r.id == kind_id && r.category == categories::PERMISSION_KIND && r.is_active
    });
    if known {
        Ok(kind_id)
    } else {
        Err(ApiError::invalid("kindId", "unknown permission kind"))
    }
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<PermissionPayload>,
) -> ApiResult<(StatusCode, Json<Permission>)> {
    payload.validate()?;
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    let kind_id = resolve_kind(&state, &payload.kind_id)?;
    let now = Utc::now();
    let permission = state.store.permissions.insert(Permission {
        id: Uuid::new_v4(),
        employee_id,
        kind_id,
        date: payload.date,
        start_time: payload.start_time,
        end_time: payload.end_time,
        reason: sanitize_optional(payload.reason),
        status: PermissionStatus::Pending,
        decided_by: None,
        decided_at: None,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(permission)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Permission>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .permissions
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("permission"))
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PermissionPayload>,
) -> ApiResult<Json<Permission>> {
    let id = parse_uuid("id", &id)?;
    payload.validate()?;
    let current = state
        .store
        .permissions
        .get(id)
        .ok_or(ApiError::NotFound("permission"))?;
    if current.status != PermissionStatus::Pending {
        return Err(ApiError::bad_request(
            "only pending permissions can be edited",
        ));
    }
    let kind_id = resolve_kind(&state, &payload.kind_id)?;
    let updated = state
        .store
        .permissions
        .update(id, |permission| {
            permission.kind_id = kind_id;
            permission.date = payload.date;
            permission.start_time = payload.start_time;
            permission.end_time = payload.end_time;
            permission.reason = sanitize_optional(payload.reason.clone());
            permission.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("permission"))?;
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
        .permissions
        .get(id)
        .ok_or(ApiError::NotFound("permission"))?;
    if current.status != PermissionStatus::Pending {
        return Err(ApiError::bad_request(
            "only pending permissions can be deleted",
        ));
    }
    state.store.permissions.remove(id);
    Ok(StatusCode::NO_CONTENT)
}

async fn approve(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Permission>> {
    decide(&state, &user, &id, PermissionStatus::Approved)
}

async fn reject(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Permission>> {
    decide(&state, &user, &id, PermissionStatus::Rejected)
}

/// Pending is the only state a decision can leave from; repeat decisions are
/// a 400, not an overwrite.
fn decide(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
    verdict: PermissionStatus,
) -> ApiResult<Json<Permission>> {
    user.require(Role::Supervisor)?;
    let id = parse_uuid("id", raw_id)?;
    let current = state
        .store
        .permissions
        .get(id)
        .ok_or(ApiError::NotFound("permission"))?;
    if current.status != PermissionStatus::Pending {
        return Err(ApiError::bad_request("permission is not pending"));
    }
    let updated = state
        .store
        .permissions
        .update(id, |permission| {
            permission.status = verdict;
            permission.decided_by = Some(user.user_id);
            permission.decided_at = Some(Utc::now());
            permission.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("permission"))?;
    Ok(Json(updated))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionSummary {
    pending: usize,
    approved: usize,
    rejected: usize,
    total: usize,
}

async fn summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PermissionSummary>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let rows = state
        .store
        .permissions
        .filter(|permission| query.matches(employee_id, permission));
    let count = |status: PermissionStatus| rows.iter().filter(|p| p.status == status).count();
    Ok(Json(PermissionSummary {
        pending: count(PermissionStatus::Pending),
        approved: count(PermissionStatus::Approved),
        rejected: count(PermissionStatus::Rejected),
        total: rows.len(),
    }))
}
