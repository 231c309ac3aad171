use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveTime, Utc};
use entity::schedule::{Schedule, ScheduleAssignment};
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
}

/// Read-only assignment history, mounted at `/api/schedule-assignments`.
pub fn assignments_router() -> Router<AppState> {
    Router::new().route("/", get(list_assignments))
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Schedule>>> {
    let mut rows = state.store.schedules.all();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulePayload {
    name: String,
    start_time: NaiveTime,
    end_time: NaiveTime,
    work_days: Vec<u8>,
    #[serde(default)]
    tolerance_minutes: u32,
}

impl SchedulePayload {
    /// Overnight windows (end before start) are legal; zero-length ones are
    /// not.
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.push("name", "must not be empty");
        }
        if self.start_time == self.end_time {
            errors.push("endTime", "must differ from the start time");
        }
        if self.work_days.is_empty() {
            errors.push("workDays", "must name at least one weekday");
        }
        if self.work_days.iter().any(|day| !(1..=7).contains(day)) {
            errors.push("workDays", "weekdays are numbered 1 (Monday) to 7");
        }
        if self.tolerance_minutes > 120 {
            errors.push("toleranceMinutes", "must be at most 120");
        }
        errors.into_result()
    }

    fn normalized_days(&self) -> Vec<u8> {
        let mut days = self.work_days.clone();
        days.sort_unstable();
        days.dedup();
        days
    }
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<SchedulePayload>,
) -> ApiResult<(StatusCode, Json<Schedule>)> {
    payload.validate()?;
    let name = payload.name.trim().to_string();
    if state
        .store
        .schedules
        .any(|s| s.name.eq_ignore_ascii_case(&name))
    {
        return Err(ApiError::invalid("name", "already in use"));
    }
    let now = Utc::now();
    let schedule = state.store.schedules.insert(Schedule {
        id: Uuid::new_v4(),
        name,
        start_time: payload.start_time,
        end_time: payload.end_time,
        work_days: payload.normalized_days(),
        tolerance_minutes: payload.tolerance_minutes,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(schedule)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Schedule>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .schedules
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("schedule"))
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<SchedulePayload>,
) -> ApiResult<Json<Schedule>> {
    let id = parse_uuid("id", &id)?;
    payload.validate()?;
    let name = payload.name.trim().to_string();
    if state
        .store
        .schedules
        .any(|s| s.name.eq_ignore_ascii_case(&name) && s.id != id)
    {
        return Err(ApiError::invalid("name", "already in use"));
    }
    state
        .store
        .schedules
        .update(id, |schedule| {
            schedule.name = name.clone();
            schedule.start_time = payload.start_time;
            schedule.end_time = payload.end_time;
            schedule.work_days = payload.normalized_days();
            schedule.tolerance_minutes = payload.tolerance_minutes;
            schedule.updated_at = Utc::now();
        })
        .map(Json)
        .ok_or(ApiError::NotFound("schedule"))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    if state.store.assignments.any(|a| a.schedule_id == id) {
        return Err(ApiError::bad_request(
            "schedule is referenced by assignments",
        ));
    }
    state
        .store
        .schedules
        .remove(id)
        .ok_or(ApiError::NotFound("schedule"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentsQuery {
    employee_id: Option<String>,
}

async fn list_assignments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<AssignmentsQuery>,
) -> ApiResult<Json<Vec<ScheduleAssignment>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .assignments
        .filter(|a| employee_id.is_none_or(|id| a.employee_id == id));
    rows.sort_by(|a, b| b.start_date.cmp(&a.start_date));
    Ok(Json(rows))
}
