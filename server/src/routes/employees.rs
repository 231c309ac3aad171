use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use entity::employee::Employee;
use entity::schedule::{Schedule, ScheduleAssignment};
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{parse_uuid, sanitize_optional};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/schedule", get(active_schedule).post(replace_schedule))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    department: Option<String>,
    active: Option<bool>,
    q: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Employee>>> {
    let department = sanitize_optional(query.department);
    let needle = sanitize_optional(query.q).map(|q| q.to_lowercase());
    let mut rows = state.store.employees.filter(|employee| {
        department
            .as_ref()
            .is_none_or(|d| employee.department.eq_ignore_ascii_case(d))
            && query.active.is_none_or(|active| employee.is_active == active)
            && needle.as_ref().is_none_or(|needle| {
                employee.employee_number.to_lowercase().contains(needle)
                    || employee.job_title.to_lowercase().contains(needle)
            })
    });
    rows.sort_by(|a, b| a.employee_number.cmp(&b.employee_number));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEmployee {
    person_id: String,
    employee_number: String,
    department: String,
    job_title: String,
    hire_date: NaiveDate,
    termination_date: Option<NaiveDate>,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.employee_number.trim().is_empty() {
            errors.push("employeeNumber", "must not be empty");
        }
        if self.department.trim().is_empty() {
            errors.push("department", "must not be empty");
        }
        if self.job_title.trim().is_empty() {
            errors.push("jobTitle", "must not be empty");
        }
        if let Some(end) = self.termination_date {
            if end < self.hire_date {
                errors.push("terminationDate", "must not precede the hire date");
            }
        }
        errors.into_result()
    }
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CreateEmployee>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    payload.validate()?;
    let person_id = parse_uuid("personId", &payload.person_id)?;
    if state.store.persons.get(person_id).is_none() {
        return Err(ApiError::invalid("personId", "unknown person"));
    }
    let number = payload.employee_number.trim().to_string();
    if state.store.employees.any(|e| e.employee_number == number) {
        return Err(ApiError::invalid("employeeNumber", "already in use"));
    }
    let now = Utc::now();
    let employee = state.store.employees.insert(Employee {
        id: Uuid::new_v4(),
        person_id,
        employee_number: number,
        department: payload.department.trim().to_string(),
        job_title: payload.job_title.trim().to_string(),
        hire_date: payload.hire_date,
        termination_date: payload.termination_date,
        is_active: payload.termination_date.is_none(),
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .employees
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("employee"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateEmployee {
    department: String,
    job_title: String,
    termination_date: Option<NaiveDate>,
    is_active: Option<bool>,
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEmployee>,
) -> ApiResult<Json<Employee>> {
    let id = parse_uuid("id", &id)?;
    let current = state
        .store
        .employees
        .get(id)
        .ok_or(ApiError::NotFound("employee"))?;

    let mut errors = FieldErrors::new();
    if payload.department.trim().is_empty() {
        errors.push("department", "must not be empty");
    }
    if payload.job_title.trim().is_empty() {
        errors.push("jobTitle", "must not be empty");
    }
    if let Some(end) = payload.termination_date {
        if end < current.hire_date {
            errors.push("terminationDate", "must not precede the hire date");
        }
    }
    errors.into_result()?;

    let updated = state
        .store
        .employees
        .update(id, |employee| {
            employee.department = payload.department.trim().to_string();
            employee.job_title = payload.job_title.trim().to_string();
            employee.termination_date = payload.termination_date;
            employee.is_active = payload
                .is_active
                .unwrap_or(payload.termination_date.is_none());
            employee.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("employee"))?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    let referenced = state.store.assignments.any(|a| a.employee_id == id)
        || state.store.punches.any(|p| p.employee_id == id)
        || state.store.permissions.any(|p| p.employee_id == id)
        || state.store.vacations.any(|v| v.employee_id == id)
        || state.store.payrolls.any(|p| p.employee_id == id);
    if referenced {
        return Err(ApiError::bad_request(
            "employee has history records; deactivate instead of deleting",
        ));
    }
    state
        .store
        .employees
        .remove(id)
        .ok_or(ApiError::NotFound("employee"))?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleQuery {
    date: Option<NaiveDate>,
}

/// The assignment (and its schedule) covering the requested date.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActiveSchedule {
    assignment: ScheduleAssignment,
    schedule: Schedule,
}

async fn active_schedule(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Json<ActiveSchedule>> {
    let id = parse_uuid("id", &id)?;
    if state.store.employees.get(id).is_none() {
        return Err(ApiError::NotFound("employee"));
    }
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let assignment = state
        .store
        .active_assignment(id, date)
        .ok_or(ApiError::NotFound("schedule assignment"))?;
    let schedule = state
        .store
        .schedules
        .get(assignment.schedule_id)
        .ok_or(ApiError::NotFound("schedule"))?;
    Ok(Json(ActiveSchedule {
        assignment,
        schedule,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceSchedule {
    schedule_id: String,
}

/// Replacement workflow: close the active assignment at today, open the new
/// one tomorrow.
async fn replace_schedule(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<ReplaceSchedule>,
) -> ApiResult<(StatusCode, Json<ScheduleAssignment>)> {
    let id = parse_uuid("id", &id)?;
    let schedule_id = parse_uuid("scheduleId", &payload.schedule_id)?;
    if state.store.employees.get(id).is_none() {
        return Err(ApiError::NotFound("employee"));
    }
    if state.store.schedules.get(schedule_id).is_none() {
        return Err(ApiError::invalid("scheduleId", "unknown schedule"));
    }
    let today = Utc::now().date_naive();
    let assignment = state.store.replace_schedule(id, schedule_id, today);
    Ok((StatusCode::CREATED, Json(assignment)))
}
