use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get},
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::attendance::{AttendancePunch, PunchDirection};
use platform_api::{ApiError, ApiResult};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_optional_uuid, parse_uuid, sanitize_optional};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/export", get(export_csv))
        .route("/{id}", delete(remove))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PunchQuery {
    employee_id: Option<String>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
}

impl PunchQuery {
    fn matches(&self, employee_id: Option<Uuid>, punch: &AttendancePunch) -> bool {
        let day = punch.punched_at.date_naive();
        employee_id.is_none_or(|id| punch.employee_id == id)
            && self.from.is_none_or(|from| day >= from)
            && self.to.is_none_or(|to| day <= to)
    }
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<PunchQuery>,
) -> ApiResult<Json<Vec<AttendancePunch>>> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .punches
        .filter(|punch| query.matches(employee_id, punch));
    rows.sort_by(|a, b| b.punched_at.cmp(&a.punched_at));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePunch {
    employee_id: String,
    direction: PunchDirection,
    punched_at: Option<DateTime<Utc>>,
    source: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<CreatePunch>,
) -> ApiResult<(StatusCode, Json<AttendancePunch>)> {
    let employee_id = parse_uuid("employeeId", &payload.employee_id)?;
    if state.store.employees.get(employee_id).is_none() {
        return Err(ApiError::invalid("employeeId", "unknown employee"));
    }
    let now = Utc::now();
    let punch = state.store.punches.insert(AttendancePunch {
        id: Uuid::new_v4(),
        employee_id,
        punched_at: payload.punched_at.unwrap_or(now),
        direction: payload.direction,
        source: sanitize_optional(payload.source),
        created_at: now,
    });
    Ok((StatusCode::CREATED, Json(punch)))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .punches
        .remove(id)
        .ok_or(ApiError::NotFound("attendance punch"))?;
    Ok(StatusCode::NO_CONTENT)
}

/// CSV dump of the filtered punch list, oldest first. Employee names resolve
/// through the person record; punches of deleted employees fall back to the
/// raw id.
async fn export_csv(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<PunchQuery>,
) -> ApiResult<impl IntoResponse> {
    let employee_id = parse_optional_uuid("employeeId", &query.employee_id)?;
    let mut rows = state
        .store
        .punches
        .filter(|punch| query.matches(employee_id, punch));
    rows.sort_by(|a, b| a.punched_at.cmp(&b.punched_at));

    let mut csv = String::from("employeeNumber,employeeName,punchedAt,direction,source\n");
    for punch in &rows {
        let employee = state.store.employees.get(punch.employee_id);
        let number = employee
            .as_ref()
            .map(|e| e.employee_number.clone())
            .unwrap_or_else(|| punch.employee_id.to_string());
        let name = employee
            .and_then(|e| state.store.persons.get(e.person_id))
            .map(|p| p.full_name())
            .unwrap_or_default();
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&number),
            csv_field(&name),
            punch.punched_at.to_rfc3339(),
            punch.direction.as_str(),
            csv_field(punch.source.as_deref().unwrap_or("")),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"attendance.csv\"",
            ),
        ],
        csv,
    ))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_field_quotes_only_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
