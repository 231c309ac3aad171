use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDate, Utc};
use entity::person::Person;
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_uuid, sanitize_optional};
use crate::auth::CurrentUser;
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Deserialize)]
struct ListQuery {
    q: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Person>>> {
    let needle = sanitize_optional(query.q).map(|q| q.to_lowercase());
    let mut rows = state.store.persons.filter(|person| match &needle {
        None => true,
        Some(needle) => {
            person.first_name.to_lowercase().contains(needle)
                || person.last_name.to_lowercase().contains(needle)
                || person.national_id.to_lowercase().contains(needle)
        }
    });
    rows.sort_by(|a, b| {
        (&a.last_name, &a.first_name).cmp(&(&b.last_name, &b.first_name))
    });
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersonPayload {
    first_name: String,
    last_name: String,
    national_id: String,
    birth_date: NaiveDate,
    email: Option<String>,
    phone: Option<String>,
    address: Option<String>,
}

impl PersonPayload {
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        if self.first_name.trim().is_empty() {
            errors.push("firstName", "must not be empty");
        }
        if self.last_name.trim().is_empty() {
            errors.push("lastName", "must not be empty");
        }
        if self.national_id.trim().is_empty() {
            errors.push("nationalId", "must not be empty");
        }
        if self.birth_date >= Utc::now().date_naive() {
            errors.push("birthDate", "must be in the past");
        }
        if let Some(email) = &self.email {
            if !email.trim().is_empty() && !email.contains('@') {
                errors.push("email", "must be a valid email address");
            }
        }
        errors.into_result()
    }
}

async fn create(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(payload): Json<PersonPayload>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    payload.validate()?;
    let national_id = payload.national_id.trim().to_string();
    if state.store.persons.any(|p| p.national_id == national_id) {
        return Err(ApiError::invalid("nationalId", "already registered"));
    }
    let now = Utc::now();
    let person = state.store.persons.insert(Person {
        id: Uuid::new_v4(),
        first_name: payload.first_name.trim().to_string(),
        last_name: payload.last_name.trim().to_string(),
        national_id,
        birth_date: payload.birth_date,
        email: sanitize_optional(payload.email),
        phone: sanitize_optional(payload.phone),
        address: sanitize_optional(payload.address),
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(person)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Person>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .persons
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("person"))
}

async fn update(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PersonPayload>,
) -> ApiResult<Json<Person>> {
    let id = parse_uuid("id", &id)?;
    payload.validate()?;
    let national_id = payload.national_id.trim().to_string();
    if state
        .store
        .persons
        .any(|p| p.national_id == national_id && p.id != id)
    {
        return Err(ApiError::invalid("nationalId", "already registered"));
    }
    state
        .store
        .persons
        .update(id, |person| {
            person.first_name = payload.first_name.trim().to_string();
            person.last_name = payload.last_name.trim().to_string();
            person.national_id = national_id.clone();
            person.birth_date = payload.birth_date;
            person.email = sanitize_optional(payload.email.clone());
            person.phone = sanitize_optional(payload.phone.clone());
            person.address = sanitize_optional(payload.address.clone());
            person.updated_at = Utc::now();
        })
        .map(Json)
        .ok_or(ApiError::NotFound("person"))
}

async fn remove(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_uuid("id", &id)?;
    if state.store.employees.any(|e| e.person_id == id) {
        return Err(ApiError::bad_request(
            "person is referenced by an employee record",
        ));
    }
    state
        .store
        .persons
        .remove(id)
        .ok_or(ApiError::NotFound("person"))?;
    Ok(StatusCode::NO_CONTENT)
}
