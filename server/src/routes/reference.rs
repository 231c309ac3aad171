use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::Utc;
use entity::reference::ReferenceType;
use entity::user::Role;
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
#[serde(rename_all = "camelCase")]
struct ListQuery {
    category: Option<String>,
    #[serde(default)]
    active_only: bool,
}

async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<ReferenceType>>> {
    let category = sanitize_optional(query.category);
    let mut rows = state.store.reference_types.filter(|row| {
        category
            .as_ref()
            .is_none_or(|c| row.category.eq_ignore_ascii_case(c))
            && (!query.active_only || row.is_active)
    });
    rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
    Ok(Json(rows))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateReference {
    category: String,
    name: String,
    #[serde(default = "default_active")]
    is_active: bool,
}

fn default_active() -> bool {
    true
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateReference>,
) -> ApiResult<(StatusCode, Json<ReferenceType>)> {
    user.require(Role::Admin)?;
    let mut errors = FieldErrors::new();
    if payload.category.trim().is_empty() {
        errors.push("category", "must not be empty");
    }
    if payload.name.trim().is_empty() {
        errors.push("name", "must not be empty");
    }
    errors.into_result()?;

    let category = payload.category.trim().to_string();
    let name = payload.name.trim().to_string();
    let duplicate = state.store.reference_types.any(|row| {
        row.category.eq_ignore_ascii_case(&category) && row.name.eq_ignore_ascii_case(&name)
    });
    if duplicate {
        return Err(ApiError::invalid("name", "already exists in this category"));
    }

    let now = Utc::now();
    let row = state.store.reference_types.insert(ReferenceType {
        id: Uuid::new_v4(),
        category,
        name,
        is_active: payload.is_active,
        created_at: now,
        updated_at: now,
    });
    Ok((StatusCode::CREATED, Json(row)))
}

async fn fetch(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ReferenceType>> {
    let id = parse_uuid("id", &id)?;
    state
        .store
        .reference_types
        .get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("reference type"))
}

/// Category is part of the row's identity and stays fixed; rename or
/// deactivate instead.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateReference {
    name: String,
    is_active: bool,
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReference>,
) -> ApiResult<Json<ReferenceType>> {
    user.require(Role::Admin)?;
    let id = parse_uuid("id", &id)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::invalid("name", "must not be empty"));
    }
    let current = state
        .store
        .reference_types
        .get(id)
        .ok_or(ApiError::NotFound("reference type"))?;
    let name = payload.name.trim().to_string();
    let duplicate = state.store.reference_types.any(|row| {
        row.id != id
            && row.category.eq_ignore_ascii_case(&current.category)
            && row.name.eq_ignore_ascii_case(&name)
    });
    if duplicate {
        return Err(ApiError::invalid("name", "already exists in this category"));
    }
    let updated = state
        .store
        .reference_types
        .update(id, |row| {
            row.name = name.clone();
            row.is_active = payload.is_active;
            row.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("reference type"))?;
    Ok(Json(updated))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require(Role::Admin)?;
    let id = parse_uuid("id", &id)?;
    let referenced = state.store.permissions.any(|p| p.kind_id == id)
        || state.store.contract_requests.any(|c| c.contract_type_id == id);
    if referenced {
        return Err(ApiError::bad_request(
            "reference type is in use; deactivate it instead",
        ));
    }
    state
        .store
        .reference_types
        .remove(id)
        .ok_or(ApiError::NotFound("reference type"))?;
    Ok(StatusCode::NO_CONTENT)
}
