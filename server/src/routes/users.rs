use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use entity::user::{Role, User};
use platform_api::{ApiError, ApiResult, FieldErrors};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::parse_uuid;
use crate::auth::{self, CurrentUser};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

/// Response shape for user records; the password hash never leaves the store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            roles: user.roles,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

async fn list(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<UserView>>> {
    user.require(Role::Admin)?;
    let mut rows = state.store.users.all();
    rows.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(Json(rows.into_iter().map(UserView::from).collect()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUser {
    email: String,
    display_name: String,
    password: Option<String>,
    roles: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedUser {
    user: UserView,
    /// Present only when no password was supplied; shown exactly once.
    temporary_password: Option<String>,
}

fn parse_roles(raw: &Option<Vec<String>>, errors: &mut FieldErrors) -> Vec<Role> {
    let Some(raw) = raw else {
        return vec![Role::Employee];
    };
    if raw.is_empty() {
        errors.push("roles", "must name at least one role");
        return Vec::new();
    }
    let mut roles = Vec::new();
    for value in raw {
        match Role::from_str(value) {
            Some(role) if !roles.contains(&role) => roles.push(role),
            Some(_) => {}
            None => errors.push("roles", format!("unknown role {value:?}")),
        }
    }
    roles
}

async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateUser>,
) -> ApiResult<(StatusCode, Json<CreatedUser>)> {
    user.require(Role::Admin)?;
    let mut errors = FieldErrors::new();
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        errors.push("email", "must be a valid email address");
    }
    if payload.display_name.trim().is_empty() {
        errors.push("displayName", "must not be empty");
    }
    if let Some(password) = &payload.password {
        if password.len() < 8 {
            errors.push("password", "must be at least 8 characters");
        }
    }
    let roles = parse_roles(&payload.roles, &mut errors);
    errors.into_result()?;

    if state.store.users.any(|u| u.email == email) {
        return Err(ApiError::invalid("email", "already registered"));
    }

    let (password, temporary) = match payload.password {
        Some(password) => (password, None),
        None => {
            let generated = auth::generate_password();
            (generated.clone(), Some(generated))
        }
    };
    let now = Utc::now();
    let created = state.store.users.insert(User {
        id: Uuid::new_v4(),
        email,
        display_name: payload.display_name.trim().to_string(),
        password_hash: auth::hash_password(&password)?,
        roles,
        is_active: true,
        created_at: now,
        updated_at: now,
    });
    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            user: created.into(),
            temporary_password: temporary,
        }),
    ))
}

async fn fetch(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    user.require(Role::Admin)?;
    let id = parse_uuid("id", &id)?;
    state
        .store
        .users
        .get(id)
        .map(|u| Json(UserView::from(u)))
        .ok_or(ApiError::NotFound("user"))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUser {
    display_name: String,
    roles: Option<Vec<String>>,
    is_active: Option<bool>,
    password: Option<String>,
}

/// True when removing admin rights (or the whole account) would leave no
/// active admin behind.
fn would_orphan_admins(state: &AppState, target: &User, keeps_admin: bool) -> bool {
    let target_is_admin = target.is_active && target.has_role(Role::Admin);
    if !target_is_admin || keeps_admin {
        return false;
    }
    !state
        .store
        .users
        .any(|u| u.id != target.id && u.is_active && u.has_role(Role::Admin))
}

async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUser>,
) -> ApiResult<Json<UserView>> {
    user.require(Role::Admin)?;
    let id = parse_uuid("id", &id)?;
    let current = state.store.users.get(id).ok_or(ApiError::NotFound("user"))?;

    let mut errors = FieldErrors::new();
    if payload.display_name.trim().is_empty() {
        errors.push("displayName", "must not be empty");
    }
    if let Some(password) = &payload.password {
        if password.len() < 8 {
            errors.push("password", "must be at least 8 characters");
        }
    }
    let roles = match &payload.roles {
        Some(_) => parse_roles(&payload.roles, &mut errors),
        None => current.roles.clone(),
    };
    errors.into_result()?;

    let stays_active = payload.is_active.unwrap_or(current.is_active);
    let keeps_admin = stays_active && roles.iter().any(|r| r.level() >= Role::Admin.level());
    if would_orphan_admins(&state, &current, keeps_admin) {
        return Err(ApiError::bad_request("cannot remove the last active admin"));
    }

    let password_hash = match &payload.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };
    let updated = state
        .store
        .users
        .update(id, |u| {
            u.display_name = payload.display_name.trim().to_string();
            u.roles = roles.clone();
            u.is_active = stays_active;
            if let Some(hash) = &password_hash {
                u.password_hash = hash.clone();
            }
            u.updated_at = Utc::now();
        })
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(updated.into()))
}

async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require(Role::Admin)?;
    let id = parse_uuid("id", &id)?;
    let current = state.store.users.get(id).ok_or(ApiError::NotFound("user"))?;
    if would_orphan_admins(&state, &current, false) {
        return Err(ApiError::bad_request("cannot remove the last active admin"));
    }
    state.store.users.remove(id);
    Ok(StatusCode::NO_CONTENT)
}
