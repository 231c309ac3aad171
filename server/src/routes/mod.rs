//! REST surface: one module per resource, nested under `/api`.

pub mod attendance;
pub mod auth;
pub mod certifications;
pub mod contracts;
pub mod employees;
pub mod payrolls;
pub mod permissions;
pub mod persons;
pub mod reference;
pub mod schedules;
pub mod users;
pub mod vacations;

use axum::Router;
use platform_api::ApiError;
use uuid::Uuid;

use crate::http::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/persons", persons::router())
        .nest("/employees", employees::router())
        .nest("/schedules", schedules::router())
        .nest("/schedule-assignments", schedules::assignments_router())
        .nest("/attendance", attendance::router())
        .nest("/permissions", permissions::router())
        .nest("/vacations", vacations::router())
        .nest("/payrolls", payrolls::router())
        .nest("/contract-requests", contracts::router())
        .nest("/certifications", certifications::router())
        .nest("/reference-types", reference::router())
        .nest("/users", users::router())
}

/// Path and body ids arrive as strings; parse failures surface as field-level
/// validation errors so the failure body stays uniform.
pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(value.trim()).map_err(|_| ApiError::invalid(field, "must be a valid id"))
}

pub(crate) fn parse_optional_uuid(
    field: &str,
    value: &Option<String>,
) -> Result<Option<Uuid>, ApiError> {
    match value {
        Some(raw) => parse_uuid(field, raw).map(Some),
        None => Ok(None),
    }
}

/// Trims free-text inputs; whitespace-only strings collapse to `None`.
pub(crate) fn sanitize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
