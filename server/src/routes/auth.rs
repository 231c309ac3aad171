use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use platform_api::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use time::Duration as TimeDuration;

use super::users::UserView;
use crate::auth::{self, CurrentUser, SESSION_COOKIE};
use crate::http::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user: UserView,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> ApiResult<(CookieJar, Json<LoginResponse>)> {
    let email = payload.email.trim().to_lowercase();
    let user = state
        .store
        .users
        .find(|u| u.email == email)
        .filter(|u| u.is_active)
        .ok_or(ApiError::Unauthorized("invalid credentials"))?;
    if !auth::verify_password(&payload.password, &user.password_hash) {
        return Err(ApiError::Unauthorized("invalid credentials"));
    }

    let token = auth::issue_token(user.id, &user.roles, &state.auth)
        .map_err(|err| ApiError::internal(err.into()))?;
    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(state.auth.session_ttl_minutes))
        .build();
    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            user: user.into(),
        }),
    ))
}

async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());
    (jar, StatusCode::NO_CONTENT)
}

async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<UserView>> {
    state
        .store
        .users
        .get(user.user_id)
        .map(|u| Json(UserView::from(u)))
        .ok_or(ApiError::Unauthorized("user not found"))
}
