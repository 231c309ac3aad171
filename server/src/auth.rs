use anyhow::{Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use entity::user::{Role, User};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use platform_api::ApiError;
use platform_store::HrStore;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::http::AppState;

pub const SESSION_COOKIE: &str = "hr_session";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(
    user_id: Uuid,
    roles: &[Role],
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user_id,
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

/// The authenticated principal for a request. Roles come from the store, not
/// the token, so revocations take effect on the next request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r.level() >= role.level())
    }

    pub fn require(&self, role: Role) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| session_cookie(parts))
            .ok_or(ApiError::Unauthorized("login required"))?;
        let claims = decode_token(&token, &state.auth)
            .map_err(|_| ApiError::Unauthorized("invalid session"))?;
        let user = state
            .store
            .users
            .get(claims.sub)
            .filter(|user| user.is_active)
            .ok_or(ApiError::Unauthorized("user not found"))?;
        Ok(CurrentUser {
            user_id: user.id,
            roles: user.roles,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn session_cookie(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("password hashing failed: {err}"))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Ensures an admin account exists on a fresh store so the API is reachable.
pub fn bootstrap_admin(store: &HrStore, config: &AppConfig) -> Result<()> {
    if store.users.any(|user| user.is_active && user.has_role(Role::Admin)) {
        return Ok(());
    }
    let password = match &config.admin_password {
        Some(password) => password.clone(),
        None => {
            let generated = generate_password();
            warn!(
                email = %config.admin_email,
                password = %generated,
                "ADMIN_PASSWORD not set; generated a one-off bootstrap password"
            );
            generated
        }
    };
    let now = Utc::now();
    store.users.insert(User {
        id: Uuid::new_v4(),
        email: config.admin_email.clone(),
        display_name: "Administrator".to_string(),
        password_hash: hash_password(&password)?,
        roles: vec![Role::Admin],
        is_active: true,
        created_at: now,
        updated_at: now,
    });
    info!(email = %config.admin_email, "bootstrap admin user created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(verify_password("hunter2hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("hunter2hunter2", "not-a-phc-string"));
    }

    #[test]
    fn token_round_trip_carries_roles() {
        let config = AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            session_ttl_minutes: 60,
        };
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, &[Role::Supervisor], &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.roles, vec!["SUPERVISOR".to_string()]);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let config = AuthConfig {
            jwt_secret: "0123456789abcdef0123456789abcdef".into(),
            session_ttl_minutes: 60,
        };
        let other = AuthConfig {
            jwt_secret: "ffffffffffffffffffffffffffffffff".into(),
            session_ttl_minutes: 60,
        };
        let token = issue_token(Uuid::new_v4(), &[Role::Employee], &config).unwrap();
        assert!(decode_token(&token, &other).is_err());
    }
}
