use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use entity::user::{Role, User};
use http_body_util::BodyExt;
use platform_store::{HrStore, SeededHrRecords};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use server::auth::{self, AuthConfig};
use server::config::AppConfig;
use server::http::{AppState, build_router};

const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

pub struct TestEnv {
    pub router: Router,
    pub store: Arc<HrStore>,
    pub seeded: SeededHrRecords,
    pub admin_token: String,
    pub supervisor_token: String,
    pub employee_token: String,
}

pub fn test_env() -> TestEnv {
    let store = Arc::new(HrStore::new());
    let seeded = store.seed_demo();
    let auth_config = Arc::new(AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        session_ttl_minutes: 60,
    });

    let admin = insert_user(&store, "admin@example.test", &[Role::Admin]);
    let supervisor = insert_user(&store, "supervisor@example.test", &[Role::Supervisor]);
    let employee = insert_user(&store, "employee@example.test", &[Role::Employee]);
    let admin_token = auth::issue_token(admin.id, &admin.roles, &auth_config).unwrap();
    let supervisor_token =
        auth::issue_token(supervisor.id, &supervisor.roles, &auth_config).unwrap();
    let employee_token = auth::issue_token(employee.id, &employee.roles, &auth_config).unwrap();

    let config = Arc::new(AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        session_ttl_minutes: 60,
        cors_allowed_origins: Vec::new(),
        admin_email: "admin@example.test".to_string(),
        admin_password: None,
        seed_demo: false,
    });
    let state = AppState {
        store: store.clone(),
        auth: auth_config,
        config,
    };
    TestEnv {
        router: build_router(state),
        store,
        seeded,
        admin_token,
        supervisor_token,
        employee_token,
    }
}

pub fn insert_user(store: &HrStore, email: &str, roles: &[Role]) -> User {
    let now = Utc::now();
    store.users.insert(User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        password_hash: auth::hash_password("password123").unwrap(),
        roles: roles.to_vec(),
        is_active: true,
        created_at: now,
        updated_at: now,
    })
}

/// Sends one request through the router and decodes the response body as
/// JSON when possible, falling back to the raw text (CSV export).
pub async fn request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}
