mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{request, test_env};

#[tokio::test]
async fn login_returns_token_and_session_cookie() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "supervisor@example.test", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "supervisor@example.test");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = request(&env.router, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["roles"][0], "SUPERVISOR");
}

#[tokio::test]
async fn login_rejects_bad_credentials_with_uniform_body() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "supervisor@example.test", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid credentials");
    assert!(body["details"].is_null());
}

#[tokio::test]
async fn requests_without_session_are_unauthorized() {
    let env = test_env();
    let (status, body) = request(&env.router, "GET", "/api/employees", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "login required");

    let (status, _) = request(
        &env.router,
        "GET",
        "/api/employees",
        Some("not-a-real-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reference_data_mutation_requires_admin() {
    let env = test_env();
    let payload = json!({"category": "permission_kind", "name": "Training"});
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/reference-types",
        Some(&env.employee_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "insufficient permissions");

    let (status, body) = request(
        &env.router,
        "POST",
        "/api/reference-types",
        Some(&env.admin_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Training");
}

#[tokio::test]
async fn user_admin_keeps_last_admin_alive() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "GET",
        "/api/users",
        Some(&env.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let admin_id = body
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["email"] == "admin@example.test")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = request(
        &env.router,
        "DELETE",
        &format!("/api/users/{admin_id}"),
        Some(&env.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "cannot remove the last active admin");
}

#[tokio::test]
async fn created_user_without_password_gets_temporary_one() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/users",
        Some(&env.admin_token),
        Some(json!({
            "email": "New.Hire@Example.Test",
            "displayName": "New Hire",
            "roles": ["HR_MANAGER"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    // Email is normalized, the temp password is shown exactly once.
    assert_eq!(body["user"]["email"], "new.hire@example.test");
    let password = body["temporaryPassword"].as_str().unwrap().to_string();
    assert_eq!(password.len(), 16);

    let (status, body) = request(
        &env.router,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "new.hire@example.test", "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["roles"][0], "HR_MANAGER");
}
