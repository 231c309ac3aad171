mod common;

use axum::http::StatusCode;
use entity::reference::categories;
use serde_json::json;

use common::{request, test_env};

#[tokio::test]
async fn payroll_requires_hr_manager_and_unique_period() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let payload = json!({
        "employeeId": employee.id,
        "year": 2026,
        "month": 7,
        "grossCents": 520_000,
        "deductionsCents": 95_000
    });

    let (status, _) = request(
        &env.router,
        "POST",
        "/api/payrolls",
        Some(&env.supervisor_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &env.router,
        "POST",
        "/api/payrolls",
        Some(&env.admin_token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["netCents"], 425_000);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &env.router,
        "POST",
        "/api/payrolls",
        Some(&env.admin_token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"][0]["message"],
        "payroll already exists for this period"
    );

    // Issue freezes the record.
    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/payrolls/{id}/issue"),
        Some(&env.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["issuedAt"].is_string());

    let (status, body) = request(
        &env.router,
        "PUT",
        &format!("/api/payrolls/{id}"),
        Some(&env.admin_token),
        Some(json!({
            "employeeId": employee.id,
            "year": 2026,
            "month": 7,
            "grossCents": 600_000,
            "deductionsCents": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "payroll has already been issued");
}

#[tokio::test]
async fn payroll_validation_bounds_amounts_and_period() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/payrolls",
        Some(&env.admin_token),
        Some(json!({
            "employeeId": employee.id,
            "year": 2026,
            "month": 13,
            "grossCents": 100,
            "deductionsCents": 200
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["month", "deductionsCents"]);
}

#[tokio::test]
async fn contract_request_decision_flow() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let full_time = env
        .seeded
        .reference_type(categories::CONTRACT_TYPE, "Full Time")
        .unwrap();

    let (status, body) = request(
        &env.router,
        "POST",
        "/api/contract-requests",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "contractTypeId": full_time.id,
            "copies": 2,
            "notes": "  for the bank  "
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["notes"], "for the bank");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/contract-requests/{id}/issue"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ISSUED");

    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/contract-requests/{id}/reject"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "contract request is not pending");

    let (status, _) = request(
        &env.router,
        "DELETE",
        &format!("/api/contract-requests/{id}"),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn certification_issue_flow() {
    let env = test_env();
    let employee = &env.seeded.employees[2];
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/certifications",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "purpose": "Mortgage application"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["issuedAt"].is_null());
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = request(
        &env.router,
        "POST",
        &format!("/api/certifications/{id}/issue"),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/certifications/{id}/issue"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["issuedAt"].is_string());

    let (status, body) = request(
        &env.router,
        "DELETE",
        &format!("/api/certifications/{id}"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "issued certifications cannot be deleted");
}

#[tokio::test]
async fn reference_rows_in_use_cannot_be_deleted() {
    let env = test_env();
    let medical = env
        .seeded
        .reference_type(categories::PERMISSION_KIND, "Medical")
        .unwrap();
    let (status, body) = request(
        &env.router,
        "DELETE",
        &format!("/api/reference-types/{}", medical.id),
        Some(&env.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "reference type is in use; deactivate it instead");

    // Deactivation is the supported path and hides it from new requests.
    let (status, body) = request(
        &env.router,
        "PUT",
        &format!("/api/reference-types/{}", medical.id),
        Some(&env.admin_token),
        Some(json!({"name": "Medical", "isActive": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let employee = &env.seeded.employees[0];
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/permissions",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "kindId": medical.id,
            "date": "2026-09-15"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "unknown permission kind");
}
