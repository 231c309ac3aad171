mod common;

use axum::http::StatusCode;
use entity::reference::categories;
use serde_json::json;

use common::{request, test_env};

#[tokio::test]
async fn permission_approval_records_decision() {
    let env = test_env();
    let pending = &env.seeded.permissions[0];

    // Approvals are supervisor territory.
    let (status, _) = request(
        &env.router,
        "POST",
        &format!("/api/permissions/{}/approve", pending.id),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/permissions/{}/approve", pending.id),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
    assert!(body["decidedBy"].is_string());
    assert!(body["decidedAt"].is_string());

    // The decision is final: a second transition is a 400.
    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/permissions/{}/reject", pending.id),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "permission is not pending");
}

#[tokio::test]
async fn approved_permissions_cannot_be_edited_or_deleted() {
    let env = test_env();
    let pending = &env.seeded.permissions[0];
    let (status, _) = request(
        &env.router,
        "POST",
        &format!("/api/permissions/{}/approve", pending.id),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &env.router,
        "PUT",
        &format!("/api/permissions/{}", pending.id),
        Some(&env.employee_token),
        Some(json!({
            "employeeId": pending.employee_id,
            "kindId": pending.kind_id,
            "date": "2026-09-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "only pending permissions can be edited");

    let (status, _) = request(
        &env.router,
        "DELETE",
        &format!("/api/permissions/{}", pending.id),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn permission_create_validates_kind_and_times() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let department = env
        .seeded
        .reference_type(categories::DEPARTMENT, "Engineering")
        .unwrap();

    // A reference row from another category is not a permission kind.
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/permissions",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "kindId": department.id,
            "date": "2026-09-01"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "unknown permission kind");

    let medical = env
        .seeded
        .reference_type(categories::PERMISSION_KIND, "Medical")
        .unwrap();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/permissions",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "kindId": medical.id,
            "date": "2026-09-01",
            "startTime": "14:00:00",
            "endTime": "13:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "endTime");
}

#[tokio::test]
async fn permission_summary_rolls_up_statuses() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let medical = env
        .seeded
        .reference_type(categories::PERMISSION_KIND, "Medical")
        .unwrap();
    for day in ["2026-09-01", "2026-09-02"] {
        let (status, _) = request(
            &env.router,
            "POST",
            "/api/permissions",
            Some(&env.employee_token),
            Some(json!({
                "employeeId": employee.id,
                "kindId": medical.id,
                "date": day
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let seeded_pending = &env.seeded.permissions[0];
    let (status, _) = request(
        &env.router,
        "POST",
        &format!("/api/permissions/{}/reject", seeded_pending.id),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &env.router,
        "GET",
        &format!("/api/permissions/summary?employeeId={}", employee.id),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], 2);
    assert_eq!(body["rejected"], 1);
    assert_eq!(body["approved"], 0);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn vacation_lifecycle_and_guards() {
    let env = test_env();
    let employee = &env.seeded.employees[1];
    let (status, vacation) = request(
        &env.router,
        "POST",
        "/api/vacations",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "startDate": "2026-10-05",
            "endDate": "2026-10-09"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vacation["days"], 5);
    assert_eq!(vacation["status"], "PLANNED");
    let id = vacation["id"].as_str().unwrap().to_string();

    // Overlapping request for the same employee is refused.
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/vacations",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "startDate": "2026-10-09",
            "endDate": "2026-10-12"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "overlaps an existing vacation");

    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/vacations/{id}/start"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "IN_PROGRESS");

    // A started vacation can no longer be canceled or edited.
    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/vacations/{id}/cancel"),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "vacation is not planned");

    let (status, _) = request(
        &env.router,
        "PUT",
        &format!("/api/vacations/{id}"),
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "startDate": "2026-11-01",
            "endDate": "2026-11-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn inverted_vacation_range_is_rejected() {
    let env = test_env();
    let employee = &env.seeded.employees[1];
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/vacations",
        Some(&env.employee_token),
        Some(json!({
            "employeeId": employee.id,
            "startDate": "2026-10-09",
            "endDate": "2026-10-05"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "endDate");
}

#[tokio::test]
async fn vacation_summary_counts_by_status() {
    let env = test_env();
    let seeded = &env.seeded.vacations[0];
    let (status, _) = request(
        &env.router,
        "POST",
        &format!("/api/vacations/{}/cancel", seeded.id),
        Some(&env.supervisor_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(
        &env.router,
        "GET",
        "/api/vacations/summary",
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["canceled"], 1);
    assert_eq!(body["planned"], 0);
    assert_eq!(body["total"], 1);
}
