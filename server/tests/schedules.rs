mod common;

use axum::http::StatusCode;
use chrono::{Days, Utc};
use serde_json::json;

use common::{request, test_env};

#[tokio::test]
async fn schedule_validation_rejects_bad_windows() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/schedules",
        Some(&env.admin_token),
        Some(json!({
            "name": "Broken",
            "startTime": "09:00:00",
            "endTime": "09:00:00",
            "workDays": [0, 8]
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
    assert!(fields.contains(&"endTime"));
    assert!(fields.contains(&"workDays"));
}

#[tokio::test]
async fn overnight_windows_are_allowed() {
    let env = test_env();
    let (status, body) = request(
        &env.router,
        "POST",
        "/api/schedules",
        Some(&env.admin_token),
        Some(json!({
            "name": "Late Shift",
            "startTime": "23:00:00",
            "endTime": "07:00:00",
            "workDays": [1, 2, 3, 3, 2],
            "toleranceMinutes": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["workDays"], json!([1, 2, 3]));
}

#[tokio::test]
async fn replacement_expires_today_and_starts_tomorrow() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let night_shift = &env.seeded.schedules[1];
    let today = Utc::now().date_naive();
    let tomorrow = today.checked_add_days(Days::new(1)).unwrap();

    let (status, assignment) = request(
        &env.router,
        "POST",
        &format!("/api/employees/{}/schedule", employee.id),
        Some(&env.admin_token),
        Some(json!({"scheduleId": night_shift.id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(assignment["scheduleId"], json!(night_shift.id));
    assert_eq!(assignment["startDate"], json!(tomorrow));
    assert!(assignment["endDate"].is_null());

    // Today still resolves to the old schedule.
    let (status, active) = request(
        &env.router,
        "GET",
        &format!("/api/employees/{}/schedule?date={}", employee.id, today),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["schedule"]["name"], "Day Shift");
    assert_eq!(active["assignment"]["endDate"], json!(today));

    // Tomorrow resolves to the replacement.
    let (status, active) = request(
        &env.router,
        "GET",
        &format!("/api/employees/{}/schedule?date={}", employee.id, tomorrow),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["schedule"]["name"], "Night Shift");

    // History now holds both assignments.
    let (status, history) = request(
        &env.router,
        "GET",
        &format!("/api/schedule-assignments?employeeId={}", employee.id),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn replacement_requires_known_schedule() {
    let env = test_env();
    let employee = &env.seeded.employees[0];
    let (status, body) = request(
        &env.router,
        "POST",
        &format!("/api/employees/{}/schedule", employee.id),
        Some(&env.admin_token),
        Some(json!({"scheduleId": uuid::Uuid::new_v4()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["message"], "unknown schedule");
}

#[tokio::test]
async fn employee_without_assignment_gets_404() {
    let env = test_env();
    let unassigned = &env.seeded.employees[2];
    let (status, body) = request(
        &env.router,
        "GET",
        &format!("/api/employees/{}/schedule", unassigned.id),
        Some(&env.employee_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "schedule assignment not found");
}

#[tokio::test]
async fn assigned_schedule_refuses_deletion() {
    let env = test_env();
    let day_shift = &env.seeded.schedules[0];
    let (status, body) = request(
        &env.router,
        "DELETE",
        &format!("/api/schedules/{}", day_shift.id),
        Some(&env.admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "schedule is referenced by assignments");
}
