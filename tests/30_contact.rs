mod common;

use anyhow::Result;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use common::{ADMIN, MEMBER};

fn updated_at(body: &Value) -> Option<DateTime<Utc>> {
    body["data"]["updatedAt"].as_str().and_then(|s| s.parse().ok())
}

#[tokio::test]
async fn invalid_submission_lists_every_field() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::post(
        &app,
        "/api/contact",
        None,
        json!({ "name": "", "email": "not-an-email", "subject": "Hi", "message": "", "inquiryType": "sales" }),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    for field in ["name", "email", "message", "inquiryType"] {
        assert!(body["field_errors"][field].is_string(), "missing {}", field);
    }
    assert!(body["field_errors"]["subject"].is_null());
    Ok(())
}

#[tokio::test]
async fn triage_is_admin_only() -> Result<()> {
    let app = common::offline_app();
    let id = uuid::Uuid::new_v4();

    let (status, _) = common::patch(
        &app,
        &format!("/api/admin/contact/{}/status", id),
        Some(MEMBER),
        json!({ "status": "resolved" }),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = common::patch(
        &app,
        &format!("/api/admin/contact/{}/status", id),
        Some(ADMIN),
        json!({ "status": "closed" }),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn submission_and_triage_round_trip() -> Result<()> {
    let Some(app) = common::database_app().await? else {
        return Ok(());
    };
    let subject = common::unique("contact");

    let (status, body) = common::post(
        &app,
        "/api/contact",
        None,
        json!({
            "name": "Ada Lovelace",
            "email": "ada@example.org",
            "subject": subject,
            "message": "We would like to partner on a policy brief.",
            "inquiryType": "partnership",
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "new");
    let id = body["data"]["id"].as_str().unwrap_or_default().to_string();
    let submitted_at = updated_at(&body);
    assert!(submitted_at.is_some());
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let (status, body) = common::get(&app, "/api/admin/contact", Some(ADMIN)).await?;
    assert_eq!(status, StatusCode::OK);
    let listed = body["data"].as_array().cloned().unwrap_or_default();
    assert!(listed.iter().any(|row| row["id"] == id.as_str()));

    let (status, body) = common::patch(
        &app,
        &format!("/api/admin/contact/{}/status", id),
        Some(ADMIN),
        json!({ "status": "in_progress" }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert!(updated_at(&body) > submitted_at, "updatedAt did not advance on triage");

    let (_, body) = common::delete(&app, &format!("/api/admin/contact/{}", id), Some(ADMIN)).await?;
    assert_eq!(body["data"]["deleted"], true);

    let (_, body) = common::delete(&app, &format!("/api/admin/contact/{}", id), Some(ADMIN)).await?;
    assert_eq!(body["data"]["deleted"], false);

    let (status, _) = common::patch(
        &app,
        &format!("/api/admin/contact/{}/status", id),
        Some(ADMIN),
        json!({ "status": "resolved" }),
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
