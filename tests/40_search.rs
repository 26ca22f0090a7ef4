mod common;

use anyhow::Result;
use axum::http::StatusCode;

#[tokio::test]
async fn blank_term_returns_empty_page() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/api/search?q=%20%20", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["results"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[tokio::test]
async fn storage_failure_degrades_to_empty() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/api/search?q=inflation&type=publication", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total"], 0);
    Ok(())
}

#[tokio::test]
async fn unknown_type_is_rejected() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/api/search?q=tax&type=podcast", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn limit_is_capped() -> Result<()> {
    let app = common::offline_app();

    let (_, body) = common::get(&app, "/api/search?q=%20&limit=100000", None).await?;
    let max = common::test_config("postgres://unused").search.max_limit;
    assert!(body["data"]["limit"].as_i64().unwrap_or_default() <= max);
    Ok(())
}

#[tokio::test]
async fn huge_page_number_is_clamped() -> Result<()> {
    let app = common::offline_app();

    let (status, body) = common::get(&app, "/api/search?q=tax&page=9223372036854775807", None).await?;
    assert_eq!(status, StatusCode::OK);
    let limit = common::test_config("postgres://unused").search.default_limit;
    assert_eq!(body["data"]["limit"], limit);
    assert_eq!(body["data"]["page"], i64::MAX / limit);
    Ok(())
}
