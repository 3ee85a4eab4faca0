mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn unknown_filter_key_is_rejected() -> Result<()> {
    let app = common::lazy_app();
    let (status, body) = common::get(&app, "/companies?colour=red", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Unrecognized filter: colour"));
    Ok(())
}

#[tokio::test]
async fn non_numeric_bounds_are_rejected() -> Result<()> {
    let app = common::lazy_app();
    let (status, body) = common::get(&app, "/companies?minEmployees=lots", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    Ok(())
}

#[tokio::test]
async fn inverted_employee_range_is_rejected() -> Result<()> {
    let app = common::lazy_app();
    let (status, body) = common::get(&app, "/companies?minEmployees=10&maxEmployees=2", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Min employees cannot be greater than max"));
    Ok(())
}

#[tokio::test]
async fn create_validates_payload() -> Result<()> {
    let app = common::lazy_app();
    let token = common::admin_token();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/companies",
        Some(token.as_str()),
        Some(json!({ "handle": "Not Lower", "name": "New", "description": "Desc" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/companies",
        Some(token.as_str()),
        Some(json!({ "handle": "new", "name": "New", "description": "Desc", "logoUrl": "not a url" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    Ok(())
}

#[tokio::test]
async fn patch_rejects_handle_and_empty_body() -> Result<()> {
    let app = common::lazy_app();
    let token = common::admin_token();

    let (status, body) =
        common::send(&app, Method::PATCH, "/companies/c1", Some(token.as_str()), Some(json!({ "handle": "c1-new" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_JSON"));

    let (status, body) = common::send(&app, Method::PATCH, "/companies/c1", Some(token.as_str()), Some(json!({}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("No data"));
    Ok(())
}

#[tokio::test]
async fn patch_rejects_null_for_required_fields() -> Result<()> {
    let app = common::lazy_app();
    let token = common::admin_token();

    for body in [json!({ "name": null }), json!({ "description": null, "logoUrl": null })] {
        let (status, body) = common::send(&app, Method::PATCH, "/companies/c1", Some(token.as_str()), Some(body)).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("INVALID_JSON"));
    }
    Ok(())
}

#[tokio::test]
#[ignore = "requires a database"]
async fn companies_against_database() -> Result<()> {
    let _guard = common::DB_LOCK.lock().await;
    let (app, _pool) = common::db_app().await?;
    let token = common::admin_token();

    // list, ordered by name
    let (status, body) = common::get(&app, "/companies", None).await?;
    assert_eq!(status, StatusCode::OK);
    let handles: Vec<&str> = body["data"]["companies"]
        .as_array()
        .map(|a| a.iter().filter_map(|c| c["handle"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(handles, vec!["c1", "c2", "c3"]);

    // filters combine with AND
    let (_, body) = common::get(&app, "/companies?nameLike=c&minEmployees=2&maxEmployees=2", None).await?;
    assert_eq!(body["data"]["companies"], json!([{
        "handle": "c2", "name": "C2", "description": "Desc2", "numEmployees": 2, "logoUrl": "http://c2.img"
    }]));

    // detail includes jobs
    let (status, body) = common::get(&app, "/companies/c1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"]["jobs"].as_array().map(Vec::len), Some(4));

    let (status, body) = common::get(&app, "/companies/nope", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("No company: nope"));

    // create, duplicate
    let new_company = json!({ "handle": "new", "name": "New", "description": "New Description", "numEmployees": 10 });
    let (status, body) = common::send(&app, Method::POST, "/companies", Some(token.as_str()), Some(new_company.clone())).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["company"]["numEmployees"], json!(10));
    let (status, body) = common::send(&app, Method::POST, "/companies", Some(token.as_str()), Some(new_company)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Duplicate company: new"));

    // partial update touches only supplied fields
    let (status, body) = common::send(
        &app,
        Method::PATCH,
        "/companies/c1",
        Some(token.as_str()),
        Some(json!({ "name": "C1-new", "numEmployees": 99 })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"], json!({
        "handle": "c1", "name": "C1-new", "description": "Desc1", "numEmployees": 99, "logoUrl": "http://c1.img"
    }));

    let (status, _) =
        common::send(&app, Method::PATCH, "/companies/nope", Some(token.as_str()), Some(json!({ "name": "X" }))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // explicit nulls clear nullable columns, alone or next to other fields
    let (status, body) =
        common::send(&app, Method::PATCH, "/companies/c1", Some(token.as_str()), Some(json!({ "logoUrl": null }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"]["logoUrl"], json!(null));
    assert_eq!(body["data"]["company"]["numEmployees"], json!(99));

    let (status, body) = common::send(
        &app,
        Method::PATCH,
        "/companies/c2",
        Some(token.as_str()),
        Some(json!({ "name": "C2-new", "numEmployees": null })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"], json!({
        "handle": "c2", "name": "C2-new", "description": "Desc2", "numEmployees": null, "logoUrl": "http://c2.img"
    }));

    // delete cascades to jobs
    let (status, body) = common::send(&app, Method::DELETE, "/companies/c1", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!("c1"));
    let (_, body) = common::get(&app, "/jobs", None).await?;
    assert_eq!(body["data"]["jobs"], json!([]));

    let (status, _) = common::send(&app, Method::DELETE, "/companies/c1", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
