mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

fn titles(body: &Value) -> Vec<String> {
    body["data"]["jobs"]
        .as_array()
        .map(|jobs| jobs.iter().filter_map(|j| j["title"].as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn filter_values_are_type_checked() -> Result<()> {
    let app = common::lazy_app();

    let (status, _) = common::get(&app, "/jobs?hasEquity=maybe", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::get(&app, "/jobs?minSalary=1.5", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = common::get(&app, "/jobs?title=J1", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Unrecognized filter: title"));
    Ok(())
}

#[tokio::test]
async fn create_and_patch_validate_payload() -> Result<()> {
    let app = common::lazy_app();
    let token = common::admin_token();

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/jobs",
        Some(token.as_str()),
        Some(json!({ "title": "J", "salary": 10, "equity": "1.5", "companyHandle": "c1" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));

    let (status, body) =
        common::send(&app, Method::PATCH, "/jobs/1", Some(token.as_str()), Some(json!({ "companyHandle": "c2" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_JSON"));

    let (status, _) = common::send(&app, Method::PATCH, "/jobs/1", Some(token.as_str()), Some(json!({ "salary": -1 }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_ids_get_the_error_envelope() -> Result<()> {
    let app = common::lazy_app();
    let admin = common::admin_token();
    let u2 = common::user_token("u2");

    let (status, body) = common::get(&app, "/jobs/abc", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["code"], json!("BAD_REQUEST"));

    let (status, body) =
        common::send(&app, Method::PATCH, "/jobs/abc", Some(admin.as_str()), Some(json!({ "title": "T" }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("BAD_REQUEST"));

    let (status, body) = common::send(&app, Method::DELETE, "/jobs/1.5", Some(admin.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("BAD_REQUEST"));

    let (status, body) = common::send(&app, Method::POST, "/users/u2/jobs/abc", Some(u2.as_str()), None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("BAD_REQUEST"));
    Ok(())
}

#[tokio::test]
async fn patch_rejects_null_title() -> Result<()> {
    let app = common::lazy_app();
    let token = common::admin_token();
    let (status, body) =
        common::send(&app, Method::PATCH, "/jobs/1", Some(token.as_str()), Some(json!({ "title": null }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("INVALID_JSON"));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a database"]
async fn jobs_against_database() -> Result<()> {
    let _guard = common::DB_LOCK.lock().await;
    let (app, _pool) = common::db_app().await?;
    let token = common::admin_token();

    let (status, body) = common::get(&app, "/jobs", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["J1", "J2", "J3", "J4"]);

    // hasEquity=true drops NULL and zero equity; false does not filter at all
    let (_, body) = common::get(&app, "/jobs?hasEquity=true", None).await?;
    assert_eq!(titles(&body), vec!["J1", "J2"]);
    let (_, body) = common::get(&app, "/jobs?hasEquity=false", None).await?;
    assert_eq!(titles(&body), vec!["J1", "J2", "J3", "J4"]);

    let (_, body) = common::get(&app, "/jobs?minSalary=2&titleLike=j", None).await?;
    assert_eq!(titles(&body), vec!["J2", "J3"]);

    let (_, body) = common::get(&app, "/jobs?companyHandle=c2", None).await?;
    assert_eq!(titles(&body), Vec::<String>::new());

    // detail embeds the company
    let (status, body) = common::get(&app, "/jobs/1", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["equity"], json!("0.1"));
    assert_eq!(body["data"]["job"]["company"]["handle"], json!("c1"));

    let (status, body) = common::get(&app, "/jobs/999", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("No job: 999"));

    // create against a missing company
    let (status, body) = common::send(
        &app,
        Method::POST,
        "/jobs",
        Some(token.as_str()),
        Some(json!({ "title": "New", "salary": 100, "equity": "0.5", "companyHandle": "nope" })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("No company: nope"));

    let (status, body) = common::send(
        &app,
        Method::POST,
        "/jobs",
        Some(token.as_str()),
        Some(json!({ "title": "New", "salary": 100, "equity": "0.5", "companyHandle": "c2" })),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["job"]["companyHandle"], json!("c2"));
    assert_eq!(body["data"]["job"]["title"], json!("New"));
    // the rejected insert above already consumed a serial value
    let new_id = body["data"]["job"]["id"].as_i64().unwrap_or_default();
    let (status, body) = common::get(&app, &format!("/jobs/{}", new_id), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["company"]["handle"], json!("c2"));

    // partial update, equity travels and comes back as a decimal string
    let (status, body) = common::send(
        &app,
        Method::PATCH,
        "/jobs/1",
        Some(token.as_str()),
        Some(json!({ "title": "J1-new", "equity": "0.3" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["title"], json!("J1-new"));
    assert_eq!(body["data"]["job"]["salary"], json!(1));
    assert_eq!(body["data"]["job"]["equity"], json!("0.3"));

    let (status, body) = common::send(
        &app,
        Method::PATCH,
        "/jobs/2",
        Some(token.as_str()),
        Some(json!({ "equity": "0.123456789012345678" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["equity"], json!("0.123456789012345678"));

    // explicit nulls clear salary and equity
    let (status, body) = common::send(
        &app,
        Method::PATCH,
        "/jobs/2",
        Some(token.as_str()),
        Some(json!({ "salary": null, "equity": null })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["job"]["salary"], json!(null));
    assert_eq!(body["data"]["job"]["equity"], json!(null));
    assert_eq!(body["data"]["job"]["title"], json!("J2"));

    let (status, body) = common::send(&app, Method::DELETE, "/jobs/1", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], json!(1));
    let (status, _) = common::send(&app, Method::DELETE, "/jobs/1", Some(token.as_str()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
