mod common;

use anyhow::Result;
use axum::http::StatusCode;
use fleet_api::store::Store;
use serde_json::json;

async fn create_project(
    app: &common::TestApp,
    user_id: uuid::Uuid,
    token: &str,
    devices: serde_json::Value,
) -> Result<serde_json::Value> {
    let (status, body) = common::request(
        &app.router,
        "POST",
        &format!("/projects/{}", user_id),
        Some(token),
        Some(json!({ "devices": devices })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(body["project"].clone())
}

#[tokio::test]
async fn replace_swaps_the_entire_device_set() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let project = create_project(
        &app,
        user.id,
        &token,
        json!([{"name": "old-a"}, {"name": "old-b"}]),
    )
    .await?;
    let project_id = project["id"].as_str().unwrap().to_string();

    let (status, body) = common::request(
        &app.router,
        "PUT",
        &format!("/projects/{}/{}", project_id, user.id),
        Some(&token),
        Some(json!({"devices": [{"name": "new-a"}, {"name": "new-b"}, {"name": "new-c"}]})),
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["devices"].as_array().unwrap().len(), 3);
    // The previous devices are deleted, not orphaned
    assert_eq!(app.store.device_count().await, 3);

    let (_, shown) = common::request(
        &app.router,
        "GET",
        &format!("/projects/{}", user.id),
        Some(&token),
        None,
    )
    .await?;
    let names: Vec<&str> = shown["project"]["devices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["new-a", "new-b", "new-c"]);
    Ok(())
}

#[tokio::test]
async fn replacing_an_unknown_project_fails_with_the_update_message() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let (status, body) = common::request(
        &app.router,
        "PUT",
        &format!("/projects/{}/{}", uuid::Uuid::new_v4(), user.id),
        Some(&token),
        Some(json!({"devices": []})),
    )
    .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Error updating project"}));
    Ok(())
}

#[tokio::test]
async fn append_then_remove_restores_membership() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let project = create_project(&app, user.id, &token, json!([{"name": "base"}])).await?;
    let project_id = project["id"].as_str().unwrap().to_string();
    let original_devices = project["devices"].clone();
    let extra = uuid::Uuid::new_v4();

    let (status, body) = common::request(
        &app.router,
        "PUT",
        &format!("/projects/{}/{}/{}", project_id, user.id, extra),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let appended = body["project"]["devices"].as_array().unwrap();
    assert_eq!(appended.len(), 2);
    assert_eq!(appended[1], json!(extra));

    // The removal endpoint responds with the updated project, unwrapped
    let (status, removed) = common::request(
        &app.router,
        "DELETE",
        &format!("/projects/device/{}/{}/{}", extra, project_id, user.id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["devices"], original_devices);
    Ok(())
}

#[tokio::test]
async fn remove_leaves_the_device_document_in_place() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let project = create_project(&app, user.id, &token, json!([{"name": "keeper"}])).await?;
    let project_id = project["id"].as_str().unwrap().to_string();
    let device_id = project["devices"][0].as_str().unwrap().to_string();

    let (status, removed) = common::request(
        &app.router,
        "DELETE",
        &format!("/projects/device/{}/{}/{}", device_id, project_id, user.id),
        Some(&token),
        None,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["devices"], json!([]));
    assert_eq!(app.store.device_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn delete_returns_the_document_and_is_idempotent() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let project = create_project(&app, user.id, &token, json!([{"name": "doomed"}])).await?;
    let device_id = project["devices"][0].as_str().unwrap().to_string();

    let (status, body) = common::request(
        &app.router,
        "DELETE",
        &format!("/projects/{}/{}", device_id, user.id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "doomed");
    assert_eq!(body["id"], json!(device_id));

    // Second delete is a no-op, never a crash
    let (status, body) = common::request(
        &app.router,
        "DELETE",
        &format!("/projects/{}/{}", device_id, user.id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(null));
    Ok(())
}

#[tokio::test]
async fn direct_delete_leaves_a_dangling_reference_that_expansion_skips() -> Result<()> {
    let app = common::test_app();
    let user = app.seed_user("ana").await;
    let token = common::token_for(user.id);

    let project = create_project(
        &app,
        user.id,
        &token,
        json!([{"name": "a"}, {"name": "b"}]),
    )
    .await?;
    let device_id = project["devices"][0].as_str().unwrap().to_string();

    common::request(
        &app.router,
        "DELETE",
        &format!("/projects/{}/{}", device_id, user.id),
        Some(&token),
        None,
    )
    .await?;

    // The stored reference list still has both entries
    let stored = app
        .store
        .find_project(uuid::Uuid::parse_str(project["id"].as_str().unwrap())?)
        .await?;
    assert_eq!(stored.unwrap().devices.len(), 2);

    // But the expanded view only materializes the surviving document
    let (status, body) = common::request(
        &app.router,
        "GET",
        &format!("/projects/{}", user.id),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let devices = body["project"]["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["name"], "b");
    Ok(())
}
