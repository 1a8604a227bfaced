mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn create_rejects_blank_name_and_description() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;

    let (status, body) = common::request(
        &app,
        "POST",
        "/projects",
        Some(&token),
        Some(json!({ "name": "", "description": "  " })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["name"], "can't be blank");
    assert_eq!(body["field_errors"]["description"], "can't be blank");
    assert_eq!(common::count(&pool, "projects").await?, 0);
    Ok(())
}

#[tokio::test]
async fn create_then_show_includes_issues() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, user) = common::register(&app, "alice@example.com").await?;

    let project = common::create_project(&app, &token, "P1").await?;
    assert_eq!(project["user_id"], user["id"]);

    common::create_issue(&app, &token, common::id_of(&project), common::id_of(&user)).await?;

    // Detail view is read-open: no token needed
    let (status, body) = common::request(
        &app,
        "GET",
        &format!("/projects/{}", common::id_of(&project)),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["project"]["name"], "P1");
    assert_eq!(body["data"]["issues"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn owner_can_update() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, body) = common::request(
        &app,
        "PUT",
        &format!("/projects/{}", common::id_of(&project)),
        Some(&token),
        Some(json!({ "name": "Renamed" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Renamed");
    // Untouched field keeps its value
    assert_eq!(body["data"]["description"], project["description"]);
    Ok(())
}

#[tokio::test]
async fn update_cannot_blank_required_fields() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, body) = common::request(
        &app,
        "PUT",
        &format!("/projects/{}", common::id_of(&project)),
        Some(&token),
        Some(json!({ "name": "" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["name"], "can't be blank");
    Ok(())
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (owner, _) = common::register(&app, "alice@example.com").await?;
    let (intruder, _) = common::register(&app, "bob@example.com").await?;
    let project = common::create_project(&app, &owner, "P1").await?;
    let path = format!("/projects/{}", common::id_of(&project));

    let (status, body) = common::request(
        &app,
        "PUT",
        &path,
        Some(&intruder),
        Some(json!({ "name": "Hijacked" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    let (status, body) = common::request(&app, "DELETE", &path, Some(&intruder), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");

    // Nothing changed
    assert_eq!(common::count(&pool, "projects").await?, 1);
    let (_, body) = common::request(&app, "GET", &path, None, None).await?;
    assert_eq!(body["data"]["project"]["name"], "P1");
    Ok(())
}

#[tokio::test]
async fn owner_can_delete() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;
    let path = format!("/projects/{}", common::id_of(&project));

    let (status, _) = common::request(&app, "DELETE", &path, Some(&token), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(common::count(&pool, "projects").await?, 0);

    let (status, _) = common::request(&app, "GET", &path, None, None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn listing_is_visibility_not_ownership() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (alice, alice_user) = common::register(&app, "alice@example.com").await?;
    let (bob, bob_user) = common::register(&app, "bob@example.com").await?;
    let (carol, _) = common::register(&app, "carol@example.com").await?;

    let p1 = common::create_project(&app, &alice, "Alice's").await?;
    common::create_project(&app, &bob, "Bob's").await?;

    // Bob is assigned to an issue in Alice's project
    common::create_issue(&app, &alice, common::id_of(&p1), common::id_of(&bob_user)).await?;

    // Anonymous: everything
    let (_, body) = common::request(&app, "GET", "/projects", None, None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Alice: owner of one, not assigned anywhere else
    let (_, body) = common::request(&app, "GET", "/projects", Some(&alice), None).await?;
    let visible = body["data"].as_array().unwrap();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0]["user_id"], alice_user["id"]);

    // Bob: his own project plus the one he is assigned in
    let (_, body) = common::request(&app, "GET", "/projects", Some(&bob), None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // Carol: no ownership, no assignments
    let (_, body) = common::request(&app, "GET", "/projects", Some(&carol), None).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    Ok(())
}
