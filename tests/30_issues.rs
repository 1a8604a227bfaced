mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn browsing_issues_requires_authentication() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, _) = common::request(
        &app,
        "GET",
        &format!("/projects/{}/issues", common::id_of(&project)),
        None,
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn create_rejects_blank_required_fields() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, body) = common::request(
        &app,
        "POST",
        &format!("/projects/{}/issues", common::id_of(&project)),
        Some(&token),
        Some(json!({ "title": "", "description": "" })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["title"], "can't be blank");
    assert_eq!(body["field_errors"]["description"], "can't be blank");
    assert_eq!(body["field_errors"]["status"], "can't be blank");
    assert_eq!(body["field_errors"]["assignee_id"], "can't be blank");
    assert_eq!(common::count(&pool, "issues").await?, 0);
    Ok(())
}

#[tokio::test]
async fn create_rejects_unknown_status() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, user) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, body) = common::request(
        &app,
        "POST",
        &format!("/projects/{}/issues", common::id_of(&project)),
        Some(&token),
        Some(json!({
            "title": "T",
            "description": "D",
            "status": "Done",
            "assignee_id": user["id"],
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["status"], "is not a valid status");
    Ok(())
}

#[tokio::test]
async fn create_rejects_missing_assignee() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (token, _) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;

    let (status, body) = common::request(
        &app,
        "POST",
        &format!("/projects/{}/issues", common::id_of(&project)),
        Some(&token),
        Some(json!({
            "title": "T",
            "description": "D",
            "status": "Active",
            "assignee_id": Uuid::new_v4(),
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field_errors"]["assignee_id"], "does not exist");
    assert_eq!(common::count(&pool, "issues").await?, 0);
    Ok(())
}

#[tokio::test]
async fn broken_chain_is_a_uniform_not_found() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, user) = common::register(&app, "alice@example.com").await?;
    let p1 = common::create_project(&app, &token, "P1").await?;
    let p2 = common::create_project(&app, &token, "P2").await?;
    let issue = common::create_issue(&app, &token, common::id_of(&p1), common::id_of(&user)).await?;

    // Issue id that exists nowhere
    let (status, body) = common::request(
        &app,
        "GET",
        &format!("/projects/{}/issues/{}", common::id_of(&p1), Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Record not found");

    // Issue that exists, but under a different project: same answer
    let (status, body) = common::request(
        &app,
        "GET",
        &format!(
            "/projects/{}/issues/{}",
            common::id_of(&p2),
            common::id_of(&issue)
        ),
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Record not found");
    Ok(())
}

#[tokio::test]
async fn assignee_has_no_edit_rights() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (alice, _) = common::register(&app, "alice@example.com").await?;
    let (bob, bob_user) = common::register(&app, "bob@example.com").await?;
    let project = common::create_project(&app, &alice, "P1").await?;
    let issue = common::create_issue(&app, &alice, common::id_of(&project), common::id_of(&bob_user)).await?;

    let (status, body) = common::request(
        &app,
        "PUT",
        &format!(
            "/projects/{}/issues/{}",
            common::id_of(&project),
            common::id_of(&issue)
        ),
        Some(&bob),
        Some(json!({ "title": "Assignee takeover" })),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Not authorized");
    Ok(())
}

#[tokio::test]
async fn creator_can_update_status_and_fields() -> Result<()> {
    let (app, _pool) = common::test_app().await?;
    let (token, user) = common::register(&app, "alice@example.com").await?;
    let project = common::create_project(&app, &token, "P1").await?;
    let issue = common::create_issue(&app, &token, common::id_of(&project), common::id_of(&user)).await?;

    let (status, body) = common::request(
        &app,
        "PUT",
        &format!(
            "/projects/{}/issues/{}",
            common::id_of(&project),
            common::id_of(&issue)
        ),
        Some(&token),
        Some(json!({ "status": "On hold" })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "On hold");
    assert_eq!(body["data"]["title"], issue["title"]);
    Ok(())
}

#[tokio::test]
async fn project_owner_is_not_creator_and_cannot_delete() -> Result<()> {
    let (app, pool) = common::test_app().await?;
    let (alice, alice_user) = common::register(&app, "alice@example.com").await?;
    let (bob, _) = common::register(&app, "bob@example.com").await?;

    // Bob files an issue in Alice's project; Alice owns the project but
    // did not create the issue
    let project = common::create_project(&app, &alice, "P1").await?;
    let issue = common::create_issue(&app, &bob, common::id_of(&project), common::id_of(&alice_user)).await?;

    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!(
            "/projects/{}/issues/{}",
            common::id_of(&project),
            common::id_of(&issue)
        ),
        Some(&alice),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::count(&pool, "issues").await?, 1);

    // The creator can
    let (status, _) = common::request(
        &app,
        "DELETE",
        &format!(
            "/projects/{}/issues/{}",
            common::id_of(&project),
            common::id_of(&issue)
        ),
        Some(&bob),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(common::count(&pool, "issues").await?, 0);
    Ok(())
}
