// Shared harness: each suite builds the real router over a fresh in-memory
// SQLite database and drives it in-process. The pool is pinned to a single
// connection so the in-memory database survives across requests.

use anyhow::{ensure, Result};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tower::ServiceExt;

pub async fn test_app() -> Result<(Router, SqlitePool)> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;

    tracker_api::database::manager::migrate(&pool).await?;
    Ok((tracker_api::handlers::router(pool.clone()), pool))
}

pub async fn request(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, value))
}

/// Register a user and return (token, user json)
pub async fn register(app: &Router, email: &str) -> Result<(String, Value)> {
    let (status, body) = request(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "name": "Someone", "password": "password1" })),
    )
    .await?;
    ensure!(
        status == StatusCode::CREATED,
        "register failed: {} {}",
        status,
        body
    );

    let token = body["data"]["token"]
        .as_str()
        .expect("token in register response")
        .to_string();
    Ok((token, body["data"]["user"].clone()))
}

pub async fn create_project(app: &Router, token: &str, name: &str) -> Result<Value> {
    let (status, body) = request(
        app,
        "POST",
        "/projects",
        Some(token),
        Some(json!({ "name": name, "description": "A project under test" })),
    )
    .await?;
    ensure!(
        status == StatusCode::CREATED,
        "create_project failed: {} {}",
        status,
        body
    );
    Ok(body["data"].clone())
}

pub async fn create_issue(
    app: &Router,
    token: &str,
    project_id: &str,
    assignee_id: &str,
) -> Result<Value> {
    let (status, body) = request(
        app,
        "POST",
        &format!("/projects/{}/issues", project_id),
        Some(token),
        Some(json!({
            "title": "An issue",
            "description": "Something is wrong",
            "status": "Active",
            "assignee_id": assignee_id,
        })),
    )
    .await?;
    ensure!(
        status == StatusCode::CREATED,
        "create_issue failed: {} {}",
        status,
        body
    );
    Ok(body["data"].clone())
}

pub async fn create_comment(
    app: &Router,
    token: &str,
    project_id: &str,
    issue_id: &str,
    text: &str,
) -> Result<Value> {
    let (status, body) = request(
        app,
        "POST",
        &format!("/projects/{}/issues/{}/comments", project_id, issue_id),
        Some(token),
        Some(json!({ "body": text })),
    )
    .await?;
    ensure!(
        status == StatusCode::CREATED,
        "create_comment failed: {} {}",
        status,
        body
    );
    Ok(body["data"].clone())
}

pub fn id_of(value: &Value) -> &str {
    value["id"].as_str().expect("entity id")
}

pub async fn count(pool: &SqlitePool, table: &str) -> Result<i64> {
    let n: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(n)
}
