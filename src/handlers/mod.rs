// Handlers are grouped by resource; routes follow the nested shape
// /projects/:project_id/issues/:issue_id/comments/:comment_id.
//
// Three tiers of access:
// - public:    root, health, register, login
// - read-open: project listing and detail (anonymous allowed, a presented
//              token is still validated)
// - protected: everything else (JWT required; mutations additionally pass
//              the ownership gate)

pub mod auth;
pub mod comments;
pub mod issues;
pub mod projects;

use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::manager;
use crate::middleware::{jwt_auth_middleware, optional_jwt_auth_middleware};

pub fn router(pool: SqlitePool) -> Router {
    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let read_open = Router::new()
        .route("/projects", get(projects::project_list))
        .route("/projects/:project_id", get(projects::project_show))
        .layer(from_fn(optional_jwt_auth_middleware));

    let protected = Router::new()
        .route("/auth/whoami", get(auth::whoami))
        .route("/auth/user", delete(auth::user_delete))
        .route("/projects", post(projects::project_create))
        .route(
            "/projects/:project_id",
            put(projects::project_update).delete(projects::project_delete),
        )
        .route(
            "/projects/:project_id/issues",
            get(issues::issue_list).post(issues::issue_create),
        )
        .route(
            "/projects/:project_id/issues/:issue_id",
            get(issues::issue_show)
                .put(issues::issue_update)
                .delete(issues::issue_delete),
        )
        .route(
            "/projects/:project_id/issues/:issue_id/comments",
            post(comments::comment_create),
        )
        .route(
            "/projects/:project_id/issues/:issue_id/comments/:comment_id",
            delete(comments::comment_delete),
        )
        .layer(from_fn(jwt_auth_middleware));

    Router::new()
        .merge(public)
        .merge(read_open)
        .merge(protected)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Tracker API",
            "version": version,
            "description": "Project and issue tracker with ownership-based authorization",
            "endpoints": {
                "auth": "/auth/register, /auth/login (public), /auth/whoami, /auth/user (protected)",
                "projects": "/projects[/:project_id] (list/show public)",
                "issues": "/projects/:project_id/issues[/:issue_id] (protected)",
                "comments": "/projects/:project_id/issues/:issue_id/comments[/:comment_id] (protected)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(pool): axum::extract::State<SqlitePool>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": { "status": "degraded", "timestamp": now, "database_error": e.to_string() }
            })),
        ),
    }
}
