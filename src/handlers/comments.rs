// Comment endpoints, nested under an issue. Any authenticated user may
// comment; only the author may delete.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::policy::{authorize, Resource};
use crate::database::models::Comment;
use crate::middleware::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ChainLoader, CommentService};

#[derive(Debug, Deserialize)]
pub struct CommentParams {
    pub body: Option<String>,
}

/// POST /projects/:project_id/issues/:issue_id/comments
pub async fn comment_create(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    axum::Json(params): axum::Json<CommentParams>,
) -> ApiResult<Comment> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, Some(issue_id), None)
        .await?;
    let issue = chain.issue.expect("issue loaded by chain");

    let comment = CommentService::new(pool)
        .create(
            &issue,
            caller.user_id,
            params.body.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::created(comment))
}

/// DELETE /projects/:project_id/issues/:issue_id/comments/:comment_id -
/// author only
pub async fn comment_delete(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path((project_id, issue_id, comment_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<()> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, Some(issue_id), Some(comment_id))
        .await?;
    let comment = chain.comment.expect("comment loaded by chain");
    authorize(&caller, &Resource::Comment(&comment))?;

    CommentService::new(pool).delete(&comment).await?;
    Ok(ApiResponse::<()>::no_content())
}
