// Issue endpoints, nested under a project. Browsing requires authentication;
// editing and deleting require the caller to be the creator. The assignee is
// a delegation target only and holds no rights here.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::policy::{authorize, Resource};
use crate::database::models::{Comment, Issue};
use crate::middleware::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::issue_service::{IssueChanges, NewIssue};
use crate::services::{ChainLoader, CommentService, IssueService};

#[derive(Debug, Deserialize)]
pub struct IssueParams {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct IssueDetail {
    pub issue: Issue,
    pub comments: Vec<Comment>,
}

/// GET /projects/:project_id/issues
pub async fn issue_list(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Vec<Issue>> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, None, None)
        .await?;
    let issues = IssueService::new(pool)
        .list_for_project(chain.project.id)
        .await?;
    Ok(ApiResponse::success(issues))
}

/// GET /projects/:project_id/issues/:issue_id - issue detail with comments
pub async fn issue_show(
    State(pool): State<SqlitePool>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<IssueDetail> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, Some(issue_id), None)
        .await?;
    let issue = chain.issue.expect("issue loaded by chain");
    let comments = CommentService::new(pool).list_for_issue(issue.id).await?;

    Ok(ApiResponse::success(IssueDetail { issue, comments }))
}

/// POST /projects/:project_id/issues - creator fixed to the caller
pub async fn issue_create(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    axum::Json(params): axum::Json<IssueParams>,
) -> ApiResult<Issue> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, None, None)
        .await?;

    let issue = IssueService::new(pool)
        .create(
            &chain.project,
            caller.user_id,
            NewIssue {
                title: params.title.unwrap_or_default(),
                description: params.description.unwrap_or_default(),
                status: params.status.unwrap_or_default(),
                assignee_id: params.assignee_id,
            },
        )
        .await?;

    Ok(ApiResponse::created(issue))
}

/// PUT /projects/:project_id/issues/:issue_id - creator only
pub async fn issue_update(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
    axum::Json(params): axum::Json<IssueParams>,
) -> ApiResult<Issue> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, Some(issue_id), None)
        .await?;
    let issue = chain.issue.expect("issue loaded by chain");
    authorize(&caller, &Resource::Issue(&issue))?;

    let issue = IssueService::new(pool)
        .update(
            &issue,
            IssueChanges {
                title: params.title,
                description: params.description,
                status: params.status,
                assignee_id: params.assignee_id,
            },
        )
        .await?;

    Ok(ApiResponse::success(issue))
}

/// DELETE /projects/:project_id/issues/:issue_id - creator only; comments go
/// with the issue
pub async fn issue_delete(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path((project_id, issue_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, Some(issue_id), None)
        .await?;
    let issue = chain.issue.expect("issue loaded by chain");
    authorize(&caller, &Resource::Issue(&issue))?;

    IssueService::new(pool).delete(&issue).await?;
    Ok(ApiResponse::<()>::no_content())
}
