// Project endpoints. Listing and detail are read-open: anonymous callers see
// every project, authenticated callers see the owner-or-assignee visibility
// slice. Mutations require the caller to be the owner.

use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::policy::{authorize, Resource};
use crate::database::models::{Issue, Project};
use crate::middleware::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ChainLoader, IssueService, ProjectService};

#[derive(Debug, Deserialize)]
pub struct ProjectParams {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub issues: Vec<Issue>,
}

/// GET /projects - visibility rule, not ownership: anonymous callers get all
/// projects, authenticated callers get projects they own or are assigned in.
pub async fn project_list(
    State(pool): State<SqlitePool>,
    caller: Option<Extension<AuthUser>>,
) -> ApiResult<Vec<Project>> {
    let service = ProjectService::new(pool);
    let projects = match caller {
        Some(Extension(user)) => service.list_visible_to(user.user_id).await?,
        None => service.list_all().await?,
    };
    Ok(ApiResponse::success(projects))
}

/// GET /projects/:project_id - project detail with its issues
pub async fn project_show(
    State(pool): State<SqlitePool>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<ProjectDetail> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, None, None)
        .await?;
    let issues = IssueService::new(pool)
        .list_for_project(chain.project.id)
        .await?;

    Ok(ApiResponse::success(ProjectDetail {
        project: chain.project,
        issues,
    }))
}

/// POST /projects - create a project owned by the caller
pub async fn project_create(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    axum::Json(params): axum::Json<ProjectParams>,
) -> ApiResult<Project> {
    let project = ProjectService::new(pool)
        .create(
            caller.user_id,
            params.name.as_deref().unwrap_or_default(),
            params.description.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::created(project))
}

/// PUT /projects/:project_id - owner only
pub async fn project_update(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
    axum::Json(params): axum::Json<ProjectParams>,
) -> ApiResult<Project> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, None, None)
        .await?;
    authorize(&caller, &Resource::Project(&chain.project))?;

    let project = ProjectService::new(pool)
        .update(
            &chain.project,
            crate::services::project_service::ProjectChanges {
                name: params.name,
                description: params.description,
            },
        )
        .await?;

    Ok(ApiResponse::success(project))
}

/// DELETE /projects/:project_id - owner only; issues are nullified, not
/// deleted (preserved original behavior)
pub async fn project_delete(
    State(pool): State<SqlitePool>,
    Extension(caller): Extension<AuthUser>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<()> {
    let chain = ChainLoader::new(pool.clone())
        .load(project_id, None, None)
        .await?;
    authorize(&caller, &Resource::Project(&chain.project))?;

    ProjectService::new(pool).delete(&chain.project).await?;
    Ok(ApiResponse::<()>::no_content())
}
