//! Ordered loader for the nested resource chain Project → Issue → Comment.
//!
//! Each link must exist and belong to its claimed parent; the first broken
//! link short-circuits with a uniform NotFound that never says which ancestor
//! was missing. An issue id that exists under a different project is exactly
//! as missing as one that does not exist at all.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Comment, Issue, Project};
use crate::error::ApiError;

#[derive(Debug)]
pub struct ResourceChain {
    pub project: Project,
    pub issue: Option<Issue>,
    pub comment: Option<Comment>,
}

pub struct ChainLoader {
    pool: SqlitePool,
}

impl ChainLoader {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(
        &self,
        project_id: Uuid,
        issue_id: Option<Uuid>,
        comment_id: Option<Uuid>,
    ) -> Result<ResourceChain, ApiError> {
        let project: Project = sqlx::query_as("SELECT * FROM projects WHERE id = ?1")
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(not_found)?;

        let issue: Option<Issue> = match issue_id {
            Some(issue_id) => Some(
                sqlx::query_as("SELECT * FROM issues WHERE id = ?1 AND project_id = ?2")
                    .bind(issue_id)
                    .bind(project.id)
                    .fetch_optional(&self.pool)
                    .await?
                    .ok_or_else(not_found)?,
            ),
            None => None,
        };

        let comment: Option<Comment> = match comment_id {
            Some(comment_id) => {
                // Routing only nests comments under an issue
                let issue = issue
                    .as_ref()
                    .ok_or_else(|| ApiError::internal_server_error("comment lookup without issue"))?;
                Some(
                    sqlx::query_as("SELECT * FROM comments WHERE id = ?1 AND issue_id = ?2")
                        .bind(comment_id)
                        .bind(issue.id)
                        .fetch_optional(&self.pool)
                        .await?
                        .ok_or_else(not_found)?,
                )
            }
            None => None,
        };

        Ok(ResourceChain {
            project,
            issue,
            comment,
        })
    }
}

fn not_found() -> ApiError {
    ApiError::not_found("Record not found")
}
