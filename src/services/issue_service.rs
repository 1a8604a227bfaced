use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Issue, Project};
use crate::error::ApiError;
use crate::services::UserService;
use crate::types::IssueStatus;

/// Required fields for creating an issue. Status arrives as text and is
/// parsed against the closed enumeration at this boundary.
#[derive(Debug)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assignee_id: Option<Uuid>,
}

/// Partial update; provided fields are re-validated like on create.
#[derive(Debug, Default)]
pub struct IssueChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee_id: Option<Uuid>,
}

pub struct IssueService {
    pool: SqlitePool,
}

impl IssueService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<Issue>, ApiError> {
        let issues =
            sqlx::query_as("SELECT * FROM issues WHERE project_id = ?1 ORDER BY created_at")
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(issues)
    }

    /// Create an issue under `project` with `creator` fixed for the lifetime
    /// of the row. Everything is required; problems are gathered into one
    /// validation failure rather than reported one at a time.
    pub async fn create(
        &self,
        project: &Project,
        creator: Uuid,
        new_issue: NewIssue,
    ) -> Result<Issue, ApiError> {
        let mut field_errors = HashMap::new();

        if new_issue.title.trim().is_empty() {
            field_errors.insert("title".to_string(), "can't be blank".to_string());
        }
        if new_issue.description.trim().is_empty() {
            field_errors.insert("description".to_string(), "can't be blank".to_string());
        }

        let status = parse_status(&new_issue.status, &mut field_errors);
        let assignee_id = self
            .check_assignee(new_issue.assignee_id, &mut field_errors)
            .await?;

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Validation failed", field_errors));
        }

        let issue = Issue {
            id: Uuid::new_v4(),
            title: new_issue.title,
            description: new_issue.description,
            // field_errors is empty here, so both parsed values are present
            status: status.unwrap_or(IssueStatus::Active),
            project_id: Some(project.id),
            creator_id: Some(creator),
            assignee_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO issues \
             (id, title, description, status, project_id, creator_id, assignee_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(issue.id)
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(issue.status)
        .bind(issue.project_id)
        .bind(issue.creator_id)
        .bind(issue.assignee_id)
        .bind(issue.created_at)
        .bind(issue.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(issue)
    }

    /// Apply changes to an already-authorized issue.
    pub async fn update(&self, issue: &Issue, changes: IssueChanges) -> Result<Issue, ApiError> {
        let mut field_errors = HashMap::new();

        let title = changes.title.unwrap_or_else(|| issue.title.clone());
        if title.trim().is_empty() {
            field_errors.insert("title".to_string(), "can't be blank".to_string());
        }

        let description = changes
            .description
            .unwrap_or_else(|| issue.description.clone());
        if description.trim().is_empty() {
            field_errors.insert("description".to_string(), "can't be blank".to_string());
        }

        let status = match changes.status {
            Some(raw) => parse_status(&raw, &mut field_errors).unwrap_or(issue.status),
            None => issue.status,
        };

        let assignee_id = match changes.assignee_id {
            Some(candidate) => self
                .check_assignee(Some(candidate), &mut field_errors)
                .await?,
            None => issue.assignee_id,
        };

        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Validation failed", field_errors));
        }

        let updated_at = Utc::now();
        sqlx::query(
            "UPDATE issues SET title = ?1, description = ?2, status = ?3, assignee_id = ?4, \
             updated_at = ?5 WHERE id = ?6",
        )
        .bind(&title)
        .bind(&description)
        .bind(status)
        .bind(assignee_id)
        .bind(updated_at)
        .bind(issue.id)
        .execute(&self.pool)
        .await?;

        Ok(Issue {
            title,
            description,
            status,
            assignee_id,
            updated_at,
            ..issue.clone()
        })
    }

    /// Delete an already-authorized issue together with its comments.
    pub async fn delete(&self, issue: &Issue) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        sqlx::query("DELETE FROM comments WHERE issue_id = ?1")
            .bind(issue.id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM issues WHERE id = ?1")
            .bind(issue.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(ApiError::from)?;
            return Err(ApiError::not_found("Record not found"));
        }

        tx.commit().await.map_err(ApiError::from)?;
        Ok(())
    }

    /// The assignee is required and must reference an existing user. A bad
    /// reference is a validation problem, not a NotFound: it comes from form
    /// input, not from the URL chain.
    async fn check_assignee(
        &self,
        assignee_id: Option<Uuid>,
        field_errors: &mut HashMap<String, String>,
    ) -> Result<Option<Uuid>, ApiError> {
        match assignee_id {
            None => {
                field_errors.insert("assignee_id".to_string(), "can't be blank".to_string());
                Ok(None)
            }
            Some(id) => {
                if UserService::new(self.pool.clone()).exists(id).await? {
                    Ok(Some(id))
                } else {
                    field_errors.insert("assignee_id".to_string(), "does not exist".to_string());
                    Ok(None)
                }
            }
        }
    }
}

fn parse_status(raw: &str, field_errors: &mut HashMap<String, String>) -> Option<IssueStatus> {
    if raw.trim().is_empty() {
        field_errors.insert("status".to_string(), "can't be blank".to_string());
        return None;
    }
    match raw.parse::<IssueStatus>() {
        Ok(status) => Some(status),
        Err(_) => {
            field_errors.insert("status".to_string(), "is not a valid status".to_string());
            None
        }
    }
}
