use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Project;
use crate::error::ApiError;

/// Fields a project update may change. Absent fields keep their value;
/// present fields must still satisfy the presence validations.
#[derive(Debug, Default)]
pub struct ProjectChanges {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub struct ProjectService {
    pool: SqlitePool,
}

impl ProjectService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Anonymous listing: every project.
    pub async fn list_all(&self) -> Result<Vec<Project>, ApiError> {
        let projects = sqlx::query_as("SELECT * FROM projects ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(projects)
    }

    /// Projects visible to an authenticated caller: owned by them, or holding
    /// any issue assigned to them. Broader than the mutation rule on purpose;
    /// visibility is not edit rights.
    pub async fn list_visible_to(&self, user_id: Uuid) -> Result<Vec<Project>, ApiError> {
        let projects = sqlx::query_as(
            "SELECT DISTINCT p.* FROM projects p \
             LEFT JOIN issues i ON i.project_id = p.id \
             WHERE p.user_id = ?1 OR i.assignee_id = ?1 \
             ORDER BY p.created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(projects)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Project>, ApiError> {
        let project = sqlx::query_as("SELECT * FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Create a project owned by `owner`. Ownership is fixed here and never
    /// reassigned.
    pub async fn create(
        &self,
        owner: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Project, ApiError> {
        validate_fields(name, description)?;

        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            user_id: owner,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO projects (id, name, description, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.user_id)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(project)
    }

    /// Apply changes to an already-authorized project.
    pub async fn update(
        &self,
        project: &Project,
        changes: ProjectChanges,
    ) -> Result<Project, ApiError> {
        let name = changes.name.unwrap_or_else(|| project.name.clone());
        let description = changes
            .description
            .unwrap_or_else(|| project.description.clone());
        validate_fields(&name, &description)?;

        let updated_at = Utc::now();
        sqlx::query(
            "UPDATE projects SET name = ?1, description = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(&name)
        .bind(&description)
        .bind(updated_at)
        .bind(project.id)
        .execute(&self.pool)
        .await?;

        Ok(Project {
            name,
            description,
            updated_at,
            ..project.clone()
        })
    }

    /// Delete an already-authorized project. Its issues are nullified, not
    /// deleted: they survive orphaned with no project reference. Preserved
    /// from the original system as-is; see DESIGN.md before changing.
    pub async fn delete(&self, project: &Project) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        sqlx::query("UPDATE issues SET project_id = NULL WHERE project_id = ?1")
            .bind(project.id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(project.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            tx.rollback().await.map_err(ApiError::from)?;
            return Err(ApiError::not_found("Record not found"));
        }

        tx.commit().await.map_err(ApiError::from)?;
        Ok(())
    }
}

fn validate_fields(name: &str, description: &str) -> Result<(), ApiError> {
    let mut field_errors = HashMap::new();
    if name.trim().is_empty() {
        field_errors.insert("name".to_string(), "can't be blank".to_string());
    }
    if description.trim().is_empty() {
        field_errors.insert("description".to_string(), "can't be blank".to_string());
    }
    if field_errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation_error("Validation failed", field_errors))
    }
}
