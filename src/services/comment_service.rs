use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Comment, Issue};
use crate::error::ApiError;

pub struct CommentService {
    pool: SqlitePool,
}

impl CommentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_for_issue(&self, issue_id: Uuid) -> Result<Vec<Comment>, ApiError> {
        let comments =
            sqlx::query_as("SELECT * FROM comments WHERE issue_id = ?1 ORDER BY created_at")
                .bind(issue_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(comments)
    }

    pub async fn create(
        &self,
        issue: &Issue,
        author: Uuid,
        body: &str,
    ) -> Result<Comment, ApiError> {
        if body.trim().is_empty() {
            return Err(ApiError::invalid_field("body", "can't be blank"));
        }

        let comment = Comment {
            id: Uuid::new_v4(),
            body: body.to_string(),
            issue_id: issue.id,
            user_id: author,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO comments (id, body, issue_id, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(comment.id)
        .bind(&comment.body)
        .bind(comment.issue_id)
        .bind(comment.user_id)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(comment)
    }

    /// Delete an already-authorized comment. Deleting a row that vanished in
    /// the meantime is reported as NotFound, never as corruption.
    pub async fn delete(&self, comment: &Comment) -> Result<(), ApiError> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(comment.id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(ApiError::not_found("Record not found"));
        }
        Ok(())
    }
}
