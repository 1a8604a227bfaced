use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::User;
use crate::error::ApiError;

/// User directory. Registration and credential checks stand in for the
/// external authentication provider; deletion runs the full ownership
/// cascade in one transaction.
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Hash a password to a stable digest. Not a production KDF; credential
    /// strength is out of scope for this service.
    fn digest(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub async fn register(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let mut field_errors = HashMap::new();
        if email.trim().is_empty() {
            field_errors.insert("email".to_string(), "can't be blank".to_string());
        }
        if name.trim().is_empty() {
            field_errors.insert("name".to_string(), "can't be blank".to_string());
        }
        if password.is_empty() {
            field_errors.insert("password".to_string(), "can't be blank".to_string());
        }
        if !field_errors.is_empty() {
            return Err(ApiError::validation_error("Validation failed", field_errors));
        }

        if self.email_taken(email).await? {
            return Err(ApiError::conflict(format!(
                "Email '{}' is already registered",
                email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_digest: Self::digest(password),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        sqlx::query(
            "INSERT INTO users (id, email, name, password_digest, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_digest)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::info!("Registered user {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Check credentials; the failure message never says which part was wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) if user.password_digest == Self::digest(password) => Ok(user),
            _ => Err(ApiError::unauthorized("Invalid email or password")),
        }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn exists(&self, id: Uuid) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    async fn email_taken(&self, email: &str) -> Result<bool, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }

    /// Delete a user and everything they own, atomically:
    /// - their projects, the issues under those projects, and those issues'
    ///   comments are removed
    /// - every comment they authored anywhere is removed
    /// - issues they created or were assigned elsewhere survive with the
    ///   reference cleared
    pub async fn delete_cascade(&self, user_id: Uuid) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::from)?;

        let owned_projects = "SELECT id FROM projects WHERE user_id = ?1";

        sqlx::query(&format!(
            "DELETE FROM comments WHERE issue_id IN \
             (SELECT id FROM issues WHERE project_id IN ({owned_projects}))"
        ))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "DELETE FROM issues WHERE project_id IN ({owned_projects})"
        ))
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM projects WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        // Detach, not delete: participation without ownership
        sqlx::query("UPDATE issues SET creator_id = NULL WHERE creator_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE issues SET assignee_id = NULL WHERE assignee_id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            // Nothing to delete; roll the cascade back untouched
            tx.rollback().await.map_err(ApiError::from)?;
            return Err(ApiError::not_found("Record not found"));
        }

        tx.commit().await.map_err(ApiError::from)?;
        tracing::info!("Deleted user {} with owned resources", user_id);
        Ok(())
    }
}
