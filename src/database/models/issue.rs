use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::IssueStatus;

/// An issue nested under a project. All three references are required at
/// creation; they go NULL only when the referenced row is deleted:
/// project_id when its project is removed (the issue survives orphaned),
/// creator_id/assignee_id when that user is removed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: IssueStatus,
    pub project_id: Option<Uuid>,
    pub creator_id: Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
