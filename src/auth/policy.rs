//! Ownership policy applied before every mutating operation.
//!
//! One rule, three resource kinds: a Project is owned by its owner, an Issue
//! by its creator, a Comment by its author. Ownership equality is the whole
//! policy: no roles, no delegation, no admin override. The assignee of an
//! issue carries no rights over it.

use uuid::Uuid;

use crate::database::models::{Comment, Issue, Project};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

/// The message the original UI shows on a denied mutation; preserved verbatim.
pub const NOT_AUTHORIZED: &str = "Not authorized";

/// A mutable resource, tagged by kind so the one equality check covers all
/// three controllers.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Project(&'a Project),
    Issue(&'a Issue),
    Comment(&'a Comment),
}

impl<'a> Resource<'a> {
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Project(_) => "project",
            Resource::Issue(_) => "issue",
            Resource::Comment(_) => "comment",
        }
    }

    /// The controlling user. `None` for issues whose creator was deleted and
    /// detached; such issues are no longer editable by anyone.
    pub fn owner(&self) -> Option<Uuid> {
        match self {
            Resource::Project(p) => Some(p.user_id),
            Resource::Issue(i) => i.creator_id,
            Resource::Comment(c) => Some(c.user_id),
        }
    }
}

/// Allow iff the caller is the resource's owner. Denial aborts the operation
/// before any mutation happens; the resource's existence is not hidden.
pub fn authorize(caller: &AuthUser, resource: &Resource<'_>) -> Result<(), ApiError> {
    match resource.owner() {
        Some(owner) if owner == caller.user_id => Ok(()),
        _ => {
            tracing::debug!(
                "denied {} mutation for caller {}",
                resource.kind(),
                caller.user_id
            );
            Err(ApiError::forbidden(NOT_AUTHORIZED))
        }
    }
}
