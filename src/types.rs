/// Shared types used across the codebase
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Issue workflow status. A closed enumeration with no transition
/// restrictions: any status can follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum IssueStatus {
    #[serde(rename = "Active")]
    #[sqlx(rename = "Active")]
    Active,
    #[serde(rename = "On hold")]
    #[sqlx(rename = "On hold")]
    OnHold,
    #[serde(rename = "Resolved")]
    #[sqlx(rename = "Resolved")]
    Resolved,
    #[serde(rename = "Closed")]
    #[sqlx(rename = "Closed")]
    Closed,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 4] = [
        IssueStatus::Active,
        IssueStatus::OnHold,
        IssueStatus::Resolved,
        IssueStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Active => "Active",
            IssueStatus::OnHold => "On hold",
            IssueStatus::Resolved => "Resolved",
            IssueStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(IssueStatus::Active),
            "On hold" => Ok(IssueStatus::OnHold),
            "Resolved" => Ok(IssueStatus::Resolved),
            "Closed" => Ok(IssueStatus::Closed),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}
