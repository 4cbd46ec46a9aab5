//! Core entity records for the task board.
//!
//! Pure data contracts shared by the board store, the persistence gateway,
//! and the HTTP layer. These types intentionally perform no validation beyond
//! structural typing (an empty task title is legal); input validation is a
//! presentation concern. Field names serialize as camelCase to match the
//! dashboard's JSON surface.

use serde::{Deserialize, Serialize};

/// Task priority. Serialized lowercase on every surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = UnknownPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(UnknownPriority(other.to_string())),
        }
    }
}

/// Returned when a persisted priority string is not one of low/medium/high.
#[derive(Debug, thiserror::Error)]
#[error("unknown priority: {0}")]
pub struct UnknownPriority(pub String);

/// A unit of work belonging to exactly one column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable unique id, assigned by the writer before any persistence call.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub column_id: String,
    pub board_id: String,
    /// Dense 0-based rank within the owning column.
    pub position: usize,
    pub priority: Priority,
    /// Ordered, duplicate-free (case-sensitive compare).
    pub tags: Vec<String>,
    /// Provenance flag: true when the task was synthesized from a command.
    pub ai_generated: bool,
    pub user_id: String,
    /// RFC 3339 timestamps; `updated_at` never precedes `created_at`.
    pub created_at: String,
    pub updated_at: String,
}

/// An ordered status lane on a board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub board_id: String,
    pub name: String,
    /// Visual/status class token, e.g. `#6366f1`.
    pub color: String,
    /// Dense 0-based rank within the board, ascending = left-to-right.
    pub position: usize,
    pub user_id: String,
    pub created_at: String,
}

/// Top-level container for one set of columns and tasks.
///
/// Only one board is active in the current scope, but nothing here assumes
/// singularity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Current RFC 3339 timestamp, the stamp used for `created_at`/`updated_at`.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_round_trip() {
        for p in [Priority::Low, Priority::Medium, Priority::High] {
            let parsed: Priority = p.to_string().parse().unwrap();
            assert_eq!(parsed, p);
        }
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task {
            id: "task-1".to_string(),
            title: String::new(), // empty titles are legal by design
            description: None,
            column_id: "col-1".to_string(),
            board_id: "board-1".to_string(),
            position: 0,
            priority: Priority::High,
            tags: vec!["welcome".to_string()],
            ai_generated: true,
            user_id: "u1".to_string(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
            updated_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["columnId"], "col-1");
        assert_eq!(json["aiGenerated"], true);
        assert_eq!(json["priority"], "high");
        // absent description is omitted, not null
        assert!(json.get("description").is_none());
    }
}
