//! Deterministic fallback board data.
//!
//! Used when the persistence service is unreachable (demo mode) and to seed a
//! fresh account that has no columns yet. Pure data generation, no side
//! effects.

use crate::model::{Column, Priority, Task};

/// Columns plus seed tasks produced by [`mock_board`].
#[derive(Debug, Clone)]
pub struct MockBoard {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

/// Default lanes for a new board: (name, color).
const DEFAULT_COLUMNS: [(&str, &str); 4] = [
    ("To Do", "#6366f1"),
    ("In Progress", "#f59e0b"),
    ("Review", "#8b5cf6"),
    ("Done", "#22c55e"),
];

/// Generate the default board: four columns at positions 0-3 and one seed
/// task per column, each at position 0 within its column.
///
/// IDs are request-time-unique (millisecond timestamp + slot index). That is
/// the only uniqueness guarantee: two outputs of this function must not be
/// persisted into the same store without re-keying.
pub fn mock_board(user_id: &str, board_id: &str) -> MockBoard {
    let stamp = chrono::Utc::now().timestamp_millis();
    let now = crate::model::now_rfc3339();

    let columns: Vec<Column> = DEFAULT_COLUMNS
        .iter()
        .enumerate()
        .map(|(slot, (name, color))| Column {
            id: format!("col-{stamp}-{slot}"),
            board_id: board_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            position: slot,
            user_id: user_id.to_string(),
            created_at: now.clone(),
        })
        .collect();

    let seeds = [
        (
            "Welcome to AI Task Board!",
            "This is your first AI-powered task. Try using the command bar below to create more tasks with natural language.",
            Priority::High,
            vec!["welcome", "ai-generated"],
            true,
        ),
        (
            "Set up project requirements",
            "Define the scope and requirements for the new project",
            Priority::Medium,
            vec!["planning", "requirements"],
            false,
        ),
        (
            "Code review for authentication",
            "Review the authentication implementation and security measures",
            Priority::High,
            vec!["security", "review"],
            false,
        ),
        (
            "Deploy to production",
            "Successfully deployed the application to production environment",
            Priority::Low,
            vec!["deployment", "completed"],
            false,
        ),
    ];

    let tasks: Vec<Task> = seeds
        .iter()
        .enumerate()
        .map(|(slot, (title, description, priority, tags, ai))| Task {
            id: format!("task-{stamp}-{slot}"),
            title: title.to_string(),
            description: Some(description.to_string()),
            column_id: columns[slot].id.clone(),
            board_id: board_id.to_string(),
            position: 0,
            priority: *priority,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ai_generated: *ai,
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        })
        .collect();

    MockBoard { columns, tasks }
}
