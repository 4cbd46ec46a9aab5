//! Request/response payloads for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::command::Suggestion;
use crate::model::Priority;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub dev_mode: bool,
    pub auth_required: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub exp: i64,
}

/// Payload for creating a task directly from the UI. Everything but the
/// target column is optional; the defaults mirror the "click to edit" card
/// the dashboard drops onto the board.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskRequest {
    pub column_id: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_title() -> String {
    "New Task".to_string()
}

fn default_description() -> Option<String> {
    Some("Click to edit this task".to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
}

/// Drag-gesture outcome: target column container plus the slot index within
/// it (ignored for cross-column drops, which always append).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTaskRequest {
    pub column_id: String,
    #[serde(default)]
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}
