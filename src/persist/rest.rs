//! PostgREST-backed persistence gateway.
//!
//! Record shapes here mirror the entity model in the service's own dialect:
//! snake_case columns, `tags` as a JSON-encoded string, `ai_generated` as a
//! 0/1 integer. Encode/decode happens in this module only; everything above
//! the gateway works with native arrays and booleans.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{BoardPersistence, TaskPatch};
use crate::model::{Column, Task};

/// Client for the remote board store's REST API.
pub struct RestPersistence {
    client: Client,
    url: String,
    service_key: String,
}

impl RestPersistence {
    /// Create a new gateway client.
    pub fn new(url: &str, service_key: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
        }
    }

    /// Get the PostgREST URL.
    fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

#[async_trait::async_trait]
impl BoardPersistence for RestPersistence {
    async fn probe(&self) -> bool {
        let resp = self
            .client
            .get(format!("{}/columns?limit=1", self.rest_url()))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await;

        match resp {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                tracing::warn!("Persistence probe failed: {}", e);
                false
            }
        }
    }

    async fn list_columns(&self, board_id: &str, user_id: &str) -> anyhow::Result<Vec<Column>> {
        let resp = self
            .client
            .get(format!(
                "{}/columns?board_id=eq.{}&user_id=eq.{}&order=position.asc",
                self.rest_url(),
                board_id,
                user_id
            ))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to list columns: {} - {}", status, text);
        }

        let records: Vec<ColumnRecord> = resp.json().await?;
        Ok(records.into_iter().map(ColumnRecord::into_column).collect())
    }

    async fn list_tasks(&self, board_id: &str, user_id: &str) -> anyhow::Result<Vec<Task>> {
        let resp = self
            .client
            .get(format!(
                "{}/tasks?board_id=eq.{}&user_id=eq.{}&order=position.asc",
                self.rest_url(),
                board_id,
                user_id
            ))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to list tasks: {} - {}", status, text);
        }

        let records: Vec<TaskRecord> = resp.json().await?;
        Ok(records.into_iter().map(TaskRecord::into_task).collect())
    }

    async fn create_columns(&self, columns: &[Column]) -> anyhow::Result<()> {
        let records: Vec<ColumnRecord> = columns.iter().map(ColumnRecord::from_column).collect();
        let resp = self
            .client
            .post(format!("{}/columns", self.rest_url()))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&records)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to create columns: {} - {}", status, text);
        }

        Ok(())
    }

    async fn create_task(&self, task: &Task) -> anyhow::Result<()> {
        let record = TaskRecord::from_task(task);
        let resp = self
            .client
            .post(format!("{}/tasks", self.rest_url()))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", "application/json")
            .header("Prefer", "return=minimal")
            .json(&record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to create task: {} - {}", status, text);
        }

        Ok(())
    }

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> anyhow::Result<()> {
        let record = TaskPatchRecord::from_patch(patch);
        let resp = self
            .client
            .patch(format!("{}/tasks?id=eq.{}", self.rest_url(), id))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .header("Content-Type", "application/json")
            .json(&record)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to update task: {} - {}", status, text);
        }

        Ok(())
    }

    async fn delete_task(&self, id: &str) -> anyhow::Result<()> {
        let resp = self
            .client
            .delete(format!("{}/tasks?id=eq.{}", self.rest_url(), id))
            .header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Failed to delete task: {} - {}", status, text);
        }

        Ok(())
    }
}

/// Task row as stored by the persistence service.
#[derive(Debug, Serialize, Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    column_id: String,
    board_id: String,
    position: i64,
    priority: String,
    /// JSON-encoded string array.
    tags: String,
    /// Stored as 0/1.
    ai_generated: i64,
    user_id: String,
    created_at: String,
    updated_at: String,
}

impl TaskRecord {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            column_id: task.column_id.clone(),
            board_id: task.board_id.clone(),
            position: task.position as i64,
            priority: task.priority.to_string(),
            tags: encode_tags(&task.tags),
            ai_generated: i64::from(task.ai_generated),
            user_id: task.user_id.clone(),
            created_at: task.created_at.clone(),
            updated_at: task.updated_at.clone(),
        }
    }

    /// Decode into the in-memory shape, defaulting on mismatches rather than
    /// failing: unparsable tags become empty, an unknown priority becomes
    /// medium.
    fn into_task(self) -> Task {
        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            column_id: self.column_id,
            board_id: self.board_id,
            position: self.position.max(0) as usize,
            priority: self.priority.parse().unwrap_or_default(),
            tags: decode_tags(&self.tags),
            ai_generated: self.ai_generated > 0,
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Column row as stored by the persistence service.
#[derive(Debug, Serialize, Deserialize)]
struct ColumnRecord {
    id: String,
    board_id: String,
    name: String,
    color: String,
    position: i64,
    user_id: String,
    created_at: String,
}

impl ColumnRecord {
    fn from_column(column: &Column) -> Self {
        Self {
            id: column.id.clone(),
            board_id: column.board_id.clone(),
            name: column.name.clone(),
            color: column.color.clone(),
            position: column.position as i64,
            user_id: column.user_id.clone(),
            created_at: column.created_at.clone(),
        }
    }

    fn into_column(self) -> Column {
        Column {
            id: self.id,
            board_id: self.board_id,
            name: self.name,
            color: self.color,
            position: self.position.max(0) as usize,
            user_id: self.user_id,
            created_at: self.created_at,
        }
    }
}

/// Wire form of [`TaskPatch`]: only the present fields are sent.
#[derive(Debug, Serialize)]
struct TaskPatchRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<String>,
}

impl TaskPatchRecord {
    fn from_patch(patch: &TaskPatch) -> Self {
        Self {
            title: patch.title.clone(),
            description: patch.description.clone(),
            priority: patch.priority.map(|p| p.to_string()),
            tags: patch.tags.as_deref().map(encode_tags),
            column_id: patch.column_id.clone(),
            position: patch.position.map(|p| p as i64),
            updated_at: patch.updated_at.clone(),
        }
    }
}

fn encode_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn decode_tags(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
