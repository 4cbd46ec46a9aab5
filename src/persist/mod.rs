//! Persistence gateway for the remote board store.
//!
//! The board store only ever sees this trait; the live implementation speaks
//! PostgREST over HTTP. Every operation is at-most-once (the gateway never
//! retries) and any failure is the caller's signal to continue in local-only
//! mode. The gateway never originates ids; all ids arrive already assigned.

mod rest;

pub use rest::RestPersistence;

use async_trait::async_trait;
use serde::Serialize;

use crate::model::{Column, Priority, Task};

/// Partial task update. `None` fields are left untouched by the store.
/// `updated_at` is always stamped by the writer.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub column_id: Option<String>,
    pub position: Option<usize>,
    pub updated_at: Option<String>,
}

/// Capability contract against the remote persistence service.
#[async_trait]
pub trait BoardPersistence: Send + Sync {
    /// Minimal availability read. `false` on any failure; never an error.
    async fn probe(&self) -> bool;

    /// Columns of a board, ordered by position ascending.
    async fn list_columns(&self, board_id: &str, user_id: &str) -> anyhow::Result<Vec<Column>>;

    /// Tasks of a board, ordered by position ascending.
    async fn list_tasks(&self, board_id: &str, user_id: &str) -> anyhow::Result<Vec<Task>>;

    async fn create_columns(&self, columns: &[Column]) -> anyhow::Result<()>;

    async fn create_task(&self, task: &Task) -> anyhow::Result<()>;

    async fn update_task(&self, id: &str, patch: &TaskPatch) -> anyhow::Result<()>;

    async fn delete_task(&self, id: &str) -> anyhow::Result<()>;
}
