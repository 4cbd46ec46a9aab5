//! Board state store: the single writer of UI-visible board state.
//!
//! The store owns the authoritative in-memory columns and tasks for the
//! active board. Every mutation is a synchronous state transition under the
//! write lock, followed by a best-effort, result-ignored durability attempt
//! against the persistence gateway. The UI never waits on the network to see
//! a change, and a remote failure never rolls the in-memory state back; the
//! store downgrades to local-only mode instead.

pub mod fallback;
pub mod reorder;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::command::TaskDraft;
use crate::model::{now_rfc3339, Column, Task};
use crate::persist::{BoardPersistence, TaskPatch};
use reorder::Placement;

/// Errors surfaced to the caller of a board operation.
///
/// These cover caller mistakes only; persistence failures never appear here.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("unknown task: {0}")]
    UnknownTask(String),
    #[error("board has no columns")]
    NoColumns,
    #[error("board state is not loaded")]
    NotLoaded,
}

#[derive(Default)]
struct BoardState {
    user_id: Option<String>,
    columns: Vec<Column>,
    tasks: Vec<Task>,
}

/// Read-only view handed to the presentation layer. Columns are ordered
/// left-to-right; tasks by owning column, then position.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
    pub demo_mode: bool,
}

/// In-memory source of truth for one board.
pub struct BoardStore {
    gateway: Option<Arc<dyn BoardPersistence>>,
    board_id: String,
    state: RwLock<BoardState>,
    /// One-way flag: starts true when a gateway exists, drops to false on the
    /// first failed probe or write and never recovers within a session.
    persistence_enabled: AtomicBool,
}

impl BoardStore {
    /// Create a store over an optional persistence gateway. `None` means the
    /// board runs local-only from the start.
    pub fn new(gateway: Option<Arc<dyn BoardPersistence>>, board_id: impl Into<String>) -> Self {
        let has_gateway = gateway.is_some();
        Self {
            gateway,
            board_id: board_id.into(),
            state: RwLock::new(BoardState::default()),
            persistence_enabled: AtomicBool::new(has_gateway),
        }
    }

    /// True when mutations are no longer durable. Surfaced to the user as
    /// the demo-mode banner.
    pub fn demo_mode(&self) -> bool {
        !self.persistence_enabled.load(Ordering::Relaxed)
    }

    /// Load board state for `user_id`, probing the persistence service once.
    /// Subsequent calls for the same user are no-ops.
    pub async fn load(&self, user_id: &str) {
        {
            let state = self.state.read().await;
            if state.user_id.as_deref() == Some(user_id) {
                return;
            }
        }

        let mut state = self.state.write().await;
        if state.user_id.as_deref() == Some(user_id) {
            return;
        }

        let Some(gateway) = self.gateway.clone() else {
            tracing::info!("No persistence service configured, starting in demo mode");
            self.load_fallback(&mut state, user_id);
            return;
        };

        if !gateway.probe().await {
            tracing::info!("Persistence service unavailable, running in demo mode");
            self.load_fallback(&mut state, user_id);
            return;
        }

        let mut seeded_tasks: Option<Vec<Task>> = None;
        let columns = match gateway.list_columns(&self.board_id, user_id).await {
            Ok(columns) if columns.is_empty() => {
                // Fresh account: seed the default lanes and try to persist
                // them. On failure the seeds are still shown, local-only.
                let mock = fallback::mock_board(user_id, &self.board_id);
                if let Err(e) = gateway.create_columns(&mock.columns).await {
                    self.note_write_failure("create columns", &e);
                    seeded_tasks = Some(mock.tasks);
                }
                mock.columns
            }
            Ok(columns) => columns,
            Err(e) => {
                tracing::warn!("Failed to load columns, running in demo mode: {:#}", e);
                self.persistence_enabled.store(false, Ordering::Relaxed);
                self.load_fallback(&mut state, user_id);
                return;
            }
        };

        let tasks = match seeded_tasks {
            Some(tasks) => tasks,
            None => match gateway.list_tasks(&self.board_id, user_id).await {
                Ok(tasks) => tasks,
                Err(e) => {
                    // Fall back to the full mock board so every task still
                    // references a column that exists.
                    tracing::warn!("Failed to load tasks, running in demo mode: {:#}", e);
                    self.persistence_enabled.store(false, Ordering::Relaxed);
                    self.load_fallback(&mut state, user_id);
                    return;
                }
            },
        };

        *state = BoardState {
            user_id: Some(user_id.to_string()),
            columns,
            tasks,
        };
    }

    fn load_fallback(&self, state: &mut BoardState, user_id: &str) {
        self.persistence_enabled.store(false, Ordering::Relaxed);
        let mock = fallback::mock_board(user_id, &self.board_id);
        *state = BoardState {
            user_id: Some(user_id.to_string()),
            columns: mock.columns,
            tasks: mock.tasks,
        };
    }

    /// Ordered snapshot of the whole board.
    pub async fn snapshot(&self) -> BoardSnapshot {
        let state = self.state.read().await;
        let mut columns = state.columns.clone();
        columns.sort_by_key(|c| c.position);

        let mut tasks = state.tasks.clone();
        tasks.sort_by_key(|t| {
            let lane = columns
                .iter()
                .position(|c| c.id == t.column_id)
                .unwrap_or(usize::MAX);
            (lane, t.position)
        });

        BoardSnapshot {
            columns,
            tasks,
            demo_mode: self.demo_mode(),
        }
    }

    /// Tasks of one column, ordered by position.
    pub async fn tasks_in_column(&self, column_id: &str) -> Vec<Task> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    /// Append a new task at the tail of `column_id`. The task is visible
    /// immediately; the create call is best-effort.
    pub async fn add_task(
        &self,
        column_id: &str,
        draft: TaskDraft,
        ai_generated: bool,
    ) -> Result<Task, BoardError> {
        let task = {
            let mut state = self.state.write().await;
            let user_id = state.user_id.clone().ok_or(BoardError::NotLoaded)?;
            if !state.columns.iter().any(|c| c.id == column_id) {
                return Err(BoardError::UnknownColumn(column_id.to_string()));
            }

            let position = state
                .tasks
                .iter()
                .filter(|t| t.column_id == column_id)
                .count();
            let now = now_rfc3339();
            let task = Task {
                id: format!("task-{}", Uuid::new_v4()),
                title: draft.title,
                description: draft.description,
                column_id: column_id.to_string(),
                board_id: self.board_id.clone(),
                position,
                priority: draft.priority,
                tags: dedup_tags(draft.tags),
                ai_generated,
                user_id,
                created_at: now.clone(),
                updated_at: now,
            };
            state.tasks.push(task.clone());
            task
        };

        if let Some(gateway) = self.live_gateway() {
            if let Err(e) = gateway.create_task(&task).await {
                self.note_write_failure("create task", &e);
            }
        }

        Ok(task)
    }

    /// Append a command-synthesized task to the leftmost column (position 0,
    /// or the first column if none has position 0).
    pub async fn add_generated_task(&self, draft: TaskDraft) -> Result<Task, BoardError> {
        let column_id = {
            let state = self.state.read().await;
            state
                .columns
                .iter()
                .find(|c| c.position == 0)
                .or_else(|| state.columns.first())
                .map(|c| c.id.clone())
                .ok_or(BoardError::NoColumns)?
        };
        self.add_task(&column_id, draft, true).await
    }

    /// Overwrite the patched fields of a task and bump `updated_at`.
    pub async fn edit_task(&self, id: &str, patch: TaskPatch) -> Result<Task, BoardError> {
        let (task, outgoing) = {
            let mut state = self.state.write().await;
            let task = state
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;

            let tags = patch.tags.map(dedup_tags);
            if let Some(title) = &patch.title {
                task.title = title.clone();
            }
            if let Some(description) = &patch.description {
                task.description = Some(description.clone());
            }
            if let Some(priority) = patch.priority {
                task.priority = priority;
            }
            if let Some(tags) = &tags {
                task.tags = tags.clone();
            }
            task.updated_at = now_rfc3339();

            // Edits never relocate a task; only moveTask touches
            // column/position.
            let outgoing = TaskPatch {
                title: patch.title,
                description: patch.description,
                priority: patch.priority,
                tags,
                column_id: None,
                position: None,
                updated_at: Some(task.updated_at.clone()),
            };
            (task.clone(), outgoing)
        };

        if let Some(gateway) = self.live_gateway() {
            if let Err(e) = gateway.update_task(id, &outgoing).await {
                self.note_write_failure("update task", &e);
            }
        }

        Ok(task)
    }

    /// Remove a task and close the position gap it leaves in its column.
    pub async fn delete_task(&self, id: &str) -> Result<(), BoardError> {
        let writes = {
            let mut state = self.state.write().await;
            let index = state
                .tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| BoardError::UnknownTask(id.to_string()))?;
            let removed = state.tasks.remove(index);

            let plan = reorder::renumber_column(&state.tasks, &removed.column_id);
            apply_placements(&mut state.tasks, &plan)
        };

        if let Some(gateway) = self.live_gateway() {
            if let Err(e) = gateway.delete_task(id).await {
                self.note_write_failure("delete task", &e);
            }
        }
        self.persist_batch(writes).await;

        Ok(())
    }

    /// Apply a drag gesture: delegate ordering to the reorder engine, apply
    /// the plan synchronously, then dispatch every resulting write as a group
    /// of independent best-effort calls.
    ///
    /// A gesture with no effect (same slot, unknown task, missed target) is
    /// silently ignored.
    pub async fn move_task(
        &self,
        task_id: &str,
        target_column_id: &str,
        target_index: usize,
    ) -> Result<(), BoardError> {
        let writes = {
            let mut state = self.state.write().await;
            if state.user_id.is_none() {
                return Err(BoardError::NotLoaded);
            }
            let plan = reorder::plan_move(
                &state.tasks,
                &state.columns,
                task_id,
                target_column_id,
                target_index,
            );
            if plan.is_empty() {
                return Ok(());
            }
            apply_placements(&mut state.tasks, &plan)
        };

        self.persist_batch(writes).await;
        Ok(())
    }

    /// Gateway handle, or `None` once persistence has been downgraded.
    fn live_gateway(&self) -> Option<Arc<dyn BoardPersistence>> {
        if self.persistence_enabled.load(Ordering::Relaxed) {
            self.gateway.clone()
        } else {
            None
        }
    }

    fn note_write_failure(&self, op: &str, err: &anyhow::Error) {
        tracing::warn!(
            "Persistence {} failed, continuing in local-only mode: {:#}",
            op,
            err
        );
        self.persistence_enabled.store(false, Ordering::Relaxed);
    }

    /// Issue a batch of task updates together, each independently
    /// best-effort. Partial failure is accepted: in-memory state has already
    /// won and no read-back reconciliation happens.
    async fn persist_batch(&self, writes: Vec<(String, TaskPatch)>) {
        let Some(gateway) = self.live_gateway() else {
            return;
        };
        let results = join_all(
            writes
                .iter()
                .map(|(id, patch)| gateway.update_task(id, patch)),
        )
        .await;

        for (result, (id, _)) in results.iter().zip(&writes) {
            if let Err(e) = result {
                self.note_write_failure(&format!("update task {id}"), e);
            }
        }
    }
}

/// Apply placements to the collection, stamping `updated_at`, and return the
/// matching persistence writes.
fn apply_placements(tasks: &mut [Task], plan: &[Placement]) -> Vec<(String, TaskPatch)> {
    let now = now_rfc3339();
    let mut writes = Vec::with_capacity(plan.len());
    for placement in plan {
        if let Some(task) = tasks.iter_mut().find(|t| t.id == placement.task_id) {
            task.column_id = placement.column_id.clone();
            task.position = placement.position;
            task.updated_at = now.clone();
            writes.push((
                task.id.clone(),
                TaskPatch {
                    column_id: Some(placement.column_id.clone()),
                    position: Some(placement.position),
                    updated_at: Some(now.clone()),
                    ..TaskPatch::default()
                },
            ));
        }
    }
    writes
}

/// Drop duplicate tags, keeping first occurrence (case-sensitive compare).
fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// In-memory gateway fake with switchable failure modes.
    struct FakeGateway {
        available: bool,
        listed_columns: Vec<Column>,
        listed_tasks: Vec<Task>,
        fail_writes: AtomicBool,
        /// When present, `update_task` blocks until a permit is released.
        update_gate: Option<Arc<Semaphore>>,
        created_columns: Mutex<Vec<Vec<Column>>>,
        created_tasks: Mutex<Vec<Task>>,
        updates: Mutex<Vec<(String, TaskPatch)>>,
        deletes: Mutex<Vec<String>>,
        list_task_failures: AtomicUsize,
    }

    impl FakeGateway {
        fn new(available: bool) -> Self {
            Self {
                available,
                listed_columns: Vec::new(),
                listed_tasks: Vec::new(),
                fail_writes: AtomicBool::new(false),
                update_gate: None,
                created_columns: Mutex::new(Vec::new()),
                created_tasks: Mutex::new(Vec::new()),
                updates: Mutex::new(Vec::new()),
                deletes: Mutex::new(Vec::new()),
                list_task_failures: AtomicUsize::new(0),
            }
        }

        fn check_write(&self) -> anyhow::Result<()> {
            if self.fail_writes.load(Ordering::Relaxed) {
                anyhow::bail!("write refused")
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl BoardPersistence for FakeGateway {
        async fn probe(&self) -> bool {
            self.available
        }

        async fn list_columns(&self, _board_id: &str, _user_id: &str) -> anyhow::Result<Vec<Column>> {
            Ok(self.listed_columns.clone())
        }

        async fn list_tasks(&self, _board_id: &str, _user_id: &str) -> anyhow::Result<Vec<Task>> {
            if self.list_task_failures.load(Ordering::Relaxed) > 0 {
                self.list_task_failures.fetch_sub(1, Ordering::Relaxed);
                anyhow::bail!("list refused")
            }
            Ok(self.listed_tasks.clone())
        }

        async fn create_columns(&self, columns: &[Column]) -> anyhow::Result<()> {
            self.check_write()?;
            self.created_columns.lock().unwrap().push(columns.to_vec());
            Ok(())
        }

        async fn create_task(&self, task: &Task) -> anyhow::Result<()> {
            self.check_write()?;
            self.created_tasks.lock().unwrap().push(task.clone());
            Ok(())
        }

        async fn update_task(&self, id: &str, patch: &TaskPatch) -> anyhow::Result<()> {
            if let Some(gate) = &self.update_gate {
                gate.acquire().await.unwrap().forget();
            }
            self.check_write()?;
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), patch.clone()));
            Ok(())
        }

        async fn delete_task(&self, id: &str) -> anyhow::Result<()> {
            self.check_write()?;
            self.deletes.lock().unwrap().push(id.to_string());
            Ok(())
        }
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.to_string(),
            description: None,
            priority: Priority::Medium,
            tags: Vec::new(),
        }
    }

    async fn loaded_store(gateway: Arc<FakeGateway>) -> BoardStore {
        let store = BoardStore::new(Some(gateway), "board-1");
        store.load("u1").await;
        store
    }

    async fn demo_store() -> BoardStore {
        let store = BoardStore::new(None, "board-1");
        store.load("u1").await;
        store
    }

    fn positions(snapshot: &BoardSnapshot, column_id: &str) -> Vec<(String, usize)> {
        snapshot
            .tasks
            .iter()
            .filter(|t| t.column_id == column_id)
            .map(|t| (t.title.clone(), t.position))
            .collect()
    }

    #[tokio::test]
    async fn test_load_without_gateway_runs_demo_mode() {
        let store = demo_store().await;
        assert!(store.demo_mode());

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.columns.len(), 4);
        assert_eq!(snapshot.tasks.len(), 4);
        assert!(snapshot.demo_mode);
    }

    #[tokio::test]
    async fn test_load_unavailable_service_falls_back() {
        let store = loaded_store(Arc::new(FakeGateway::new(false))).await;
        assert!(store.demo_mode());
        assert_eq!(store.snapshot().await.columns.len(), 4);
    }

    #[tokio::test]
    async fn test_load_fresh_account_seeds_and_persists_columns() {
        let gateway = Arc::new(FakeGateway::new(true));
        let store = loaded_store(Arc::clone(&gateway)).await;

        assert!(!store.demo_mode());
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.columns.len(), 4);
        // seed tasks are not persisted and not listed back
        assert!(snapshot.tasks.is_empty());
        assert_eq!(gateway.created_columns.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_load_seed_persist_failure_degrades_but_shows_board() {
        let gateway = Arc::new(FakeGateway::new(true));
        gateway.fail_writes.store(true, Ordering::Relaxed);
        let store = loaded_store(Arc::clone(&gateway)).await;

        assert!(store.demo_mode());
        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.columns.len(), 4);
        assert_eq!(snapshot.tasks.len(), 4);
    }

    #[tokio::test]
    async fn test_load_task_list_failure_degrades_to_full_fallback() {
        let mock = fallback::mock_board("u1", "board-1");
        let mut gw = FakeGateway::new(true);
        gw.listed_columns = mock.columns;
        gw.list_task_failures.store(1, Ordering::Relaxed);
        let gateway = Arc::new(gw);

        let store = loaded_store(Arc::clone(&gateway)).await;
        assert!(store.demo_mode());

        // the fallback board is internally consistent
        let snapshot = store.snapshot().await;
        for task in &snapshot.tasks {
            assert!(snapshot.columns.iter().any(|c| c.id == task.column_id));
        }
    }

    #[tokio::test]
    async fn test_add_task_assigns_dense_positions_and_persists() {
        let store = live_store().await.0;
        let column_id = store.snapshot().await.columns[0].id.clone();

        let a = store.add_task(&column_id, draft("a"), false).await.unwrap();
        let b = store.add_task(&column_id, draft("b"), false).await.unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
    }

    async fn live_store() -> (BoardStore, Arc<FakeGateway>) {
        let gateway = Arc::new(FakeGateway::new(true));
        let store = loaded_store(Arc::clone(&gateway)).await;
        (store, gateway)
    }

    #[tokio::test]
    async fn test_add_task_records_create_call() {
        let (store, gateway) = live_store().await;
        let column_id = store.snapshot().await.columns[0].id.clone();

        store.add_task(&column_id, draft("a"), false).await.unwrap();
        let created = gateway.created_tasks.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "a");
    }

    #[tokio::test]
    async fn test_add_task_unknown_column_is_rejected() {
        let store = demo_store().await;
        let err = store.add_task("ghost", draft("a"), false).await.unwrap_err();
        assert!(matches!(err, BoardError::UnknownColumn(_)));
    }

    #[tokio::test]
    async fn test_write_failure_degrades_once_and_stays_down() {
        let (store, gateway) = live_store().await;
        let column_id = store.snapshot().await.columns[0].id.clone();

        gateway.fail_writes.store(true, Ordering::Relaxed);
        store.add_task(&column_id, draft("a"), false).await.unwrap();
        assert!(store.demo_mode());

        // even after the service recovers, the session stays local-only
        gateway.fail_writes.store(false, Ordering::Relaxed);
        store.add_task(&column_id, draft("b"), false).await.unwrap();
        assert!(store.demo_mode());
        assert!(gateway.created_tasks.lock().unwrap().is_empty());

        // and the failed write never rolled the optimistic state back
        assert_eq!(store.tasks_in_column(&column_id).await.len(), 2);
    }

    #[tokio::test]
    async fn test_move_within_column_scenario() {
        // Columns [To Do(0), Done(1)], tasks A(0), B(1) in To Do;
        // moving B to index 0 gives B=0, A=1.
        let (store, gateway) = live_store().await;
        let todo = store.snapshot().await.columns[0].id.clone();
        let a = store.add_task(&todo, draft("A"), false).await.unwrap();
        let b = store.add_task(&todo, draft("B"), false).await.unwrap();

        store.move_task(&b.id, &todo, 0).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(
            positions(&snapshot, &todo),
            vec![("B".to_string(), 0), ("A".to_string(), 1)]
        );

        // one gesture, both writes dispatched as a group
        let updates = gateway.updates.lock().unwrap();
        let moved: HashSet<&str> = updates.iter().map(|(id, _)| id.as_str()).collect();
        assert!(moved.contains(a.id.as_str()));
        assert!(moved.contains(b.id.as_str()));
    }

    #[tokio::test]
    async fn test_move_across_columns_scenario() {
        // moveTask(A, Done, 0) from To Do appends A to Done and reindexes B.
        let (store, _gateway) = live_store().await;
        let snapshot = store.snapshot().await;
        let todo = snapshot.columns[0].id.clone();
        let done = snapshot.columns[3].id.clone();
        let a = store.add_task(&todo, draft("A"), false).await.unwrap();
        store.add_task(&todo, draft("B"), false).await.unwrap();

        store.move_task(&a.id, &done, 0).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(positions(&snapshot, &done), vec![("A".to_string(), 0)]);
        assert_eq!(positions(&snapshot, &todo), vec![("B".to_string(), 0)]);
    }

    #[tokio::test]
    async fn test_move_to_same_slot_is_noop() {
        let (store, gateway) = live_store().await;
        let todo = store.snapshot().await.columns[0].id.clone();
        store.add_task(&todo, draft("A"), false).await.unwrap();
        let b = store.add_task(&todo, draft("B"), false).await.unwrap();
        let before = store.snapshot().await;

        store.move_task(&b.id, &todo, 1).await.unwrap();

        let after = store.snapshot().await;
        assert_eq!(positions(&before, &todo), positions(&after, &todo));
        assert!(gateway.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_with_missed_target_is_ignored() {
        let (store, gateway) = live_store().await;
        let todo = store.snapshot().await.columns[0].id.clone();
        let a = store.add_task(&todo, draft("A"), false).await.unwrap();

        store.move_task(&a.id, "ghost", 0).await.unwrap();
        store.move_task("ghost", &todo, 0).await.unwrap();

        assert!(gateway.updates.lock().unwrap().is_empty());
        assert!(!store.demo_mode());
    }

    #[tokio::test]
    async fn test_move_is_optimistic_before_persistence_resolves() {
        let gateway = {
            let mut gw = FakeGateway::new(true);
            gw.update_gate = Some(Arc::new(Semaphore::new(0)));
            Arc::new(gw)
        };
        let store = Arc::new(BoardStore::new(
            Some(Arc::clone(&gateway) as Arc<dyn BoardPersistence>),
            "board-1",
        ));
        store.load("u1").await;
        let todo = store.snapshot().await.columns[0].id.clone();
        store.add_task(&todo, draft("A"), false).await.unwrap();
        let b = store.add_task(&todo, draft("B"), false).await.unwrap();

        let mover = {
            let store = Arc::clone(&store);
            let todo = todo.clone();
            let id = b.id.clone();
            tokio::spawn(async move { store.move_task(&id, &todo, 0).await })
        };

        // let the mover apply its state transition and block on the gateway
        tokio::task::yield_now().await;
        let snapshot = store.snapshot().await;
        assert_eq!(
            positions(&snapshot, &todo),
            vec![("B".to_string(), 0), ("A".to_string(), 1)]
        );

        // release the gated updates and finish the gesture
        gateway.update_gate.as_ref().unwrap().add_permits(8);
        mover.await.unwrap().unwrap();
        assert!(!store.demo_mode());
    }

    #[tokio::test]
    async fn test_delete_closes_the_gap() {
        let (store, gateway) = live_store().await;
        let todo = store.snapshot().await.columns[0].id.clone();
        store.add_task(&todo, draft("A"), false).await.unwrap();
        let b = store.add_task(&todo, draft("B"), false).await.unwrap();
        store.add_task(&todo, draft("C"), false).await.unwrap();

        store.delete_task(&b.id).await.unwrap();

        let snapshot = store.snapshot().await;
        assert_eq!(
            positions(&snapshot, &todo),
            vec![("A".to_string(), 0), ("C".to_string(), 1)]
        );
        assert_eq!(gateway.deletes.lock().unwrap().as_slice(), [b.id.clone()]);
    }

    #[tokio::test]
    async fn test_edit_task_patches_fields_and_dedups_tags() {
        let (store, gateway) = live_store().await;
        let todo = store.snapshot().await.columns[0].id.clone();
        let task = store.add_task(&todo, draft("A"), false).await.unwrap();

        let edited = store
            .edit_task(
                &task.id,
                TaskPatch {
                    title: Some("A2".to_string()),
                    priority: Some(Priority::High),
                    tags: Some(vec![
                        "x".to_string(),
                        "y".to_string(),
                        "x".to_string(),
                    ]),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(edited.title, "A2");
        assert_eq!(edited.priority, Priority::High);
        assert_eq!(edited.tags, vec!["x", "y"]);
        assert!(edited.updated_at >= edited.created_at);

        let updates = gateway.updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].1.updated_at.is_some());
        assert!(updates[0].1.column_id.is_none());
    }

    #[tokio::test]
    async fn test_generated_task_lands_in_first_column() {
        let store = demo_store().await;
        let task = store.add_generated_task(draft("from command")).await.unwrap();

        let snapshot = store.snapshot().await;
        let first = snapshot.columns.iter().find(|c| c.position == 0).unwrap();
        assert_eq!(task.column_id, first.id);
        assert!(task.ai_generated);
    }

    #[tokio::test]
    async fn test_dense_positions_after_mixed_operations() {
        let store = demo_store().await;
        let snapshot = store.snapshot().await;
        let todo = snapshot.columns[0].id.clone();
        let review = snapshot.columns[2].id.clone();

        let a = store.add_task(&todo, draft("A"), false).await.unwrap();
        let b = store.add_task(&todo, draft("B"), false).await.unwrap();
        store.add_task(&review, draft("C"), false).await.unwrap();
        store.move_task(&a.id, &review, 0).await.unwrap();
        store.delete_task(&b.id).await.unwrap();
        store.move_task(&a.id, &todo, 0).await.unwrap();

        let snapshot = store.snapshot().await;
        for column in &snapshot.columns {
            let mut positions: Vec<usize> = snapshot
                .tasks
                .iter()
                .filter(|t| t.column_id == column.id)
                .map(|t| t.position)
                .collect();
            positions.sort_unstable();
            assert_eq!(positions, (0..positions.len()).collect::<Vec<_>>());
        }
    }
}
