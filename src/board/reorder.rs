//! Pure ordering computations for drag gestures.
//!
//! Given the current board collections and a gesture outcome, [`plan_move`]
//! returns the set of position/column reassignments to apply. No I/O, no
//! mutation: the board store applies the plan to state and dispatches the
//! matching persistence writes.

use crate::model::{Column, Task};

/// One position/column reassignment produced by a move plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub task_id: String,
    pub column_id: String,
    pub position: usize,
}

/// Classic array move: remove at `from`, insert at `to`. Relative order of
/// every other element is preserved. Out-of-range indexes are a no-op.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() || to >= items.len() || from == to {
        return;
    }
    let item = items.remove(from);
    items.insert(to, item);
}

/// Compute the reassignments for moving `task_id` to `target_index` within
/// `target_column_id`.
///
/// Same-column moves are an array move followed by a dense 0-based
/// renumbering of that column, so positions are gap-free by construction.
/// Cross-column moves always append at the destination tail (`target_index`
/// is ignored) and densely renumber the source column; mid-column
/// cross-column insertion is intentionally unsupported.
///
/// An empty plan means nothing to do: the task or target column is unknown
/// (a missed drop target, silently ignored) or the gesture lands the task
/// exactly where it already is.
pub fn plan_move(
    tasks: &[Task],
    columns: &[Column],
    task_id: &str,
    target_column_id: &str,
    target_index: usize,
) -> Vec<Placement> {
    let Some(task) = tasks.iter().find(|t| t.id == task_id) else {
        return Vec::new();
    };
    if !columns.iter().any(|c| c.id == target_column_id) {
        return Vec::new();
    }

    if task.column_id == target_column_id {
        reorder_within_column(tasks, task_id, target_column_id, target_index)
    } else {
        append_to_column(tasks, task_id, &task.column_id, target_column_id)
    }
}

/// Dense renumbering of one column in its current order, e.g. to close the
/// gap a deletion leaves behind. Returns only the changed entries.
pub fn renumber_column(tasks: &[Task], column_id: &str) -> Vec<Placement> {
    renumber(tasks, &ordered_ids(tasks, column_id), column_id)
}

/// Ids of a column's tasks in ascending position order.
fn ordered_ids(tasks: &[Task], column_id: &str) -> Vec<String> {
    let mut in_column: Vec<&Task> = tasks.iter().filter(|t| t.column_id == column_id).collect();
    in_column.sort_by_key(|t| t.position);
    in_column.iter().map(|t| t.id.clone()).collect()
}

/// Placements that renumber `ids` densely inside `column_id`, limited to the
/// entries whose position actually changed.
fn renumber(tasks: &[Task], ids: &[String], column_id: &str) -> Vec<Placement> {
    ids.iter()
        .enumerate()
        .filter(|(index, id)| {
            tasks
                .iter()
                .find(|t| &t.id == *id)
                .map(|t| t.position != *index || t.column_id != column_id)
                .unwrap_or(false)
        })
        .map(|(index, id)| Placement {
            task_id: id.clone(),
            column_id: column_id.to_string(),
            position: index,
        })
        .collect()
}

fn reorder_within_column(
    tasks: &[Task],
    task_id: &str,
    column_id: &str,
    target_index: usize,
) -> Vec<Placement> {
    let mut ids = ordered_ids(tasks, column_id);
    let Some(old_index) = ids.iter().position(|id| id == task_id) else {
        return Vec::new();
    };
    let new_index = target_index.min(ids.len().saturating_sub(1));
    if old_index == new_index {
        return Vec::new();
    }

    array_move(&mut ids, old_index, new_index);
    renumber(tasks, &ids, column_id)
}

fn append_to_column(
    tasks: &[Task],
    task_id: &str,
    source_column_id: &str,
    target_column_id: &str,
) -> Vec<Placement> {
    let destination_count = tasks
        .iter()
        .filter(|t| t.column_id == target_column_id)
        .count();

    let mut plan = vec![Placement {
        task_id: task_id.to_string(),
        column_id: target_column_id.to_string(),
        position: destination_count,
    }];

    // Close the gap the departing task leaves behind.
    let remaining: Vec<String> = ordered_ids(tasks, source_column_id)
        .into_iter()
        .filter(|id| id != task_id)
        .collect();
    plan.extend(renumber(tasks, &remaining, source_column_id));

    plan
}
