/// Task and subtask storage for the todo exercise.
/// Subtasks reference their parent task through a plain foreign key.
use rusqlite::{params, OptionalExtension, Result as SqliteResult, Row};

use super::models::{Subtask, Task};
use super::{DbPool, Store};

fn task_from_row(row: &Row) -> SqliteResult<Task> {
    Ok(Task {
        id: row.get(0)?,
        description: row.get(1)?,
        done: row.get(2)?,
    })
}

fn subtask_from_row(row: &Row) -> SqliteResult<Subtask> {
    Ok(Subtask {
        id: row.get(0)?,
        description: row.get(1)?,
        done: row.get(2)?,
        task_id: row.get(3)?,
    })
}

impl Store {
    pub async fn create_task(pool: &DbPool, description: &str, done: bool) -> SqliteResult<Task> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO tasks (description, done) VALUES (?1, ?2)",
            params![description, done],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, description, done FROM tasks WHERE id = ?1",
            params![id],
            task_from_row,
        )
    }

    pub async fn all_tasks(pool: &DbPool) -> SqliteResult<Vec<Task>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare("SELECT id, description, done FROM tasks ORDER BY id")?;
        let tasks = stmt
            .query_map([], task_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    pub async fn get_task(pool: &DbPool, id: i64) -> SqliteResult<Option<Task>> {
        let conn = pool.lock().await;

        conn.query_row(
            "SELECT id, description, done FROM tasks WHERE id = ?1",
            params![id],
            task_from_row,
        )
        .optional()
    }

    /// Partial update: fields left out of the request keep their prior value.
    pub async fn update_task(
        pool: &DbPool,
        id: i64,
        description: Option<&str>,
        done: Option<bool>,
    ) -> SqliteResult<Option<Task>> {
        let conn = pool.lock().await;

        let existing = conn
            .query_row(
                "SELECT id, description, done FROM tasks WHERE id = ?1",
                params![id],
                task_from_row,
            )
            .optional()?;
        let Some(existing) = existing else {
            return Ok(None);
        };

        let description = description.unwrap_or(&existing.description);
        let done = done.unwrap_or(existing.done);
        conn.execute(
            "UPDATE tasks SET description = ?1, done = ?2 WHERE id = ?3",
            params![description, done, id],
        )?;

        conn.query_row(
            "SELECT id, description, done FROM tasks WHERE id = ?1",
            params![id],
            task_from_row,
        )
        .optional()
    }

    /// Delete a task and return the prior value.
    pub async fn delete_task(pool: &DbPool, id: i64) -> SqliteResult<Option<Task>> {
        let conn = pool.lock().await;

        let task = conn
            .query_row(
                "SELECT id, description, done FROM tasks WHERE id = ?1",
                params![id],
                task_from_row,
            )
            .optional()?;

        if task.is_some() {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        }

        Ok(task)
    }

    /// Insert a subtask under an existing task. Callers check the parent
    /// exists before calling; the foreign key is stored as given.
    pub async fn create_subtask(
        pool: &DbPool,
        task_id: i64,
        description: &str,
        done: bool,
    ) -> SqliteResult<Subtask> {
        let conn = pool.lock().await;

        conn.execute(
            "INSERT INTO subtasks (description, done, task_id) VALUES (?1, ?2, ?3)",
            params![description, done, task_id],
        )?;
        let id = conn.last_insert_rowid();

        conn.query_row(
            "SELECT id, description, done, task_id FROM subtasks WHERE id = ?1",
            params![id],
            subtask_from_row,
        )
    }

    pub async fn subtasks_of(pool: &DbPool, task_id: i64) -> SqliteResult<Vec<Subtask>> {
        let conn = pool.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, description, done, task_id FROM subtasks WHERE task_id = ?1 ORDER BY id",
        )?;
        let subtasks = stmt
            .query_map(params![task_id], subtask_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(subtasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_create_and_get_task() {
        let pool = create_test_pool();

        let task = Store::create_task(&pool, "buy milk", false)
            .await
            .expect("Failed to create task");
        assert!(task.id > 0);
        assert!(!task.done);

        let fetched = Store::get_task(&pool, task.id)
            .await
            .expect("Query failed")
            .expect("Task not found");
        assert_eq!(fetched, task);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unspecified_fields() {
        let pool = create_test_pool();
        let task = Store::create_task(&pool, "buy milk", false)
            .await
            .expect("create");

        let updated = Store::update_task(&pool, task.id, None, Some(true))
            .await
            .expect("Update failed")
            .expect("Task not found");
        assert_eq!(updated.description, "buy milk");
        assert!(updated.done);

        let updated = Store::update_task(&pool, task.id, Some("buy oat milk"), None)
            .await
            .expect("Update failed")
            .expect("Task not found");
        assert_eq!(updated.description, "buy oat milk");
        assert!(updated.done);
    }

    #[tokio::test]
    async fn test_delete_then_get_yields_none() {
        let pool = create_test_pool();
        let task = Store::create_task(&pool, "x", true).await.expect("create");

        let deleted = Store::delete_task(&pool, task.id)
            .await
            .expect("Delete failed")
            .expect("Task not found");
        assert_eq!(deleted, task);

        assert!(Store::get_task(&pool, task.id)
            .await
            .expect("Query failed")
            .is_none());
    }

    #[tokio::test]
    async fn test_delete_task_with_subtasks_succeeds() {
        let pool = create_test_pool();
        let task = Store::create_task(&pool, "parent", false)
            .await
            .expect("create");
        Store::create_subtask(&pool, task.id, "child", false)
            .await
            .expect("create");

        let deleted = Store::delete_task(&pool, task.id)
            .await
            .expect("Delete failed")
            .expect("Task not found");
        assert_eq!(deleted.id, task.id);

        // The subtask row survives, still pointing at the gone parent.
        let subs = Store::subtasks_of(&pool, task.id).await.expect("Query failed");
        assert_eq!(subs.len(), 1);
    }

    #[tokio::test]
    async fn test_subtasks_filter_by_parent() {
        let pool = create_test_pool();
        let t1 = Store::create_task(&pool, "one", false).await.expect("create");
        let t2 = Store::create_task(&pool, "two", false).await.expect("create");

        Store::create_subtask(&pool, t1.id, "a", false).await.expect("create");
        Store::create_subtask(&pool, t1.id, "b", true).await.expect("create");
        Store::create_subtask(&pool, t2.id, "c", false).await.expect("create");

        let subs = Store::subtasks_of(&pool, t1.id).await.expect("Query failed");
        assert_eq!(subs.len(), 2);
        assert!(subs.iter().all(|s| s.task_id == t1.id));
    }
}
