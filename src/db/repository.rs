use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::models::{NewTask, Task, TaskPatch};

const TASK_COLUMNS: &str = "id, title, description, priority, due_date, completed, created_at";

pub async fn fetch_tasks(db: &SqlitePool) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {} FROM tasks ORDER BY created_at DESC, id DESC",
        TASK_COLUMNS
    ))
    .fetch_all(db)
    .await
}

pub async fn find_task_by_id(db: &SqlitePool, id: i64) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {} FROM tasks WHERE id = ?", TASK_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_task(db: &SqlitePool, req: NewTask) -> Result<Task, sqlx::Error> {
    let now = Utc::now();

    let id = sqlx::query(
        r#"
        INSERT INTO tasks
            (title, description, priority, due_date, completed, created_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5)
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.priority)
    .bind(req.due_date)
    .bind(now)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Task {
        id,
        title: req.title,
        description: req.description,
        priority: req.priority,
        due_date: req.due_date,
        completed: false,
        created_at: now,
    })
}

/// Writes only the supplied columns in a single statement, so concurrent
/// patches touching different fields never overwrite each other.
pub async fn update_task(
    db: &SqlitePool,
    id: i64,
    patch: TaskPatch,
) -> Result<Option<Task>, sqlx::Error> {
    if patch.is_empty() {
        return find_task_by_id(db, id).await;
    }

    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE tasks SET ");
    {
        let mut set = builder.separated(", ");
        if let Some(title) = patch.title {
            set.push("title = ");
            set.push_bind_unseparated(title);
        }
        if let Some(description) = patch.description {
            set.push("description = ");
            set.push_bind_unseparated(description);
        }
        if let Some(priority) = patch.priority {
            set.push("priority = ");
            set.push_bind_unseparated(priority);
        }
        if let Some(due_date) = patch.due_date {
            set.push("due_date = ");
            set.push_bind_unseparated(due_date);
        }
        if let Some(completed) = patch.completed {
            set.push("completed = ");
            set.push_bind_unseparated(completed);
        }
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(TASK_COLUMNS);

    builder.build_query_as::<Task>().fetch_optional(db).await
}

pub async fn delete_task(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
