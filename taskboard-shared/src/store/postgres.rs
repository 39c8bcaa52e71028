/// PostgreSQL task store
///
/// Runtime-checked sqlx queries against the `tasks` table created by the
/// migrations in `taskboard-shared/migrations`.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskboard_shared::store::{postgres::PgTaskStore, TaskStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
///
/// let store = PgTaskStore::new(pool);
/// let tasks = store.list(None).await?;
/// # Ok(())
/// # }
/// ```

use super::{StoreError, StoreResult, TaskStore};
use crate::db::pool;
use crate::models::task::{NewTask, PositionUpdate, Task, UpdateTask};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, title, status, position, user_id, created_at, updated_at";

/// Task store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    /// Creates a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn list(&self, user_id: Option<Uuid>) -> StoreResult<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY status ASC, position ASC, created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn create(&self, data: NewTask) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (title, status, position, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.title)
        .bind(data.status.as_str())
        .bind(data.position)
        .bind(data.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn update(&self, id: Uuid, data: UpdateTask) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                status = COALESCE($3, status),
                position = COALESCE($4, position),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.status.map(|s| s.as_str()))
        .bind(data.position)
        .fetch_optional(&self.pool)
        .await?;

        task.ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: Uuid) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        task.ok_or(StoreError::NotFound(id))
    }

    async fn bulk_reposition(&self, updates: &[PositionUpdate]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        for update in updates {
            let result = sqlx::query(
                r#"
                UPDATE tasks
                SET status = $2,
                    position = $3,
                    updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(update.id)
            .bind(update.status.as_str())
            .bind(update.position)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction would roll back too; be explicit
                tx.rollback().await?;
                return Err(StoreError::NotFound(update.id));
            }
        }

        tx.commit().await?;
        debug!(count = updates.len(), "Committed reposition batch");

        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
