//! Control task queue backed by PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use tradeguard_core::AppResult;
use tradeguard_entity::control::{ControlTask, NewControlTask, TASK_STATUS_PENDING};

use super::db_error;
use crate::traits::TaskQueue;

/// Producer side of `control_tasks`; workers dequeue elsewhere.
#[derive(Debug, Clone)]
pub struct PgTaskQueue {
    pool: PgPool,
}

impl PgTaskQueue {
    /// Create a new task queue producer.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskQueue for PgTaskQueue {
    async fn enqueue(&self, task: &NewControlTask) -> AppResult<ControlTask> {
        sqlx::query_as::<_, ControlTask>(
            "INSERT INTO control_tasks (id, queue, task_type, client_id, payload, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, NOW()) RETURNING *",
        )
        .bind(Uuid::now_v7())
        .bind(&task.queue)
        .bind(&task.task_type)
        .bind(&task.client_id)
        .bind(&task.payload)
        .bind(TASK_STATUS_PENDING)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to enqueue control task"))
    }
}
