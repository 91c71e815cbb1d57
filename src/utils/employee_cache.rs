use std::time::Duration;

use futures::StreamExt;
use moka::future::Cache;
use sqlx::SqlitePool;
use tracing::info;

use crate::directory;

/// Active flag per employee id, consulted on every authenticated request.
/// Entries expire after a short TTL so a deactivation made elsewhere is
/// picked up even without an explicit `forget`.
#[derive(Clone)]
pub struct ActiveEmployeeCache {
    inner: Cache<i64, bool>,
}

impl ActiveEmployeeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(50_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// `false` for unknown employees as well as disabled ones.
    pub async fn is_active(&self, pool: &SqlitePool, employee_id: i64) -> Result<bool, sqlx::Error> {
        if let Some(active) = self.inner.get(&employee_id).await {
            return Ok(active);
        }

        let active = directory::active_flag(pool, employee_id)
            .await?
            .unwrap_or(false);
        self.inner.insert(employee_id, active).await;
        Ok(active)
    }

    pub async fn forget(&self, employee_id: i64) {
        self.inner.invalidate(&employee_id).await;
    }

    /// Preloads every employee's flag, inserting in batches.
    pub async fn warmup(&self, pool: &SqlitePool, batch_size: usize) -> anyhow::Result<()> {
        let mut stream =
            sqlx::query_as::<_, (i64, bool)>("SELECT id, active FROM employees").fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total_count = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total_count += 1;

            if batch.len() >= batch_size {
                self.insert_batch(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.insert_batch(&batch).await;
        }

        info!(total_count, "Active employee cache warmup complete");
        Ok(())
    }

    async fn insert_batch(&self, rows: &[(i64, bool)]) {
        let inserts = rows
            .iter()
            .map(|&(id, active)| self.inner.insert(id, active));
        futures::future::join_all(inserts).await;
    }
}
