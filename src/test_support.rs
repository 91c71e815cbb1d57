//! Fixtures shared by the unit tests.

use std::{path::PathBuf, str::FromStr};

use chrono::{NaiveDate, Utc};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::{
    auth::auth::AuthUser,
    db::{MIGRATOR, init_db},
    directory,
    error::AppError,
    leave::balance,
    model::{
        leave_request::{Category, HalfDay, Status},
        role::Role,
    },
};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// A fresh migrated in-memory store. A single connection that never expires
/// keeps the database alive for the whole test.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();
    pool
}

/// A migrated store in a temporary file, opened the way the server opens
/// it. Several connections can hold transactions at once. Files are removed
/// on drop.
pub struct FileStore {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl FileStore {
    pub async fn open() -> Self {
        let path = std::env::temp_dir().join(format!("timeoff-{}.db", uuid::Uuid::new_v4()));
        let pool = init_db(&format!("sqlite://{}", path.display())).await.unwrap();
        FileStore { pool, path }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", self.path.display()));
        }
    }
}

pub async fn seed_employee(pool: &SqlitePool, username: &str, entitlement: i64) -> i64 {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO employees
            (username, display_name, password_hash, role, vacation_entitlement, active, created_at, updated_at)
        VALUES (?, ?, 'not-a-hash', ?, ?, 1, ?, ?)
        "#,
    )
    .bind(username)
    .bind(username.to_uppercase())
    .bind(Role::Employee)
    .bind(entitlement)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

/// Inserts a request as-is, bypassing every lifecycle check.
pub async fn seed_request(
    pool: &SqlitePool,
    employee_id: i64,
    category: Category,
    status: Status,
    start: NaiveDate,
    end: NaiveDate,
    quantity: f64,
) -> i64 {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, category, status, start_date, end_date, quantity, reason, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(category)
    .bind(status)
    .bind(start)
    .bind(end)
    .bind(quantity)
    .bind((category == Category::Overtime).then_some("seeded"))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

pub async fn seed_half_day(
    pool: &SqlitePool,
    employee_id: i64,
    on: NaiveDate,
    marker: HalfDay,
) -> i64 {
    let now = Utc::now();
    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, category, status, start_date, end_date, quantity, half_day, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 0.5, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(Category::Administrative)
    .bind(Status::Pending)
    .bind(on)
    .bind(on)
    .bind(marker)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}

/// Remaining balance as shown to the employee, clamped at zero.
pub async fn remaining(
    pool: &SqlitePool,
    employee_id: i64,
    category: Category,
    year: i32,
) -> Result<Option<f64>, AppError> {
    let mut conn = pool.acquire().await?;
    let employee = directory::find_employee(&mut conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;

    Ok(balance::available(&mut conn, &employee, category, year).await?)
}

pub fn admin(employee_id: i64) -> AuthUser {
    AuthUser {
        employee_id,
        username: format!("admin{employee_id}"),
        role: Role::Administrator,
    }
}

pub fn employee_user(employee_id: i64) -> AuthUser {
    AuthUser {
        employee_id,
        username: format!("user{employee_id}"),
        role: Role::Employee,
    }
}
