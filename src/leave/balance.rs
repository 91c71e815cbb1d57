use serde::Serialize;
use sqlx::SqliteConnection;
use strum::IntoEnumIterator;
use utoipa::ToSchema;

use crate::model::{
    employee::Employee,
    leave_request::{Category, Status, Unit},
};

/// Administrative days granted to every employee per calendar year.
pub const ADMINISTRATIVE_DAYS_PER_YEAR: f64 = 6.0;

/// Approved quantity of `category` for the employee in `year` (by start
/// date), optionally leaving one request out of the sum.
pub async fn used(
    conn: &mut SqliteConnection,
    employee_id: i64,
    category: Category,
    year: i32,
    excluding: Option<i64>,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        r#"
        SELECT CAST(COALESCE(SUM(quantity), 0) AS REAL)
        FROM leave_requests
        WHERE employee_id = ?
          AND category = ?
          AND status = ?
          AND CAST(strftime('%Y', start_date) AS INTEGER) = ?
          AND (? IS NULL OR id <> ?)
        "#,
    )
    .bind(employee_id)
    .bind(category)
    .bind(Status::Approved)
    .bind(year)
    .bind(excluding)
    .bind(excluding)
    .fetch_one(conn)
    .await
}

/// Yearly ceiling for a category. `None` means the category is unbounded.
/// Comp time is bounded by the overtime hours approved in the same year.
pub async fn cap(
    conn: &mut SqliteConnection,
    employee: &Employee,
    category: Category,
    year: i32,
) -> Result<Option<f64>, sqlx::Error> {
    let cap = match category {
        Category::Vacation => Some(employee.vacation_entitlement as f64),
        Category::Administrative => Some(ADMINISTRATIVE_DAYS_PER_YEAR),
        Category::Overtime => None,
        Category::CompTime => Some(used(conn, employee.id, Category::Overtime, year, None).await?),
    };
    Ok(cap)
}

/// Signed `cap - used`. Validation uses this unclamped value so error
/// messages report the real remainder.
pub async fn signed_available(
    conn: &mut SqliteConnection,
    employee: &Employee,
    category: Category,
    year: i32,
    excluding: Option<i64>,
) -> Result<Option<f64>, sqlx::Error> {
    let Some(cap) = cap(&mut *conn, employee, category, year).await? else {
        return Ok(None);
    };
    let used = used(conn, employee.id, category, year, excluding).await?;
    Ok(Some(cap - used))
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[schema(example = json!({
    "category": "vacation",
    "unit": "days",
    "cap": 15.0,
    "used": 5.0,
    "pending": 2.0,
    "available": 10.0
}))]
pub struct Balance {
    pub category: Category,
    pub unit: Unit,
    /// Absent for unbounded categories
    pub cap: Option<f64>,
    pub used: f64,
    /// Quantity still waiting for review
    pub pending: f64,
    /// Clamped at zero for display
    pub available: Option<f64>,
}

async fn pending(
    conn: &mut SqliteConnection,
    employee_id: i64,
    category: Category,
    year: i32,
) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar::<_, f64>(
        r#"
        SELECT CAST(COALESCE(SUM(quantity), 0) AS REAL)
        FROM leave_requests
        WHERE employee_id = ?
          AND category = ?
          AND status = ?
          AND CAST(strftime('%Y', start_date) AS INTEGER) = ?
        "#,
    )
    .bind(employee_id)
    .bind(category)
    .bind(Status::Pending)
    .bind(year)
    .fetch_one(conn)
    .await
}

pub async fn balance(
    conn: &mut SqliteConnection,
    employee: &Employee,
    category: Category,
    year: i32,
) -> Result<Balance, sqlx::Error> {
    let cap = cap(&mut *conn, employee, category, year).await?;
    let used = used(&mut *conn, employee.id, category, year, None).await?;
    let pending = pending(conn, employee.id, category, year).await?;

    Ok(Balance {
        category,
        unit: category.unit(),
        cap,
        used,
        pending,
        available: cap.map(|cap| (cap - used).max(0.0)),
    })
}

/// One balance per category, in declaration order.
pub async fn summary(
    conn: &mut SqliteConnection,
    employee: &Employee,
    year: i32,
) -> Result<Vec<Balance>, sqlx::Error> {
    let mut balances = Vec::with_capacity(4);
    for category in Category::iter() {
        balances.push(balance(&mut *conn, employee, category, year).await?);
    }
    Ok(balances)
}

/// Display-path availability, clamped at zero. `None` for overtime.
pub async fn available(
    conn: &mut SqliteConnection,
    employee: &Employee,
    category: Category,
    year: i32,
) -> Result<Option<f64>, sqlx::Error> {
    let available = signed_available(conn, employee, category, year, None).await?;
    Ok(available.map(|a| a.max(0.0)))
}
