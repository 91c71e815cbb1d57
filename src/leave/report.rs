use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, prelude::FromRow};
use strum::IntoEnumIterator;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppError,
    model::leave_request::{Category, LEAVE_COLUMNS, LeaveRequest, Status, Unit},
};

/// A request together with who asked for it.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RequestListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub request: LeaveRequest,
    #[schema(example = "fgarcia")]
    pub employee_username: String,
    #[schema(example = "F. Garcia")]
    pub employee_name: String,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AdminFilter {
    /// Balance year (year of start_date); defaults to the latest year on record
    #[schema(example = 2025)]
    pub year: Option<i32>,
    pub category: Option<Category>,
    pub status: Option<Status>,
    #[schema(example = 2)]
    pub employee_id: Option<i64>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<i64>,
    #[schema(example = 20)]
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RequestPage {
    pub data: Vec<RequestListing>,
    #[schema(example = 1)]
    pub page: i64,
    #[schema(example = 20)]
    pub per_page: i64,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryPanel {
    pub category: Category,
    pub unit: Unit,
    pub pending: Vec<RequestListing>,
    pub approved: Vec<RequestListing>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminPanel {
    #[schema(example = 2025)]
    pub year: i32,
    /// Years that have requests, most recent first
    pub years: Vec<i32>,
    pub categories: Vec<CategoryPanel>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Int(i64),
    Text(String),
}

fn listing_columns() -> String {
    let request = LEAVE_COLUMNS
        .split(',')
        .map(|column| format!("lr.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{request}, e.username AS employee_username, e.display_name AS employee_name")
}

/// Distinct request years, most recent first. The current year stands in
/// when nothing has been requested yet.
pub async fn available_years(
    pool: &SqlitePool,
    employee_id: Option<i64>,
) -> Result<Vec<i32>, AppError> {
    let mut years = sqlx::query_scalar::<_, i32>(
        r#"
        SELECT DISTINCT CAST(strftime('%Y', start_date) AS INTEGER) AS year
        FROM leave_requests
        WHERE (? IS NULL OR employee_id = ?)
        ORDER BY year DESC
        "#,
    )
    .bind(employee_id)
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    if years.is_empty() {
        years.push(Utc::now().year());
    }
    Ok(years)
}

/// Every request of the employee in `year`, newest first.
pub async fn list_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
) -> Result<Vec<LeaveRequest>, AppError> {
    let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE employee_id = ?
          AND CAST(strftime('%Y', start_date) AS INTEGER) = ?
        ORDER BY created_at DESC, id DESC
        "#
    ))
    .bind(employee_id)
    .bind(year)
    .fetch_all(pool)
    .await?;
    Ok(requests)
}

/// Filtered, paginated listing across employees.
pub async fn admin_list(pool: &SqlitePool, filter: &AdminFilter) -> Result<RequestPage, AppError> {
    let per_page = filter.per_page.unwrap_or(20).clamp(1, 100);
    let page = filter.page.unwrap_or(1).max(1);
    let offset = (page - 1)
        .checked_mul(per_page)
        .ok_or_else(|| AppError::Validation(format!("page {page} is out of range")))?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(year) = filter.year {
        where_sql.push_str(" AND CAST(strftime('%Y', lr.start_date) AS INTEGER) = ?");
        args.push(FilterValue::Int(year.into()));
    }
    if let Some(category) = filter.category {
        where_sql.push_str(" AND lr.category = ?");
        args.push(FilterValue::Text(category.to_string()));
    }
    if let Some(status) = filter.status {
        where_sql.push_str(" AND lr.status = ?");
        args.push(FilterValue::Text(status.to_string()));
    }
    if let Some(employee_id) = filter.employee_id {
        where_sql.push_str(" AND lr.employee_id = ?");
        args.push(FilterValue::Int(employee_id));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests lr{where_sql}");
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Int(v) => count_q.bind(*v),
            FilterValue::Text(s) => count_q.bind(s.as_str()),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        r#"
        SELECT {}
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        {where_sql}
        ORDER BY lr.start_date DESC, lr.id DESC
        LIMIT ? OFFSET ?
        "#,
        listing_columns()
    );
    let mut data_q = sqlx::query_as::<_, RequestListing>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::Int(v) => data_q.bind(*v),
            FilterValue::Text(s) => data_q.bind(s.as_str()),
        };
    }
    let data = data_q.bind(per_page).bind(offset).fetch_all(pool).await?;

    Ok(RequestPage {
        data,
        page,
        per_page,
        total,
    })
}

/// Pending and approved requests per category for one year. Without a year
/// the most recent year on record is shown.
pub async fn admin_panel(pool: &SqlitePool, year: Option<i32>) -> Result<AdminPanel, AppError> {
    let years = available_years(pool, None).await?;
    let year = year
        .or_else(|| years.first().copied())
        .unwrap_or_else(|| Utc::now().year());

    let rows = sqlx::query_as::<_, RequestListing>(&format!(
        r#"
        SELECT {}
        FROM leave_requests lr
        JOIN employees e ON e.id = lr.employee_id
        WHERE CAST(strftime('%Y', lr.start_date) AS INTEGER) = ?
          AND lr.status IN (?, ?)
        ORDER BY lr.start_date ASC, lr.id ASC
        "#,
        listing_columns()
    ))
    .bind(year)
    .bind(Status::ACTIVE[0])
    .bind(Status::ACTIVE[1])
    .fetch_all(pool)
    .await?;

    let categories = Category::iter()
        .map(|category| {
            let (pending, approved): (Vec<_>, Vec<_>) = rows
                .iter()
                .filter(|row| row.request.category == category)
                .cloned()
                .partition(|row| row.request.status == Status::Pending);
            CategoryPanel {
                category,
                unit: category.unit(),
                pending,
                approved,
            }
        })
        .collect();

    Ok(AdminPanel {
        year,
        years,
        categories,
    })
}
