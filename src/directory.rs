use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool, prelude::FromRow};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::{
    auth::password::hash_password,
    error::AppError,
    model::{
        employee::{EMPLOYEE_COLUMNS, Employee},
        leave_request::{Category, Status},
        role::Role,
    },
};

fn default_entitlement() -> i64 {
    15
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "fgarcia")]
    pub username: String,
    #[schema(example = "F. Garcia")]
    pub display_name: String,
    #[schema(example = "change-me")]
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "default_entitlement")]
    #[schema(example = 15)]
    pub vacation_entitlement: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeeUpdate {
    pub active: Option<bool>,
    #[schema(example = 20)]
    pub vacation_entitlement: Option<i64>,
}

/// Row used only by the login path.
#[derive(FromRow)]
pub struct Credentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

pub async fn find_employee(
    conn: &mut SqliteConnection,
    employee_id: i64,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
    ))
    .bind(employee_id)
    .fetch_optional(conn)
    .await
}

pub async fn get_employee(pool: &SqlitePool, employee_id: i64) -> Result<Employee, AppError> {
    let mut conn = pool.acquire().await?;
    find_employee(&mut conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))
}

pub async fn list_employees(pool: &SqlitePool) -> Result<Vec<Employee>, AppError> {
    let employees = sqlx::query_as::<_, Employee>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY display_name ASC, id ASC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

pub async fn credentials(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<Credentials>, sqlx::Error> {
    sqlx::query_as::<_, Credentials>(
        r#"
        SELECT id, username, password_hash, role, active
        FROM employees
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// `None` when the employee does not exist.
pub async fn active_flag(pool: &SqlitePool, employee_id: i64) -> Result<Option<bool>, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT active FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await
}

pub async fn create_employee(pool: &SqlitePool, payload: &NewEmployee) -> Result<i64, AppError> {
    let username = payload.username.trim().to_lowercase();
    let display_name = payload.display_name.trim();

    if username.is_empty() || display_name.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "username, display_name and password are required".into(),
        ));
    }
    if payload.vacation_entitlement < 0 {
        return Err(AppError::Validation(
            "vacation_entitlement cannot be negative".into(),
        ));
    }

    let hashed = hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO employees
            (username, display_name, password_hash, role, vacation_entitlement, active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&username)
    .bind(display_name)
    .bind(hashed)
    .bind(payload.role)
    .bind(payload.vacation_entitlement)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    match result {
        Ok(done) => {
            let id = done.last_insert_rowid();
            info!(employee_id = id, username = %username, role = %payload.role, "Employee created");
            Ok(id)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::Validation(format!("username {username} already exists")),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Takes the store's write lock through the employee row before anything
/// else is read in the transaction, so later reads see the latest commit.
pub async fn lock_employee(conn: &mut SqliteConnection, employee_id: i64) -> Result<(), AppError> {
    let locked = sqlx::query("UPDATE employees SET updated_at = updated_at WHERE id = ?")
        .bind(employee_id)
        .execute(conn)
        .await?;

    if locked.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "employee {employee_id} not found"
        )));
    }
    Ok(())
}

/// Toggles the active flag and/or changes the entitlement. An entitlement
/// may not drop below the vacation days already approved in any year.
pub async fn update_employee(
    pool: &SqlitePool,
    employee_id: i64,
    update: &EmployeeUpdate,
) -> Result<Employee, AppError> {
    if update.active.is_none() && update.vacation_entitlement.is_none() {
        return Err(AppError::Validation("no fields provided for update".into()));
    }

    if update.vacation_entitlement.is_some_and(|e| e < 0) {
        return Err(AppError::Validation(
            "vacation_entitlement cannot be negative".into(),
        ));
    }

    let mut tx = pool.begin().await?;
    lock_employee(&mut tx, employee_id).await?;

    if let Some(entitlement) = update.vacation_entitlement {
        let busiest_year = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT CAST(COALESCE(MAX(total), 0) AS REAL)
            FROM (
                SELECT SUM(quantity) AS total
                FROM leave_requests
                WHERE employee_id = ?
                  AND category = ?
                  AND status = ?
                GROUP BY strftime('%Y', start_date)
            )
            "#,
        )
        .bind(employee_id)
        .bind(Category::Vacation)
        .bind(Status::Approved)
        .fetch_one(&mut *tx)
        .await?;

        if busiest_year > entitlement as f64 {
            return Err(AppError::Validation(format!(
                "entitlement {entitlement} is below the {busiest_year} vacation days already approved in one year"
            )));
        }
    }

    sqlx::query(
        r#"
        UPDATE employees
        SET active = COALESCE(?, active),
            vacation_entitlement = COALESCE(?, vacation_entitlement),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(update.active)
    .bind(update.vacation_entitlement)
    .bind(Utc::now())
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    let employee = find_employee(&mut tx, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;
    tx.commit().await?;

    info!(
        employee_id,
        active = employee.active,
        vacation_entitlement = employee.vacation_entitlement,
        "Employee updated"
    );
    Ok(employee)
}

/// Creates the first administrator when none exists yet. Returns whether an
/// account was created.
pub async fn bootstrap_admin(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<bool, AppError> {
    let admins = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE role = ?")
        .bind(Role::Administrator)
        .fetch_one(pool)
        .await?;

    if admins > 0 {
        return Ok(false);
    }

    warn!(username, "No administrator found, bootstrapping one");
    create_employee(
        pool,
        &NewEmployee {
            username: username.to_string(),
            display_name: username.to_string(),
            password: password.to_string(),
            role: Role::Administrator,
            vacation_entitlement: default_entitlement(),
        },
    )
    .await?;
    Ok(true)
}
