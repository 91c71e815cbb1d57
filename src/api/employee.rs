use actix_web::{HttpResponse, web};
use chrono::{Datelike, Utc};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

use crate::{
    api::leave_request::{YearQuery, balance_summary},
    auth::auth::AuthUser,
    directory::{self, EmployeeUpdate, NewEmployee},
    leave::balance::Balance,
    model::employee::Employee,
    utils::employee_cache::ActiveEmployeeCache,
};

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 10)]
    pub total: usize,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: Employee,
    #[schema(example = 2025)]
    pub year: i32,
    pub balances: Vec<Balance>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/admin/employee",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Object, example = json!({
            "message": "Employee created",
            "id": 3
        })),
        (status = 400, description = "Missing fields or duplicate username"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let id = directory::create_employee(pool.get_ref(), &payload).await?;
    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created",
        "id": id
    })))
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/admin/employee",
    responses(
        (status = 200, description = "All employees, active or not", body = EmployeeListResponse),
        (status = 403, description = "Forbidden")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let data = directory::list_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        total: data.len(),
        data,
    }))
}

/// Employee profile with the balances of one year (current year by default)
#[utoipa::path(
    get,
    path = "/api/admin/employee/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID"),
        YearQuery
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetail),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let id = path.into_inner();
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let employee = directory::get_employee(pool.get_ref(), id).await?;
    let balances = balance_summary(pool.get_ref(), id, year).await?;

    Ok(HttpResponse::Ok().json(EmployeeDetail {
        employee,
        year,
        balances,
    }))
}

/// Enable/disable an employee or change the vacation entitlement
#[utoipa::path(
    put,
    path = "/api/admin/employee/{id}",
    params(
        ("id" = i64, Path, description = "Employee ID")
    ),
    request_body = EmployeeUpdate,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid update"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    cache: web::Data<ActiveEmployeeCache>,
    path: web::Path<i64>,
    payload: web::Json<EmployeeUpdate>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let id = path.into_inner();
    let employee = directory::update_employee(pool.get_ref(), id, &payload).await?;

    if payload.active.is_some() {
        debug!(employee_id = id, "Dropping cached active flag");
        cache.forget(id).await;
    }

    Ok(HttpResponse::Ok().json(employee))
}
