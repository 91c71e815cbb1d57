use actix_web::{HttpResponse, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    directory,
    error::AppError,
    leave::{
        balance::{self, Balance},
        calendar::HolidayCalendar,
        lifecycle::{self, Assessment, TransitionOutcome},
        report::{self, AdminFilter, AdminPanel, RequestPage},
        submission::{self, SubmitLeave},
    },
    model::leave_request::{LeaveRequest, Status},
};

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct YearQuery {
    /// Calendar year; each endpoint documents its default
    #[schema(example = 2025)]
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct MyRequests {
    #[schema(example = 2025)]
    pub year: i32,
    /// Years with requests, most recent first
    pub years: Vec<i32>,
    pub data: Vec<LeaveRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceSummary {
    #[schema(example = 2025)]
    pub year: i32,
    pub balances: Vec<Balance>,
}

#[derive(Serialize, ToSchema)]
pub struct HolidayList {
    #[schema(example = 2025)]
    pub year: i32,
    #[schema(value_type = Vec<String>, example = json!(["2025-01-01", "2025-04-18"]))]
    pub holidays: Vec<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: Status,
    /// Kept on the request; an empty comment leaves the previous one
    #[schema(example = "Approved, enjoy")]
    pub comment: Option<String>,
}

fn current_year() -> i32 {
    Utc::now().year()
}

/* =========================
Submit a request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = SubmitLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request recorded as pending", body = Object,
         example = json!({
            "message": "Leave request submitted",
            "id": 12,
            "status": "pending",
            "quantity": 5.0,
            "unit": "days",
            "available": 15.0
         })
        ),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Overlaps an existing request"),
        (status = 422, description = "Not enough balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    calendar: web::Data<HolidayCalendar>,
    payload: web::Json<SubmitLeave>,
) -> actix_web::Result<HttpResponse> {
    let new = submission::prepare(calendar.get_ref(), &payload)?;
    let submitted = lifecycle::create(pool.get_ref(), auth.employee_id, &new).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave request submitted",
        "id": submitted.request_id,
        "status": Status::Pending,
        "quantity": new.quantity,
        "unit": new.category.unit(),
        "available": submitted.available
    })))
}

/* =========================
Dry run of a submission
========================= */
#[utoipa::path(
    post,
    path = "/api/leave/preview",
    request_body = SubmitLeave,
    responses(
        (status = 200, description = "Computed quantity, balance and conflicts", body = Assessment),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn preview_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    calendar: web::Data<HolidayCalendar>,
    payload: web::Json<SubmitLeave>,
) -> actix_web::Result<HttpResponse> {
    let new = submission::prepare(calendar.get_ref(), &payload)?;
    let assessment = lifecycle::preview(pool.get_ref(), auth.employee_id, &new).await?;
    Ok(HttpResponse::Ok().json(assessment))
}

/// Own requests of one year; defaults to the latest year with requests.
#[utoipa::path(
    get,
    path = "/api/leave/mine",
    params(YearQuery),
    responses(
        (status = 200, description = "Requests of the caller", body = MyRequests),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_requests(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<HttpResponse> {
    let years = report::available_years(pool.get_ref(), Some(auth.employee_id)).await?;
    let year = query
        .year
        .or_else(|| years.first().copied())
        .unwrap_or_else(current_year);
    let data = report::list_for_employee(pool.get_ref(), auth.employee_id, year).await?;

    Ok(HttpResponse::Ok().json(MyRequests { year, years, data }))
}

/// Balance per category; defaults to the current year.
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    params(YearQuery),
    responses(
        (status = 200, description = "Balances of the caller", body = BalanceSummary),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_balance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<HttpResponse> {
    let year = query.year.unwrap_or_else(current_year);
    let balances = balance_summary(pool.get_ref(), auth.employee_id, year).await?;
    Ok(HttpResponse::Ok().json(BalanceSummary { year, balances }))
}

pub(crate) async fn balance_summary(
    pool: &SqlitePool,
    employee_id: i64,
    year: i32,
) -> Result<Vec<Balance>, AppError> {
    let mut conn = pool.acquire().await.map_err(AppError::from)?;
    let employee = directory::find_employee(&mut conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;
    Ok(balance::summary(&mut conn, &employee, year).await?)
}

#[utoipa::path(
    get,
    path = "/api/leave/holidays",
    params(YearQuery),
    responses(
        (status = 200, description = "Public holidays of the year", body = HolidayList),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn holidays(
    calendar: web::Data<HolidayCalendar>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<HttpResponse> {
    let year = query.year.unwrap_or_else(current_year);
    Ok(HttpResponse::Ok().json(HolidayList {
        year,
        holidays: calendar.holidays(year),
    }))
}

/// A single request. Employees only see their own.
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Request of another employee"),
        (status = 404, description = "Leave request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let mut conn = pool.acquire().await.map_err(AppError::from)?;

    let request = lifecycle::find_request(&mut conn, leave_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound(format!("leave request {leave_id} not found")))?;
    auth.ensure_can_view(request.employee_id)?;

    Ok(HttpResponse::Ok().json(request))
}

/* =========================
Administrator views
========================= */
#[utoipa::path(
    get,
    path = "/api/admin/leave",
    params(AdminFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = RequestPage),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn admin_leave_list(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<AdminFilter>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;

    let mut filter = query.into_inner();
    if filter.year.is_none() {
        filter.year = report::available_years(pool.get_ref(), None)
            .await?
            .first()
            .copied();
    }

    let page = report::admin_list(pool.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/admin/panel",
    params(YearQuery),
    responses(
        (status = 200, description = "Pending and approved requests per category", body = AdminPanel),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn admin_panel(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin()?;
    let panel = report::admin_panel(pool.get_ref(), query.year).await?;
    Ok(HttpResponse::Ok().json(panel))
}

/// Approve, reject or reopen a request. Setting the current status again
/// succeeds with `changed: false`.
#[utoipa::path(
    put,
    path = "/api/admin/leave/{leave_id}/status",
    params(
        ("leave_id" = i64, Path, description = "ID of the leave request to review")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Transition applied", body = TransitionOutcome),
        (status = 400, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Approved comp time depends on this overtime"),
        (status = 422, description = "Not enough balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Admin"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    payload: web::Json<StatusUpdate>,
) -> actix_web::Result<HttpResponse> {
    let StatusUpdate { status, comment } = payload.into_inner();
    let outcome =
        lifecycle::transition(pool.get_ref(), &auth, path.into_inner(), status, comment).await?;
    Ok(HttpResponse::Ok().json(outcome))
}
