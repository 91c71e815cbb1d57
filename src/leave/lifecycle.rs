use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    directory,
    error::AppError,
    leave::{balance, overlap},
    model::{
        employee::Employee,
        leave_request::{Category, HalfDay, LEAVE_COLUMNS, LeaveRequest, Status, Unit},
    },
};

/// A request that has passed the caller's quantity computation and is
/// ready to be checked against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLeaveRequest {
    pub category: Category,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quantity: f64,
    pub half_day: Option<HalfDay>,
    pub reason: Option<String>,
}

impl NewLeaveRequest {
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }

    /// Shape rules that need no store access.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.quantity > 0.0) {
            return Err(AppError::Validation(
                "quantity must be greater than zero".into(),
            ));
        }
        if !self.quantity.is_finite() {
            return Err(AppError::Validation("quantity must be a finite number".into()));
        }
        if self.start_date > self.end_date {
            return Err(AppError::Validation(
                "start_date cannot be after end_date".into(),
            ));
        }

        if let Some(marker) = self.half_day {
            if self.category != Category::Administrative {
                return Err(AppError::Validation(format!(
                    "half days ({marker}) are only available for administrative requests"
                )));
            }
            if self.start_date != self.end_date {
                return Err(AppError::Validation(
                    "a half day must start and end on the same date".into(),
                ));
            }
            if self.quantity != 0.5 {
                return Err(AppError::Validation(
                    "a half day request is worth exactly 0.5 days".into(),
                ));
            }
        } else if self.category.unit() == Unit::Days && self.quantity.fract() != 0.0 {
            return Err(AppError::Validation(
                "fractional days require an AM or PM marker".into(),
            ));
        }

        if self.category == Category::Overtime
            && self.reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(AppError::Validation(
                "overtime must be reported with a reason".into(),
            ));
        }

        Ok(())
    }
}

/// Outcome of checking a new request against the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Assessment {
    pub category: Category,
    pub unit: Unit,
    pub quantity: f64,
    /// Signed remainder before this request; absent for overtime
    pub available: Option<f64>,
    pub conflict: Option<LeaveRequest>,
    /// True when the request would be accepted as submitted
    pub fits: bool,
}

async fn assess(
    conn: &mut SqliteConnection,
    employee: &Employee,
    new: &NewLeaveRequest,
) -> Result<Assessment, sqlx::Error> {
    let conflict = overlap::find_conflict(
        &mut *conn,
        employee.id,
        new.start_date,
        new.end_date,
        new.half_day,
    )
    .await?;
    let available =
        balance::signed_available(conn, employee, new.category, new.year(), None).await?;
    let within_cap = available.is_none_or(|remaining| new.quantity <= remaining);

    Ok(Assessment {
        category: new.category,
        unit: new.category.unit(),
        quantity: new.quantity,
        available,
        fits: conflict.is_none() && within_cap,
        conflict,
    })
}

/// Locks the owning employee row and loads it. The aggregates read
/// afterwards cannot change until commit.
async fn lock_employee(conn: &mut SqliteConnection, employee_id: i64) -> Result<Employee, AppError> {
    directory::lock_employee(&mut *conn, employee_id).await?;

    directory::find_employee(conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))
}

pub async fn find_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    sqlx::query_as::<_, LeaveRequest>(&format!(
        "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
    ))
    .bind(request_id)
    .fetch_optional(conn)
    .await
}

/// Dry run of `create`: reports quantity, remaining balance and any
/// conflicting request without writing anything.
pub async fn preview(
    pool: &SqlitePool,
    employee_id: i64,
    new: &NewLeaveRequest,
) -> Result<Assessment, AppError> {
    new.validate()?;
    let mut conn = pool.acquire().await?;
    let employee = directory::find_employee(&mut conn, employee_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("employee {employee_id} not found")))?;

    Ok(assess(&mut conn, &employee, new).await?)
}

/// A stored request and the balance left in its category, both read in the
/// transaction that inserted it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Submitted {
    pub request_id: i64,
    /// Clamped at zero; absent for overtime.
    pub available: Option<f64>,
}

/// Records a new pending request. Conflict and quota checks run in the same
/// transaction as the insert.
pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    new: &NewLeaveRequest,
) -> Result<Submitted, AppError> {
    new.validate()?;

    let mut tx = pool.begin().await?;
    let employee = lock_employee(&mut tx, employee_id).await?;
    if !employee.active {
        return Err(AppError::Authorization(
            "employee account is disabled".into(),
        ));
    }

    let assessment = assess(&mut tx, &employee, new).await?;
    if let Some(existing) = assessment.conflict {
        debug!(employee_id, conflict_id = existing.id, "Request overlaps an existing one");
        return Err(AppError::Conflict(Box::new(existing)));
    }
    if let Some(remaining) = assessment.available {
        if new.quantity > remaining {
            return Err(AppError::QuotaExceeded {
                category: new.category,
                requested: new.quantity,
                remaining,
            });
        }
    }

    let now = Utc::now();
    let inserted = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, category, status, start_date, end_date, quantity, half_day, reason, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(new.category)
    .bind(Status::Pending)
    .bind(new.start_date)
    .bind(new.end_date)
    .bind(new.quantity)
    .bind(new.half_day)
    .bind(new.reason.as_deref().map(str::trim))
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let available = balance::available(&mut tx, &employee, new.category, new.year()).await?;

    tx.commit().await?;

    let request_id = inserted.last_insert_rowid();
    info!(
        request_id,
        employee_id,
        category = %new.category,
        quantity = new.quantity,
        start_date = %new.start_date,
        end_date = %new.end_date,
        "Leave request submitted"
    );
    Ok(Submitted {
        request_id,
        available,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct TransitionOutcome {
    pub request_id: i64,
    pub previous: Status,
    pub status: Status,
    /// False when the request already had the requested status
    pub changed: bool,
}

/// Category-specific guard for moving `request` to `next`, evaluated
/// against the aggregates visible inside the caller's transaction.
async fn guard(
    conn: &mut SqliteConnection,
    employee: &Employee,
    request: &LeaveRequest,
    next: Status,
) -> Result<(), AppError> {
    let year = request.year();

    match request.category {
        Category::Vacation | Category::Administrative | Category::CompTime => {
            if next != Status::Approved {
                return Ok(());
            }
            let remaining = balance::signed_available(
                conn,
                employee,
                request.category,
                year,
                Some(request.id),
            )
            .await?
            .unwrap_or(f64::INFINITY);

            if request.quantity > remaining {
                return Err(AppError::QuotaExceeded {
                    category: request.category,
                    requested: request.quantity,
                    remaining,
                });
            }
            Ok(())
        }
        Category::Overtime => {
            if request.status != Status::Approved || next == Status::Approved {
                return Ok(());
            }
            let dependents = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT COUNT(*)
                FROM leave_requests
                WHERE employee_id = ?
                  AND category = ?
                  AND status = ?
                  AND CAST(strftime('%Y', start_date) AS INTEGER) = ?
                "#,
            )
            .bind(employee.id)
            .bind(Category::CompTime)
            .bind(Status::Approved)
            .bind(year)
            .fetch_one(conn)
            .await?;

            if dependents > 0 {
                return Err(AppError::DependencyViolation(format!(
                    "{dependents} approved comp time request(s) in {year} depend on this overtime; \
                     reverse them first"
                )));
            }
            Ok(())
        }
    }
}

/// Administrator review of a request. Re-validates against current
/// aggregates and writes in one transaction. Asking for the status the
/// request already has succeeds without writing.
pub async fn transition(
    pool: &SqlitePool,
    actor: &AuthUser,
    request_id: i64,
    next: Status,
    comment: Option<String>,
) -> Result<TransitionOutcome, AppError> {
    actor.require_admin()?;

    let mut tx = pool.begin().await?;

    let locked = sqlx::query(
        r#"
        UPDATE employees
        SET updated_at = updated_at
        WHERE id = (SELECT employee_id FROM leave_requests WHERE id = ?)
        "#,
    )
    .bind(request_id)
    .execute(&mut *tx)
    .await?;
    if locked.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "leave request {request_id} not found"
        )));
    }

    let request = find_request(&mut tx, request_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("leave request {request_id} not found")))?;
    let previous = request.status;

    if previous == next {
        debug!(request_id, status = %next, "Transition to current status, nothing to do");
        return Ok(TransitionOutcome {
            request_id,
            previous,
            status: next,
            changed: false,
        });
    }
    if !previous.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "cannot move a {previous} request to {next}"
        )));
    }

    let employee = directory::find_employee(&mut tx, request.employee_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("employee {} not found", request.employee_id))
        })?;

    if let Err(e) = guard(&mut tx, &employee, &request, next).await {
        warn!(
            request_id,
            reviewer_id = actor.employee_id,
            from = %previous,
            to = %next,
            error = %e,
            "Transition refused"
        );
        return Err(e);
    }

    let now = Utc::now();
    let comment = comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?,
            reviewer_id = ?,
            reviewed_at = ?,
            updated_at = ?,
            admin_comment = COALESCE(?, admin_comment)
        WHERE id = ?
        "#,
    )
    .bind(next)
    .bind(actor.employee_id)
    .bind(now)
    .bind(now)
    .bind(comment)
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        request_id,
        reviewer_id = actor.employee_id,
        category = %request.category,
        from = %previous,
        to = %next,
        "Leave request reviewed"
    );
    Ok(TransitionOutcome {
        request_id,
        previous,
        status: next,
        changed: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        FileStore, admin, d, employee_user, memory_pool, remaining, seed_employee, seed_request,
    };

    fn vacation(start: NaiveDate, end: NaiveDate, days: f64) -> NewLeaveRequest {
        NewLeaveRequest {
            category: Category::Vacation,
            start_date: start,
            end_date: end,
            quantity: days,
            half_day: None,
            reason: None,
        }
    }

    fn hours(category: Category, on: NaiveDate, hours: f64) -> NewLeaveRequest {
        NewLeaveRequest {
            category,
            start_date: on,
            end_date: on,
            quantity: hours,
            half_day: None,
            reason: (category == Category::Overtime).then(|| "month-end close".to_string()),
        }
    }

    fn half_day(on: NaiveDate, marker: HalfDay) -> NewLeaveRequest {
        NewLeaveRequest {
            category: Category::Administrative,
            start_date: on,
            end_date: on,
            quantity: 0.5,
            half_day: Some(marker),
            reason: None,
        }
    }

    async fn status_of(pool: &SqlitePool, id: i64) -> Status {
        let mut conn = pool.acquire().await.unwrap();
        find_request(&mut conn, id).await.unwrap().unwrap().status
    }

    #[test]
    fn shape_validation() {
        let day = d(2025, 3, 4);
        assert!(vacation(day, day, 1.0).validate().is_ok());
        assert!(matches!(
            vacation(day, day, 0.0).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            vacation(d(2025, 3, 5), day, 1.0).validate(),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            vacation(day, day, 0.5).validate(),
            Err(AppError::Validation(_))
        ));

        let mut spread = half_day(day, HalfDay::Am);
        spread.end_date = d(2025, 3, 5);
        assert!(matches!(spread.validate(), Err(AppError::Validation(_))));

        let mut no_reason = hours(Category::Overtime, day, 3.0);
        no_reason.reason = Some("   ".into());
        assert!(matches!(no_reason.validate(), Err(AppError::Validation(_))));

        assert!(matches!(
            hours(Category::CompTime, day, f64::INFINITY).validate(),
            Err(AppError::Validation(_))
        ));

        assert!(hours(Category::CompTime, day, 1.5).validate().is_ok());
    }

    #[actix_web::test]
    async fn vacation_week_scenario() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "fgarcia", 15).await;
        let reviewer = seed_employee(&pool, "jcerda", 15).await;

        let submitted = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 10), 5.0))
            .await
            .unwrap();
        assert_eq!(submitted.available, Some(15.0));
        let id = submitted.request_id;
        assert_eq!(status_of(&pool, id).await, Status::Pending);
        assert_eq!(
            remaining(&pool, emp, Category::Vacation, 2025).await.unwrap(),
            Some(15.0)
        );

        let outcome = transition(&pool, &admin(reviewer), id, Status::Approved, None)
            .await
            .unwrap();
        assert!(outcome.changed);
        assert_eq!(
            remaining(&pool, emp, Category::Vacation, 2025).await.unwrap(),
            Some(10.0)
        );

        let mut conn = pool.acquire().await.unwrap();
        let stored = find_request(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(stored.reviewer_id, Some(reviewer));
        assert!(stored.reviewed_at.is_some());
    }

    #[actix_web::test]
    async fn reversal_restores_availability() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "caviles", 15).await;
        let reviewer = admin(1);

        let a = create(&pool, emp, &vacation(d(2025, 2, 3), d(2025, 2, 4), 2.0)).await.unwrap().request_id;
        let b = create(&pool, emp, &vacation(d(2025, 3, 3), d(2025, 3, 5), 3.0)).await.unwrap().request_id;
        transition(&pool, &reviewer, a, Status::Approved, None).await.unwrap();
        transition(&pool, &reviewer, b, Status::Approved, None).await.unwrap();
        assert_eq!(
            remaining(&pool, emp, Category::Vacation, 2025).await.unwrap(),
            Some(10.0)
        );

        transition(&pool, &reviewer, b, Status::Pending, None).await.unwrap();
        assert_eq!(
            remaining(&pool, emp, Category::Vacation, 2025).await.unwrap(),
            Some(13.0)
        );

        transition(&pool, &reviewer, a, Status::Rejected, Some("staffing".into()))
            .await
            .unwrap();
        assert_eq!(
            remaining(&pool, emp, Category::Vacation, 2025).await.unwrap(),
            Some(15.0)
        );

        let mut conn = pool.acquire().await.unwrap();
        let rejected = find_request(&mut conn, a).await.unwrap().unwrap();
        assert_eq!(rejected.admin_comment.as_deref(), Some("staffing"));
    }

    #[actix_web::test]
    async fn overlapping_submission_is_a_conflict() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "ljaque", 15).await;

        let first = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 10), 5.0)).await.unwrap().request_id;
        let err = create(&pool, emp, &vacation(d(2025, 1, 9), d(2025, 1, 13), 3.0))
            .await
            .unwrap_err();

        match err {
            AppError::Conflict(existing) => {
                assert_eq!(existing.id, first);
                assert_eq!(existing.start_date, d(2025, 1, 6));
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn morning_and_afternoon_half_days_both_fit() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "colivares", 15).await;

        create(&pool, emp, &half_day(d(2025, 3, 4), HalfDay::Am)).await.unwrap();
        create(&pool, emp, &half_day(d(2025, 3, 4), HalfDay::Pm)).await.unwrap();

        let err = create(&pool, emp, &half_day(d(2025, 3, 4), HalfDay::Am))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn submission_over_quota_is_refused() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "pencina", 3).await;

        let err = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 10), 5.0))
            .await
            .unwrap_err();
        match err {
            AppError::QuotaExceeded { requested, remaining, .. } => {
                assert_eq!(requested, 5.0);
                assert_eq!(remaining, 3.0);
            }
            other => panic!("expected quota error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn approval_over_entitlement_leaves_status_unchanged() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "hgalvez", 5).await;
        let reviewer = admin(1);

        // both fit on their own while pending
        let a = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 8), 3.0)).await.unwrap().request_id;
        let b = create(&pool, emp, &vacation(d(2025, 2, 3), d(2025, 2, 5), 3.0)).await.unwrap().request_id;

        transition(&pool, &reviewer, a, Status::Approved, None).await.unwrap();
        let err = transition(&pool, &reviewer, b, Status::Approved, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::QuotaExceeded { remaining, .. } if remaining == 2.0));
        assert_eq!(status_of(&pool, b).await, Status::Pending);
    }

    #[actix_web::test]
    async fn administrative_cap_is_enforced_on_approval() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "fgarcia", 15).await;
        seed_request(&pool, emp, Category::Administrative, Status::Approved, d(2025, 4, 7), d(2025, 4, 11), 5.0).await;
        let pending = seed_request(&pool, emp, Category::Administrative, Status::Pending, d(2025, 5, 5), d(2025, 5, 6), 2.0).await;

        let err = transition(&pool, &admin(1), pending, Status::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { .. }));
    }

    #[actix_web::test]
    async fn overtime_and_comp_time_scenario() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "jcerda", 15).await;
        let reviewer = admin(1);

        let overtime = create(&pool, emp, &hours(Category::Overtime, d(2025, 1, 13), 10.0))
            .await
            .unwrap()
            .request_id;
        transition(&pool, &reviewer, overtime, Status::Approved, None).await.unwrap();

        let err = create(&pool, emp, &hours(Category::CompTime, d(2025, 2, 7), 12.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { remaining, .. } if remaining == 10.0));

        let comp = create(&pool, emp, &hours(Category::CompTime, d(2025, 2, 7), 10.0))
            .await
            .unwrap()
            .request_id;
        transition(&pool, &reviewer, comp, Status::Approved, None).await.unwrap();
        assert_eq!(
            remaining(&pool, emp, Category::CompTime, 2025).await.unwrap(),
            Some(0.0)
        );

        let err = transition(&pool, &reviewer, overtime, Status::Pending, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DependencyViolation(_)));
        assert_eq!(status_of(&pool, overtime).await, Status::Approved);

        // once the comp time is reversed the overtime can be restored
        transition(&pool, &reviewer, comp, Status::Pending, None).await.unwrap();
        transition(&pool, &reviewer, overtime, Status::Pending, None).await.unwrap();
        assert_eq!(status_of(&pool, overtime).await, Status::Pending);
    }

    #[actix_web::test]
    async fn comp_time_approval_rechecks_current_overtime() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "caviles", 15).await;
        seed_request(&pool, emp, Category::Overtime, Status::Approved, d(2025, 1, 13), d(2025, 1, 13), 4.0).await;
        let first = seed_request(&pool, emp, Category::CompTime, Status::Pending, d(2025, 2, 3), d(2025, 2, 3), 3.0).await;
        let second = seed_request(&pool, emp, Category::CompTime, Status::Pending, d(2025, 2, 4), d(2025, 2, 4), 3.0).await;

        transition(&pool, &admin(1), first, Status::Approved, None).await.unwrap();
        let err = transition(&pool, &admin(1), second, Status::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExceeded { remaining, .. } if remaining == 1.0));
    }

    #[actix_web::test]
    async fn same_status_is_a_successful_no_op() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "ljaque", 15).await;
        let id = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 6), 1.0)).await.unwrap().request_id;

        let outcome = transition(&pool, &admin(1), id, Status::Pending, None)
            .await
            .unwrap();
        assert!(!outcome.changed);
        assert_eq!(outcome.status, Status::Pending);

        transition(&pool, &admin(1), id, Status::Approved, None).await.unwrap();
        let again = transition(&pool, &admin(2), id, Status::Approved, None)
            .await
            .unwrap();
        assert!(!again.changed);

        let mut conn = pool.acquire().await.unwrap();
        let stored = find_request(&mut conn, id).await.unwrap().unwrap();
        assert_eq!(stored.reviewer_id, Some(1));
    }

    #[actix_web::test]
    async fn rejected_is_terminal() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "ljaque", 15).await;
        let id = seed_request(&pool, emp, Category::Vacation, Status::Rejected, d(2025, 1, 6), d(2025, 1, 6), 1.0).await;

        let err = transition(&pool, &admin(1), id, Status::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn only_administrators_review() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "ljaque", 15).await;
        let id = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 6), 1.0)).await.unwrap().request_id;

        let err = transition(&pool, &employee_user(emp), id, Status::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert_eq!(status_of(&pool, id).await, Status::Pending);
    }

    #[actix_web::test]
    async fn unknown_targets_are_not_found() {
        let pool = memory_pool().await;
        let err = transition(&pool, &admin(1), 404, Status::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = create(&pool, 404, &vacation(d(2025, 1, 6), d(2025, 1, 6), 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[actix_web::test]
    async fn disabled_employees_cannot_submit() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "ljaque", 15).await;
        sqlx::query("UPDATE employees SET active = 0 WHERE id = ?")
            .bind(emp)
            .execute(&pool)
            .await
            .unwrap();

        let err = create(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 6), 1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[actix_web::test]
    async fn preview_reports_without_writing() {
        let pool = memory_pool().await;
        let emp = seed_employee(&pool, "fgarcia", 4).await;
        seed_request(&pool, emp, Category::Vacation, Status::Pending, d(2025, 1, 6), d(2025, 1, 6), 1.0).await;

        let report = preview(&pool, emp, &vacation(d(2025, 1, 6), d(2025, 1, 10), 5.0))
            .await
            .unwrap();
        assert_eq!(report.available, Some(4.0));
        assert!(report.conflict.is_some());
        assert!(!report.fits);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM leave_requests")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn simultaneous_approvals_respect_the_entitlement() {
        let store = FileStore::open().await;
        let pool = &store.pool;
        let emp = seed_employee(pool, "pencina", 5).await;
        let reviewer = admin(seed_employee(pool, "jcerda", 15).await);

        for round in 0..5u32 {
            let month = round + 1;
            let a = seed_request(pool, emp, Category::Vacation, Status::Pending, d(2025, month, 6), d(2025, month, 8), 3.0).await;
            let b = seed_request(pool, emp, Category::Vacation, Status::Pending, d(2025, month, 20), d(2025, month, 22), 3.0).await;

            let (first, second) = futures::join!(
                transition(pool, &reviewer, a, Status::Approved, None),
                transition(pool, &reviewer, b, Status::Approved, None),
            );
            let outcomes = [first, second];
            let approved = outcomes.iter().filter(|o| o.is_ok()).count();
            let refused = outcomes
                .iter()
                .filter(|o| matches!(o, Err(AppError::QuotaExceeded { .. })))
                .count();
            assert_eq!((approved, refused), (1, 1), "round {round}: {outcomes:?}");

            let used: f64 = sqlx::query_scalar(
                "SELECT CAST(COALESCE(SUM(quantity), 0) AS REAL) FROM leave_requests WHERE employee_id = ? AND status = 'approved'",
            )
            .bind(emp)
            .fetch_one(pool)
            .await
            .unwrap();
            assert!(used <= 5.0, "round {round}: {used} approved");

            // reopen both so the next round starts from an empty balance
            for id in [a, b] {
                transition(pool, &reviewer, id, Status::Pending, None).await.unwrap();
            }
        }
    }
}
