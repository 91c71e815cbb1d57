use chrono::NaiveDate;
use sqlx::SqliteConnection;

use crate::model::leave_request::{HalfDay, LEAVE_COLUMNS, LeaveRequest, Status};

/// Whether an existing request whose span already intersects the candidate
/// blocks it. Two half-days can only intersect on their single shared date;
/// they coexist when the markers differ (AM + PM). The rule is applied to
/// every category alike.
pub fn blocks(existing: &LeaveRequest, half_day: Option<HalfDay>) -> bool {
    match (existing.half_day, half_day) {
        (Some(theirs), Some(ours)) => theirs == ours,
        _ => true,
    }
}

/// First pending or approved request of the employee that conflicts with
/// `[start, end]`, in id order.
pub async fn find_conflict(
    conn: &mut SqliteConnection,
    employee_id: i64,
    start: NaiveDate,
    end: NaiveDate,
    half_day: Option<HalfDay>,
) -> Result<Option<LeaveRequest>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {LEAVE_COLUMNS}
        FROM leave_requests
        WHERE employee_id = ?
          AND status IN (?, ?)
          AND start_date <= ?
          AND end_date >= ?
        ORDER BY id ASC
        "#
    );

    let candidates = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(employee_id)
        .bind(Status::ACTIVE[0])
        .bind(Status::ACTIVE[1])
        .bind(end)
        .bind(start)
        .fetch_all(conn)
        .await?;

    Ok(candidates
        .into_iter()
        .find(|existing| blocks(existing, half_day)))
}
