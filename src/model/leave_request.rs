use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Kind of time being requested. Days categories are charged against a
/// yearly cap; hours categories are reported (overtime) or redeemed
/// against approved overtime (comp time).
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Vacation,
    Administrative,
    Overtime,
    CompTime,
}

sqlite_text_enum!(Category);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Unit {
    Days,
    Hours,
}

impl Category {
    pub fn unit(self) -> Unit {
        match self {
            Category::Vacation | Category::Administrative => Unit::Days,
            Category::Overtime | Category::CompTime => Unit::Hours,
        }
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

sqlite_text_enum!(Status);

impl Status {
    /// Statuses that occupy calendar time and count for overlap checks.
    pub const ACTIVE: [Status; 2] = [Status::Pending, Status::Approved];

    /// Allowed moves. `Rejected` is terminal; an approval may be restored
    /// to pending or rejected by an administrator.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Pending, Status::Approved)
                | (Status::Pending, Status::Rejected)
                | (Status::Approved, Status::Pending)
                | (Status::Approved, Status::Rejected)
        )
    }
}

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum HalfDay {
    #[strum(serialize = "AM")]
    Am,
    #[strum(serialize = "PM")]
    Pm,
}

sqlite_text_enum!(HalfDay);

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "employee_id": 2,
    "category": "administrative",
    "status": "pending",
    "start_date": "2025-03-04",
    "end_date": "2025-03-04",
    "quantity": 0.5,
    "half_day": "AM",
    "reason": null,
    "admin_comment": null,
    "reviewer_id": null,
    "created_at": "2025-02-20T10:15:00Z",
    "updated_at": "2025-02-20T10:15:00Z",
    "reviewed_at": null
}))]
pub struct LeaveRequest {
    pub id: i64,
    pub employee_id: i64,
    pub category: Category,
    pub status: Status,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days for vacation/administrative, hours for overtime/comp_time
    pub quantity: f64,
    pub half_day: Option<HalfDay>,
    pub reason: Option<String>,
    pub admin_comment: Option<String>,
    pub reviewer_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

pub const LEAVE_COLUMNS: &str = "id, employee_id, category, status, start_date, end_date, \
     quantity, half_day, reason, admin_comment, reviewer_id, created_at, updated_at, reviewed_at";

impl LeaveRequest {
    /// Balance year of the request. Always taken from `start_date`.
    pub fn year(&self) -> i32 {
        self.start_date.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_transitions() {
        assert!(Status::Pending.can_transition_to(Status::Approved));
        assert!(Status::Pending.can_transition_to(Status::Rejected));
        assert!(Status::Approved.can_transition_to(Status::Pending));
        assert!(Status::Approved.can_transition_to(Status::Rejected));

        assert!(!Status::Rejected.can_transition_to(Status::Approved));
        assert!(!Status::Rejected.can_transition_to(Status::Pending));
        assert!(!Status::Pending.can_transition_to(Status::Pending));
    }

    #[test]
    fn text_forms_match_store_values() {
        assert_eq!(Category::CompTime.to_string(), "comp_time");
        assert_eq!("overtime".parse::<Category>().unwrap(), Category::Overtime);
        assert_eq!(HalfDay::Pm.to_string(), "PM");
        assert_eq!("AM".parse::<HalfDay>().unwrap(), HalfDay::Am);
        assert_eq!(Status::Approved.to_string(), "approved");
        assert_eq!(Category::CompTime.unit(), Unit::Hours);
        assert_eq!(Category::Administrative.unit().to_string(), "days");
    }
}
