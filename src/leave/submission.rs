use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppError,
    leave::{calendar::HolidayCalendar, calendar::business_days, lifecycle::NewLeaveRequest},
    model::leave_request::{Category, HalfDay},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Portion {
    #[default]
    Full,
    Am,
    Pm,
}

impl Portion {
    fn half_day(self) -> Option<HalfDay> {
        match self {
            Portion::Full => None,
            Portion::Am => Some(HalfDay::Am),
            Portion::Pm => Some(HalfDay::Pm),
        }
    }
}

/// What an employee fills in. The quantity is derived from it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SubmitLeave {
    pub category: Category,
    #[schema(example = "2025-01-06", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    /// Defaults to `start_date`
    #[schema(example = "2025-01-10", format = "date", value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    /// Administrative requests only
    #[serde(default)]
    pub portion: Portion,
    /// Overtime and comp time only
    #[schema(example = 4.0)]
    pub hours: Option<f64>,
    /// Overtime worked on a day that counts double
    #[serde(default)]
    pub double_hours: bool,
    pub reason: Option<String>,
}

/// Most hours that can be reported for a single date.
pub const MAX_HOURS_PER_DATE: f64 = 24.0;

fn reject(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Turns a submission into a request with a computed quantity: business
/// days for day-based categories and reported hours for the others.
pub fn prepare(calendar: &HolidayCalendar, form: &SubmitLeave) -> Result<NewLeaveRequest, AppError> {
    let start = form.start_date;
    let end = form.end_date.unwrap_or(start);
    if start > end {
        return Err(reject("start_date cannot be after end_date"));
    }
    if form.portion != Portion::Full && form.category != Category::Administrative {
        return Err(reject("half days are only available for administrative requests"));
    }

    let half_day = form.portion.half_day();
    let quantity = match form.category {
        Category::Vacation | Category::Administrative => {
            if form.hours.is_some() || form.double_hours {
                return Err(reject("day-based requests do not take hours"));
            }
            if half_day.is_some() {
                if start != end {
                    return Err(reject("a half day must start and end on the same date"));
                }
                if calendar.is_business_day(start) { 0.5 } else { 0.0 }
            } else {
                business_days(start, end, calendar) as f64
            }
        }
        Category::Overtime | Category::CompTime => {
            if start != end {
                return Err(reject("hours are reported for a single date"));
            }
            let hours = form.hours.ok_or_else(|| reject("hours are required"))?;
            if !(hours > 0.0) {
                return Err(reject("hours must be greater than zero"));
            }
            if !(hours <= MAX_HOURS_PER_DATE) {
                return Err(AppError::Validation(format!(
                    "at most {MAX_HOURS_PER_DATE} hours can be reported for one date"
                )));
            }
            if form.double_hours && form.category != Category::Overtime {
                return Err(reject("only overtime can count double"));
            }
            if form.double_hours { hours * 2.0 } else { hours }
        }
    };

    if quantity == 0.0 {
        return Err(reject("no business days in range"));
    }

    Ok(NewLeaveRequest {
        category: form.category,
        start_date: start,
        end_date: end,
        quantity,
        half_day,
        reason: form
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    })
}
