//! Time-off reconciliation: calendars, balances, overlap checks, the
//! request lifecycle and the reporting views built on top of them.

pub mod balance;
pub mod calendar;
pub mod lifecycle;
pub mod overlap;
pub mod report;
pub mod submission;
