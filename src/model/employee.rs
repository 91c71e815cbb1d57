use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 2,
        "username": "fgarcia",
        "display_name": "F. Garcia",
        "role": "employee",
        "vacation_entitlement": 15,
        "active": true,
        "created_at": "2025-01-02T09:00:00Z",
        "updated_at": "2025-01-02T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 2)]
    pub id: i64,

    #[schema(example = "fgarcia")]
    pub username: String,

    #[schema(example = "F. Garcia")]
    pub display_name: String,

    pub role: Role,

    /// Vacation days granted per calendar year
    #[schema(example = 15)]
    pub vacation_entitlement: i64,

    /// Disabled employees cannot log in; their history is kept
    pub active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns selected whenever an `Employee` is loaded.
pub const EMPLOYEE_COLUMNS: &str = "id, username, display_name, role, vacation_entitlement, \
     active, created_at, updated_at";
