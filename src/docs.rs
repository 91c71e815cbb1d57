use crate::api::employee::{EmployeeDetail, EmployeeListResponse};
use crate::api::leave_request::{BalanceSummary, HolidayList, MyRequests, StatusUpdate, YearQuery};
use crate::directory::{EmployeeUpdate, NewEmployee};
use crate::leave::balance::Balance;
use crate::leave::lifecycle::{Assessment, TransitionOutcome};
use crate::leave::report::{AdminFilter, AdminPanel, CategoryPanel, RequestListing, RequestPage};
use crate::leave::submission::{Portion, SubmitLeave};
use crate::model::employee::Employee;
use crate::model::leave_request::{Category, HalfDay, LeaveRequest, Status, Unit};
use crate::model::role::Role;
use crate::models::{LoginReqDto, LoginResponse};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Time-off API",
        version = "1.0.0",
        description = r#"
## Time-off requests and balances

Employees request vacation days, administrative days, report overtime and
redeem it as comp time. Administrators review requests; every approval is
checked against the yearly balance of its category.

### Categories
- **vacation**: business days, capped by the employee's yearly entitlement
- **administrative**: business days or AM/PM half days, 6 per year
- **overtime**: hours, uncapped, needs a reason
- **comp_time**: hours, capped by the overtime approved in the same year

### Security
Every endpoint except `/auth/login` needs a **JWT Bearer** token.
Endpoints under `/api/admin` are for administrators only.
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::preview_leave,
        crate::api::leave_request::my_requests,
        crate::api::leave_request::my_balance,
        crate::api::leave_request::holidays,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::admin_leave_list,
        crate::api::leave_request::admin_panel,
        crate::api::leave_request::update_leave_status,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            Category,
            Unit,
            Status,
            HalfDay,
            Role,
            Portion,
            SubmitLeave,
            LeaveRequest,
            Assessment,
            Balance,
            BalanceSummary,
            MyRequests,
            HolidayList,
            YearQuery,
            StatusUpdate,
            TransitionOutcome,
            AdminFilter,
            RequestListing,
            RequestPage,
            CategoryPanel,
            AdminPanel,
            Employee,
            NewEmployee,
            EmployeeUpdate,
            EmployeeDetail,
            EmployeeListResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Leave", description = "Employee self-service"),
        (name = "Admin", description = "Request review and reporting"),
        (name = "Employee", description = "Employee administration"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/login",
            "/api/leave",
            "/api/leave/preview",
            "/api/admin/leave/{leave_id}/status",
            "/api/admin/employee/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
