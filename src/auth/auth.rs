use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::{error::AppError, model::role::Role};

/// Identity established by `auth_middleware` for the current request.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub employee_id: i64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("missing credentials".into()));
        ready(user)
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("administrators only".into()))
        }
    }

    /// Employees see their own records; administrators see everyone's.
    pub fn ensure_can_view(&self, employee_id: i64) -> Result<(), AppError> {
        if self.is_admin() || self.employee_id == employee_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "records of other employees are not visible".into(),
            ))
        }
    }
}
