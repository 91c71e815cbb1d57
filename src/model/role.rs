use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    Employee,
    Administrator,
}

sqlite_text_enum!(Role);

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Administrator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_text_form() {
        assert_eq!(Role::Administrator.to_string(), "administrator");
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert!("hr".parse::<Role>().is_err());
    }
}
