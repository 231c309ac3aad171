use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Auth principal. Not serialized directly: responses map through a DTO that
/// leaves `password_hash` behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r.level() >= role.level())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    HrManager,
    Supervisor,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::HrManager => "HR_MANAGER",
            Role::Supervisor => "SUPERVISOR",
            Role::Employee => "EMPLOYEE",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "HR_MANAGER" => Some(Role::HrManager),
            "SUPERVISOR" => Some(Role::Supervisor),
            "EMPLOYEE" => Some(Role::Employee),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            Role::Admin => 4,
            Role::HrManager => 3,
            Role::Supervisor => 2,
            Role::Employee => 1,
        }
    }
}
