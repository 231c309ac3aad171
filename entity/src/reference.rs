use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic lookup row (category + name) backing select inputs across the
/// app: permission kinds, contract types, departments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceType {
    pub id: Uuid,
    pub category: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Well-known categories used by the fixed workflows.
pub mod categories {
    pub const PERMISSION_KIND: &str = "permission_kind";
    pub const CONTRACT_TYPE: &str = "contract_type";
    pub const DEPARTMENT: &str = "department";
}
