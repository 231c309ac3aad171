use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::status::{self, StatusEnum};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub contract_type_id: Uuid,
    pub copies: u32,
    pub notes: Option<String>,
    pub status: ContractStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContractStatus {
    Pending,
    Issued,
    Rejected,
}

impl StatusEnum for ContractStatus {
    const KIND: &'static str = "contract request";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ContractStatus::Pending),
            1 => Some(ContractStatus::Issued),
            2 => Some(ContractStatus::Rejected),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(ContractStatus::Pending),
            "ISSUED" => Some(ContractStatus::Issued),
            "REJECTED" => Some(ContractStatus::Rejected),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Pending => "PENDING",
            ContractStatus::Issued => "ISSUED",
            ContractStatus::Rejected => "REJECTED",
        }
    }
}

impl ContractStatus {
    pub fn as_str(self) -> &'static str {
        StatusEnum::as_str(self)
    }
}

impl Serialize for ContractStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(StatusEnum::as_str(*self))
    }
}

impl<'de> Deserialize<'de> for ContractStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        status::deserialize(deserializer)
    }
}
