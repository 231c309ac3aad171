use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::status::{self, StatusEnum};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePunch {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub punched_at: DateTime<Utc>,
    pub direction: PunchDirection,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PunchDirection {
    In,
    Out,
}

impl StatusEnum for PunchDirection {
    const KIND: &'static str = "punch direction";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PunchDirection::In),
            1 => Some(PunchDirection::Out),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "IN" => Some(PunchDirection::In),
            "OUT" => Some(PunchDirection::Out),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            PunchDirection::In => "IN",
            PunchDirection::Out => "OUT",
        }
    }
}

impl PunchDirection {
    pub fn as_str(self) -> &'static str {
        StatusEnum::as_str(self)
    }
}

impl Serialize for PunchDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(StatusEnum::as_str(*self))
    }
}

impl<'de> Deserialize<'de> for PunchDirection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        status::deserialize(deserializer)
    }
}
