//! Leave requests: permissions (hours within a day) and vacations (day
//! ranges). Both cycle through a small status enumeration with the decision
//! recorded on the record itself.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::status::{self, StatusEnum};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub kind_id: Uuid,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub reason: Option<String>,
    pub status: PermissionStatus,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PermissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl StatusEnum for PermissionStatus {
    const KIND: &'static str = "permission";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PermissionStatus::Pending),
            1 => Some(PermissionStatus::Approved),
            2 => Some(PermissionStatus::Rejected),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(PermissionStatus::Pending),
            "APPROVED" => Some(PermissionStatus::Approved),
            "REJECTED" => Some(PermissionStatus::Rejected),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            PermissionStatus::Pending => "PENDING",
            PermissionStatus::Approved => "APPROVED",
            PermissionStatus::Rejected => "REJECTED",
        }
    }
}

impl PermissionStatus {
    pub fn as_str(self) -> &'static str {
        StatusEnum::as_str(self)
    }
}

impl Serialize for PermissionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(StatusEnum::as_str(*self))
    }
}

impl<'de> Deserialize<'de> for PermissionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        status::deserialize(deserializer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub status: VacationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inclusive day count of a vacation range. Callers validate `end >= start`.
pub fn span_days(start: NaiveDate, end: NaiveDate) -> u32 {
    (end - start).num_days().max(0) as u32 + 1
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VacationStatus {
    Planned,
    InProgress,
    Canceled,
}

impl StatusEnum for VacationStatus {
    const KIND: &'static str = "vacation";

    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(VacationStatus::Planned),
            1 => Some(VacationStatus::InProgress),
            2 => Some(VacationStatus::Canceled),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PLANNED" => Some(VacationStatus::Planned),
            "IN_PROGRESS" | "INPROGRESS" => Some(VacationStatus::InProgress),
            "CANCELED" | "CANCELLED" => Some(VacationStatus::Canceled),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            VacationStatus::Planned => "PLANNED",
            VacationStatus::InProgress => "IN_PROGRESS",
            VacationStatus::Canceled => "CANCELED",
        }
    }
}

impl VacationStatus {
    pub fn as_str(self) -> &'static str {
        StatusEnum::as_str(self)
    }
}

impl Serialize for VacationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(StatusEnum::as_str(*self))
    }
}

impl<'de> Deserialize<'de> for VacationStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        status::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_accepts_numeric_codes() {
        let status: PermissionStatus = serde_json::from_str("1").unwrap();
        assert_eq!(status, PermissionStatus::Approved);
        let status: VacationStatus = serde_json::from_str("2").unwrap();
        assert_eq!(status, VacationStatus::Canceled);
    }

    #[test]
    fn status_accepts_free_text_casing() {
        let status: PermissionStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, PermissionStatus::Pending);
        let status: VacationStatus = serde_json::from_str("\"inProgress\"").unwrap();
        assert_eq!(status, VacationStatus::InProgress);
        let status: VacationStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, VacationStatus::Canceled);
    }

    #[test]
    fn status_serializes_canonical_string() {
        let json = serde_json::to_string(&PermissionStatus::Rejected).unwrap();
        assert_eq!(json, "\"REJECTED\"");
        let json = serde_json::to_string(&VacationStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_str::<PermissionStatus>("\"maybe\"").is_err());
        assert!(serde_json::from_str::<PermissionStatus>("7").is_err());
    }

    #[test]
    fn span_is_inclusive() {
        let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(span_days(day("2026-03-02"), day("2026-03-02")), 1);
        assert_eq!(span_days(day("2026-03-02"), day("2026-03-06")), 5);
    }
}
