use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One payroll record per employee and period. Amounts are cents; `net_cents`
/// is derived as gross minus deductions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub gross_cents: i64,
    pub deductions_cents: i64,
    pub net_cents: i64,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
