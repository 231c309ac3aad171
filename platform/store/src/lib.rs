//! In-memory array-backed storage. Every entity lives in a [`Collection`]:
//! a `Vec` behind an `RwLock`, looked up by linear scan. There are no
//! cross-collection transactions; multi-step workflows run their steps
//! sequentially.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{Days, NaiveDate, Utc};
use entity::attendance::AttendancePunch;
use entity::certification::FinancialCertification;
use entity::contract::ContractRequest;
use entity::employee::Employee;
use entity::leave::{Permission, Vacation};
use entity::payroll::Payroll;
use entity::person::Person;
use entity::reference::ReferenceType;
use entity::schedule::{Schedule, ScheduleAssignment};
use entity::user::User;
use uuid::Uuid;

mod seed;

pub use seed::SeededHrRecords;

/// A stored row, addressable by id.
pub trait Record: Clone {
    fn id(&self) -> Uuid;
}

macro_rules! impl_record {
    ($($ty:ty),+ $(,)?) => {
        $(impl Record for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        })+
    };
}

impl_record!(
    Person,
    Employee,
    Schedule,
    ScheduleAssignment,
    AttendancePunch,
    Permission,
    Vacation,
    Payroll,
    ContractRequest,
    FinancialCertification,
    ReferenceType,
    User,
);

/// One entity table. Lock poisoning is recovered rather than propagated: the
/// data is a plain `Vec` and stays structurally valid even if a holder
/// panicked.
pub struct Collection<T> {
    rows: RwLock<Vec<T>>,
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn all(&self) -> Vec<T> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.read().iter().find(|row| row.id() == id).cloned()
    }

    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.read().iter().find(|row| pred(row)).cloned()
    }

    pub fn filter(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.read().iter().filter(|row| pred(row)).cloned().collect()
    }

    pub fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.read().iter().any(|row| pred(row))
    }

    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.read().iter().filter(|row| pred(row)).count()
    }

    pub fn insert(&self, row: T) -> T {
        self.write().push(row.clone());
        row
    }

    /// Mutates the row in place and returns the updated clone.
    pub fn update(&self, id: Uuid, apply: impl FnOnce(&mut T)) -> Option<T> {
        let mut rows = self.write();
        let row = rows.iter_mut().find(|row| row.id() == id)?;
        apply(row);
        Some(row.clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<T> {
        let mut rows = self.write();
        let index = rows.iter().position(|row| row.id() == id)?;
        Some(rows.remove(index))
    }
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The whole data store: one collection per entity.
#[derive(Default)]
pub struct HrStore {
    pub persons: Collection<Person>,
    pub employees: Collection<Employee>,
    pub schedules: Collection<Schedule>,
    pub assignments: Collection<ScheduleAssignment>,
    pub punches: Collection<AttendancePunch>,
    pub permissions: Collection<Permission>,
    pub vacations: Collection<Vacation>,
    pub payrolls: Collection<Payroll>,
    pub contract_requests: Collection<ContractRequest>,
    pub certifications: Collection<FinancialCertification>,
    pub reference_types: Collection<ReferenceType>,
    pub users: Collection<User>,
}

impl HrStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The schedule assignment covering `date` for the employee, if any.
    /// Assignment windows do not overlap, so the first hit wins.
    pub fn active_assignment(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Option<ScheduleAssignment> {
        self.assignments
            .find(|a| a.employee_id == employee_id && a.active_on(date))
    }

    /// The schedule replacement workflow: close the active assignment at
    /// `today`, then open a new one starting tomorrow. Two sequential steps
    /// on two collections, no compensating action.
    pub fn replace_schedule(
        &self,
        employee_id: Uuid,
        schedule_id: Uuid,
        today: NaiveDate,
    ) -> ScheduleAssignment {
        let now = Utc::now();
        if let Some(current) = self.active_assignment(employee_id, today) {
            self.assignments.update(current.id, |a| {
                a.end_date = Some(today);
                a.updated_at = now;
            });
        }
        let start = today.checked_add_days(Days::new(1)).unwrap_or(today);
        self.assignments.insert(ScheduleAssignment {
            id: Uuid::new_v4(),
            employee_id,
            schedule_id,
            start_date: start,
            end_date: None,
            created_at: now,
            updated_at: now,
        })
    }
}
