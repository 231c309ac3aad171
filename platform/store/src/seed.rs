//! Demo fixtures for development and integration tests.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use entity::attendance::{AttendancePunch, PunchDirection};
use entity::employee::Employee;
use entity::leave::{Permission, PermissionStatus, Vacation, VacationStatus, span_days};
use entity::person::Person;
use entity::reference::{ReferenceType, categories};
use entity::schedule::{Schedule, ScheduleAssignment};
use uuid::Uuid;

use crate::HrStore;

/// Everything `seed_demo` inserted, for tests that need concrete ids.
#[derive(Clone, Debug, Default)]
pub struct SeededHrRecords {
    pub reference_types: Vec<ReferenceType>,
    pub persons: Vec<Person>,
    pub employees: Vec<Employee>,
    pub schedules: Vec<Schedule>,
    pub assignments: Vec<ScheduleAssignment>,
    pub punches: Vec<AttendancePunch>,
    pub permissions: Vec<Permission>,
    pub vacations: Vec<Vacation>,
}

impl SeededHrRecords {
    pub fn reference_type(&self, category: &str, name: &str) -> Option<&ReferenceType> {
        self.reference_types
            .iter()
            .find(|r| r.category == category && r.name == name)
    }

    pub fn employee_by_number(&self, number: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.employee_number == number)
    }
}

impl HrStore {
    /// Loads a small consistent fixture set: lookup rows, three employees,
    /// a day-shift schedule actively assigned to the first one, and sample
    /// punches and leave requests.
    pub fn seed_demo(&self) -> SeededHrRecords {
        let now = Utc::now();
        let today = now.date_naive();
        let mut seeded = SeededHrRecords::default();

        for (category, name) in [
            (categories::PERMISSION_KIND, "Medical"),
            (categories::PERMISSION_KIND, "Personal"),
            (categories::CONTRACT_TYPE, "Full Time"),
            (categories::CONTRACT_TYPE, "Temporary"),
            (categories::DEPARTMENT, "Engineering"),
            (categories::DEPARTMENT, "Operations"),
        ] {
            seeded.reference_types.push(self.reference_types.insert(ReferenceType {
                id: Uuid::new_v4(),
                category: category.to_string(),
                name: name.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            }));
        }

        let people = [
            ("Ada", "Lovelace", "NID-0001", 1985, 12, 10, "E-0001", "Engineering", "Developer"),
            ("Grace", "Hopper", "NID-0002", 1988, 6, 9, "E-0002", "Engineering", "Team Lead"),
            ("Edsger", "Dijkstra", "NID-0003", 1979, 5, 11, "E-0003", "Operations", "Analyst"),
        ];
        for (first, last, nid, y, m, d, number, department, title) in people {
            let person = self.persons.insert(Person {
                id: Uuid::new_v4(),
                first_name: first.to_string(),
                last_name: last.to_string(),
                national_id: nid.to_string(),
                birth_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today),
                email: Some(format!(
                    "{}.{}@example.test",
                    first.to_lowercase(),
                    last.to_lowercase()
                )),
                phone: None,
                address: None,
                created_at: now,
                updated_at: now,
            });
            let employee = self.employees.insert(Employee {
                id: Uuid::new_v4(),
                person_id: person.id,
                employee_number: number.to_string(),
                department: department.to_string(),
                job_title: title.to_string(),
                hire_date: today.checked_sub_days(Days::new(400)).unwrap_or(today),
                termination_date: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            });
            seeded.persons.push(person);
            seeded.employees.push(employee);
        }

        let day_shift = self.schedules.insert(Schedule {
            id: Uuid::new_v4(),
            name: "Day Shift".to_string(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            work_days: vec![1, 2, 3, 4, 5],
            tolerance_minutes: 10,
            created_at: now,
            updated_at: now,
        });
        let night_shift = self.schedules.insert(Schedule {
            id: Uuid::new_v4(),
            name: "Night Shift".to_string(),
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            work_days: vec![1, 2, 3, 4, 5],
            tolerance_minutes: 15,
            created_at: now,
            updated_at: now,
        });
        seeded.schedules.push(day_shift.clone());
        seeded.schedules.push(night_shift);

        let first = &seeded.employees[0];
        seeded.assignments.push(self.assignments.insert(ScheduleAssignment {
            id: Uuid::new_v4(),
            employee_id: first.id,
            schedule_id: day_shift.id,
            start_date: today.checked_sub_days(Days::new(30)).unwrap_or(today),
            end_date: None,
            created_at: now,
            updated_at: now,
        }));

        let yesterday = now - chrono::Duration::days(1);
        for (offset_hours, direction) in [(9, PunchDirection::In), (17, PunchDirection::Out)] {
            seeded.punches.push(self.punches.insert(AttendancePunch {
                id: Uuid::new_v4(),
                employee_id: first.id,
                punched_at: punch_instant(yesterday, offset_hours),
                direction,
                source: Some("terminal-1".to_string()),
                created_at: now,
            }));
        }

        let medical = seeded
            .reference_type(categories::PERMISSION_KIND, "Medical")
            .cloned();
        if let Some(kind) = medical {
            seeded.permissions.push(self.permissions.insert(Permission {
                id: Uuid::new_v4(),
                employee_id: first.id,
                kind_id: kind.id,
                date: today.checked_add_days(Days::new(3)).unwrap_or(today),
                start_time: NaiveTime::from_hms_opt(10, 0, 0),
                end_time: NaiveTime::from_hms_opt(12, 0, 0),
                reason: Some("Dental appointment".to_string()),
                status: PermissionStatus::Pending,
                decided_by: None,
                decided_at: None,
                created_at: now,
                updated_at: now,
            }));
        }

        let start = today.checked_add_days(Days::new(20)).unwrap_or(today);
        let end = start.checked_add_days(Days::new(9)).unwrap_or(start);
        seeded.vacations.push(self.vacations.insert(Vacation {
            id: Uuid::new_v4(),
            employee_id: first.id,
            start_date: start,
            end_date: end,
            days: span_days(start, end),
            status: VacationStatus::Planned,
            created_at: now,
            updated_at: now,
        }));

        seeded
    }
}

fn punch_instant(day: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    day.date_naive()
        .and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_produces_consistent_fixtures() {
        let store = HrStore::new();
        let seeded = store.seed_demo();

        assert_eq!(seeded.persons.len(), seeded.employees.len());
        assert!(seeded.reference_types.len() >= 6);
        for employee in &seeded.employees {
            assert!(store.persons.get(employee.person_id).is_some());
        }
        let first = &seeded.employees[0];
        let today = Utc::now().date_naive();
        let active = store.active_assignment(first.id, today).unwrap();
        assert!(store.schedules.get(active.schedule_id).is_some());
        assert_eq!(seeded.vacations[0].days, 10);
    }
}
