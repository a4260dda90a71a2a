use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::workflows::scoring::domain::{
    ApprovalState, AssignedTask, AttendanceRecord, CompanyId, Employee, EmployeeId,
    EmployeeStatus, LocationId, MonthlyScoreSnapshot, ReviewRecord, ShiftAssignment, ShiftId,
    TaskCompletion, TaskId, TestSubmission, WarningEvent, WarningSeverity,
};
use crate::workflows::scoring::fixtures::FixtureSet;
use crate::workflows::scoring::period::ScoringPeriod;
use crate::workflows::scoring::repository::{
    OperationsSource, SnapshotError, SnapshotStore, SourceError,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(date_value: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    date_value.and_time(NaiveTime::from_hms_opt(hour, minute, 0).expect("valid time"))
}

/// February 2026, the month most fixtures below are built around.
pub(super) fn fixture_period() -> ScoringPeriod {
    ScoringPeriod::for_month(date(2026, 2, 1))
}

pub(super) fn employee(id: &str, company: &str, location: Option<&str>) -> Employee {
    Employee {
        id: EmployeeId(id.to_string()),
        name: format!("Employee {id}"),
        company: CompanyId(company.to_string()),
        location: location.map(|value| LocationId(value.to_string())),
        status: EmployeeStatus::Active,
    }
}

pub(super) fn shift(id: &str, employee_id: &str, on: NaiveDate) -> ShiftAssignment {
    ShiftAssignment {
        shift: ShiftId(id.to_string()),
        employee: EmployeeId(employee_id.to_string()),
        date: on,
        approval: ApprovalState::Approved,
    }
}

pub(super) fn attendance_for_shift(
    employee_id: &str,
    shift_id: &str,
    on: NaiveDate,
) -> AttendanceRecord {
    AttendanceRecord {
        employee: EmployeeId(employee_id.to_string()),
        shift: Some(ShiftId(shift_id.to_string())),
        check_in: at(on, 8, 58),
        check_out: Some(at(on, 17, 2)),
        late: false,
        late_minutes: 0,
    }
}

pub(super) fn walk_in_attendance(employee_id: &str, on: NaiveDate) -> AttendanceRecord {
    AttendanceRecord {
        employee: EmployeeId(employee_id.to_string()),
        shift: None,
        check_in: at(on, 9, 5),
        check_out: None,
        late: false,
        late_minutes: 0,
    }
}

pub(super) fn late_attendance(
    employee_id: &str,
    shift_id: &str,
    on: NaiveDate,
    minutes: u32,
) -> AttendanceRecord {
    AttendanceRecord {
        employee: EmployeeId(employee_id.to_string()),
        shift: Some(ShiftId(shift_id.to_string())),
        check_in: at(on, 9, minutes.min(59)),
        check_out: None,
        late: true,
        late_minutes: minutes,
    }
}

pub(super) fn task(id: &str, assignee: &str, created: NaiveDate) -> AssignedTask {
    AssignedTask {
        id: TaskId(id.to_string()),
        assignee: EmployeeId(assignee.to_string()),
        created_on: created,
    }
}

pub(super) fn completion(
    task_id: &str,
    employee_id: &str,
    on: NaiveDate,
    late: bool,
    shared: bool,
) -> TaskCompletion {
    TaskCompletion {
        task: TaskId(task_id.to_string()),
        employee: EmployeeId(employee_id.to_string()),
        completed_on: on,
        late,
        shared,
    }
}

pub(super) fn test_submission(employee_id: &str, on: NaiveDate, score: f64) -> TestSubmission {
    TestSubmission {
        employee: EmployeeId(employee_id.to_string()),
        submitted_at: at(on, 14, 0),
        score,
    }
}

pub(super) fn review(employee_id: &str, on: NaiveDate, score: f64) -> ReviewRecord {
    ReviewRecord {
        employee: EmployeeId(employee_id.to_string()),
        audited_on: on,
        score,
    }
}

pub(super) fn warning(
    employee_id: &str,
    on: NaiveDate,
    severity: WarningSeverity,
) -> WarningEvent {
    WarningEvent {
        employee: EmployeeId(employee_id.to_string()),
        issued_on: on,
        severity,
        note: "documented incident".to_string(),
    }
}

/// Read-only source backed by a [`FixtureSet`], filtering per company the
/// way the production backend queries would.
pub(super) struct MemorySource {
    data: FixtureSet,
}

impl MemorySource {
    pub(super) fn new(data: FixtureSet) -> Self {
        Self { data }
    }

    fn company_of(&self, employee_id: &EmployeeId) -> Option<&CompanyId> {
        self.data
            .employees
            .iter()
            .find(|employee| &employee.id == employee_id)
            .map(|employee| &employee.company)
    }

    fn belongs_to(&self, employee_id: &EmployeeId, company: &CompanyId) -> bool {
        self.company_of(employee_id) == Some(company)
    }
}

impl OperationsSource for MemorySource {
    fn companies(&self) -> Result<Vec<CompanyId>, SourceError> {
        Ok(self.data.companies.clone())
    }

    fn active_employees(&self, company: &CompanyId) -> Result<Vec<Employee>, SourceError> {
        Ok(self
            .data
            .employees
            .iter()
            .filter(|employee| {
                employee.company == *company && employee.status == EmployeeStatus::Active
            })
            .cloned()
            .collect())
    }

    fn approved_assignments(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, SourceError> {
        Ok(self
            .data
            .assignments
            .iter()
            .filter(|assignment| {
                assignment.approval == ApprovalState::Approved
                    && assignment.date >= start
                    && assignment.date <= end
                    && self.belongs_to(&assignment.employee, company)
            })
            .cloned()
            .collect())
    }

    fn attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        Ok(self
            .data
            .attendance
            .iter()
            .filter(|record| {
                record.check_in >= start
                    && record.check_in < end
                    && self.belongs_to(&record.employee, company)
            })
            .cloned()
            .collect())
    }

    fn assigned_tasks(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssignedTask>, SourceError> {
        Ok(self
            .data
            .tasks
            .iter()
            .filter(|task| {
                task.created_on >= start
                    && task.created_on <= end
                    && self.belongs_to(&task.assignee, company)
            })
            .cloned()
            .collect())
    }

    fn task_completions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskCompletion>, SourceError> {
        Ok(self
            .data
            .completions
            .iter()
            .filter(|completion| {
                completion.completed_on >= start
                    && completion.completed_on <= end
                    && self.belongs_to(&completion.employee, company)
            })
            .cloned()
            .collect())
    }

    fn test_submissions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TestSubmission>, SourceError> {
        Ok(self
            .data
            .test_submissions
            .iter()
            .filter(|submission| {
                let on = submission.submitted_at.date();
                on >= start && on <= end && self.belongs_to(&submission.employee, company)
            })
            .cloned()
            .collect())
    }

    fn reviews(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, SourceError> {
        Ok(self
            .data
            .reviews
            .iter()
            .filter(|record| {
                record.audited_on >= start
                    && record.audited_on <= end
                    && self.belongs_to(&record.employee, company)
            })
            .cloned()
            .collect())
    }

    fn warnings_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WarningEvent>, SourceError> {
        Ok(self
            .data
            .warnings
            .iter()
            .filter(|event| {
                event.issued_on >= start
                    && event.issued_on <= end
                    && self.belongs_to(&event.employee, company)
            })
            .cloned()
            .collect())
    }
}

/// Source whose company listing itself fails; aborts the whole run.
pub(super) struct BrokenSource;

impl OperationsSource for BrokenSource {
    fn companies(&self) -> Result<Vec<CompanyId>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn active_employees(&self, _company: &CompanyId) -> Result<Vec<Employee>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn approved_assignments(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn attendance_between(
        &self,
        _company: &CompanyId,
        _start: NaiveDateTime,
        _end: NaiveDateTime,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn assigned_tasks(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<AssignedTask>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn task_completions(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<TaskCompletion>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn test_submissions(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<TestSubmission>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn reviews(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }

    fn warnings_between(
        &self,
        _company: &CompanyId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<WarningEvent>, SourceError> {
        Err(SourceError::Unavailable("backend offline".to_string()))
    }
}

/// Delegating source that fails employee reads for one chosen company and
/// optionally stalls another, to exercise partial-success runs.
pub(super) struct FlakySource {
    pub(super) inner: MemorySource,
    pub(super) failing: Option<CompanyId>,
    pub(super) stalling: Option<(CompanyId, Duration)>,
}

impl FlakySource {
    pub(super) fn wrapping(inner: MemorySource) -> Self {
        Self {
            inner,
            failing: None,
            stalling: None,
        }
    }
}

impl OperationsSource for FlakySource {
    fn companies(&self) -> Result<Vec<CompanyId>, SourceError> {
        self.inner.companies()
    }

    fn active_employees(&self, company: &CompanyId) -> Result<Vec<Employee>, SourceError> {
        if self.failing.as_ref() == Some(company) {
            return Err(SourceError::Query(format!(
                "employee query failed for {}",
                company.0
            )));
        }
        if let Some((stalled, pause)) = &self.stalling {
            if stalled == company {
                std::thread::sleep(*pause);
            }
        }
        self.inner.active_employees(company)
    }

    fn approved_assignments(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, SourceError> {
        self.inner.approved_assignments(company, start, end)
    }

    fn attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        self.inner.attendance_between(company, start, end)
    }

    fn assigned_tasks(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssignedTask>, SourceError> {
        self.inner.assigned_tasks(company, start, end)
    }

    fn task_completions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskCompletion>, SourceError> {
        self.inner.task_completions(company, start, end)
    }

    fn test_submissions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TestSubmission>, SourceError> {
        self.inner.test_submissions(company, start, end)
    }

    fn reviews(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, SourceError> {
        self.inner.reviews(company, start, end)
    }

    fn warnings_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WarningEvent>, SourceError> {
        self.inner.warnings_between(company, start, end)
    }
}

/// Keyed in-memory snapshot store with replace-month semantics.
#[derive(Default)]
pub(super) struct MemoryStore {
    rows: Mutex<HashMap<(EmployeeId, NaiveDate), MonthlyScoreSnapshot>>,
}

impl SnapshotStore for MemoryStore {
    fn replace_month(
        &self,
        company: &CompanyId,
        month: NaiveDate,
        rows: Vec<MonthlyScoreSnapshot>,
    ) -> Result<usize, SnapshotError> {
        let mut guard = self.rows.lock().expect("store mutex poisoned");
        guard.retain(|(_, row_month), row| !(*row_month == month && row.company == *company));
        let written = rows.len();
        for row in rows {
            guard.insert((row.employee.clone(), month), row);
        }
        Ok(written)
    }

    fn month_rows(&self, month: NaiveDate) -> Result<Vec<MonthlyScoreSnapshot>, SnapshotError> {
        let guard = self.rows.lock().expect("store mutex poisoned");
        let mut rows: Vec<MonthlyScoreSnapshot> = guard
            .values()
            .filter(|row| row.month == month)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (&a.company, &a.employee).cmp(&(&b.company, &b.employee)));
        Ok(rows)
    }
}

/// Store that rejects every write, for persistence-failure runs.
#[derive(Default)]
pub(super) struct RejectingStore;

impl SnapshotStore for RejectingStore {
    fn replace_month(
        &self,
        _company: &CompanyId,
        _month: NaiveDate,
        _rows: Vec<MonthlyScoreSnapshot>,
    ) -> Result<usize, SnapshotError> {
        Err(SnapshotError::Unavailable("disk full".to_string()))
    }

    fn month_rows(&self, _month: NaiveDate) -> Result<Vec<MonthlyScoreSnapshot>, SnapshotError> {
        Ok(Vec::new())
    }
}
