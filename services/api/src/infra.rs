use chrono::{NaiveDate, NaiveDateTime};
use crewpulse::workflows::scoring::{
    ApprovalState, AssignedTask, AttendanceRecord, CompanyId, Employee, EmployeeId,
    EmployeeStatus, FixtureSet, MonthlyScoreSnapshot, OperationsSource, ReviewRecord,
    ShiftAssignment, SnapshotError, SnapshotStore, SourceError, TaskCompletion, TestSubmission,
    WarningEvent,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Operations source backed by an in-memory fixture set. Stands in for the
/// managed backend; reads filter per company and range exactly as the
/// backend queries would.
#[derive(Default, Clone)]
pub(crate) struct InMemoryOperationsSource {
    data: Arc<Mutex<FixtureSet>>,
}

impl InMemoryOperationsSource {
    pub(crate) fn ingest(&self, fixtures: FixtureSet) {
        let mut guard = self.data.lock().expect("source mutex poisoned");
        guard.companies.extend(fixtures.companies);
        guard.employees.extend(fixtures.employees);
        guard.assignments.extend(fixtures.assignments);
        guard.attendance.extend(fixtures.attendance);
        guard.tasks.extend(fixtures.tasks);
        guard.completions.extend(fixtures.completions);
        guard.test_submissions.extend(fixtures.test_submissions);
        guard.reviews.extend(fixtures.reviews);
        guard.warnings.extend(fixtures.warnings);
    }

    fn with_data<T>(&self, read: impl FnOnce(&FixtureSet) -> T) -> T {
        let guard = self.data.lock().expect("source mutex poisoned");
        read(&guard)
    }
}

fn belongs_to(data: &FixtureSet, employee_id: &EmployeeId, company: &CompanyId) -> bool {
    data.employees
        .iter()
        .any(|employee| employee.id == *employee_id && employee.company == *company)
}

impl OperationsSource for InMemoryOperationsSource {
    fn companies(&self) -> Result<Vec<CompanyId>, SourceError> {
        Ok(self.with_data(|data| data.companies.clone()))
    }

    fn active_employees(&self, company: &CompanyId) -> Result<Vec<Employee>, SourceError> {
        Ok(self.with_data(|data| {
            data.employees
                .iter()
                .filter(|employee| {
                    employee.company == *company && employee.status == EmployeeStatus::Active
                })
                .cloned()
                .collect()
        }))
    }

    fn approved_assignments(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, SourceError> {
        Ok(self.with_data(|data| {
            data.assignments
                .iter()
                .filter(|assignment| {
                    assignment.approval == ApprovalState::Approved
                        && assignment.date >= start
                        && assignment.date <= end
                        && belongs_to(data, &assignment.employee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AttendanceRecord>, SourceError> {
        Ok(self.with_data(|data| {
            data.attendance
                .iter()
                .filter(|record| {
                    record.check_in >= start
                        && record.check_in < end
                        && belongs_to(data, &record.employee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn assigned_tasks(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssignedTask>, SourceError> {
        Ok(self.with_data(|data| {
            data.tasks
                .iter()
                .filter(|task| {
                    task.created_on >= start
                        && task.created_on <= end
                        && belongs_to(data, &task.assignee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn task_completions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskCompletion>, SourceError> {
        Ok(self.with_data(|data| {
            data.completions
                .iter()
                .filter(|completion| {
                    completion.completed_on >= start
                        && completion.completed_on <= end
                        && belongs_to(data, &completion.employee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn test_submissions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TestSubmission>, SourceError> {
        Ok(self.with_data(|data| {
            data.test_submissions
                .iter()
                .filter(|submission| {
                    let on = submission.submitted_at.date();
                    on >= start && on <= end && belongs_to(data, &submission.employee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn reviews(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, SourceError> {
        Ok(self.with_data(|data| {
            data.reviews
                .iter()
                .filter(|record| {
                    record.audited_on >= start
                        && record.audited_on <= end
                        && belongs_to(data, &record.employee, company)
                })
                .cloned()
                .collect()
        }))
    }

    fn warnings_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WarningEvent>, SourceError> {
        Ok(self.with_data(|data| {
            data.warnings
                .iter()
                .filter(|event| {
                    event.issued_on >= start
                        && event.issued_on <= end
                        && belongs_to(data, &event.employee, company)
                })
                .cloned()
                .collect()
        }))
    }
}

/// Snapshot store keyed by `(employee, month)`. A batch write clears the
/// company's rows for that month first, all under one lock, so re-runs
/// replace instead of accumulate.
#[derive(Default, Clone)]
pub(crate) struct InMemorySnapshotStore {
    rows: Arc<Mutex<HashMap<(EmployeeId, NaiveDate), MonthlyScoreSnapshot>>>,
}

impl SnapshotStore for InMemorySnapshotStore {
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

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
