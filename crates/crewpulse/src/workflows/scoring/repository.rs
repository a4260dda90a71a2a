use chrono::{NaiveDate, NaiveDateTime};

use super::domain::{
    AssignedTask, AttendanceRecord, CompanyId, Employee, MonthlyScoreSnapshot, ReviewRecord,
    ShiftAssignment, TaskCompletion, TestSubmission, WarningEvent,
};

/// Read-only access to the operations backend. Every query is scoped to one
/// company; date ranges are inclusive unless noted. Implementations must not
/// mutate anything: the pipeline relies on reads being repeatable within a
/// run and across backfills.
pub trait OperationsSource: Send + Sync {
    fn companies(&self) -> Result<Vec<CompanyId>, SourceError>;

    /// Employees eligible for scoring: active ones, with company and
    /// optional location attached.
    fn active_employees(&self, company: &CompanyId) -> Result<Vec<Employee>, SourceError>;

    /// Shift assignments in an approved state with dates in `[start, end]`.
    fn approved_assignments(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ShiftAssignment>, SourceError>;

    /// Attendance records with a check-in timestamp in `[start, end)`.
    fn attendance_between(
        &self,
        company: &CompanyId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<AttendanceRecord>, SourceError>;

    /// Directly assigned tasks created in `[start, end]`.
    fn assigned_tasks(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AssignedTask>, SourceError>;

    /// Employee-attributed task completions in `[start, end]`, including
    /// completions of shared pool tasks.
    fn task_completions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TaskCompletion>, SourceError>;

    /// Graded test submissions in `[start, end]`.
    fn test_submissions(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TestSubmission>, SourceError>;

    /// Manager reviews with an audit date in `[start, end]`.
    fn reviews(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ReviewRecord>, SourceError>;

    /// Disciplinary warnings issued in `[start, end]`; the caller passes the
    /// trailing decay window, which may reach into earlier months.
    fn warnings_between(
        &self,
        company: &CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WarningEvent>, SourceError>;
}

/// Error enumeration for source reads.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source query failed: {0}")]
    Query(String),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Persistence seam for monthly snapshots. The natural key is
/// `(employee, month)`; a write replaces whatever was stored for that key.
pub trait SnapshotStore: Send + Sync {
    /// Replace the company's snapshot rows for `month` with `rows`,
    /// atomically per batch, and return how many rows were written. Rows
    /// from a prior run for the same company and month must not survive.
    fn replace_month(
        &self,
        company: &CompanyId,
        month: NaiveDate,
        rows: Vec<MonthlyScoreSnapshot>,
    ) -> Result<usize, SnapshotError>;

    /// All snapshot rows persisted for `month`, across companies, in a
    /// deterministic order. This is the read contract leaderboard and
    /// detail views consume; they never write.
    fn month_rows(&self, month: NaiveDate) -> Result<Vec<MonthlyScoreSnapshot>, SnapshotError>;
}

/// Error enumeration for snapshot persistence.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot write rejected: {0}")]
    Rejected(String),
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}
