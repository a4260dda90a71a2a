use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for a company (tenant) in the operations backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanyId(pub String);

/// Identifier wrapper for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for a physical work location (site/branch).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(pub String);

/// Identifier wrapper for a scheduled shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftId(pub String);

/// Identifier wrapper for a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

/// Whether an employee is currently part of the scored workforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// Employee master record as read from the operations backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub company: CompanyId,
    pub location: Option<LocationId>,
    pub status: EmployeeStatus,
}

/// Approval state of a shift assignment; only approved assignments count as scheduled work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Approved,
    Pending,
    Declined,
}

/// A shift scheduled for an employee on a calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub shift: ShiftId,
    pub employee: EmployeeId,
    pub date: NaiveDate,
    pub approval: ApprovalState,
}

/// A clock-in/out event. `shift` is absent for records logged outside the
/// scheduling flow; those are correlated to assignments by check-in date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee: EmployeeId,
    pub shift: Option<ShiftId>,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub late: bool,
    pub late_minutes: u32,
}

/// A task assigned directly to one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignedTask {
    pub id: TaskId,
    pub assignee: EmployeeId,
    pub created_on: NaiveDate,
}

/// Completion of a task by an employee. `shared` marks completions of
/// pool tasks that had no direct assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub task: TaskId,
    pub employee: EmployeeId,
    pub completed_on: NaiveDate,
    pub late: bool,
    pub shared: bool,
}

/// A graded knowledge-test submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSubmission {
    pub employee: EmployeeId,
    pub submitted_at: NaiveDateTime,
    pub score: f64,
}

/// A manager audit of the employee's work, graded 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub employee: EmployeeId,
    pub audited_on: NaiveDate,
    pub score: f64,
}

/// Severity class of a disciplinary warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    Major,
    Standard,
}

impl WarningSeverity {
    pub const fn weight(self) -> f64 {
        match self {
            WarningSeverity::Major => 10.0,
            WarningSeverity::Standard => 5.0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            WarningSeverity::Major => "major",
            WarningSeverity::Standard => "standard",
        }
    }
}

/// A disciplinary event feeding the decayed penalty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningEvent {
    pub employee: EmployeeId,
    pub issued_on: NaiveDate,
    pub severity: WarningSeverity,
    pub note: String,
}

/// The five independent performance signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Attendance,
    Punctuality,
    Tasks,
    Tests,
    Reviews,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Attendance,
        SignalKind::Punctuality,
        SignalKind::Tasks,
        SignalKind::Tests,
        SignalKind::Reviews,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            SignalKind::Attendance => "attendance",
            SignalKind::Punctuality => "punctuality",
            SignalKind::Tasks => "tasks",
            SignalKind::Tests => "tests",
            SignalKind::Reviews => "reviews",
        }
    }
}

/// The pipeline's sole persisted output: one row per employee per month.
/// Component fields are `None` when the signal was not applicable, and
/// `effective_score` is `None` exactly when no component applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyScoreSnapshot {
    pub employee: EmployeeId,
    pub company: CompanyId,
    pub location: Option<LocationId>,
    pub month: NaiveDate,
    pub effective_score: Option<f64>,
    pub used_components: u32,
    pub attendance_score: Option<f64>,
    pub punctuality_score: Option<f64>,
    pub task_score: Option<f64>,
    pub test_score: Option<f64>,
    pub review_score: Option<f64>,
    pub warning_penalty: f64,
    pub rank_in_location: Option<u32>,
}

impl MonthlyScoreSnapshot {
    /// Component lookup used by detail views and the demo breakdown.
    pub fn component_score(&self, kind: SignalKind) -> Option<f64> {
        match kind {
            SignalKind::Attendance => self.attendance_score,
            SignalKind::Punctuality => self.punctuality_score,
            SignalKind::Tasks => self.task_score,
            SignalKind::Tests => self.test_score,
            SignalKind::Reviews => self.review_score,
        }
    }
}
