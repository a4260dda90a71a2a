//! Monthly performance scoring and ranking pipeline.
//!
//! A batch run fuses five independently collected signals (attendance,
//! punctuality, task completion, test results, manager reviews) into one
//! composite score per active employee, subtracts a time-decayed warning
//! penalty, ranks employees within their location, and persists one
//! snapshot row per employee and month. Companies are scored independently
//! and re-running a month replaces that month's rows wholesale.

pub(crate) mod collectors;
pub mod composer;
pub mod domain;
pub mod fixtures;
pub mod penalty;
pub mod period;
pub(crate) mod ranker;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use composer::{compose, ComponentScores, ScoreBreakdown};
pub use domain::{
    ApprovalState, AssignedTask, AttendanceRecord, CompanyId, Employee, EmployeeId,
    EmployeeStatus, LocationId, MonthlyScoreSnapshot, ReviewRecord, ShiftAssignment, ShiftId,
    SignalKind, TaskCompletion, TaskId, TestSubmission, WarningEvent, WarningSeverity,
};
pub use fixtures::{FixtureImportError, FixtureSet};
pub use penalty::decay;
pub use period::{parse_month, ScoringPeriod};
pub use repository::{OperationsSource, SnapshotError, SnapshotStore, SourceError};
pub use router::{scoring_router, ScoreRunRequest};
pub use service::{
    CompanyFailure, MonthlyScoringService, RunSummary, ScoringRunError, ScoringSettings,
};
