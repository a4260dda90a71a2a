//! The five signal collectors. Each is a pure function over records already
//! fetched for one company and period, returning a map keyed by employee;
//! absence from the map means the signal is not applicable for that employee
//! and must not influence the composite.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::domain::{
    ApprovalState, AssignedTask, AttendanceRecord, EmployeeId, ReviewRecord, ShiftAssignment,
    ShiftId, TaskCompletion, TaskId, TestSubmission,
};
use super::period::ScoringPeriod;

/// Scheduled-versus-worked shift counts for one employee. Shared between the
/// attendance and punctuality collectors so both gate on the same
/// applicability rule (`scheduled > 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ShiftCoverage {
    pub scheduled: u32,
    pub worked: u32,
}

/// Correlate approved assignments with attendance records.
///
/// Join precedence: an attendance record naming the shift id wins; a
/// shift-less record is consumed as a same-day fallback, each record at most
/// once. Assignments dated after the period end never count as scheduled.
pub(crate) fn shift_coverage(
    assignments: &[ShiftAssignment],
    attendance: &[AttendanceRecord],
    period: &ScoringPeriod,
) -> HashMap<EmployeeId, ShiftCoverage> {
    let mut referenced_shifts: HashMap<&EmployeeId, HashSet<&ShiftId>> = HashMap::new();
    let mut walk_ins: HashMap<(&EmployeeId, NaiveDate), u32> = HashMap::new();

    for record in attendance {
        match &record.shift {
            Some(shift) => {
                referenced_shifts
                    .entry(&record.employee)
                    .or_default()
                    .insert(shift);
            }
            None => {
                *walk_ins
                    .entry((&record.employee, record.check_in.date()))
                    .or_insert(0) += 1;
            }
        }
    }

    let mut coverage: HashMap<EmployeeId, ShiftCoverage> = HashMap::new();
    for assignment in assignments {
        if assignment.approval != ApprovalState::Approved || assignment.date > period.end {
            continue;
        }

        let entry = coverage.entry(assignment.employee.clone()).or_default();
        entry.scheduled += 1;

        let direct = referenced_shifts
            .get(&assignment.employee)
            .is_some_and(|shifts| shifts.contains(&assignment.shift));
        if direct {
            entry.worked += 1;
        } else if let Some(remaining) = walk_ins.get_mut(&(&assignment.employee, assignment.date))
        {
            if *remaining > 0 {
                *remaining -= 1;
                entry.worked += 1;
            }
        }
    }

    coverage
}

/// Attendance: share of scheduled shifts actually worked, as a percentage.
pub(crate) fn attendance_scores(
    coverage: &HashMap<EmployeeId, ShiftCoverage>,
) -> HashMap<EmployeeId, f64> {
    coverage
        .iter()
        .filter(|(_, counts)| counts.scheduled > 0)
        .map(|(employee, counts)| {
            (
                employee.clone(),
                counts.worked as f64 / counts.scheduled as f64 * 100.0,
            )
        })
        .collect()
}

/// Punctuality: `max(0, 100 - 5*late_count - min(50, late_minutes/10))`,
/// only defined for employees with at least one scheduled shift.
pub(crate) fn punctuality_scores(
    coverage: &HashMap<EmployeeId, ShiftCoverage>,
    attendance: &[AttendanceRecord],
) -> HashMap<EmployeeId, f64> {
    let mut lateness: HashMap<&EmployeeId, (u32, u32)> = HashMap::new();
    for record in attendance {
        if record.late {
            let entry = lateness.entry(&record.employee).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += record.late_minutes;
        }
    }

    coverage
        .iter()
        .filter(|(_, counts)| counts.scheduled > 0)
        .map(|(employee, _)| {
            let (late_count, late_minutes) = lateness.get(employee).copied().unwrap_or((0, 0));
            let minutes_penalty = f64::from((late_minutes / 10).min(50));
            let score = (100.0 - 5.0 * f64::from(late_count) - minutes_penalty).max(0.0);
            (employee.clone(), score)
        })
        .collect()
}

#[derive(Debug, Default)]
struct TaskTally {
    assigned: u32,
    on_time: u32,
}

/// Task completion: on-time share of the employee's task load. The load is
/// directly assigned in-period tasks plus completions of shared pool tasks,
/// the latter only on dates the employee held an approved shift.
pub(crate) fn task_scores(
    tasks: &[AssignedTask],
    completions: &[TaskCompletion],
    assignments: &[ShiftAssignment],
    period: &ScoringPeriod,
) -> HashMap<EmployeeId, f64> {
    let mut shift_dates: HashMap<&EmployeeId, HashSet<NaiveDate>> = HashMap::new();
    for assignment in assignments {
        if assignment.approval == ApprovalState::Approved {
            shift_dates
                .entry(&assignment.employee)
                .or_default()
                .insert(assignment.date);
        }
    }

    // First completion per task wins; later duplicates are ignored.
    let mut completion_by_task: HashMap<&TaskId, &TaskCompletion> = HashMap::new();
    for completion in completions {
        completion_by_task
            .entry(&completion.task)
            .or_insert(completion);
    }

    let mut tallies: HashMap<EmployeeId, TaskTally> = HashMap::new();
    for task in tasks {
        if !period.contains(task.created_on) {
            continue;
        }

        let tally = tallies.entry(task.assignee.clone()).or_default();
        tally.assigned += 1;
        if let Some(completion) = completion_by_task.get(&task.id) {
            if completion.employee == task.assignee && !completion.late {
                tally.on_time += 1;
            }
        }
    }

    for completion in completions {
        if !completion.shared || !period.contains(completion.completed_on) {
            continue;
        }

        let on_site = shift_dates
            .get(&completion.employee)
            .is_some_and(|dates| dates.contains(&completion.completed_on));
        if !on_site {
            continue;
        }

        let tally = tallies.entry(completion.employee.clone()).or_default();
        tally.assigned += 1;
        if !completion.late {
            tally.on_time += 1;
        }
    }

    tallies
        .into_iter()
        .filter(|(_, tally)| tally.assigned > 0)
        .map(|(employee, tally)| {
            (
                employee,
                tally.on_time as f64 / tally.assigned as f64 * 100.0,
            )
        })
        .collect()
}

/// Test results: arithmetic mean of in-period submissions.
pub(crate) fn test_scores(submissions: &[TestSubmission]) -> HashMap<EmployeeId, f64> {
    mean_by_employee(submissions.iter().map(|s| (&s.employee, s.score)))
}

/// Manager reviews: arithmetic mean of in-period audit scores.
pub(crate) fn review_scores(reviews: &[ReviewRecord]) -> HashMap<EmployeeId, f64> {
    mean_by_employee(reviews.iter().map(|r| (&r.employee, r.score)))
}

fn mean_by_employee<'a>(
    samples: impl Iterator<Item = (&'a EmployeeId, f64)>,
) -> HashMap<EmployeeId, f64> {
    let mut sums: HashMap<&EmployeeId, (f64, u32)> = HashMap::new();
    for (employee, score) in samples {
        let entry = sums.entry(employee).or_insert((0.0, 0));
        entry.0 += score;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(employee, (total, count))| (employee.clone(), total / f64::from(count)))
        .collect()
}
