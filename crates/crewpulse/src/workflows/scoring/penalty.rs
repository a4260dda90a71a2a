use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use super::domain::{EmployeeId, WarningEvent};

/// Length of the trailing window over which a warning's weight decays to
/// zero, anchored at the period end date.
pub const DECAY_WINDOW_DAYS: i64 = 90;

/// Linear decay factor for a warning `days_elapsed` days before the anchor.
/// Day 0 carries full weight; day 90 and beyond contribute nothing.
pub fn decay(days_elapsed: i64) -> f64 {
    (1.0 - days_elapsed as f64 / DECAY_WINDOW_DAYS as f64).clamp(0.0, 1.0)
}

/// First day of the decay window for a period ending on `period_end`.
pub fn window_start(period_end: NaiveDate) -> NaiveDate {
    period_end - Duration::days(DECAY_WINDOW_DAYS)
}

/// Sum each employee's decayed warning contributions. Employees without
/// warnings are simply absent; the composer treats that as a zero penalty.
pub(crate) fn warning_penalties(
    warnings: &[WarningEvent],
    period_end: NaiveDate,
) -> HashMap<EmployeeId, f64> {
    let mut totals: HashMap<EmployeeId, f64> = HashMap::new();
    for warning in warnings {
        let days_elapsed = (period_end - warning.issued_on).num_days();
        let contribution = warning.severity.weight() * decay(days_elapsed);
        if contribution > 0.0 {
            *totals.entry(warning.employee.clone()).or_insert(0.0) += contribution;
        }
    }

    totals
}
