use chrono::{Datelike, Duration, NaiveDate};

/// Inclusive calendar-month window the pipeline scores over. `month` is the
/// first day of the month and doubles as the snapshot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPeriod {
    pub month: NaiveDate,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ScoringPeriod {
    /// Window for the month containing `date`. Mid-month dates snap to the
    /// first of their month.
    pub fn for_month(date: NaiveDate) -> Self {
        let start = first_of_month(date);
        Self {
            month: start,
            start,
            end: last_of_month(start),
        }
    }

    /// Resolve the target window from an optional explicit month. Absent
    /// input falls back to the previous calendar month relative to `today`;
    /// this is the only defaulting rule and it never fails.
    pub fn resolve(requested: Option<NaiveDate>, today: NaiveDate) -> Self {
        match requested {
            Some(date) => Self::for_month(date),
            None => Self::for_month(first_of_month(today) - Duration::days(1)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Lenient `YYYY-MM-DD` parse for trigger payloads: anything unparsable is
/// treated as "no month requested" rather than an error.
pub fn parse_month(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub(crate) fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn last_of_month(start: NaiveDate) -> NaiveDate {
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };

    next_month
        .map(|first_of_next| first_of_next - Duration::days(1))
        .unwrap_or(start)
}
