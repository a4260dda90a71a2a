//! CSV fixture import for the in-memory operations source. One file carries
//! every record kind, discriminated by a `kind` column; unknown kinds are
//! ignored so exports can carry extra rows without breaking the loader.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};

use super::domain::{
    ApprovalState, AssignedTask, AttendanceRecord, CompanyId, Employee, EmployeeId,
    EmployeeStatus, LocationId, ReviewRecord, ShiftAssignment, ShiftId, TaskCompletion, TaskId,
    TestSubmission, WarningEvent, WarningSeverity,
};

/// A full operations data set, ready to back an in-memory source.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub companies: Vec<CompanyId>,
    pub employees: Vec<Employee>,
    pub assignments: Vec<ShiftAssignment>,
    pub attendance: Vec<AttendanceRecord>,
    pub tasks: Vec<AssignedTask>,
    pub completions: Vec<TaskCompletion>,
    pub test_submissions: Vec<TestSubmission>,
    pub reviews: Vec<ReviewRecord>,
    pub warnings: Vec<WarningEvent>,
}

#[derive(Debug)]
pub enum FixtureImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Row { line: usize, reason: String },
}

impl std::fmt::Display for FixtureImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixtureImportError::Io(err) => write!(f, "failed to read fixture file: {}", err),
            FixtureImportError::Csv(err) => write!(f, "invalid fixture CSV data: {}", err),
            FixtureImportError::Row { line, reason } => {
                write!(f, "fixture row {} rejected: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for FixtureImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FixtureImportError::Io(err) => Some(err),
            FixtureImportError::Csv(err) => Some(err),
            FixtureImportError::Row { .. } => None,
        }
    }
}

impl From<std::io::Error> for FixtureImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for FixtureImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<FixtureSet, FixtureImportError> {
    let file = std::fs::File::open(path)?;
    from_reader(file)
}

pub fn from_reader<R: Read>(reader: R) -> Result<FixtureSet, FixtureImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut fixtures = FixtureSet::default();
    for (index, record) in csv_reader.deserialize::<FixtureRow>().enumerate() {
        // header occupies the first line of the file
        let line = index + 2;
        let row = record?;
        apply_row(row, line, &mut fixtures)?;
    }

    Ok(fixtures)
}

fn apply_row(
    row: FixtureRow,
    line: usize,
    fixtures: &mut FixtureSet,
) -> Result<(), FixtureImportError> {
    match row.kind.to_ascii_lowercase().as_str() {
        "company" => {
            fixtures
                .companies
                .push(CompanyId(row.require("id", line)?.to_string()));
        }
        "employee" => {
            let id = row.require("id", line)?.to_string();
            fixtures.employees.push(Employee {
                name: row.name.clone().unwrap_or_else(|| id.clone()),
                id: EmployeeId(id),
                company: CompanyId(row.require("company", line)?.to_string()),
                location: row.location.clone().map(LocationId),
                status: match row.status.as_deref() {
                    Some("inactive") => EmployeeStatus::Inactive,
                    _ => EmployeeStatus::Active,
                },
            });
        }
        "shift" => {
            fixtures.assignments.push(ShiftAssignment {
                shift: ShiftId(row.require("id", line)?.to_string()),
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                date: row.date(line)?,
                approval: match row.status.as_deref() {
                    Some("pending") => ApprovalState::Pending,
                    Some("declined") => ApprovalState::Declined,
                    _ => ApprovalState::Approved,
                },
            });
        }
        "attendance" => {
            let check_in = row.date(line)?.and_time(row.time(line)?);
            fixtures.attendance.push(AttendanceRecord {
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                shift: row.shift.clone().map(ShiftId),
                check_in,
                check_out: None,
                late: row.flag(&row.late),
                late_minutes: row.parse_u32(&row.late_minutes, "late_minutes", line)?,
            });
        }
        "task" => {
            fixtures.tasks.push(AssignedTask {
                id: TaskId(row.require("id", line)?.to_string()),
                assignee: EmployeeId(row.require("employee", line)?.to_string()),
                created_on: row.date(line)?,
            });
        }
        "completion" => {
            fixtures.completions.push(TaskCompletion {
                task: TaskId(row.require("task", line)?.to_string()),
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                completed_on: row.date(line)?,
                late: row.flag(&row.late),
                shared: row.flag(&row.shared),
            });
        }
        "test" => {
            fixtures.test_submissions.push(TestSubmission {
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                submitted_at: row.date(line)?.and_time(row.time(line)?),
                score: row.parse_score(line)?,
            });
        }
        "review" => {
            fixtures.reviews.push(ReviewRecord {
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                audited_on: row.date(line)?,
                score: row.parse_score(line)?,
            });
        }
        "warning" => {
            fixtures.warnings.push(WarningEvent {
                employee: EmployeeId(row.require("employee", line)?.to_string()),
                issued_on: row.date(line)?,
                severity: match row.severity.as_deref() {
                    Some("major") => WarningSeverity::Major,
                    _ => WarningSeverity::Standard,
                },
                note: row.note.clone().unwrap_or_default(),
            });
        }
        _ => {}
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct FixtureRow {
    kind: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    company: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    employee: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    time: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    shift: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    task: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    late: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    late_minutes: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    score: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    severity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    shared: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    note: Option<String>,
}

impl FixtureRow {
    fn require(&self, field: &'static str, line: usize) -> Result<&str, FixtureImportError> {
        let value = match field {
            "id" => &self.id,
            "company" => &self.company,
            "employee" => &self.employee,
            "task" => &self.task,
            _ => &None,
        };

        value.as_deref().ok_or(FixtureImportError::Row {
            line,
            reason: format!("missing required column '{field}' for kind '{}'", self.kind),
        })
    }

    fn date(&self, line: usize) -> Result<NaiveDate, FixtureImportError> {
        let raw = self.date.as_deref().ok_or(FixtureImportError::Row {
            line,
            reason: format!("missing required column 'date' for kind '{}'", self.kind),
        })?;

        NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|err| FixtureImportError::Row {
            line,
            reason: format!("invalid date '{raw}': {err}"),
        })
    }

    fn time(&self, line: usize) -> Result<NaiveTime, FixtureImportError> {
        match self.time.as_deref() {
            None => Ok(NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)),
            Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M").map_err(|err| {
                FixtureImportError::Row {
                    line,
                    reason: format!("invalid time '{raw}': {err}"),
                }
            }),
        }
    }

    fn flag(&self, value: &Option<String>) -> bool {
        matches!(
            value.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("true") | Some("1") | Some("yes")
        )
    }

    fn parse_u32(
        &self,
        value: &Option<String>,
        field: &'static str,
        line: usize,
    ) -> Result<u32, FixtureImportError> {
        match value.as_deref() {
            None => Ok(0),
            Some(raw) => raw.parse::<u32>().map_err(|err| FixtureImportError::Row {
                line,
                reason: format!("invalid {field} '{raw}': {err}"),
            }),
        }
    }

    fn parse_score(&self, line: usize) -> Result<f64, FixtureImportError> {
        let raw = self.score.as_deref().ok_or(FixtureImportError::Row {
            line,
            reason: format!("missing required column 'score' for kind '{}'", self.kind),
        })?;

        raw.parse::<f64>().map_err(|err| FixtureImportError::Row {
            line,
            reason: format!("invalid score '{raw}': {err}"),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
