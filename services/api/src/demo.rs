use crate::infra::{InMemoryOperationsSource, InMemorySnapshotStore};
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use crewpulse::error::AppError;
use crewpulse::workflows::scoring::{
    fixtures, ApprovalState, AssignedTask, AttendanceRecord, CompanyId, Employee, EmployeeId,
    EmployeeStatus, FixtureSet, LocationId, MonthlyScoreSnapshot, MonthlyScoringService,
    ReviewRecord, RunSummary, ScoringPeriod, ScoringSettings, ShiftAssignment, ShiftId,
    SignalKind, TaskCompletion, TaskId, TestSubmission, WarningEvent, WarningSeverity,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV fixture file with the operations data to score
    #[arg(long)]
    pub(crate) fixtures: PathBuf,
    /// Month to score (YYYY-MM-01). Defaults to the previous calendar month.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) month: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Month to score (YYYY-MM-01). Defaults to the previous calendar month.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) month: Option<NaiveDate>,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let loaded = fixtures::from_path(&args.fixtures)?;
    let source = InMemoryOperationsSource::default();
    source.ingest(loaded);

    let service = build_service(source);
    let summary = service.run(args.month).await?;
    render_run_summary(&summary);

    match service.month_rows(summary.month) {
        Ok(rows) => render_leaderboards(&rows),
        Err(err) => println!("Snapshot store unavailable: {err}"),
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let period = ScoringPeriod::resolve(args.month, Local::now().date_naive());

    println!("CrewPulse monthly scoring demo");
    println!("Scoring window: {} -> {}", period.start, period.end);

    let source = InMemoryOperationsSource::default();
    source.ingest(demo_fixtures(&period));

    let service = build_service(source);
    let summary = service.run_for_period(period).await?;
    render_run_summary(&summary);

    let rows = match service.month_rows(summary.month) {
        Ok(rows) => rows,
        Err(err) => {
            println!("Snapshot store unavailable: {err}");
            return Ok(());
        }
    };

    render_leaderboards(&rows);

    if let Some(top) = rows
        .iter()
        .find(|row| row.rank_in_location == Some(1))
    {
        render_breakdown(top);
    }

    Ok(())
}

fn build_service(
    source: InMemoryOperationsSource,
) -> MonthlyScoringService<InMemoryOperationsSource, InMemorySnapshotStore> {
    MonthlyScoringService::new(
        Arc::new(source),
        Arc::new(InMemorySnapshotStore::default()),
        ScoringSettings::default(),
    )
}

fn render_run_summary(summary: &RunSummary) {
    println!(
        "\nRun complete for {}: {} companies, {} rows upserted",
        summary.month, summary.companies, summary.upserted
    );
    if !summary.failures.is_empty() {
        println!("Companies skipped:");
        for failure in &summary.failures {
            println!("  - {}: {}", failure.company.0, failure.reason);
        }
    }
}

fn render_leaderboards(rows: &[MonthlyScoreSnapshot]) {
    let mut boards: BTreeMap<(String, String), Vec<&MonthlyScoreSnapshot>> = BTreeMap::new();
    let mut unranked = Vec::new();
    let mut idle = Vec::new();

    for row in rows {
        match (&row.location, row.rank_in_location) {
            (Some(location), Some(_)) => boards
                .entry((row.company.0.clone(), location.0.clone()))
                .or_default()
                .push(row),
            _ if row.effective_score.is_some() => unranked.push(row),
            _ => idle.push(row),
        }
    }

    for ((company, location), mut board) in boards {
        board.sort_by_key(|row| row.rank_in_location);
        println!("\nLeaderboard for {company} / {location}");
        for row in board {
            let rank = row.rank_in_location.unwrap_or_default();
            let score = row.effective_score.unwrap_or_default();
            println!(
                "  {rank}. {} score {score:.1} ({} signals, penalty {:.1})",
                row.employee.0, row.used_components, row.warning_penalty
            );
        }
    }

    if !unranked.is_empty() {
        println!("\nScored without a location (not ranked):");
        for row in unranked {
            println!(
                "  - {} score {:.1}",
                row.employee.0,
                row.effective_score.unwrap_or_default()
            );
        }
    }

    if !idle.is_empty() {
        println!("\nNo scoreable activity this month:");
        for row in idle {
            println!("  - {}", row.employee.0);
        }
    }
}

fn render_breakdown(row: &MonthlyScoreSnapshot) {
    println!("\nComponent breakdown for {}", row.employee.0);
    for kind in SignalKind::ALL {
        match row.component_score(kind) {
            Some(score) => println!("  - {}: {:.1}", kind.label(), score),
            None => println!("  - {}: not applicable", kind.label()),
        }
    }
    println!("  - warning penalty: {:.2}", row.warning_penalty);
    match row.effective_score {
        Some(score) => println!("  = effective score {score:.2}"),
        None => println!("  = no effective score"),
    }
}

/// Two seeded companies with enough variety to show every pipeline rule:
/// partial signals, the shift join fallback, shared task gating, a decayed
/// major warning, an unlocated employee, and one with no activity at all.
fn demo_fixtures(period: &ScoringPeriod) -> FixtureSet {
    let day = |offset: i64| period.start + Duration::days(offset);
    let morning = |offset: i64, hour: u32, minute: u32| {
        day(offset).and_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN))
    };

    let employee = |id: &str, company: &str, location: Option<&str>, name: &str| Employee {
        id: EmployeeId(id.to_string()),
        name: name.to_string(),
        company: CompanyId(company.to_string()),
        location: location.map(|value| LocationId(value.to_string())),
        status: EmployeeStatus::Active,
    };

    let mut fixtures = FixtureSet::default();
    fixtures.companies = vec![
        CompanyId("northwind-ops".to_string()),
        CompanyId("globe-facilities".to_string()),
    ];
    fixtures.employees = vec![
        employee("ava", "northwind-ops", Some("riverside"), "Ava Lindgren"),
        employee("ben", "northwind-ops", Some("riverside"), "Ben Okafor"),
        employee("cora", "northwind-ops", Some("riverside"), "Cora Vance"),
        employee("dev", "northwind-ops", Some("harbor"), "Dev Batra"),
        employee("eli", "northwind-ops", Some("harbor"), "Eli Navarro"),
        employee("fin", "northwind-ops", None, "Fin Sorensen"),
        employee("gus", "northwind-ops", Some("harbor"), "Gus Marino"),
        employee("hana", "globe-facilities", Some("depot"), "Hana Silva"),
        employee("iris", "globe-facilities", Some("depot"), "Iris Kwon"),
    ];

    // ava: ten shifts, nine worked (one as a shift-less walk-in), one late
    for offset in 0..10 {
        fixtures.assignments.push(ShiftAssignment {
            shift: ShiftId(format!("ava-{offset}")),
            employee: EmployeeId("ava".to_string()),
            date: day(offset),
            approval: ApprovalState::Approved,
        });
    }
    for offset in 0..8 {
        fixtures.attendance.push(AttendanceRecord {
            employee: EmployeeId("ava".to_string()),
            shift: Some(ShiftId(format!("ava-{offset}"))),
            check_in: morning(offset, 8, 55),
            check_out: Some(morning(offset, 17, 0)),
            late: offset == 3,
            late_minutes: if offset == 3 { 25 } else { 0 },
        });
    }
    fixtures.attendance.push(AttendanceRecord {
        employee: EmployeeId("ava".to_string()),
        shift: None,
        check_in: morning(8, 9, 10),
        check_out: None,
        late: false,
        late_minutes: 0,
    });

    // ben: clean attendance plus a task load with one late completion
    for offset in 0..6 {
        fixtures.assignments.push(ShiftAssignment {
            shift: ShiftId(format!("ben-{offset}")),
            employee: EmployeeId("ben".to_string()),
            date: day(offset),
            approval: ApprovalState::Approved,
        });
        fixtures.attendance.push(AttendanceRecord {
            employee: EmployeeId("ben".to_string()),
            shift: Some(ShiftId(format!("ben-{offset}"))),
            check_in: morning(offset, 8, 50),
            check_out: Some(morning(offset, 17, 5)),
            late: false,
            late_minutes: 0,
        });
    }
    for (index, late) in [false, false, true].iter().enumerate() {
        let task_id = format!("ben-task-{index}");
        fixtures.tasks.push(AssignedTask {
            id: TaskId(task_id.clone()),
            assignee: EmployeeId("ben".to_string()),
            created_on: day(index as i64 + 1),
        });
        fixtures.completions.push(TaskCompletion {
            task: TaskId(task_id),
            employee: EmployeeId("ben".to_string()),
            completed_on: day(index as i64 + 2),
            late: *late,
            shared: false,
        });
    }
    fixtures.test_submissions.push(TestSubmission {
        employee: EmployeeId("ben".to_string()),
        submitted_at: morning(12, 14, 0),
        score: 84.0,
    });

    // cora: tests and a review, dented by a recent major warning
    fixtures.test_submissions.push(TestSubmission {
        employee: EmployeeId("cora".to_string()),
        submitted_at: morning(9, 14, 0),
        score: 91.0,
    });
    fixtures.reviews.push(ReviewRecord {
        employee: EmployeeId("cora".to_string()),
        audited_on: day(15),
        score: 88.0,
    });
    fixtures.warnings.push(WarningEvent {
        employee: EmployeeId("cora".to_string()),
        issued_on: period.end - Duration::days(12),
        severity: WarningSeverity::Major,
        note: "Safety procedure skipped".to_string(),
    });

    // dev: patchy attendance plus shared pool tasks on shift days
    for offset in 0..5 {
        fixtures.assignments.push(ShiftAssignment {
            shift: ShiftId(format!("dev-{offset}")),
            employee: EmployeeId("dev".to_string()),
            date: day(offset),
            approval: ApprovalState::Approved,
        });
    }
    for offset in 0..3 {
        fixtures.attendance.push(AttendanceRecord {
            employee: EmployeeId("dev".to_string()),
            shift: Some(ShiftId(format!("dev-{offset}"))),
            check_in: morning(offset, 7, 58),
            check_out: Some(morning(offset, 16, 2)),
            late: false,
            late_minutes: 0,
        });
    }
    fixtures.completions.push(TaskCompletion {
        task: TaskId("pool-cleanup".to_string()),
        employee: EmployeeId("dev".to_string()),
        completed_on: day(1),
        late: false,
        shared: true,
    });
    fixtures.completions.push(TaskCompletion {
        task: TaskId("pool-inventory".to_string()),
        employee: EmployeeId("dev".to_string()),
        // off-shift day, so the pipeline must not credit it
        completed_on: day(20),
        late: false,
        shared: true,
    });

    // eli: review only, with an old standard warning mostly decayed away
    fixtures.reviews.push(ReviewRecord {
        employee: EmployeeId("eli".to_string()),
        audited_on: day(18),
        score: 79.0,
    });
    fixtures.warnings.push(WarningEvent {
        employee: EmployeeId("eli".to_string()),
        issued_on: period.end - Duration::days(70),
        severity: WarningSeverity::Standard,
        note: "Uniform policy reminder".to_string(),
    });

    // fin: scored but unlocated, so never ranked; gus: no activity at all
    fixtures.test_submissions.push(TestSubmission {
        employee: EmployeeId("fin".to_string()),
        submitted_at: morning(11, 14, 0),
        score: 95.0,
    });

    fixtures.test_submissions.push(TestSubmission {
        employee: EmployeeId("hana".to_string()),
        submitted_at: morning(10, 14, 0),
        score: 87.0,
    });
    fixtures.test_submissions.push(TestSubmission {
        employee: EmployeeId("iris".to_string()),
        submitted_at: morning(10, 15, 0),
        score: 87.0,
    });

    fixtures
}
