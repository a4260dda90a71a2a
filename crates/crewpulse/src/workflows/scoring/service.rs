use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Local, NaiveDate, NaiveTime};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::ScoringConfig;

use super::collectors;
use super::composer::{self, ComponentScores};
use super::domain::{CompanyId, MonthlyScoreSnapshot};
use super::penalty;
use super::period::{first_of_month, ScoringPeriod};
use super::ranker;
use super::repository::{OperationsSource, SnapshotError, SnapshotStore, SourceError};

/// Fan-out limits for a scoring run. Companies are independent units of
/// work; the pool bounds how many are in flight and the timeout keeps one
/// slow company from stalling the whole run.
#[derive(Debug, Clone, Copy)]
pub struct ScoringSettings {
    pub workers: usize,
    pub company_timeout: Duration,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            company_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ScoringConfig> for ScoringSettings {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            workers: config.workers,
            company_timeout: Duration::from_secs(config.company_timeout_secs),
        }
    }
}

/// Outcome of one pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub month: NaiveDate,
    pub companies: usize,
    pub upserted: usize,
    pub failures: Vec<CompanyFailure>,
}

/// A company whose scoring or persistence failed; the rest of the run is
/// unaffected.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyFailure {
    pub company: CompanyId,
    pub reason: String,
}

/// Error raised when the run cannot start at all. Per-company failures are
/// reported through [`RunSummary::failures`] instead.
#[derive(Debug, thiserror::Error)]
pub enum ScoringRunError {
    #[error("could not list companies: {0}")]
    CompanyListing(#[from] SourceError),
}

/// Orchestrates the monthly scoring pipeline over an operations source and
/// a snapshot store.
pub struct MonthlyScoringService<S, P> {
    source: Arc<S>,
    snapshots: Arc<P>,
    settings: ScoringSettings,
}

impl<S, P> MonthlyScoringService<S, P>
where
    S: OperationsSource + 'static,
    P: SnapshotStore + 'static,
{
    pub fn new(source: Arc<S>, snapshots: Arc<P>, settings: ScoringSettings) -> Self {
        Self {
            source,
            snapshots,
            settings,
        }
    }

    /// Run the pipeline for the requested month, defaulting to the previous
    /// calendar month when no month is given.
    pub async fn run(&self, requested_month: Option<NaiveDate>) -> Result<RunSummary, ScoringRunError> {
        let period = ScoringPeriod::resolve(requested_month, Local::now().date_naive());
        self.run_for_period(period).await
    }

    /// Run the pipeline for an explicit period. Backfills for past months go
    /// through the same path and replace the stored rows for that month.
    pub async fn run_for_period(&self, period: ScoringPeriod) -> Result<RunSummary, ScoringRunError> {
        let companies = self.source.companies()?;
        info!(
            month = %period.month,
            companies = companies.len(),
            "starting monthly scoring run"
        );

        let limiter = Arc::new(Semaphore::new(self.settings.workers.max(1)));
        let mut workers: JoinSet<(CompanyId, Result<Vec<MonthlyScoreSnapshot>, String>)> =
            JoinSet::new();

        for company in companies.iter().cloned() {
            let source = Arc::clone(&self.source);
            let limiter = Arc::clone(&limiter);
            let deadline = self.settings.company_timeout;

            workers.spawn(async move {
                let _permit = match limiter.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (company, Err("worker pool shut down".to_string())),
                };

                let task_company = company.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    score_company(source.as_ref(), &task_company, period)
                });

                let outcome = match tokio::time::timeout(deadline, handle).await {
                    Ok(Ok(result)) => result.map_err(|err| err.to_string()),
                    Ok(Err(join_error)) => Err(format!("scoring task failed: {join_error}")),
                    Err(_) => Err(format!("timed out after {}s", deadline.as_secs())),
                };

                (company, outcome)
            });
        }

        let mut upserted = 0usize;
        let mut failures = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok((company, Ok(rows))) => {
                    match self.snapshots.replace_month(&company, period.month, rows) {
                        Ok(written) => {
                            upserted += written;
                            debug!(company = %company.0, rows = written, "snapshot batch written");
                        }
                        Err(err) => {
                            warn!(company = %company.0, error = %err, "snapshot write failed");
                            failures.push(CompanyFailure {
                                company,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
                Ok((company, Err(reason))) => {
                    warn!(company = %company.0, %reason, "company skipped this run");
                    failures.push(CompanyFailure { company, reason });
                }
                Err(join_error) => {
                    warn!(error = %join_error, "scoring worker aborted");
                }
            }
        }

        info!(
            month = %period.month,
            upserted,
            failed_companies = failures.len(),
            "monthly scoring run finished"
        );

        Ok(RunSummary {
            month: period.month,
            companies: companies.len(),
            upserted,
            failures,
        })
    }

    /// Snapshot rows persisted for a month; `month` may be any date within
    /// the month. Read-only passthrough for leaderboard consumers.
    pub fn month_rows(&self, month: NaiveDate) -> Result<Vec<MonthlyScoreSnapshot>, SnapshotError> {
        self.snapshots.month_rows(first_of_month(month))
    }
}

/// Score every active employee of one company for the period. Pure reads,
/// no writes: the caller decides what to do with the rows. Rows come back
/// ranked and sorted by employee id so batches are deterministic.
pub(crate) fn score_company<S>(
    source: &S,
    company: &CompanyId,
    period: ScoringPeriod,
) -> Result<Vec<MonthlyScoreSnapshot>, SourceError>
where
    S: OperationsSource + ?Sized,
{
    let employees = source.active_employees(company)?;
    let assignments = source.approved_assignments(company, period.start, period.end)?;
    let attendance = source.attendance_between(
        company,
        period.start.and_time(NaiveTime::MIN),
        (period.end + ChronoDuration::days(1)).and_time(NaiveTime::MIN),
    )?;
    let tasks = source.assigned_tasks(company, period.start, period.end)?;
    let completions = source.task_completions(company, period.start, period.end)?;
    let submissions = source.test_submissions(company, period.start, period.end)?;
    let reviews = source.reviews(company, period.start, period.end)?;
    let warnings =
        source.warnings_between(company, penalty::window_start(period.end), period.end)?;

    let coverage = collectors::shift_coverage(&assignments, &attendance, &period);
    let attendance_scores = collectors::attendance_scores(&coverage);
    let punctuality_scores = collectors::punctuality_scores(&coverage, &attendance);
    let task_scores = collectors::task_scores(&tasks, &completions, &assignments, &period);
    let test_scores = collectors::test_scores(&submissions);
    let review_scores = collectors::review_scores(&reviews);
    let penalties = penalty::warning_penalties(&warnings, period.end);

    let mut rows = Vec::with_capacity(employees.len());
    for employee in &employees {
        let components = ComponentScores {
            attendance: attendance_scores.get(&employee.id).copied(),
            punctuality: punctuality_scores.get(&employee.id).copied(),
            tasks: task_scores.get(&employee.id).copied(),
            tests: test_scores.get(&employee.id).copied(),
            reviews: review_scores.get(&employee.id).copied(),
        };
        let warning_penalty = penalties.get(&employee.id).copied().unwrap_or(0.0);
        let breakdown = composer::compose(&components, warning_penalty);

        rows.push(MonthlyScoreSnapshot {
            employee: employee.id.clone(),
            company: company.clone(),
            location: employee.location.clone(),
            month: period.month,
            effective_score: breakdown.effective,
            used_components: breakdown.used_components,
            attendance_score: components.attendance,
            punctuality_score: components.punctuality,
            task_score: components.tasks,
            test_score: components.tests,
            review_score: components.reviews,
            warning_penalty,
            rank_in_location: None,
        });
    }

    ranker::assign_location_ranks(&mut rows);
    rows.sort_by(|a, b| a.employee.cmp(&b.employee));
    Ok(rows)
}
