use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryOperationsSource, InMemorySnapshotStore};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use crewpulse::config::AppConfig;
use crewpulse::error::AppError;
use crewpulse::telemetry;
use crewpulse::workflows::scoring::{fixtures, MonthlyScoringService, ScoringSettings};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = Arc::new(InMemoryOperationsSource::default());
    if let Some(path) = args.fixtures.take() {
        let loaded = fixtures::from_path(&path)?;
        info!(
            path = %path.display(),
            companies = loaded.companies.len(),
            employees = loaded.employees.len(),
            "operations fixtures loaded"
        );
        source.ingest(loaded);
    }

    let snapshots = Arc::new(InMemorySnapshotStore::default());
    let scoring_service = Arc::new(MonthlyScoringService::new(
        source,
        snapshots,
        ScoringSettings::from(&config.scoring),
    ));

    let app = with_scoring_routes(scoring_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "monthly scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
