use crate::cli::ServeArgs;
use crate::infra::{
    load_catalog, spawn_event_logger, AppState, BroadcastNotifier, InMemoryEvaluationRepository,
};
use crate::routes::with_evaluation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use support_qa::config::AppConfig;
use support_qa::error::AppError;
use support_qa::evaluations::QaEvaluationService;
use support_qa::telemetry;
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

    let catalog = load_catalog(&config.scoring)?;
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let notifier = Arc::new(BroadcastNotifier::default());
    spawn_event_logger(&notifier);

    let evaluation_service = Arc::new(
        QaEvaluationService::new(repository, notifier, catalog)
            .with_scorecard_window(config.scoring.scorecard_window),
    );

    let app = with_evaluation_routes(evaluation_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "support QA scorecard service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
