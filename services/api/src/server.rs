use crate::cli::ServeArgs;
use crate::infra::{boarding_service, boarding_store, AppState};
use crate::routes::with_boarding_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use staff_boarding::config::AppConfig;
use staff_boarding::error::AppError;
use staff_boarding::telemetry;
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

    let store = boarding_store(&config.boarding, None)?;
    info!(
        staff = store.staff_count()?,
        fixtures = ?config.boarding.fixtures_path,
        "boarding store loaded"
    );
    let service = boarding_service(store, &config.boarding);

    let app = with_boarding_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "staff boarding service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
