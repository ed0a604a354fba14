use crate::cli::ServeArgs;
use crate::infra::{build_services, match_scorer, read_json, AppState, SeedDocuments};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use fitscore::config::AppConfig;
use fitscore::error::AppError;
use fitscore::telemetry;
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

    let seed = match args.documents.take() {
        Some(path) => {
            let seed: SeedDocuments = read_json(&path)?;
            info!(
                path = %path.display(),
                candidates = seed.candidates.len(),
                targets = seed.targets.len(),
                "seeded document store"
            );
            seed
        }
        None => SeedDocuments::default(),
    };

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = build_services(match_scorer(&config)?, seed.into_store(), config.jobs);

    let app = with_service_routes(&services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "match scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
