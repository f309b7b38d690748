use crate::cli::ServeArgs;
use crate::infra::{probe_storage, StorageState};
use crate::routes::build_app;
use applicant_portal::applicants::{InMemoryApplicantRepository, MongoApplicantRepository};
use applicant_portal::config::AppConfig;
use applicant_portal::error::AppError;
use applicant_portal::telemetry;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(public_dir) = args.public_dir.take() {
        config.server.public_dir = public_dir;
    }
    if args.require_storage {
        config.storage.require_connection = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));

    let (app, storage_state) = if args.in_memory {
        info!("using in-memory applicant store; submissions are lost on exit");
        let repository = Arc::new(InMemoryApplicantRepository::default());
        let app = build_app(
            repository,
            &config.server.public_dir,
            readiness_flag.clone(),
            prometheus_handle,
        );
        (app, StorageState::Connected)
    } else {
        let repository = Arc::new(MongoApplicantRepository::connect(&config.storage).await?);
        let storage_state =
            probe_storage(repository.as_ref(), config.storage.require_connection).await?;
        let app = build_app(
            repository,
            &config.server.public_dir,
            readiness_flag.clone(),
            prometheus_handle,
        );
        (app, storage_state)
    };
    let app = app.layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        storage = ?storage_state,
        public_dir = %config.server.public_dir.display(),
        "applicant portal ready; applicants listed at /api/applicants"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
