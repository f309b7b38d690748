use applicant_portal::applicants::ApplicantRepository;
use applicant_portal::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) storage: Arc<dyn ApplicantRepository>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StorageState {
    Connected,
    Degraded,
}

/// Ping the store once at startup.
///
/// An unreachable store is fatal only when `require_connection` is set;
/// otherwise the server starts and `/ready` reports the outage until the
/// driver reconnects.
pub(crate) async fn probe_storage(
    repository: &dyn ApplicantRepository,
    require_connection: bool,
) -> Result<StorageState, AppError> {
    match repository.ping().await {
        Ok(()) => {
            info!("connected to applicant store");
            Ok(StorageState::Connected)
        }
        Err(err) if require_connection => {
            error!(error = %err, "could not connect to applicant store");
            Err(err.into())
        }
        Err(err) => {
            warn!(error = %err, "could not connect to applicant store; serving degraded");
            Ok(StorageState::Degraded)
        }
    }
}
