use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredProfileSource};
use crate::routes::with_accreditation_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tor_accredit::config::AppConfig;
use tor_accredit::error::AppError;
use tor_accredit::telemetry;
use tor_accredit::workflows::accreditation::{
    AccreditationService, FinalizePolicy, MemoryAccreditationStore,
};
use tor_accredit::workflows::exports::CsvOcrExportSource;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.strict_finalize {
        config.workflow.strict_finalize = true;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryAccreditationStore::default());
    let transcripts = Arc::new(CsvOcrExportSource::new(
        config.workflow.ocr_export_dir.clone(),
    ));
    let profiles = Arc::new(ConfiguredProfileSource::new(
        config.workflow.profile_roster.clone(),
    ));
    let policy = FinalizePolicy {
        require_reviewed_entries: config.workflow.strict_finalize,
    };
    let service = Arc::new(AccreditationService::new(
        store, transcripts, profiles, policy,
    ));

    let app = with_accreditation_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "accreditation workflow service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
