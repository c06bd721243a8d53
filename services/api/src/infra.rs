use metrics_exporter_prometheus::PrometheusHandle;
use packaging_advisor::config::RecommendationConfig;
use packaging_advisor::error::AppError;
use packaging_advisor::recommendations::RecommendationEngine;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Artifacts are loaded once; a missing or malformed file aborts startup.
pub(crate) fn load_engine(
    config: &RecommendationConfig,
) -> Result<Arc<RecommendationEngine>, AppError> {
    let engine = RecommendationEngine::load(config)?;
    Ok(Arc::new(engine))
}
