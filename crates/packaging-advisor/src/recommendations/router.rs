use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::engine::RecommendationEngine;
use super::error::RecommendationError;
use super::query::{Query, RecommendationRequest};

/// Catalog coverage for front-end pickers.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOverview {
    pub locations: Vec<String>,
    pub product_types: Vec<String>,
    pub geo_locations: Vec<String>,
}

impl CatalogOverview {
    pub fn from_engine(engine: &RecommendationEngine) -> Self {
        let catalog = engine.catalog();
        Self {
            locations: catalog.locations().into_iter().map(str::to_string).collect(),
            product_types: catalog
                .product_types()
                .into_iter()
                .map(str::to_string)
                .collect(),
            geo_locations: engine
                .geo()
                .locations()
                .map(|coordinate| coordinate.name.clone())
                .collect(),
        }
    }
}

/// Router builder exposing the recommendation endpoints.
pub fn recommendation_router(engine: Arc<RecommendationEngine>) -> Router {
    Router::new()
        .route("/recommendations", post(recommendation_handler))
        .route("/api/v1/recommendations", post(recommendation_handler))
        .route("/api/v1/catalog", get(catalog_handler))
        .with_state(engine)
}

pub(crate) async fn recommendation_handler(
    State(engine): State<Arc<RecommendationEngine>>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    // Malformed bodies share the typed error shape with every other failure.
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return RecommendationError::InvalidQuery(rejection.body_text()).into_response()
        }
    };
    let outcome = Query::try_from(request).and_then(|query| engine.resolve_recommendation(&query));
    match outcome {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn catalog_handler(
    State(engine): State<Arc<RecommendationEngine>>,
) -> Json<CatalogOverview> {
    Json(CatalogOverview::from_engine(&engine))
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind().as_str(), "recommendation failed");
        }
        let payload = json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, Json(payload)).into_response()
    }
}
