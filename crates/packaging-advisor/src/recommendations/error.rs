use axum::http::StatusCode;
use serde::Serialize;

use super::classifier::PredictionError;
use super::features::TransformError;

/// Failure raised while resolving a single recommendation.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("Coordinates for '{location}' are not available.")]
    UnknownLocation { location: String },
    #[error("No data found for Product Type: {product_type} in any location.")]
    NoProductData { product_type: String },
    #[error("No suitable locations found nearby for Product Type: {product_type}.")]
    NoReachableLocation { product_type: String },
    #[error("Error transforming features: {0}")]
    Transform(#[from] TransformError),
    #[error("Error during prediction: {0}")]
    Prediction(#[from] PredictionError),
    #[error("resolved candidate set was empty")]
    EmptyCandidateSet,
}

/// Categorical error kind reported alongside the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationErrorKind {
    InvalidQuery,
    UnknownLocation,
    NoProductData,
    NoReachableLocation,
    TransformError,
    PredictionError,
    EmptyCandidateSet,
}

impl RecommendationError {
    pub fn kind(&self) -> RecommendationErrorKind {
        match self {
            RecommendationError::InvalidQuery(_) => RecommendationErrorKind::InvalidQuery,
            RecommendationError::UnknownLocation { .. } => RecommendationErrorKind::UnknownLocation,
            RecommendationError::NoProductData { .. } => RecommendationErrorKind::NoProductData,
            RecommendationError::NoReachableLocation { .. } => {
                RecommendationErrorKind::NoReachableLocation
            }
            RecommendationError::Transform(_) => RecommendationErrorKind::TransformError,
            RecommendationError::Prediction(_) => RecommendationErrorKind::PredictionError,
            RecommendationError::EmptyCandidateSet => RecommendationErrorKind::EmptyCandidateSet,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            RecommendationErrorKind::InvalidQuery => StatusCode::BAD_REQUEST,
            RecommendationErrorKind::UnknownLocation
            | RecommendationErrorKind::NoProductData
            | RecommendationErrorKind::NoReachableLocation => StatusCode::NOT_FOUND,
            RecommendationErrorKind::TransformError => StatusCode::UNPROCESSABLE_ENTITY,
            RecommendationErrorKind::PredictionError
            | RecommendationErrorKind::EmptyCandidateSet => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl RecommendationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationErrorKind::InvalidQuery => "invalid_query",
            RecommendationErrorKind::UnknownLocation => "unknown_location",
            RecommendationErrorKind::NoProductData => "no_product_data",
            RecommendationErrorKind::NoReachableLocation => "no_reachable_location",
            RecommendationErrorKind::TransformError => "transform_error",
            RecommendationErrorKind::PredictionError => "prediction_error",
            RecommendationErrorKind::EmptyCandidateSet => "empty_candidate_set",
        }
    }
}
