//! Packaging recommendation pipeline.
//!
//! A query is resolved against the catalog (exact match first, nearest known
//! location second), each candidate row is transformed and classified, and the
//! row with the lowest carbon footprint is returned.

pub mod artifacts;
pub mod catalog;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod features;
pub mod geo;
pub mod query;
pub mod resolver;
pub mod router;
pub mod selector;

pub use artifacts::ArtifactError;
pub use catalog::{CatalogError, CatalogRecord, CatalogStore};
pub use classifier::{Classifier, LabelDecoder, PredictionError, TreeEnsembleClassifier, TreeNode};
pub use engine::{ModelArtifacts, Recommendation, RecommendationEngine};
pub use error::{RecommendationError, RecommendationErrorKind};
pub use features::{
    CategoricalEncoding, CategoricalFeature, FeatureTransformer, NumericFeature, NumericScaling,
    TransformError,
};
pub use geo::{haversine_km, GeoIndex, GeoIndexError, LocationCoordinate};
pub use query::{Query, RecommendationRequest};
pub use resolver::{Resolution, ResolvedCandidateSet, Resolver, TieBreakPolicy};
pub use router::{recommendation_router, CatalogOverview};
pub use selector::{select_optimal, OptimalResult, PredictedRecord};
