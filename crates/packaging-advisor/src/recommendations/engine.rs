use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::artifacts::ArtifactError;
use super::catalog::CatalogStore;
use super::classifier::{Classifier, LabelDecoder, TreeEnsembleClassifier};
use super::error::RecommendationError;
use super::features::{CategoricalFeature, FeatureTransformer};
use super::geo::GeoIndex;
use super::query::Query;
use super::resolver::{Resolution, Resolver, TieBreakPolicy};
use super::selector::{select_optimal, OptimalResult, PredictedRecord};
use crate::config::RecommendationConfig;

/// Offline-trained inference artifacts.
pub struct ModelArtifacts {
    pub transformer: FeatureTransformer,
    pub classifier: Arc<dyn Classifier>,
    pub labels: LabelDecoder,
}

/// Optimal result plus how its candidate set was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub result: OptimalResult,
    pub resolution: Resolution,
    pub candidates: usize,
}

/// Immutable serving state shared by every request.
pub struct RecommendationEngine {
    catalog: CatalogStore,
    geo: GeoIndex,
    transformer: FeatureTransformer,
    classifier: Arc<dyn Classifier>,
    labels: LabelDecoder,
    tie_break: TieBreakPolicy,
}

impl RecommendationEngine {
    pub fn new(
        catalog: CatalogStore,
        geo: GeoIndex,
        model: ModelArtifacts,
        tie_break: TieBreakPolicy,
    ) -> Result<Self, ArtifactError> {
        let ModelArtifacts {
            transformer,
            classifier,
            labels,
        } = model;

        if transformer.width() != classifier.n_features() {
            return Err(ArtifactError::Incompatible(format!(
                "feature transformer produces {} columns but the classifier expects {}",
                transformer.width(),
                classifier.n_features()
            )));
        }
        if labels.len() < classifier.n_classes() {
            return Err(ArtifactError::Incompatible(format!(
                "label encoder has {} classes but the classifier emits {}",
                labels.len(),
                classifier.n_classes()
            )));
        }

        let engine = Self {
            catalog,
            geo,
            transformer,
            classifier,
            labels,
            tie_break,
        };
        engine.warn_on_unseen_categories();
        Ok(engine)
    }

    /// Loads every artifact named by `config`, failing on the first problem.
    pub fn load(config: &RecommendationConfig) -> Result<Self, ArtifactError> {
        let catalog = CatalogStore::from_path(&config.dataset_path)?;
        let geo = match &config.coordinates_path {
            Some(path) => GeoIndex::from_path(path)?,
            None => GeoIndex::indian_cities(),
        };
        let transformer = FeatureTransformer::from_path(&config.transformer_path)?;
        let classifier = TreeEnsembleClassifier::from_path(&config.model_path)?;
        let labels = LabelDecoder::from_path(&config.labels_path)?;
        let trees = classifier.n_trees();

        let engine = Self::new(
            catalog,
            geo,
            ModelArtifacts {
                transformer,
                classifier: Arc::new(classifier),
                labels,
            },
            config.tie_break,
        )?;

        info!(
            records = engine.catalog.len(),
            locations = engine.geo.len(),
            trees,
            classes = engine.labels.len(),
            tie_break = %engine.tie_break,
            "recommendation artifacts loaded"
        );
        Ok(engine)
    }

    fn warn_on_unseen_categories(&self) {
        for location in self.catalog.locations() {
            if !self.transformer.knows(CategoricalFeature::Location, location) {
                warn!(%location, "dataset location missing from training vocabulary");
            }
        }
        for product_type in self.catalog.product_types() {
            if !self
                .transformer
                .knows(CategoricalFeature::ProductType, product_type)
            {
                warn!(%product_type, "dataset product type missing from training vocabulary");
            }
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn geo(&self) -> &GeoIndex {
        &self.geo
    }

    pub fn tie_break(&self) -> TieBreakPolicy {
        self.tie_break
    }

    /// Runs the full pipeline: resolve, transform, predict, select.
    pub fn recommend(&self, query: &Query) -> Result<Recommendation, RecommendationError> {
        info!(
            location = query.location(),
            product_type = query.product_type(),
            "recommendation requested"
        );

        let resolver = Resolver::new(&self.catalog, &self.geo, self.tie_break);
        let (resolution, records) = resolver.resolve(query)?.into_parts();

        if let Resolution::Nearest {
            location,
            distance_km,
        } = &resolution
        {
            info!(
                requested = query.location(),
                nearest = %location,
                distance_km = *distance_km,
                "no exact match, using nearest location"
            );
        }
        debug!(candidates = records.len(), "candidate set resolved");

        let candidates = records.len();
        let mut predicted = Vec::with_capacity(candidates);
        for record in records {
            let features = self.transformer.transform(record)?;
            let class = self.classifier.predict(&features)?;
            let material = self.labels.decode(class)?;
            predicted.push(PredictedRecord {
                record,
                predicted_material: material.to_string(),
            });
        }

        let optimal = select_optimal(predicted)?;
        debug!(
            material = %optimal.predicted_material,
            carbon_footprint = optimal.record.carbon_footprint,
            "optimal packaging selected"
        );

        Ok(Recommendation {
            result: OptimalResult::from(optimal),
            resolution,
            candidates,
        })
    }

    pub fn resolve_recommendation(
        &self,
        query: &Query,
    ) -> Result<OptimalResult, RecommendationError> {
        self.recommend(query).map(|recommendation| recommendation.result)
    }
}
