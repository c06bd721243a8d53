use serde::Serialize;

use super::catalog::CatalogRecord;
use super::error::RecommendationError;

/// Catalog row paired with the classifier's material prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedRecord<'a> {
    pub record: &'a CatalogRecord,
    pub predicted_material: String,
}

/// Flat recommendation returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalResult {
    pub location: String,
    pub product_type: String,
    pub optimal_packaging_material: String,
    pub carbon_footprint: f64,
    pub biodegradability_score: f64,
    pub recyclability_score: f64,
    pub cost_efficiency: f64,
    pub availability: i64,
}

impl From<PredictedRecord<'_>> for OptimalResult {
    fn from(predicted: PredictedRecord<'_>) -> Self {
        let record = predicted.record;
        Self {
            location: record.location.clone(),
            product_type: record.product_type.clone(),
            optimal_packaging_material: predicted.predicted_material,
            carbon_footprint: record.carbon_footprint,
            biodegradability_score: record.biodegradability_score,
            recyclability_score: record.recyclability_score,
            cost_efficiency: record.cost_efficiency,
            availability: record.availability,
        }
    }
}

/// Picks the candidate with the lowest carbon footprint; the earliest wins ties.
pub fn select_optimal<'a, I>(candidates: I) -> Result<PredictedRecord<'a>, RecommendationError>
where
    I: IntoIterator<Item = PredictedRecord<'a>>,
{
    let mut best: Option<PredictedRecord<'a>> = None;
    for candidate in candidates {
        let lower = match &best {
            Some(current) => candidate.record.carbon_footprint < current.record.carbon_footprint,
            None => true,
        };
        if lower {
            best = Some(candidate);
        }
    }
    best.ok_or(RecommendationError::EmptyCandidateSet)
}
