//! Training-time column transform replayed at serving time.
//!
//! Categorical columns are one-hot encoded against a frozen vocabulary and
//! numeric columns are standardized with frozen `(mean, scale)` pairs. The
//! output places every categorical block first, in declared order, followed by
//! the numeric columns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::path::Path;

use super::artifacts::{self, ArtifactError};
use super::catalog::CatalogRecord;

const ARTIFACT: &str = "feature transformer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalFeature {
    Location,
    ProductType,
}

impl CategoricalFeature {
    fn value<'a>(&self, record: &'a CatalogRecord) -> &'a str {
        match self {
            CategoricalFeature::Location => &record.location,
            CategoricalFeature::ProductType => &record.product_type,
        }
    }
}

impl fmt::Display for CategoricalFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoricalFeature::Location => write!(f, "location"),
            CategoricalFeature::ProductType => write!(f, "product_type"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    CarbonFootprint,
    BiodegradabilityScore,
    RecyclabilityScore,
    CostEfficiency,
}

impl NumericFeature {
    fn value(&self, record: &CatalogRecord) -> f64 {
        match self {
            NumericFeature::CarbonFootprint => record.carbon_footprint,
            NumericFeature::BiodegradabilityScore => record.biodegradability_score,
            NumericFeature::RecyclabilityScore => record.recyclability_score,
            NumericFeature::CostEfficiency => record.cost_efficiency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalEncoding {
    pub feature: CategoricalFeature,
    pub categories: Vec<String>,
    /// Drop the first category's column; it encodes as all zeros.
    #[serde(default)]
    pub drop_first: bool,
}

impl CategoricalEncoding {
    fn width(&self) -> usize {
        if self.drop_first {
            self.categories.len() - 1
        } else {
            self.categories.len()
        }
    }

    fn encode_into(&self, value: &str, out: &mut Vec<f64>) -> Result<(), TransformError> {
        let position = self
            .categories
            .iter()
            .position(|category| category == value)
            .ok_or_else(|| TransformError::UnknownCategory {
                feature: self.feature,
                value: value.to_string(),
            })?;

        let start = out.len();
        out.resize(start + self.width(), 0.0);
        let column = if self.drop_first {
            position.checked_sub(1)
        } else {
            Some(position)
        };
        if let Some(column) = column {
            out[start + column] = 1.0;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericScaling {
    pub feature: NumericFeature,
    pub mean: f64,
    pub scale: f64,
}

/// Frozen categorical vocabularies plus numeric scaling statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureTransformer {
    categorical: Vec<CategoricalEncoding>,
    numeric: Vec<NumericScaling>,
}

impl FeatureTransformer {
    pub fn new(
        categorical: Vec<CategoricalEncoding>,
        numeric: Vec<NumericScaling>,
    ) -> Result<Self, ArtifactError> {
        let transformer = Self {
            categorical,
            numeric,
        };
        transformer.validate()?;
        Ok(transformer)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let reader = artifacts::open(ARTIFACT, path.as_ref())?;
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let transformer: Self = artifacts::read_json(ARTIFACT, reader)?;
        transformer.validate()?;
        Ok(transformer)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.categorical.is_empty() && self.numeric.is_empty() {
            return Err(ArtifactError::invalid(ARTIFACT, "no features declared"));
        }

        for (idx, encoding) in self.categorical.iter().enumerate() {
            if self.categorical[..idx]
                .iter()
                .any(|other| other.feature == encoding.feature)
            {
                return Err(ArtifactError::invalid(
                    ARTIFACT,
                    format!("{} is declared more than once", encoding.feature),
                ));
            }
            if encoding.categories.is_empty() {
                return Err(ArtifactError::invalid(
                    ARTIFACT,
                    format!("{} has an empty vocabulary", encoding.feature),
                ));
            }
            for (pos, category) in encoding.categories.iter().enumerate() {
                if encoding.categories[..pos].contains(category) {
                    return Err(ArtifactError::invalid(
                        ARTIFACT,
                        format!("{} lists '{}' twice", encoding.feature, category),
                    ));
                }
            }
        }

        for (idx, scaling) in self.numeric.iter().enumerate() {
            if self.numeric[..idx]
                .iter()
                .any(|other| other.feature == scaling.feature)
            {
                return Err(ArtifactError::invalid(
                    ARTIFACT,
                    format!("{:?} is declared more than once", scaling.feature),
                ));
            }
            if !scaling.mean.is_finite() || !scaling.scale.is_finite() || scaling.scale == 0.0 {
                return Err(ArtifactError::invalid(
                    ARTIFACT,
                    format!(
                        "{:?} needs a finite mean and a finite non-zero scale",
                        scaling.feature
                    ),
                ));
            }
        }

        Ok(())
    }

    /// Length of every vector produced by [`FeatureTransformer::transform`].
    pub fn width(&self) -> usize {
        self.categorical
            .iter()
            .map(CategoricalEncoding::width)
            .sum::<usize>()
            + self.numeric.len()
    }

    pub fn transform(&self, record: &CatalogRecord) -> Result<Vec<f64>, TransformError> {
        let mut features = Vec::with_capacity(self.width());
        for encoding in &self.categorical {
            encoding.encode_into(encoding.feature.value(record), &mut features)?;
        }
        for scaling in &self.numeric {
            features.push((scaling.feature.value(record) - scaling.mean) / scaling.scale);
        }
        Ok(features)
    }

    /// Whether `value` is part of the training vocabulary for `feature`.
    /// Features without an encoding accept nothing.
    pub fn knows(&self, feature: CategoricalFeature, value: &str) -> bool {
        self.categorical
            .iter()
            .find(|encoding| encoding.feature == feature)
            .is_some_and(|encoding| encoding.categories.iter().any(|c| c == value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("'{value}' is not a known {feature} category")]
    UnknownCategory {
        feature: CategoricalFeature,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(location: &str, product_type: &str) -> CatalogRecord {
        CatalogRecord {
            location: location.to_string(),
            product_type: product_type.to_string(),
            carbon_footprint: 2.0,
            biodegradability_score: 0.5,
            recyclability_score: 0.25,
            cost_efficiency: 1.0,
            availability: 1,
            packaging_material: "Jute".to_string(),
        }
    }

    fn transformer() -> FeatureTransformer {
        FeatureTransformer::new(
            vec![
                CategoricalEncoding {
                    feature: CategoricalFeature::Location,
                    categories: vec!["Bangalore".into(), "Delhi".into(), "Mumbai".into()],
                    drop_first: true,
                },
                CategoricalEncoding {
                    feature: CategoricalFeature::ProductType,
                    categories: vec!["Electronics".into(), "Food".into()],
                    drop_first: false,
                },
            ],
            vec![
                NumericScaling {
                    feature: NumericFeature::CarbonFootprint,
                    mean: 1.0,
                    scale: 0.5,
                },
                NumericScaling {
                    feature: NumericFeature::RecyclabilityScore,
                    mean: 0.25,
                    scale: 2.0,
                },
            ],
        )
        .expect("valid transformer")
    }

    #[test]
    fn encodes_categories_then_scales_numerics() {
        let features = transformer()
            .transform(&record("Mumbai", "Food"))
            .expect("known categories");
        assert_eq!(features, vec![0.0, 1.0, 0.0, 1.0, 2.0, 0.0]);
    }

    #[test]
    fn dropped_first_category_encodes_as_zeros() {
        let transformer = transformer();
        let features = transformer
            .transform(&record("Bangalore", "Electronics"))
            .expect("known categories");
        assert_eq!(features.len(), transformer.width());
        assert_eq!(&features[..4], &[0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let err = transformer()
            .transform(&record("Gurgaon", "Food"))
            .expect_err("gurgaon unseen in training");
        assert_eq!(
            err,
            TransformError::UnknownCategory {
                feature: CategoricalFeature::Location,
                value: "Gurgaon".to_string(),
            }
        );
    }

    #[test]
    fn knows_reports_vocabulary_membership() {
        let transformer = transformer();
        assert!(transformer.knows(CategoricalFeature::Location, "Delhi"));
        assert!(!transformer.knows(CategoricalFeature::ProductType, "Toys"));
    }

    #[test]
    fn rejects_zero_scale() {
        let err = FeatureTransformer::new(
            Vec::new(),
            vec![NumericScaling {
                feature: NumericFeature::CostEfficiency,
                mean: 0.0,
                scale: 0.0,
            }],
        )
        .expect_err("zero scale rejected");
        assert!(matches!(err, ArtifactError::Invalid { .. }));
    }

    #[test]
    fn rejects_duplicate_vocabulary_entries() {
        let json = r#"{
            "categorical": [
                {"feature": "location", "categories": ["Delhi", "Delhi"]}
            ],
            "numeric": []
        }"#;
        let err = FeatureTransformer::from_reader(json.as_bytes()).expect_err("duplicate");
        assert!(err.to_string().contains("twice"));
    }
}
