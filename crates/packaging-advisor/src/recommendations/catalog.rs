use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// One historical packaging observation for a (location, product type) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogRecord {
    pub location: String,
    pub product_type: String,
    pub carbon_footprint: f64,
    pub biodegradability_score: f64,
    pub recyclability_score: f64,
    pub cost_efficiency: f64,
    pub availability: i64,
    /// Ground-truth label used by the offline trainer; never returned to callers.
    pub packaging_material: String,
}

impl CatalogRecord {
    fn validate(&self) -> Result<(), String> {
        if self.location.is_empty() {
            return Err("location is empty".to_string());
        }
        if self.product_type.is_empty() {
            return Err("product type is empty".to_string());
        }
        if self.packaging_material.is_empty() {
            return Err("packaging material is empty".to_string());
        }
        if !self.carbon_footprint.is_finite() || self.carbon_footprint < 0.0 {
            return Err(format!(
                "carbon footprint must be a non-negative number, got {}",
                self.carbon_footprint
            ));
        }
        for (label, value) in [
            ("biodegradability score", self.biodegradability_score),
            ("recyclability score", self.recyclability_score),
            ("cost efficiency", self.cost_efficiency),
        ] {
            if !value.is_finite() {
                return Err(format!("{label} must be finite, got {value}"));
            }
        }
        Ok(())
    }
}

/// In-memory, read-only table of catalog records in dataset order.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    records: Vec<CatalogRecord>,
}

impl CatalogStore {
    pub fn from_records(records: Vec<CatalogRecord>) -> Result<Self, CatalogError> {
        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (idx, record) in records.iter().enumerate() {
            record
                .validate()
                .map_err(|reason| CatalogError::InvalidRecord {
                    line: idx as u64 + 1,
                    reason,
                })?;
        }
        Ok(Self { records })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for (idx, row) in csv_reader.deserialize::<CatalogRow>().enumerate() {
            let line = idx as u64 + 1;
            let record = row?
                .into_record()
                .map_err(|reason| CatalogError::InvalidRecord { line, reason })?;
            record
                .validate()
                .map_err(|reason| CatalogError::InvalidRecord { line, reason })?;
            records.push(record);
        }

        if records.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct locations in first-seen order.
    pub fn locations(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|record| record.location.as_str()))
    }

    /// Distinct product types in first-seen order.
    pub fn product_types(&self) -> Vec<&str> {
        distinct(self.records.iter().map(|record| record.product_type.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Product_Type")]
    product_type: String,
    #[serde(rename = "Packaging_Material")]
    packaging_material: String,
    #[serde(rename = "Carbon_Footprint (kg CO₂)")]
    carbon_footprint: f64,
    #[serde(rename = "Biodegradability_Score")]
    biodegradability_score: f64,
    #[serde(rename = "Recyclability_Score")]
    recyclability_score: f64,
    #[serde(rename = "Cost_Efficiency")]
    cost_efficiency: f64,
    #[serde(rename = "Availability")]
    availability: f64,
}

impl CatalogRow {
    fn into_record(self) -> Result<CatalogRecord, String> {
        // Imputed exports write integral columns as floats ("1.0").
        if !self.availability.is_finite() || self.availability.fract() != 0.0 {
            return Err(format!(
                "availability must be a whole number, got {}",
                self.availability
            ));
        }
        // 2^63 itself is not representable as i64.
        if self.availability < i64::MIN as f64 || self.availability >= i64::MAX as f64 {
            return Err(format!(
                "availability {} is out of range",
                self.availability
            ));
        }

        Ok(CatalogRecord {
            location: self.location,
            product_type: self.product_type,
            carbon_footprint: self.carbon_footprint,
            biodegradability_score: self.biodegradability_score,
            recyclability_score: self.recyclability_score,
            cost_efficiency: self.cost_efficiency,
            availability: self.availability as i64,
            packaging_material: self.packaging_material,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read packaging dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid packaging dataset CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("packaging dataset row {line} rejected: {reason}")]
    InvalidRecord { line: u64, reason: String },
    #[error("packaging dataset contains no records")]
    Empty,
}
