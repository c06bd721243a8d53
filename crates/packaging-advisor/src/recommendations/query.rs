use serde::Deserialize;

use super::error::RecommendationError;

/// Raw request body; fields stay optional so missing values map to `InvalidQuery`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
}

/// Validated, trimmed recommendation query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    location: String,
    product_type: String,
}

impl Query {
    pub fn new(location: &str, product_type: &str) -> Result<Self, RecommendationError> {
        let location = location.trim();
        let product_type = product_type.trim();

        if location.is_empty() {
            return Err(RecommendationError::InvalidQuery(
                "location is required".to_string(),
            ));
        }
        if product_type.is_empty() {
            return Err(RecommendationError::InvalidQuery(
                "product_type is required".to_string(),
            ));
        }

        Ok(Self {
            location: location.to_string(),
            product_type: product_type.to_string(),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn product_type(&self) -> &str {
        &self.product_type
    }
}

impl TryFrom<RecommendationRequest> for Query {
    type Error = RecommendationError;

    fn try_from(request: RecommendationRequest) -> Result<Self, Self::Error> {
        Query::new(
            request.location.as_deref().unwrap_or_default(),
            request.product_type.as_deref().unwrap_or_default(),
        )
    }
}
