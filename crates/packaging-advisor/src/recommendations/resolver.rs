use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::catalog::{CatalogRecord, CatalogStore};
use super::error::RecommendationError;
use super::geo::GeoIndex;
use super::query::Query;

/// How equally distant fallback locations are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreakPolicy {
    /// Keep the location encountered first in dataset order.
    #[default]
    FirstEncountered,
    /// Keep the alphabetically smallest location name.
    Lexicographic,
}

impl FromStr for TieBreakPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "first" | "first_encountered" | "dataset_order" => Ok(Self::FirstEncountered),
            "lexicographic" | "alphabetical" => Ok(Self::Lexicographic),
            other => Err(format!("unknown tie-break policy '{other}'")),
        }
    }
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreakPolicy::FirstEncountered => write!(f, "first_encountered"),
            TieBreakPolicy::Lexicographic => write!(f, "lexicographic"),
        }
    }
}

/// How a candidate set was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Resolution {
    Exact,
    Nearest { location: String, distance_km: f64 },
}

/// Non-empty catalog rows sharing one product type and one location.
#[derive(Debug, Clone)]
pub struct ResolvedCandidateSet<'a> {
    resolution: Resolution,
    records: Vec<&'a CatalogRecord>,
}

impl<'a> ResolvedCandidateSet<'a> {
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn records(&self) -> &[&'a CatalogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Resolution, Vec<&'a CatalogRecord>) {
        (self.resolution, self.records)
    }
}

/// Exact-match lookup with nearest-location fallback.
pub struct Resolver<'a> {
    catalog: &'a CatalogStore,
    geo: &'a GeoIndex,
    tie_break: TieBreakPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a CatalogStore, geo: &'a GeoIndex, tie_break: TieBreakPolicy) -> Self {
        Self {
            catalog,
            geo,
            tie_break,
        }
    }

    pub fn resolve(&self, query: &Query) -> Result<ResolvedCandidateSet<'a>, RecommendationError> {
        let exact: Vec<&'a CatalogRecord> = self
            .catalog
            .records()
            .iter()
            .filter(|record| {
                record.location == query.location() && record.product_type == query.product_type()
            })
            .collect();

        if !exact.is_empty() {
            return Ok(ResolvedCandidateSet {
                resolution: Resolution::Exact,
                records: exact,
            });
        }

        self.nearest(query)
    }

    fn nearest(&self, query: &Query) -> Result<ResolvedCandidateSet<'a>, RecommendationError> {
        if !self.geo.contains(query.location()) {
            return Err(RecommendationError::UnknownLocation {
                location: query.location().to_string(),
            });
        }

        let same_product: Vec<&'a CatalogRecord> = self
            .catalog
            .records()
            .iter()
            .filter(|record| record.product_type == query.product_type())
            .collect();

        if same_product.is_empty() {
            return Err(RecommendationError::NoProductData {
                product_type: query.product_type().to_string(),
            });
        }

        let mut best: Option<(&'a str, f64)> = None;
        for &record in &same_product {
            // Locations missing from the index are unreachable.
            let Some(distance) = self.geo.distance_km(query.location(), &record.location) else {
                continue;
            };
            let closer = match best {
                None => true,
                Some((location, best_distance)) => {
                    distance < best_distance
                        || (distance == best_distance
                            && self.tie_break == TieBreakPolicy::Lexicographic
                            && record.location.as_str() < location)
                }
            };
            if closer {
                best = Some((record.location.as_str(), distance));
            }
        }

        let (location, distance_km) =
            best.ok_or_else(|| RecommendationError::NoReachableLocation {
                product_type: query.product_type().to_string(),
            })?;

        let records = same_product
            .into_iter()
            .filter(|record| record.location == location)
            .collect();

        Ok(ResolvedCandidateSet {
            resolution: Resolution::Nearest {
                location: location.to_string(),
                distance_km,
            },
            records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendations::geo::LocationCoordinate;

    fn record(location: &str, product_type: &str, carbon_footprint: f64) -> CatalogRecord {
        CatalogRecord {
            location: location.to_string(),
            product_type: product_type.to_string(),
            carbon_footprint,
            biodegradability_score: 0.8,
            recyclability_score: 0.7,
            cost_efficiency: 0.6,
            availability: 1,
            packaging_material: "Jute".to_string(),
        }
    }

    fn catalog(records: Vec<CatalogRecord>) -> CatalogStore {
        CatalogStore::from_records(records).expect("valid catalog")
    }

    fn query(location: &str, product_type: &str) -> Query {
        Query::new(location, product_type).expect("valid query")
    }

    #[test]
    fn exact_match_returns_every_matching_row() {
        let catalog = catalog(vec![
            record("Delhi", "Food", 1.2),
            record("Gurgaon", "Food", 0.4),
            record("Delhi", "Food", 0.9),
            record("Delhi", "Electronics", 0.1),
        ]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let set = resolver.resolve(&query("Delhi", "Food")).expect("resolves");
        assert_eq!(set.resolution(), &Resolution::Exact);
        let footprints: Vec<f64> = set.records().iter().map(|r| r.carbon_footprint).collect();
        assert_eq!(footprints, vec![1.2, 0.9]);
    }

    #[test]
    fn exact_match_skips_geo_lookup_for_unindexed_locations() {
        let catalog = catalog(vec![record("Atlantis", "Food", 1.0)]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let set = resolver.resolve(&query("Atlantis", "Food")).expect("resolves");
        assert_eq!(set.resolution(), &Resolution::Exact);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn falls_back_to_all_rows_at_nearest_location() {
        let catalog = catalog(vec![
            record("Mumbai", "Electronics", 0.5),
            record("Delhi", "Electronics", 2.1),
            record("Noida", "Food", 1.0),
            record("Delhi", "Electronics", 1.7),
        ]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let set = resolver
            .resolve(&query("Gurgaon", "Electronics"))
            .expect("resolves");
        match set.resolution() {
            Resolution::Nearest {
                location,
                distance_km,
            } => {
                assert_eq!(location, "Delhi");
                assert!((23.5..26.0).contains(distance_km));
            }
            other => panic!("expected nearest resolution, got {other:?}"),
        }
        assert_eq!(set.len(), 2);
        assert!(set.records().iter().all(|r| r.location == "Delhi"));
    }

    #[test]
    fn skips_rows_without_coordinates() {
        let catalog = catalog(vec![
            record("Lemuria", "Toys", 0.1),
            record("Jaipur", "Toys", 0.9),
        ]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let set = resolver.resolve(&query("Delhi", "Toys")).expect("resolves");
        assert_eq!(set.records()[0].location, "Jaipur");
    }

    #[test]
    fn unknown_location_without_exact_match_fails() {
        let catalog = catalog(vec![record("Delhi", "Food", 1.0)]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let err = resolver
            .resolve(&query("Atlantis", "Food"))
            .expect_err("unknown location");
        assert!(matches!(
            err,
            RecommendationError::UnknownLocation { location } if location == "Atlantis"
        ));
    }

    #[test]
    fn missing_product_type_fails() {
        let catalog = catalog(vec![record("Delhi", "Food", 1.0)]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let err = resolver
            .resolve(&query("Delhi", "Unicorns"))
            .expect_err("no product data");
        assert!(matches!(err, RecommendationError::NoProductData { .. }));
    }

    #[test]
    fn unreachable_candidates_fail() {
        let catalog = catalog(vec![
            record("Lemuria", "Toys", 0.1),
            record("Mu", "Toys", 0.2),
        ]);
        let geo = GeoIndex::indian_cities();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::default());

        let err = resolver
            .resolve(&query("Delhi", "Toys"))
            .expect_err("nothing reachable");
        assert!(matches!(err, RecommendationError::NoReachableLocation { .. }));
    }

    fn equidistant_geo() -> GeoIndex {
        GeoIndex::new(vec![
            LocationCoordinate::new("Origin", 0.0, 0.0),
            LocationCoordinate::new("West", 0.0, -1.0),
            LocationCoordinate::new("East", 0.0, 1.0),
        ])
        .expect("valid index")
    }

    #[test]
    fn equal_distances_keep_first_encountered_location() {
        let catalog = catalog(vec![
            record("West", "Food", 1.0),
            record("East", "Food", 0.5),
            record("West", "Food", 2.0),
        ]);
        let geo = equidistant_geo();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::FirstEncountered);

        let set = resolver.resolve(&query("Origin", "Food")).expect("resolves");
        assert!(set.records().iter().all(|r| r.location == "West"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn lexicographic_policy_prefers_smallest_name() {
        let catalog = catalog(vec![
            record("West", "Food", 1.0),
            record("East", "Food", 0.5),
        ]);
        let geo = equidistant_geo();
        let resolver = Resolver::new(&catalog, &geo, TieBreakPolicy::Lexicographic);

        let set = resolver.resolve(&query("Origin", "Food")).expect("resolves");
        assert_eq!(set.records()[0].location, "East");
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn parses_tie_break_names() {
        assert_eq!(
            "first_encountered".parse::<TieBreakPolicy>(),
            Ok(TieBreakPolicy::FirstEncountered)
        );
        assert_eq!(
            " Lexicographic ".parse::<TieBreakPolicy>(),
            Ok(TieBreakPolicy::Lexicographic)
        );
        assert!("random".parse::<TieBreakPolicy>().is_err());
    }
}
