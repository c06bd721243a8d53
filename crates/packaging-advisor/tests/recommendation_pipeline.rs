use packaging_advisor::config::RecommendationConfig;
use packaging_advisor::recommendations::{
    ArtifactError, OptimalResult, Query, RecommendationEngine, RecommendationError,
    RecommendationErrorKind, Resolution, TieBreakPolicy,
};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn fixture_config() -> RecommendationConfig {
    RecommendationConfig {
        dataset_path: fixture("packaging_records.csv"),
        model_path: fixture("packaging_model.json"),
        transformer_path: fixture("column_transformer.json"),
        labels_path: fixture("label_encoder.json"),
        coordinates_path: None,
        tie_break: TieBreakPolicy::FirstEncountered,
    }
}

fn engine() -> RecommendationEngine {
    RecommendationEngine::load(&fixture_config()).expect("fixture artifacts load")
}

fn recommend(location: &str, product_type: &str) -> Result<OptimalResult, RecommendationError> {
    let query = Query::new(location, product_type).expect("valid query");
    engine().resolve_recommendation(&query)
}

#[test]
fn exact_match_returns_lowest_carbon_row() {
    let result = recommend("Delhi", "Food").expect("delhi food resolves");

    assert_eq!(result.location, "Delhi");
    assert_eq!(result.product_type, "Food");
    assert_eq!(result.carbon_footprint, 0.95);
    assert_eq!(result.cost_efficiency, 0.65);
    assert_eq!(result.availability, 1);
    assert_eq!(
        result.optimal_packaging_material, "Bagasse",
        "material comes from the classifier, not the dataset column"
    );
}

#[test]
fn unlisted_location_falls_back_to_nearest_city_with_data() {
    let query = Query::new("Gurgaon", "Electronics").expect("valid query");
    let recommendation = engine().recommend(&query).expect("gurgaon resolves");

    assert_eq!(recommendation.result.location, "Delhi");
    assert_eq!(recommendation.result.carbon_footprint, 1.75);
    assert_eq!(
        recommendation.result.optimal_packaging_material,
        "Corrugated Cardboard"
    );
    assert_eq!(recommendation.candidates, 2);
    match recommendation.resolution {
        Resolution::Nearest {
            location,
            distance_km,
        } => {
            assert_eq!(location, "Delhi");
            assert!(distance_km > 20.0 && distance_km < 30.0, "got {distance_km}");
        }
        Resolution::Exact => panic!("gurgaon has no catalog rows"),
    }
}

#[test]
fn fallback_prefers_the_closest_of_several_locations() {
    let result = recommend("Thane", "Food").expect("thane resolves");
    assert_eq!(result.location, "Mumbai");
    assert_eq!(result.carbon_footprint, 1.10);
}

#[test]
fn unknown_location_without_coordinates_is_reported() {
    let err = recommend("Atlantis", "Food").expect_err("atlantis unknown");
    assert_eq!(err.kind(), RecommendationErrorKind::UnknownLocation);
    assert_eq!(
        err.to_string(),
        "Coordinates for 'Atlantis' are not available."
    );
}

#[test]
fn unknown_product_type_is_reported() {
    let err = recommend("Delhi", "Unicorns").expect_err("no unicorn rows");
    assert_eq!(err.kind(), RecommendationErrorKind::NoProductData);
    assert_eq!(
        err.to_string(),
        "No data found for Product Type: Unicorns in any location."
    );
}

#[test]
fn product_only_stocked_at_unmapped_locations_is_unreachable() {
    let err = recommend("Delhi", "Toys").expect_err("lemuria has no coordinates");
    assert_eq!(err.kind(), RecommendationErrorKind::NoReachableLocation);
}

#[test]
fn carbon_ties_keep_the_first_dataset_row() {
    let result = recommend("Bangalore", "Textiles").expect("bangalore resolves");
    assert_eq!(result.carbon_footprint, 0.80);
    assert_eq!(result.cost_efficiency, 0.75);
    assert_eq!(result.recyclability_score, 0.65);
    assert_eq!(result.optimal_packaging_material, "Jute");
}

#[test]
fn location_outside_training_vocabulary_is_a_transform_error() {
    let err = recommend("Pune", "Food").expect_err("pune unseen in training");
    assert_eq!(err.kind(), RecommendationErrorKind::TransformError);
    assert!(err.to_string().starts_with("Error transforming features:"));
}

#[test]
fn repeated_queries_return_identical_results() {
    let engine = engine();
    let query = Query::new("Gurgaon", "Electronics").expect("valid query");
    let first = engine.recommend(&query).expect("first call");
    let second = engine.recommend(&query).expect("second call");
    assert_eq!(first, second);
}

#[test]
fn query_values_are_trimmed_but_case_sensitive() {
    let result = recommend("  Delhi ", " Food").expect("trimmed query resolves");
    assert_eq!(result.location, "Delhi");

    let err = recommend("delhi", "Food").expect_err("lowercase city unknown");
    assert_eq!(err.kind(), RecommendationErrorKind::UnknownLocation);
}

#[test]
fn missing_artifact_fails_at_load() {
    let mut config = fixture_config();
    config.model_path = fixture("does_not_exist.json");

    let err = RecommendationEngine::load(&config)
        .err()
        .expect("missing model rejected");
    assert!(matches!(err, ArtifactError::Io { .. }), "got {err:?}");
}

#[test]
fn label_encoder_smaller_than_model_fails_at_load() {
    let dir = std::env::temp_dir().join(format!("packaging-labels-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("label_encoder.json");
    std::fs::write(&path, r#"{"classes": ["Bagasse", "Bamboo"]}"#).expect("labels written");

    let mut config = fixture_config();
    config.labels_path = path;
    let err = RecommendationEngine::load(&config)
        .err()
        .expect("two labels cannot decode eight classes");
    assert!(matches!(err, ArtifactError::Incompatible(_)), "got {err:?}");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn custom_coordinate_table_replaces_builtin_cities() {
    let dir = std::env::temp_dir().join(format!("packaging-advisor-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("coordinates.csv");
    std::fs::write(
        &path,
        "name,latitude,longitude\nDelhi,28.6139,77.2090\nLemuria,28.70,77.10\nSpringfield,28.72,77.12\n",
    )
    .expect("coordinates written");

    let mut config = fixture_config();
    config.coordinates_path = Some(path);
    let engine = RecommendationEngine::load(&config).expect("custom coordinates load");

    let query = Query::new("Springfield", "Food").expect("valid query");
    let result = engine
        .resolve_recommendation(&query)
        .expect("springfield falls back to delhi");
    assert_eq!(result.location, "Delhi");

    let query = Query::new("Gurgaon", "Food").expect("valid query");
    let err = engine
        .resolve_recommendation(&query)
        .expect_err("gurgaon absent from custom table");
    assert_eq!(err.kind(), RecommendationErrorKind::UnknownLocation);

    std::fs::remove_dir_all(&dir).ok();
}
