use crate::infra::load_engine;
use clap::Args;
use packaging_advisor::config::AppConfig;
use packaging_advisor::error::AppError;
use packaging_advisor::recommendations::{CatalogOverview, Query, Recommendation, Resolution};

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Requested location, e.g. "Gurgaon"
    #[arg(long)]
    pub(crate) location: String,
    /// Requested product type, e.g. "Electronics"
    #[arg(long)]
    pub(crate) product_type: String,
    /// Print the full recommendation as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        location,
        product_type,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = load_engine(&config.recommendations)?;
    let query = Query::new(&location, &product_type)?;
    let recommendation = engine.recommend(&query)?;

    if json {
        match serde_json::to_string_pretty(&recommendation) {
            Ok(payload) => println!("{}", payload),
            Err(err) => println!("Recommendation payload unavailable: {}", err),
        }
    } else {
        render_recommendation(&query, &recommendation);
    }

    Ok(())
}

pub(crate) fn run_catalog() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let engine = load_engine(&config.recommendations)?;
    let overview = CatalogOverview::from_engine(&engine);

    println!("Catalog coverage ({} records)", engine.catalog().len());
    println!("Locations with data:");
    for location in &overview.locations {
        let marker = if engine.geo().contains(location) {
            ""
        } else {
            " (no coordinates, exact matches only)"
        };
        println!("  - {}{}", location, marker);
    }
    println!("Product types:");
    for product_type in &overview.product_types {
        println!("  - {}", product_type);
    }
    println!(
        "Known coordinates: {} locations (tie-break {})",
        overview.geo_locations.len(),
        engine.tie_break()
    );

    Ok(())
}

fn render_recommendation(query: &Query, recommendation: &Recommendation) {
    let result = &recommendation.result;
    println!(
        "Recommendation for {} in {}",
        query.product_type(),
        query.location()
    );
    match &recommendation.resolution {
        Resolution::Exact => println!("- Catalog match: exact"),
        Resolution::Nearest {
            location,
            distance_km,
        } => println!(
            "- Catalog match: nearest location {} ({:.1} km away)",
            location, distance_km
        ),
    }
    println!(
        "- Optimal material: {} (from {} candidates)",
        result.optimal_packaging_material, recommendation.candidates
    );
    println!(
        "- Carbon footprint {:.2} kg CO2 | biodegradability {:.2} | recyclability {:.2}",
        result.carbon_footprint, result.biodegradability_score, result.recyclability_score
    );
    println!(
        "- Cost efficiency {:.2} | availability {}",
        result.cost_efficiency, result.availability
    );
}
