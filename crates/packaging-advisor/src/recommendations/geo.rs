use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

const INDIAN_CITIES: &[(&str, f64, f64)] = &[
    ("Delhi", 28.6139, 77.2090),
    ("Gurgaon", 28.4595, 77.0266),
    ("Noida", 28.5355, 77.3910),
    ("Ghaziabad", 28.6692, 77.4538),
    ("Mumbai", 19.0760, 72.8777),
    ("Thane", 19.2183, 72.9781),
    ("Navi mumbai", 19.0330, 73.0297),
    ("Pune", 18.5204, 73.8567),
    ("Bangalore", 12.9716, 77.5946),
    ("Mysore", 12.2958, 76.6394),
    ("Hosur", 12.7406, 77.8253),
    ("Chennai", 13.0827, 80.2707),
    ("Puducherry", 11.9416, 79.8083),
    ("Vellore", 12.9165, 79.1325),
    ("Kolkata", 22.5726, 88.3639),
    ("Howrah", 22.5958, 88.2636),
    ("Durgapur", 23.5204, 87.3119),
    ("Hyderabad", 17.3850, 78.4867),
    ("Secunderabad", 17.4399, 78.4983),
    ("Warangal", 17.9784, 79.5919),
    ("Ahmedabad", 23.0225, 72.5714),
    ("Vadodara", 22.3072, 73.1812),
    ("Rajkot", 22.3039, 70.8022),
    ("Surat", 21.1702, 72.8311),
    ("Nashik", 19.9975, 73.7898),
    ("Jaipur", 26.9124, 75.7873),
    ("Ajmer", 26.4499, 74.6399),
    ("Kota", 25.2138, 75.8648),
];

/// Named point on the globe. Names are matched case-sensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCoordinate {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationCoordinate {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

/// Read-only lookup from location name to coordinates.
#[derive(Debug, Clone)]
pub struct GeoIndex {
    entries: Vec<LocationCoordinate>,
    positions: HashMap<String, usize>,
}

impl GeoIndex {
    pub fn new<I>(coordinates: I) -> Result<Self, GeoIndexError>
    where
        I: IntoIterator<Item = LocationCoordinate>,
    {
        let mut entries = Vec::new();
        let mut positions = HashMap::new();

        for coordinate in coordinates {
            if coordinate.name.trim().is_empty() {
                return Err(GeoIndexError::EmptyName);
            }
            if !coordinate.latitude.is_finite() || coordinate.latitude.abs() > 90.0 {
                return Err(GeoIndexError::OutOfRange {
                    name: coordinate.name,
                    axis: "latitude",
                });
            }
            if !coordinate.longitude.is_finite() || coordinate.longitude.abs() > 180.0 {
                return Err(GeoIndexError::OutOfRange {
                    name: coordinate.name,
                    axis: "longitude",
                });
            }
            if positions.contains_key(&coordinate.name) {
                return Err(GeoIndexError::Duplicate(coordinate.name));
            }
            positions.insert(coordinate.name.clone(), entries.len());
            entries.push(coordinate);
        }

        Ok(Self { entries, positions })
    }

    /// Built-in table of the Indian cities the reference dataset covers.
    pub fn indian_cities() -> Self {
        let entries: Vec<LocationCoordinate> = INDIAN_CITIES
            .iter()
            .map(|(name, lat, lon)| LocationCoordinate::new(*name, *lat, *lon))
            .collect();
        let positions = entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (entry.name.clone(), idx))
            .collect();
        Self { entries, positions }
    }

    /// Loads a `name,latitude,longitude` CSV table.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, GeoIndexError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, GeoIndexError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let coordinates = csv_reader
            .deserialize::<LocationCoordinate>()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(coordinates)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn coordinate(&self, name: &str) -> Option<&LocationCoordinate> {
        self.positions.get(name).map(|&idx| &self.entries[idx])
    }

    /// Great-circle distance, or `None` when either name is unknown.
    pub fn distance_km(&self, from: &str, to: &str) -> Option<f64> {
        let a = self.coordinate(from)?;
        let b = self.coordinate(to)?;
        Some(haversine_km(a.latitude, a.longitude, b.latitude, b.longitude))
    }

    pub fn locations(&self) -> impl Iterator<Item = &LocationCoordinate> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

#[derive(Debug, thiserror::Error)]
pub enum GeoIndexError {
    #[error("failed to read coordinate table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid coordinate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("coordinate table contains an empty location name")]
    EmptyName,
    #[error("location '{0}' appears more than once in the coordinate table")]
    Duplicate(String),
    #[error("{axis} for '{name}' is outside the valid range")]
    OutOfRange { name: String, axis: &'static str },
}
