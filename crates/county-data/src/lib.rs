#![deny(warnings)]

//! Builtin county reference data and the boundary-geometry loader.
//!
//! The 12-row table is the whole dataset; it ships in the binary. The
//! GeoJSON county boundaries are display-layer input, loaded once at
//! startup and fatal if missing or incomplete.

use advisory_core::{CountyDataset, CountyRecord};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// name, lat, lon, soil carbon, nitrogen, food poverty, sentiment, comment.
type Row = (&'static str, f32, f32, f32, f32, f32, f32, &'static str);

const ROWS: [Row; 12] = [
    ("Cork", 51.9, -8.5, 2.8, 65.0, 0.22, 0.66, "dairy export beef port subsidy prices CAP"),
    ("Kerry", 52.1, -9.7, 3.2, 72.0, 0.30, 0.52, "sheep drought tourism subsidy soil upland"),
    ("Limerick", 52.7, -8.6, 2.5, 60.0, 0.25, 0.60, "dairy milk prices soil policy feed"),
    ("Galway", 53.3, -9.0, 3.0, 70.0, 0.28, 0.58, "sheep wool export weed policy EU"),
    ("Dublin", 53.3, -6.3, 2.3, 68.0, 0.18, 0.69, "horticulture market prices policy urban"),
    ("Clare", 52.8, -9.0, 2.9, 66.0, 0.26, 0.61, "cattle silage weather subsidy soil"),
    ("Wexford", 52.3, -6.5, 3.1, 74.0, 0.27, 0.54, "grain export port nitrogen prices"),
    ("Kilkenny", 52.6, -7.3, 3.0, 71.0, 0.29, 0.59, "beef grain subsidy soil CAP"),
    ("Donegal", 55.0, -7.7, 2.6, 67.0, 0.33, 0.50, "sheep fishing subsidy poverty weather"),
    ("Mayo", 53.9, -9.3, 2.7, 64.0, 0.31, 0.55, "sheep peat subsidy poverty weather"),
    ("Meath", 53.6, -6.5, 3.3, 69.0, 0.21, 0.65, "beef grain prices export soil"),
    ("Tipperary", 52.5, -7.8, 2.4, 62.0, 0.24, 0.57, "dairy milk soil drought prices"),
];

/// The fixed mock reference table for all 12 counties.
pub fn builtin_dataset() -> CountyDataset {
    let records = ROWS
        .iter()
        .map(|&(name, lat, lon, soil, nitrogen, fpi, sentiment, comment)| CountyRecord {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            soil_carbon: soil,
            nitrogen_level: nitrogen,
            food_poverty_index: fpi,
            farmer_sentiment: sentiment,
            comment: comment.to_string(),
        })
        .collect();
    // The builtin rows satisfy every record invariant by construction.
    CountyDataset::from_records(records).unwrap_or_default()
}

/// Errors from loading county boundary geometry. All fatal at startup.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("io error: {0}")]
    Io(String),
    #[error("geojson parse error: {0}")]
    Parse(String),
    #[error("feature {0} has no county name property")]
    MissingNameProperty(usize),
    #[error("unsupported geometry for {0}")]
    UnsupportedGeometry(String),
    #[error("no boundary for county: {0}")]
    MissingCounty(String),
}

impl From<std::io::Error> for GeoError {
    fn from(e: std::io::Error) -> Self {
        GeoError::Io(e.to_string())
    }
}

/// Boundary polygon(s) for one county: outer rings of [lon, lat] pairs.
#[derive(Clone, Debug)]
pub struct CountyBoundary {
    pub name: String,
    pub rings: Vec<Vec<[f64; 2]>>,
}

/// All loaded boundaries, keyed by county name.
#[derive(Clone, Debug, Default)]
pub struct CountyBoundaries(BTreeMap<String, CountyBoundary>);

impl CountyBoundaries {
    pub fn get(&self, county: &str) -> Option<&CountyBoundary> {
        self.0.get(county)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fail-fast coverage check: every dataset county must have geometry.
    pub fn ensure_covers(&self, dataset: &CountyDataset) -> Result<(), GeoError> {
        for county in dataset.counties() {
            if !self.0.contains_key(county) {
                return Err(GeoError::MissingCounty(county.to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawCollection {
    features: Vec<RawFeature>,
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
    geometry: RawGeometry,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

fn feature_name(feature: &RawFeature) -> Option<String> {
    ["name", "county", "COUNTY"]
        .iter()
        .find_map(|key| feature.properties.get(*key))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

/// Parse a polygon-per-county GeoJSON feature collection from `path`.
pub fn load_boundaries<P: AsRef<Path>>(path: P) -> Result<CountyBoundaries, GeoError> {
    let text = fs::read_to_string(path.as_ref())?;
    let collection: RawCollection =
        serde_json::from_str(&text).map_err(|e| GeoError::Parse(e.to_string()))?;

    let mut map = BTreeMap::new();
    for (idx, feature) in collection.features.into_iter().enumerate() {
        let name = feature_name(&feature).ok_or(GeoError::MissingNameProperty(idx))?;
        let rings = match feature.geometry {
            RawGeometry::Polygon { coordinates } => coordinates,
            RawGeometry::MultiPolygon { coordinates } => {
                coordinates.into_iter().flatten().collect()
            }
        };
        if rings.is_empty() || rings.iter().any(|ring| ring.len() < 3) {
            return Err(GeoError::UnsupportedGeometry(name));
        }
        map.insert(name.clone(), CountyBoundary { name, rings });
    }
    info!(counties = map.len(), path = %path.as_ref().display(), "boundaries loaded");
    Ok(CountyBoundaries(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisory_core::validate_dataset;
    use std::path::PathBuf;

    fn asset(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/geo").join(name)
    }

    #[test]
    fn builtin_dataset_is_complete_and_valid() {
        let ds = builtin_dataset();
        assert_eq!(ds.len(), 12);
        validate_dataset(&ds).unwrap();
        let cork = ds.get("Cork").unwrap();
        assert_eq!(cork.soil_carbon, 2.8);
        assert_eq!(cork.food_poverty_index, 0.22);
        let kerry = ds.get("Kerry").unwrap();
        assert_eq!(kerry.nitrogen_level, 72.0);
        assert_eq!(kerry.soil_carbon, 3.2);
    }

    #[test]
    fn builtin_comments_are_nonempty_keyword_bags() {
        for rec in builtin_dataset().records() {
            assert!(rec.comment.split_whitespace().count() >= 4, "{}", rec.name);
        }
    }

    #[test]
    fn boundaries_load_and_cover_dataset() {
        let boundaries = load_boundaries(asset("ireland_counties.geojson")).unwrap();
        assert_eq!(boundaries.len(), 12);
        boundaries.ensure_covers(&builtin_dataset()).unwrap();
        let cork = boundaries.get("Cork").unwrap();
        assert!(!cork.rings.is_empty());
        assert!(cork.rings[0].len() >= 4);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_boundaries(asset("no_such_file.geojson")).unwrap_err();
        assert!(matches!(err, GeoError::Io(_)));
    }

    #[test]
    fn coverage_check_reports_missing_county() {
        let boundaries = CountyBoundaries::default();
        let err = boundaries.ensure_covers(&builtin_dataset()).unwrap_err();
        assert!(matches!(err, GeoError::MissingCounty(ref c) if c == "Clare"));
    }

    #[test]
    fn parse_rejects_feature_without_name() {
        let dir = std::env::temp_dir().join("county-data-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("anon.geojson");
        std::fs::write(
            &path,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature",
                "properties":{},
                "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}}]}"#,
        )
        .unwrap();
        let err = load_boundaries(&path).unwrap_err();
        assert!(matches!(err, GeoError::MissingNameProperty(0)));
    }
}
