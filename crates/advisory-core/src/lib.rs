#![deny(warnings)]

//! Core domain models and invariants for the agri advisory engine.
//!
//! This crate defines the per-county reference record, the global scenario
//! flags, and the evaluation context handed to the advisory agents, with
//! validation helpers to guarantee basic invariants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Immutable reference data for one county.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountyRecord {
    /// County name, unique across the dataset.
    pub name: String,
    /// Map anchor latitude in degrees.
    pub latitude: f32,
    /// Map anchor longitude in degrees.
    pub longitude: f32,
    /// Soil organic carbon index, plausible range ~[2.0, 3.5].
    pub soil_carbon: f32,
    /// Nitrogen level, plausible range ~[55, 80].
    pub nitrogen_level: f32,
    /// Food poverty index in [0, 1].
    pub food_poverty_index: f32,
    /// Base positive-sentiment ratio among farmers, in [0, 1].
    pub farmer_sentiment: f32,
    /// Free-text keyword bag consumed only by the display layer.
    pub comment: String,
}

/// Global scenario toggles. Independent and freely combinable; passed by
/// value into each evaluation so nothing is shared-mutable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFlags {
    /// Hypothetical climate shock (drought conditions).
    pub climate_shock: bool,
    /// Hypothetical export route blockage.
    pub export_block: bool,
    /// Hypothetical withdrawal of farm subsidies.
    pub subsidy_cut: bool,
}

impl ScenarioFlags {
    /// All 8 combinations of the three flags, for exhaustive checks.
    pub fn all_combinations() -> impl Iterator<Item = ScenarioFlags> {
        (0u8..8).map(|bits| ScenarioFlags {
            climate_shock: bits & 1 != 0,
            export_block: bits & 2 != 0,
            subsidy_cut: bits & 4 != 0,
        })
    }
}

/// The five advisory personas. The set is closed; untyped identifiers from
/// the UI enter through [`AgentId::from_str`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentId {
    /// Soil health and drought response (persona GAIA).
    Soil,
    /// Supply-chain flow (persona ASTRA).
    Logistics,
    /// Food affordability and safety nets (persona FLORA).
    FoodSecurity,
    /// Land-use transitions (persona SYLVA).
    LandUse,
    /// Farmer morale (persona VERA).
    Sentiment,
}

impl AgentId {
    /// Every agent, in the fixed evaluation order used by the dashboard.
    pub const ALL: [AgentId; 5] = [
        AgentId::Soil,
        AgentId::Logistics,
        AgentId::FoodSecurity,
        AgentId::LandUse,
        AgentId::Sentiment,
    ];

    /// Stable machine identifier, e.g. for CLI flags.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Soil => "soil",
            AgentId::Logistics => "logistics",
            AgentId::FoodSecurity => "food-security",
            AgentId::LandUse => "land-use",
            AgentId::Sentiment => "sentiment",
        }
    }

    /// Display persona name used by the dashboard.
    pub fn persona(self) -> &'static str {
        match self {
            AgentId::Soil => "GAIA",
            AgentId::Logistics => "ASTRA",
            AgentId::FoodSecurity => "FLORA",
            AgentId::LandUse => "SYLVA",
            AgentId::Sentiment => "VERA",
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an agent identifier outside the fixed set is supplied.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown agent: {0}")]
pub struct UnknownAgentError(pub String);

impl FromStr for AgentId {
    type Err = UnknownAgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soil" | "gaia" => Ok(AgentId::Soil),
            "logistics" | "astra" => Ok(AgentId::Logistics),
            "food-security" | "flora" => Ok(AgentId::FoodSecurity),
            "land-use" | "sylva" => Ok(AgentId::LandUse),
            "sentiment" | "vera" => Ok(AgentId::Sentiment),
            _ => Err(UnknownAgentError(s.to_string())),
        }
    }
}

/// Raised when a county name misses the reference table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown county: {0}")]
pub struct UnknownCountyError(pub String);

/// The full reference table, keyed by county name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CountyDataset(BTreeMap<String, CountyRecord>);

impl CountyDataset {
    /// Build a dataset from records, keyed by name. Later duplicates are
    /// rejected rather than silently overwriting earlier rows.
    pub fn from_records(records: Vec<CountyRecord>) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        for rec in records {
            validate_record(&rec)?;
            let name = rec.name.clone();
            if map.insert(name.clone(), rec).is_some() {
                return Err(ValidationError::DuplicateCounty(name));
            }
        }
        Ok(CountyDataset(map))
    }

    pub fn get(&self, county: &str) -> Option<&CountyRecord> {
        self.0.get(county)
    }

    /// County names in sorted order.
    pub fn counties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn records(&self) -> impl Iterator<Item = &CountyRecord> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read-only input to one round of agent evaluations. Built fresh per user
/// interaction and discarded after the responses are rendered.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    /// The selected county's reference row.
    pub record: &'a CountyRecord,
    /// Scenario flags active at build time.
    pub flags: ScenarioFlags,
}

/// Look up `county` and merge it with the active flags.
///
/// Pure: the sentiment jitter is drawn lazily by the engine, not here, so
/// unrelated agents are unaffected by random-number consumption order.
pub fn build_context<'a>(
    county: &str,
    flags: ScenarioFlags,
    dataset: &'a CountyDataset,
) -> Result<EvaluationContext<'a>, UnknownCountyError> {
    let record = dataset
        .get(county)
        .ok_or_else(|| UnknownCountyError(county.to_string()))?;
    debug!(county, ?flags, "context built");
    Ok(EvaluationContext { record, flags })
}

/// One advisory produced by one agent. Free-form text only; not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisoryMessage {
    pub agent: AgentId,
    pub text: String,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// County name must be non-empty.
    #[error("county name must be non-empty")]
    EmptyName,
    /// Two records share a county name.
    #[error("duplicate county: {0}")]
    DuplicateCounty(String),
    /// Numeric field must be finite.
    #[error("non-finite numeric value in record for {0}")]
    NonFinite(String),
    /// Ratio field must lie within [0, 1].
    #[error("{field} must be within [0,1] for {county}")]
    RatioOutOfRange { county: String, field: &'static str },
}

/// Validate a single county record.
pub fn validate_record(rec: &CountyRecord) -> Result<(), ValidationError> {
    if rec.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let finite = rec.latitude.is_finite()
        && rec.longitude.is_finite()
        && rec.soil_carbon.is_finite()
        && rec.nitrogen_level.is_finite()
        && rec.food_poverty_index.is_finite()
        && rec.farmer_sentiment.is_finite();
    if !finite {
        return Err(ValidationError::NonFinite(rec.name.clone()));
    }
    if !(0.0..=1.0).contains(&rec.food_poverty_index) {
        return Err(ValidationError::RatioOutOfRange {
            county: rec.name.clone(),
            field: "food_poverty_index",
        });
    }
    if !(0.0..=1.0).contains(&rec.farmer_sentiment) {
        return Err(ValidationError::RatioOutOfRange {
            county: rec.name.clone(),
            field: "farmer_sentiment",
        });
    }
    Ok(())
}

/// Validate the whole dataset, including key/record name agreement.
pub fn validate_dataset(ds: &CountyDataset) -> Result<(), ValidationError> {
    for rec in ds.records() {
        validate_record(rec)?;
    }
    for (key, rec) in &ds.0 {
        if key != &rec.name {
            return Err(ValidationError::DuplicateCounty(key.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str) -> CountyRecord {
        CountyRecord {
            name: name.to_string(),
            latitude: 52.0,
            longitude: -8.0,
            soil_carbon: 2.9,
            nitrogen_level: 66.0,
            food_poverty_index: 0.25,
            farmer_sentiment: 0.6,
            comment: "dairy subsidy soil".to_string(),
        }
    }

    #[test]
    fn serde_roundtrip_record() {
        let r = record("Cork");
        let s = serde_json::to_string(&r).unwrap();
        let back: CountyRecord = serde_json::from_str(&s).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn dataset_rejects_duplicates() {
        let err = CountyDataset::from_records(vec![record("Cork"), record("Cork")]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateCounty("Cork".to_string()));
    }

    #[test]
    fn build_context_unknown_county() {
        let ds = CountyDataset::from_records(vec![record("Cork")]).unwrap();
        let err = build_context("Atlantis", ScenarioFlags::default(), &ds).unwrap_err();
        assert_eq!(err, UnknownCountyError("Atlantis".to_string()));
    }

    #[test]
    fn build_context_known_county() {
        let ds = CountyDataset::from_records(vec![record("Cork"), record("Kerry")]).unwrap();
        let flags = ScenarioFlags {
            export_block: true,
            ..Default::default()
        };
        let ctx = build_context("Kerry", flags, &ds).unwrap();
        assert_eq!(ctx.record.name, "Kerry");
        assert!(ctx.flags.export_block);
        assert!(!ctx.flags.climate_shock);
    }

    #[test]
    fn agent_ids_parse_and_reject() {
        assert_eq!("soil".parse::<AgentId>().unwrap(), AgentId::Soil);
        assert_eq!("VERA".parse::<AgentId>().unwrap(), AgentId::Sentiment);
        assert_eq!("food-security".parse::<AgentId>().unwrap(), AgentId::FoodSecurity);
        let err = "oracle".parse::<AgentId>().unwrap_err();
        assert_eq!(err, UnknownAgentError("oracle".to_string()));
    }

    #[test]
    fn agent_roundtrip_through_as_str() {
        for agent in AgentId::ALL {
            assert_eq!(agent.as_str().parse::<AgentId>().unwrap(), agent);
        }
    }

    #[test]
    fn flag_combinations_are_exhaustive() {
        let combos: Vec<_> = ScenarioFlags::all_combinations().collect();
        assert_eq!(combos.len(), 8);
        assert!(combos.contains(&ScenarioFlags::default()));
        assert!(combos.contains(&ScenarioFlags {
            climate_shock: true,
            export_block: true,
            subsidy_cut: true,
        }));
    }

    #[test]
    fn validation_rejects_bad_ratio() {
        let mut r = record("Cork");
        r.food_poverty_index = 1.2;
        assert!(matches!(
            validate_record(&r),
            Err(ValidationError::RatioOutOfRange { field: "food_poverty_index", .. })
        ));
    }

    #[test]
    fn validation_rejects_nonfinite_fields() {
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let mut r = record("Cork");
            r.soil_carbon = bad;
            assert_eq!(
                validate_record(&r),
                Err(ValidationError::NonFinite("Cork".to_string()))
            );
        }
    }

    proptest! {
        #[test]
        fn records_with_unit_ratios_validate(fpi in 0.0f32..=1.0, sent in 0.0f32..=1.0) {
            let mut r = record("Cork");
            r.food_poverty_index = fpi;
            r.farmer_sentiment = sent;
            prop_assert!(validate_record(&r).is_ok());
        }
    }
}
