use crate::plant::PlantTraits;
use crate::resource::DEFAULT_REFILL_RATE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a resource node refills at the start of every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefillPolicy {
    /// `amount = min(amount + refill_rate, max_amount)`.
    #[default]
    Clamped,
    /// `amount = amount + refill_rate`, no ceiling.
    Unclamped,
}

/// Lower bound applied when a resource node is emptied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockFloor {
    /// Stock may go negative.
    #[default]
    Unbounded,
    /// Stock never drops below zero.
    Zero,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub refill_policy: RefillPolicy,
    pub stock_floor: StockFloor,
    /// Births that would grow the population past this are dropped.
    /// `None` keeps reproduction unconditional.
    pub max_population: Option<usize>,
    /// Radius used by the neighbor-count metric.
    pub neighbor_radius: f64,
    /// Traits given to plants created by a [`crate::scenario::Scenario`].
    pub plant_traits: PlantTraits,
    /// Refill rate given to resource nodes created by a scenario.
    pub source_refill_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            refill_policy: RefillPolicy::Clamped,
            stock_floor: StockFloor::Unbounded,
            max_population: None,
            neighbor_radius: 2.0,
            plant_traits: PlantTraits::default(),
            source_refill_rate: DEFAULT_REFILL_RATE,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimConfigError {
    #[error("neighbor_radius must be positive and finite")]
    InvalidNeighborRadius,
    #[error("source_refill_rate must be non-negative and finite")]
    InvalidSourceRefillRate,
    #[error("max_population must be positive when set")]
    ZeroPopulationCap,
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

// serde_json::Error is not Clone/PartialEq, so compare on the rendered message.
impl PartialEq for SimConfigError {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimConfigError> {
        if !(self.neighbor_radius.is_finite() && self.neighbor_radius > 0.0) {
            return Err(SimConfigError::InvalidNeighborRadius);
        }
        if !(self.source_refill_rate.is_finite() && self.source_refill_rate >= 0.0) {
            return Err(SimConfigError::InvalidSourceRefillRate);
        }
        if self.max_population == Some(0) {
            return Err(SimConfigError::ZeroPopulationCap);
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, SimConfigError> {
        let config: SimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = SimConfig::from_json(r#"{"seed": 7, "refill_policy": "unclamped"}"#)
            .expect("config should parse");
        assert_eq!(config.seed, 7);
        assert_eq!(config.refill_policy, RefillPolicy::Unclamped);
        assert_eq!(config.stock_floor, StockFloor::Unbounded);
        assert_eq!(config.max_population, None);
    }

    #[test]
    fn rejects_zero_population_cap() {
        let config = SimConfig {
            max_population: Some(0),
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(SimConfigError::ZeroPopulationCap));
    }

    #[test]
    fn rejects_non_positive_neighbor_radius() {
        let err = SimConfig::from_json(r#"{"neighbor_radius": -1.0}"#).unwrap_err();
        assert_eq!(err, SimConfigError::InvalidNeighborRadius);
    }

    #[test]
    fn nested_plant_traits_parse_partially() {
        let config = SimConfig::from_json(
            r#"{"plant_traits": {"uptake_rate": 4.0, "tolerance": {"low": 1.0, "high": 8.0}}}"#,
        )
        .expect("config should parse");
        assert_eq!(config.plant_traits.uptake_rate, 4.0);
        assert_eq!(config.plant_traits.tolerance.high, 8.0);
        assert_eq!(
            config.plant_traits.dispersal,
            PlantTraits::default().dispersal
        );
    }

    #[test]
    fn partial_band_and_kernel_keep_remaining_defaults() {
        let config = SimConfig::from_json(
            r#"{"plant_traits": {"tolerance": {"low": 1.0}, "dispersal": {"std_dev": [2.0, 2.0]}}}"#,
        )
        .expect("config should parse");
        let traits = config.plant_traits;
        assert_eq!(traits.tolerance.low, 1.0);
        assert_eq!(traits.tolerance.high, 30.0);
        assert_eq!(traits.dispersal.mean, [0.0, 0.0]);
        assert_eq!(traits.dispersal.std_dev, [2.0, 2.0]);
    }

    #[test]
    fn rejects_negative_source_refill_rate() {
        let config = SimConfig {
            source_refill_rate: -1.0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimConfigError::InvalidSourceRefillRate)
        );
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = SimConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SimConfigError::Parse(_)));
    }
}
