use crate::config::SimConfig;
use crate::plant::{Plant, PlantTraits};
use crate::resource::ResourceNode;
use crate::world::{World, WorldInitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preset starting populations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Four plants around one small water source.
    #[default]
    Demo,
    /// Four plants between two large water sources.
    Garden,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Demo, Scenario::Garden];

    pub fn plants(&self, traits: PlantTraits) -> Vec<Plant> {
        [[1.0, 5.0], [3.0, 4.0], [5.0, 1.0], [2.0, 2.0]]
            .into_iter()
            .map(|position| Plant::with_traits(position, traits))
            .collect()
    }

    pub fn resources(&self, refill_rate: f64) -> Vec<ResourceNode> {
        let nodes = match self {
            Scenario::Demo => vec![ResourceNode::water(2.0, 2.0, 20.0)],
            Scenario::Garden => vec![
                ResourceNode::water(4.0, 4.0, 500.0),
                ResourceNode::water(-8.0, -8.0, 500.0),
            ],
        };
        nodes
            .into_iter()
            .map(|node| node.with_refill_rate(refill_rate))
            .collect()
    }

    pub fn build(&self, config: SimConfig) -> Result<World, WorldInitError> {
        let plants = self.plants(config.plant_traits);
        let resources = self.resources(config.source_refill_rate);
        World::try_new(plants, resources, config)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Demo => write!(f, "demo"),
            Scenario::Garden => write!(f, "garden"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scenario '{0}' (expected demo or garden)")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::DEFAULT_REFILL_RATE;

    #[test]
    fn scenarios_build_valid_worlds() {
        for scenario in Scenario::ALL {
            let world = scenario
                .build(SimConfig::default())
                .expect("preset should be valid");
            assert_eq!(world.plant_count(), 4);
        }
    }

    #[test]
    fn garden_has_two_large_sources() {
        let resources = Scenario::Garden.resources(DEFAULT_REFILL_RATE);
        assert_eq!(resources.len(), 2);
        assert!(resources.iter().all(|r| r.current_amount() == 500.0));
    }

    #[test]
    fn build_applies_configured_traits_and_refill() {
        let config = SimConfig {
            plant_traits: PlantTraits {
                uptake_rate: 2.5,
                ..PlantTraits::default()
            },
            source_refill_rate: 7.0,
            ..SimConfig::default()
        };
        let world = Scenario::Demo.build(config).expect("valid scenario");
        assert!(world.plants().all(|(_, p)| p.uptake_rate() == 2.5));
        assert!(world.resources().iter().all(|r| r.refill_rate() == 7.0));
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Garden".parse::<Scenario>(), Ok(Scenario::Garden));
        assert_eq!("demo".parse::<Scenario>(), Ok(Scenario::Demo));
        assert!("desert".parse::<Scenario>().is_err());
    }
}
