pub mod lifecycle;
pub mod metrics;

pub use lifecycle::TickReport;
pub use metrics::*;

use crate::arena::{PlantArena, PlantId};
use crate::config::{SimConfig, SimConfigError};
use crate::plant::Plant;
use crate::resource::ResourceNode;
use crate::spatial;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::fmt;
use thiserror::Error;

/// Owns the live plants and resource nodes and drives ticks.
pub struct World {
    pub(crate) plants: PlantArena,
    pub(crate) resources: Vec<ResourceNode>,
    pub(crate) config: SimConfig,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) tick: usize,
    pub(crate) total_births: usize,
    pub(crate) total_deaths: usize,
    pub(crate) total_suppressed_births: usize,
    pub(crate) last_report: TickReport,
}

#[derive(Debug, Error, PartialEq)]
pub enum WorldInitError {
    #[error(transparent)]
    Config(#[from] SimConfigError),
    #[error("plant {index}: {reason}")]
    InvalidPlant { index: usize, reason: &'static str },
    #[error("resource node {index}: {reason}")]
    InvalidSource { index: usize, reason: &'static str },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WorldError {
    #[error("plant {0:?} is not owned by this world")]
    UnknownPlant(PlantId),
}

impl World {
    pub fn new(plants: Vec<Plant>, resources: Vec<ResourceNode>, config: SimConfig) -> Self {
        Self::try_new(plants, resources, config).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(
        plants: Vec<Plant>,
        mut resources: Vec<ResourceNode>,
        config: SimConfig,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        for (index, plant) in plants.iter().enumerate() {
            if let Some(reason) = plant.invalid_reason() {
                return Err(WorldInitError::InvalidPlant { index, reason });
            }
        }
        for (index, node) in resources.iter_mut().enumerate() {
            if let Some(reason) = node.invalid_reason() {
                return Err(WorldInitError::InvalidSource { index, reason });
            }
            node.inherit_policies(config.refill_policy, config.stock_floor);
        }

        let mut arena = PlantArena::with_capacity(plants.len());
        for plant in plants {
            arena.insert(plant);
        }

        tracing::debug!(
            plants = arena.len(),
            resources = resources.len(),
            seed = config.seed,
            "world initialized"
        );

        Ok(Self {
            plants: arena,
            resources,
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            config,
            tick: 0,
            total_births: 0,
            total_deaths: 0,
            total_suppressed_births: 0,
            last_report: TickReport::default(),
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn tick(&self) -> usize {
        self.tick
    }

    pub fn add_plant(&mut self, plant: Plant) -> PlantId {
        self.try_add_plant(plant).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Append a plant to the end of the visitation order.
    pub fn try_add_plant(&mut self, plant: Plant) -> Result<PlantId, WorldInitError> {
        if let Some(reason) = plant.invalid_reason() {
            return Err(WorldInitError::InvalidPlant {
                index: self.plants.len(),
                reason,
            });
        }
        Ok(self.plants.insert(plant))
    }

    /// Live plants in visitation order.
    pub fn plants(&self) -> impl Iterator<Item = (PlantId, &Plant)> + '_ {
        self.plants.iter()
    }

    pub fn plant(&self, id: PlantId) -> Option<&Plant> {
        self.plants.get(id)
    }

    pub fn plant_ids(&self) -> &[PlantId] {
        self.plants.handles()
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn resources(&self) -> &[ResourceNode] {
        &self.resources
    }

    pub fn plant_positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.plants.iter().map(|(_, plant)| plant.position)
    }

    pub fn resource_positions(&self) -> impl Iterator<Item = [f64; 2]> + '_ {
        self.resources.iter().map(ResourceNode::position)
    }

    /// Plants within `radius` of `center`, in visitation order.
    pub fn plants_within(&self, center: [f64; 2], radius: f64) -> Vec<PlantId> {
        let tree = spatial::build_index(&self.plants);
        let found: std::collections::HashSet<PlantId> =
            spatial::query_neighbors(&tree, center, radius).into_iter().collect();
        self.plants
            .handles()
            .iter()
            .copied()
            .filter(|id| found.contains(id))
            .collect()
    }

    pub fn population_stats(&self) -> PopulationStats {
        PopulationStats {
            tick: self.tick,
            population: self.plants.len(),
            total_births: self.total_births,
            total_deaths: self.total_deaths,
            total_suppressed_births: self.total_suppressed_births,
        }
    }

    pub fn last_report(&self) -> &TickReport {
        &self.last_report
    }
}

impl fmt::Display for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Species alive")?;
        writeln!(f, "-----------")?;
        for (_, plant) in self.plants.iter() {
            writeln!(f, "{plant}")?;
        }
        writeln!(f)?;
        writeln!(f, "Sources present")?;
        writeln!(f, "-----------")?;
        for node in &self.resources {
            writeln!(f, "{node}")?;
        }
        Ok(())
    }
}
