use super::World;
use crate::resource::ResourceKind;
use crate::spatial;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub population: usize,
    pub births: usize,
    pub deaths: usize,
    pub suppressed_births: usize,
    pub total_uptake: f64,
    pub mean_uptake: f64,
    pub resource_total: f64,
    pub min_resource_amount: f64,
    pub centroid: Option<[f64; 2]>,
    pub mean_neighbor_count: f64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub final_population: usize,
    pub samples: Vec<StepMetrics>,
    #[serde(default)]
    pub total_births: usize,
    #[serde(default)]
    pub total_deaths: usize,
    /// First step that ended with no plants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extinct_at: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct PopulationStats {
    pub tick: usize,
    pub population: usize,
    pub total_births: usize,
    pub total_deaths: usize,
    pub total_suppressed_births: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SourceSnapshot {
    pub kind: ResourceKind,
    pub position: [f64; 2],
    pub amount: f64,
}

/// Serializable view of the live state, the JSON counterpart of the text summary.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorldSnapshot {
    pub tick: usize,
    pub plants: Vec<[f64; 2]>,
    pub sources: Vec<SourceSnapshot>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    #[error("sample_every must be positive")]
    InvalidSampleEvery,
    #[error("steps ({actual}) exceed supported maximum ({max})")]
    TooManySteps { max: usize, actual: usize },
    #[error("sample count ({actual}) exceeds supported maximum ({max})")]
    TooManySamples { max: usize, actual: usize },
}

impl World {
    pub const MAX_EXPERIMENT_STEPS: usize = 1_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 50_000;

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            plants: self.plant_positions().collect(),
            sources: self
                .resources
                .iter()
                .map(|node| SourceSnapshot {
                    kind: node.kind(),
                    position: node.position(),
                    amount: node.current_amount(),
                })
                .collect(),
        }
    }

    fn centroid(&self) -> Option<[f64; 2]> {
        if self.plants.is_empty() {
            return None;
        }
        let n = self.plants.len() as f64;
        let sum = self
            .plant_positions()
            .fold([0.0, 0.0], |acc, p| [acc[0] + p[0], acc[1] + p[1]]);
        Some([sum[0] / n, sum[1] / n])
    }

    /// Mean number of other plants within `neighbor_radius` of each plant.
    pub fn mean_neighbor_count(&self) -> f64 {
        if self.plants.is_empty() {
            return 0.0;
        }
        let tree = spatial::build_index(&self.plants);
        let radius = self.config.neighbor_radius;
        let located: Vec<_> = self
            .plants
            .iter()
            .map(|(id, plant)| (id, plant.position))
            .collect();
        let total: usize = located
            .par_iter()
            .map(|&(id, position)| spatial::count_neighbors(&tree, position, radius, id))
            .sum();
        total as f64 / located.len() as f64
    }

    pub(crate) fn collect_step_metrics(&self, step: usize) -> StepMetrics {
        let report = &self.last_report;
        let resource_total = self.resources.iter().map(|r| r.current_amount()).sum();
        let min_resource_amount = self
            .resources
            .iter()
            .map(|r| r.current_amount())
            .reduce(f64::min)
            .unwrap_or(0.0);
        StepMetrics {
            step,
            population: self.plants.len(),
            births: report.births,
            deaths: report.deaths,
            suppressed_births: report.suppressed_births,
            total_uptake: report.total_uptake,
            mean_uptake: if report.visited > 0 {
                report.total_uptake / report.visited as f64
            } else {
                0.0
            },
            resource_total,
            min_resource_amount,
            centroid: self.centroid(),
            mean_neighbor_count: self.mean_neighbor_count(),
        }
    }

    pub fn run_experiment(&mut self, steps: usize, sample_every: usize) -> RunSummary {
        self.try_run_experiment(steps, sample_every)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let births_before = self.total_births;
        let deaths_before = self.total_deaths;
        let mut samples = Vec::with_capacity(estimated_samples);
        let mut extinct_at = None;
        for step in 1..=steps {
            self.step();
            if extinct_at.is_none() && self.plants.is_empty() {
                extinct_at = Some(step);
            }
            if step % sample_every == 0 || step == steps {
                samples.push(self.collect_step_metrics(step));
            }
        }
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            final_population: self.plants.len(),
            samples,
            total_births: self.total_births - births_before,
            total_deaths: self.total_deaths - deaths_before,
            extinct_at,
        })
    }
}
