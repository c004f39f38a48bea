use super::{World, WorldError};
use crate::arena::PlantId;
use crate::plant::{Plant, PlantFate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What happened during one tick.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: usize,
    /// Plants visited in the plant phase.
    pub visited: usize,
    pub births: usize,
    pub deaths: usize,
    pub suppressed_births: usize,
    pub total_uptake: f64,
}

impl World {
    /// Births still allowed this tick given the population cap.
    fn birth_allowance(&self) -> usize {
        match self.config.max_population {
            Some(cap) => cap.saturating_sub(self.plants.len()),
            None => usize::MAX,
        }
    }

    fn step_resource_phase(&mut self) {
        for node in &mut self.resources {
            node.step();
        }
    }

    /// Resolve one plant against the current stock without touching the plant set.
    fn resolve_plant(&mut self, id: PlantId) -> Result<PlantFate, WorldError> {
        let plant = self.plants.get(id).ok_or(WorldError::UnknownPlant(id))?;
        Ok(plant.decide(&mut self.resources, &mut self.rng))
    }

    /// Visit every plant alive at the start of the phase.
    ///
    /// Deaths and births are applied after the pass: newborns are not visited
    /// this tick and survivors keep their relative order.
    fn step_plant_phase(&mut self, report: &mut TickReport) {
        let snapshot: Vec<PlantId> = self.plants.handles().to_vec();
        let mut dead = HashSet::new();
        let mut newborns: Vec<Plant> = Vec::new();

        for id in snapshot {
            // Handles come from the arena itself and nothing removes them mid-pass.
            let Some(plant) = self.plants.get(id) else {
                debug_assert!(false, "snapshot handle {id:?} missing from arena");
                continue;
            };
            let fate = plant.decide(&mut self.resources, &mut self.rng);
            report.visited += 1;
            report.total_uptake += fate.uptake();
            match fate {
                PlantFate::Dies { uptake } => {
                    tracing::trace!(?id, uptake, "plant died");
                    dead.insert(id);
                }
                PlantFate::Reproduces { offspring, .. } => newborns.push(offspring),
            }
        }

        report.deaths = self.plants.remove_many(&dead);

        let allowance = self.birth_allowance();
        let admitted = newborns.len().min(allowance);
        report.suppressed_births = newborns.len() - admitted;
        for child in newborns.into_iter().take(admitted) {
            self.plants.insert(child);
        }
        report.births = admitted;

        if report.suppressed_births > 0 {
            tracing::warn!(
                tick = report.tick,
                suppressed = report.suppressed_births,
                cap = ?self.config.max_population,
                "population cap reached, births dropped"
            );
        }
    }

    /// Advance one tick: refill every resource node, then let every plant act.
    pub fn step(&mut self) -> TickReport {
        self.tick = self.tick.saturating_add(1);
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        self.step_resource_phase();
        self.step_plant_phase(&mut report);

        self.total_births += report.births;
        self.total_deaths += report.deaths;
        self.total_suppressed_births += report.suppressed_births;

        tracing::debug!(
            tick = report.tick,
            population = self.plants.len(),
            births = report.births,
            deaths = report.deaths,
            uptake = report.total_uptake,
            "tick complete"
        );
        self.last_report = report.clone();
        report
    }

    /// Let a single plant act against the current stock and apply its fate now.
    ///
    /// No refill happens. A death removes the plant immediately and a birth is
    /// appended immediately. Fails if `id` is not a live plant of this world.
    pub fn step_plant(&mut self, id: PlantId) -> Result<PlantFate, WorldError> {
        let fate = self.resolve_plant(id)?;
        match &fate {
            PlantFate::Dies { .. } => {
                self.plants.remove(id);
                self.total_deaths += 1;
            }
            PlantFate::Reproduces { offspring, .. } => {
                if self.birth_allowance() > 0 {
                    self.plants.insert(offspring.clone());
                    self.total_births += 1;
                } else {
                    self.total_suppressed_births += 1;
                }
            }
        }
        Ok(fate)
    }
}
