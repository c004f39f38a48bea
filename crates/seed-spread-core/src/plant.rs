use crate::dispersal::DispersalKernel;
use crate::resource::ResourceNode;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed interval of per-tick uptake a plant survives.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToleranceBand {
    pub low: f64,
    pub high: f64,
}

impl Default for ToleranceBand {
    fn default() -> Self {
        Self::new(3.0, 30.0)
    }
}

impl ToleranceBand {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, uptake: f64) -> bool {
        uptake >= self.low && uptake <= self.high
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlantTraits {
    /// Most water a plant draws from one source in one tick.
    pub uptake_rate: f64,
    pub tolerance: ToleranceBand,
    /// Not consulted: a surviving plant always reproduces.
    pub reproduce_rate: f64,
    pub dispersal: DispersalKernel,
}

impl Default for PlantTraits {
    fn default() -> Self {
        Self {
            uptake_rate: 10.0,
            tolerance: ToleranceBand::default(),
            reproduce_rate: 1.0,
            dispersal: DispersalKernel::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Plant {
    pub position: [f64; 2],
    pub traits: PlantTraits,
}

/// Outcome of one plant's turn.
#[derive(Clone, Debug, PartialEq)]
pub enum PlantFate {
    Dies { uptake: f64 },
    Reproduces { uptake: f64, offspring: Plant },
}

impl PlantFate {
    pub fn uptake(&self) -> f64 {
        match self {
            PlantFate::Dies { uptake } | PlantFate::Reproduces { uptake, .. } => *uptake,
        }
    }

    pub fn is_death(&self) -> bool {
        matches!(self, PlantFate::Dies { .. })
    }
}

impl Plant {
    pub fn new(x: f64, y: f64) -> Self {
        Self::with_traits([x, y], PlantTraits::default())
    }

    pub fn with_traits(position: [f64; 2], traits: PlantTraits) -> Self {
        Self { position, traits }
    }

    pub fn uptake_rate(&self) -> f64 {
        self.traits.uptake_rate
    }

    pub fn distance_to(&self, point: [f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        (dx * dx + dy * dy).sqrt()
    }

    /// Draw water from `source` and return the amount drawn.
    ///
    /// Bounded by `uptake_rate` and by the distance-weighted stock before the call.
    /// A source at or below zero yields a non-positive draw.
    pub fn take(&self, source: &mut ResourceNode) -> f64 {
        let distance = self.distance_to(source.position());
        let uptake = self
            .uptake_rate()
            .min(source.uptake_factor(distance) * source.current_amount());
        source.empty(uptake);
        uptake
    }

    /// Sum of [`Plant::take`] over `sources`, in slice order.
    pub fn total_uptake(&self, sources: &mut [ResourceNode]) -> f64 {
        sources.iter_mut().map(|source| self.take(source)).sum()
    }

    pub fn survives(&self, uptake: f64) -> bool {
        self.traits.tolerance.contains(uptake)
    }

    /// New plant displaced from this one by a dispersal draw.
    pub fn offspring<R: Rng + ?Sized>(&self, rng: &mut R) -> Plant {
        let [dx, dy] = self.traits.dispersal.sample(rng);
        Plant {
            position: [self.position[0] + dx, self.position[1] + dy],
            traits: self.traits,
        }
    }

    /// Take from every source, then die or reproduce.
    pub fn decide<R: Rng + ?Sized>(&self, sources: &mut [ResourceNode], rng: &mut R) -> PlantFate {
        let uptake = self.total_uptake(sources);
        if self.survives(uptake) {
            PlantFate::Reproduces {
                uptake,
                offspring: self.offspring(rng),
            }
        } else {
            PlantFate::Dies { uptake }
        }
    }

    pub(crate) fn invalid_reason(&self) -> Option<&'static str> {
        let t = &self.traits;
        if !(self.position[0].is_finite() && self.position[1].is_finite()) {
            return Some("position must be finite");
        }
        if !(t.uptake_rate.is_finite() && t.uptake_rate >= 0.0) {
            return Some("uptake_rate must be non-negative and finite");
        }
        if !(t.tolerance.low.is_finite() && t.tolerance.high.is_finite()) {
            return Some("tolerance bounds must be finite");
        }
        if t.tolerance.low > t.tolerance.high {
            return Some("tolerance low must not exceed high");
        }
        if !t.dispersal.is_valid() {
            return Some("dispersal parameters must be finite with non-negative spread");
        }
        None
    }
}

impl fmt::Display for Plant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plant ({},{})", self.position[0], self.position[1])
    }
}
