//! Water-limited plant dispersal on a continuous plane.
//!
//! Resource nodes refill every tick; plants draw distance-weighted water from
//! every node, then either die (uptake outside their tolerance band) or drop a
//! seedling at a normally distributed offset. [`world::World`] owns both
//! collections and runs the ticks.

pub mod arena;
pub mod config;
pub mod dispersal;
pub mod plant;
pub mod resource;
pub mod scenario;
pub mod spatial;
pub mod world;

pub use arena::PlantId;
pub use config::{RefillPolicy, SimConfig, SimConfigError, StockFloor};
pub use dispersal::DispersalKernel;
pub use plant::{Plant, PlantFate, PlantTraits, ToleranceBand};
pub use resource::{ResourceKind, ResourceNode};
pub use scenario::Scenario;
pub use world::{TickReport, World, WorldError, WorldInitError};
