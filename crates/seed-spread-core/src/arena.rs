use crate::plant::Plant;
use slotmap::{new_key_type, SlotMap};
use std::collections::HashSet;

new_key_type! {
    /// Stable handle for a plant; stale once the plant is removed.
    pub struct PlantId;
}

/// Plant storage with generational handles and a stable visitation order.
#[derive(Debug, Default)]
pub struct PlantArena {
    slots: SlotMap<PlantId, Plant>,
    order: Vec<PlantId>,
}

impl PlantArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            order: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: PlantId) -> Option<&Plant> {
        self.slots.get(id)
    }

    /// Handles in visitation order.
    pub fn handles(&self) -> &[PlantId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlantId, &Plant)> + '_ {
        self.order.iter().map(move |&id| (id, &self.slots[id]))
    }

    /// Append a plant to the end of the visitation order.
    pub fn insert(&mut self, plant: Plant) -> PlantId {
        let id = self.slots.insert(plant);
        self.order.push(id);
        id
    }

    pub fn remove(&mut self, id: PlantId) -> Option<Plant> {
        let plant = self.slots.remove(id)?;
        if let Some(index) = self.order.iter().position(|&h| h == id) {
            self.order.remove(index);
        }
        Some(plant)
    }

    /// Remove every plant in `dead`, keeping survivors in their relative order.
    pub fn remove_many(&mut self, dead: &HashSet<PlantId>) -> usize {
        if dead.is_empty() {
            return 0;
        }
        let before = self.order.len();
        let slots = &mut self.slots;
        self.order.retain(|id| {
            if dead.contains(id) {
                slots.remove(*id);
                false
            } else {
                true
            }
        });
        before - self.order.len()
    }
}
