use crate::arena::{PlantArena, PlantId};
use rstar::{PointDistance, RTree, RTreeObject, AABB};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantLocation {
    pub id: PlantId,
    pub position: [f64; 2],
}

impl RTreeObject for PlantLocation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for PlantLocation {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Build an R*-tree over live plants via bulk_load (O(n log n)).
pub fn build_index(plants: &PlantArena) -> RTree<PlantLocation> {
    let locations = plants
        .iter()
        .map(|(id, plant)| PlantLocation {
            id,
            position: plant.position,
        })
        .collect();
    RTree::bulk_load(locations)
}

/// Plants within `radius` of `center` (inclusive), in no particular order.
pub fn query_neighbors(tree: &RTree<PlantLocation>, center: [f64; 2], radius: f64) -> Vec<PlantId> {
    tree.locate_within_distance(center, radius * radius)
        .map(|loc| loc.id)
        .collect()
}

/// Neighbors of `center` within `radius`, not counting `exclude`.
pub fn count_neighbors(
    tree: &RTree<PlantLocation>,
    center: [f64; 2],
    radius: f64,
    exclude: PlantId,
) -> usize {
    tree.locate_within_distance(center, radius * radius)
        .filter(|loc| loc.id != exclude)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plant::Plant;

    #[test]
    fn query_returns_plants_inside_radius() {
        let mut arena = PlantArena::new();
        let near = arena.insert(Plant::new(1.0, 0.0));
        let edge = arena.insert(Plant::new(0.0, 2.0));
        let far = arena.insert(Plant::new(5.0, 5.0));
        let tree = build_index(&arena);

        let mut found = query_neighbors(&tree, [0.0, 0.0], 2.0);
        found.sort();
        let mut expected = vec![near, edge];
        expected.sort();
        assert_eq!(found, expected);
        assert!(!found.contains(&far));
    }

    #[test]
    fn count_excludes_the_querying_plant() {
        let mut arena = PlantArena::new();
        let a = arena.insert(Plant::new(0.0, 0.0));
        arena.insert(Plant::new(0.5, 0.0));
        arena.insert(Plant::new(0.0, 0.5));
        let tree = build_index(&arena);
        assert_eq!(count_neighbors(&tree, [0.0, 0.0], 1.0, a), 2);
    }

    #[test]
    fn empty_arena_has_no_neighbors() {
        let tree = build_index(&PlantArena::new());
        assert!(query_neighbors(&tree, [0.0, 0.0], 10.0).is_empty());
    }
}
