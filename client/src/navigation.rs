//! Static description of where the local vessel may sail.

use shared::{Aabb, ARENA_HEIGHT, ARENA_WIDTH};

/// Union of rectangular water regions. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationMask {
    regions: Vec<Aabb>,
}

impl NavigationMask {
    pub fn new(regions: Vec<Aabb>) -> Self {
        Self { regions }
    }

    /// The full water plane centred on the origin.
    pub fn arena() -> Self {
        Self::new(vec![Aabb::from_center(
            0.0,
            0.0,
            ARENA_WIDTH / 2.0,
            ARENA_HEIGHT / 2.0,
        )])
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.regions.iter().any(|region| region.contains_point(x, y))
    }

    pub fn regions(&self) -> &[Aabb] {
        &self.regions
    }
}

impl Default for NavigationMask {
    fn default() -> Self {
        Self::arena()
    }
}
