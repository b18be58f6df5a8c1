//! Spawned litter and wildlife, keyed by item id.

use crate::scene::SceneSink;
use log::debug;
use shared::{Aabb, ItemData, ItemId, ItemKind, Vec3, ARENA_HEIGHT, ARENA_WIDTH, FLOAT_AMPLITUDE};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub position: Vec3,
    pub size: f32,
    /// Decided once at creation. Out-of-bounds items have no renderable.
    pub out_of_bounds: bool,
}

impl Item {
    pub fn footprint(&self) -> Aabb {
        let half = self.kind.half_extent(self.size);
        Aabb::from_center(self.position.x, self.position.y, half, half)
    }

    /// Vertical bob (z) at `time` seconds.
    pub fn float_offset(&self, time: f32) -> f32 {
        if self.out_of_bounds {
            return 0.0;
        }
        (time * 2.0 + self.position.x * 0.5 + self.position.y * 0.3).sin() * FLOAT_AMPLITUDE
    }

    /// Half extent as seen from the top-down camera: the bob reads as a
    /// slight pulse in size, larger when the item rides high.
    pub fn apparent_half_extent(&self, time: f32) -> f32 {
        self.kind.half_extent(self.size) * (1.0 + self.float_offset(time))
    }
}

#[derive(Debug, Clone)]
pub struct ItemLifecycleManager {
    items: HashMap<ItemId, Item>,
    half_width: f32,
    half_height: f32,
}

impl ItemLifecycleManager {
    pub fn new(arena_width: f32, arena_height: f32) -> Self {
        Self {
            items: HashMap::new(),
            half_width: arena_width / 2.0,
            half_height: arena_height / 2.0,
        }
    }

    /// Creates every item not already known. Known items are left alone.
    pub fn apply_bulk_snapshot(
        &mut self,
        snapshot: HashMap<ItemId, ItemData>,
        scene: &mut dyn SceneSink,
    ) {
        for (id, data) in snapshot {
            self.insert_if_absent(id, data, scene);
        }
    }

    /// Returns false when the id was already present.
    pub fn apply_spawn(&mut self, id: ItemId, data: ItemData, scene: &mut dyn SceneSink) -> bool {
        let created = self.insert_if_absent(id, data, scene);
        if !created {
            debug!("Ignoring duplicate spawn");
        }
        created
    }

    pub fn apply_destroy(&mut self, id: &str, scene: &mut dyn SceneSink) -> Option<Item> {
        let removed = self.remove(id, scene);
        if removed.is_none() {
            debug!("Destroy for unknown item {}", id);
        }
        removed
    }

    pub fn remove_on_collision(&mut self, id: &str, scene: &mut dyn SceneSink) -> Option<Item> {
        self.remove(id, scene)
    }

    /// Releases every renderable and forgets every item.
    pub fn clear(&mut self, scene: &mut dyn SceneSink) {
        for (id, item) in self.items.drain() {
            if !item.out_of_bounds {
                scene.remove_item(&id);
            }
        }
    }

    /// Ids of in-bounds items overlapping `footprint`, sorted for a stable
    /// resolution order.
    pub fn overlapping(&self, footprint: &Aabb) -> Vec<ItemId> {
        let mut hits: Vec<ItemId> = self
            .items
            .values()
            .filter(|item| !item.out_of_bounds && item.footprint().intersects(footprint))
            .map(|item| item.id.clone())
            .collect();
        hits.sort();
        hits
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items that currently own a renderable.
    pub fn visible(&self) -> impl Iterator<Item = &Item> {
        self.items.values().filter(|item| !item.out_of_bounds)
    }

    fn insert_if_absent(&mut self, id: ItemId, data: ItemData, scene: &mut dyn SceneSink) -> bool {
        if self.items.contains_key(&id) {
            return false;
        }

        let mut item = Item {
            id: id.clone(),
            kind: data.kind,
            position: data.position,
            size: data.size,
            out_of_bounds: false,
        };
        item.out_of_bounds = item
            .footprint()
            .lies_outside(self.half_width, self.half_height);

        if item.out_of_bounds {
            debug!("Item {} spawned out of bounds", id);
        } else {
            scene.add_item(&item);
        }
        self.items.insert(id, item);
        true
    }

    fn remove(&mut self, id: &str, scene: &mut dyn SceneSink) -> Option<Item> {
        let item = self.items.remove(id)?;
        if !item.out_of_bounds {
            scene.remove_item(id);
        }
        Some(item)
    }
}

impl Default for ItemLifecycleManager {
    fn default() -> Self {
        Self::new(ARENA_WIDTH, ARENA_HEIGHT)
    }
}
