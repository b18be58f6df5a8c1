//! Per-frame overlap tests for the local vessel and the score they drive.

use crate::identity::PlayerIdentity;
use crate::items::ItemLifecycleManager;
use crate::scene::{Effect, SceneSink};
use log::info;
use shared::{Aabb, ItemId, ItemKind, OutgoingMessage, ARENA_HEIGHT, ARENA_WIDTH, SHORE_MARGIN};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreState {
    value: i32,
}

impl ScoreState {
    pub fn value(&self) -> i32 {
        self.value
    }

    fn apply(&mut self, delta: i32) {
        self.value += delta;
    }
}

/// Water where the hull scrapes: anything not fully inside the safe zone.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardZone {
    safe: Aabb,
}

impl HazardZone {
    pub fn new(safe: Aabb) -> Self {
        Self { safe }
    }

    /// The arena shrunk by the shore band.
    pub fn shoreline() -> Self {
        Self::new(
            Aabb::from_center(0.0, 0.0, ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0)
                .shrink(SHORE_MARGIN),
        )
    }

    pub fn overlaps(&self, footprint: &Aabb) -> bool {
        !self.safe.contains(footprint)
    }
}

impl Default for HazardZone {
    fn default() -> Self {
        Self::shoreline()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub item_id: ItemId,
    pub kind: ItemKind,
    pub score: i32,
}

#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    score: ScoreState,
    hazard: HazardZone,
}

impl CollisionResolver {
    pub fn new(hazard: HazardZone) -> Self {
        Self {
            score: ScoreState::default(),
            hazard,
        }
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    /// Runs after movement has been committed for the frame. Every hit item
    /// is removed before this returns, so it can never be scored twice.
    pub fn resolve(
        &mut self,
        footprint: &Aabb,
        items: &mut ItemLifecycleManager,
        identity: &PlayerIdentity,
        outbox: &mut Vec<OutgoingMessage>,
        scene: &mut dyn SceneSink,
    ) -> Vec<CollisionEvent> {
        if self.hazard.overlaps(footprint) {
            scene.spawn_effect(Effect::Splash {
                x: (footprint.min_x + footprint.max_x) / 2.0,
                y: (footprint.min_y + footprint.max_y) / 2.0,
            });
        }

        let mut events = Vec::new();
        for item_id in items.overlapping(footprint) {
            let Some(item) = items.remove_on_collision(&item_id, scene) else {
                continue;
            };

            outbox.push(OutgoingMessage::ItemCollision {
                item_id: item_id.clone(),
                score: self.score.value(),
                player_id: identity.player_id.clone(),
                player_name: identity.player_name.clone(),
            });
            self.score.apply(item.kind.score_delta());

            info!(
                "Collected {:?} {} (score {})",
                item.kind,
                item_id,
                self.score.value()
            );
            events.push(CollisionEvent {
                item_id,
                kind: item.kind,
                score: self.score.value(),
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRecorder;
    use shared::{hull_footprint, ItemData, Vec3};

    fn identity() -> PlayerIdentity {
        PlayerIdentity {
            player_id: "me".to_string(),
            player_name: "Skipper".to_string(),
        }
    }

    fn spawn(items: &mut ItemLifecycleManager, scene: &mut SceneRecorder, id: &str, kind: ItemKind, x: f32) {
        items.apply_spawn(
            id.to_string(),
            ItemData {
                kind,
                position: Vec3::new(x, 0.0, 0.0),
                size: 1.0,
            },
            scene,
        );
    }

    #[test]
    fn test_litter_scores_and_wildlife_costs() {
        let mut resolver = CollisionResolver::default();
        let mut items = ItemLifecycleManager::default();
        let mut scene = SceneRecorder::new();
        let mut outbox = Vec::new();
        spawn(&mut items, &mut scene, "bottle", ItemKind::Litter, 0.0);
        spawn(&mut items, &mut scene, "turtle", ItemKind::Wildlife, 0.5);

        let events = resolver.resolve(&hull_footprint(0.0, 0.0, 0.0), &mut items, &identity(), &mut outbox, &mut scene);

        assert_eq!(events.len(), 2);
        assert_eq!(resolver.score().value(), 0);
        assert!(items.is_empty());
        assert!(scene.items.is_empty());
        assert_eq!(outbox.len(), 2);
    }

    #[test]
    fn test_collision_reports_score_before_delta() {
        let mut resolver = CollisionResolver::default();
        let mut items = ItemLifecycleManager::default();
        let mut scene = SceneRecorder::new();
        let mut outbox = Vec::new();
        spawn(&mut items, &mut scene, "i1", ItemKind::Litter, 0.0);

        resolver.resolve(&hull_footprint(0.0, 0.0, 0.0), &mut items, &identity(), &mut outbox, &mut scene);

        assert_eq!(
            outbox,
            vec![OutgoingMessage::ItemCollision {
                item_id: "i1".to_string(),
                score: 0,
                player_id: "me".to_string(),
                player_name: "Skipper".to_string(),
            }]
        );
        assert_eq!(resolver.score().value(), 1);
    }

    #[test]
    fn test_collision_happens_exactly_once() {
        let mut resolver = CollisionResolver::default();
        let mut items = ItemLifecycleManager::default();
        let mut scene = SceneRecorder::new();
        let mut outbox = Vec::new();
        spawn(&mut items, &mut scene, "i1", ItemKind::Litter, 0.0);

        let footprint = hull_footprint(0.0, 0.0, 0.0);
        for _ in 0..10 {
            resolver.resolve(&footprint, &mut items, &identity(), &mut outbox, &mut scene);
        }

        assert_eq!(outbox.len(), 1);
        assert_eq!(resolver.score().value(), 1);
    }

    #[test]
    fn test_out_of_bounds_items_are_ignored() {
        let mut resolver = CollisionResolver::new(HazardZone::new(Aabb::from_center(0.0, 0.0, 100.0, 100.0)));
        let mut items = ItemLifecycleManager::new(10.0, 10.0);
        let mut scene = SceneRecorder::new();
        let mut outbox = Vec::new();
        spawn(&mut items, &mut scene, "far", ItemKind::Litter, 20.0);

        let events = resolver.resolve(&hull_footprint(20.0, 0.0, 0.0), &mut items, &identity(), &mut outbox, &mut scene);

        assert!(events.is_empty());
        assert!(items.contains("far"));
        assert_eq!(resolver.score().value(), 0);
    }

    #[test]
    fn test_shoreline_splashes_without_scoring() {
        let mut resolver = CollisionResolver::default();
        let mut items = ItemLifecycleManager::default();
        let mut scene = SceneRecorder::new();
        let mut outbox = Vec::new();

        resolver.resolve(&hull_footprint(44.0, 0.0, 0.0), &mut items, &identity(), &mut outbox, &mut scene);
        assert!(matches!(scene.effects.as_slice(), [Effect::Splash { .. }]));
        assert!(outbox.is_empty());

        scene.effects.clear();
        resolver.resolve(&hull_footprint(0.0, 0.0, 0.0), &mut items, &identity(), &mut outbox, &mut scene);
        assert!(scene.effects.is_empty());
        assert_eq!(resolver.score().value(), 0);
    }
}
