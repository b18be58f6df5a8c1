//! Seam between the simulation and whatever draws it.
//!
//! The simulation requests and releases renderables through [`SceneSink`];
//! it never reads anything back. The macroquad renderer is the production
//! sink, [`SceneRecorder`] keeps the same bookkeeping without drawing.

use crate::items::Item;
use std::collections::HashSet;

/// Short-lived visual effects. The sink owns their lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Wake { x: f32, y: f32 },
    Splash { x: f32, y: f32 },
}

pub trait SceneSink {
    fn add_item(&mut self, item: &Item);
    fn remove_item(&mut self, item_id: &str);
    fn add_avatar(&mut self, player_id: &str);
    fn remove_avatar(&mut self, player_id: &str);
    fn spawn_effect(&mut self, effect: Effect);
}

#[derive(Debug, Default)]
pub struct SceneRecorder {
    pub items: HashSet<String>,
    pub avatars: HashSet<String>,
    pub item_requests: usize,
    pub avatar_requests: usize,
    pub effects: Vec<Effect>,
}

impl SceneRecorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SceneSink for SceneRecorder {
    fn add_item(&mut self, item: &Item) {
        self.item_requests += 1;
        self.items.insert(item.id.clone());
    }

    fn remove_item(&mut self, item_id: &str) {
        self.items.remove(item_id);
    }

    fn add_avatar(&mut self, player_id: &str) {
        self.avatar_requests += 1;
        self.avatars.insert(player_id.to_string());
    }

    fn remove_avatar(&mut self, player_id: &str) {
        self.avatars.remove(player_id);
    }

    fn spawn_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}
