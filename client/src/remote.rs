//! Mirror of the other players' last known traces.
//!
//! Avatars snap to the newest sample unless a smoothing factor below one is
//! configured, in which case each frame moves the displayed pose that
//! fraction of the way toward the sample.

use crate::movement::Pose;
use crate::scene::SceneSink;
use log::debug;
use shared::{PlayerId, TraceData};
use std::collections::HashMap;
use std::time::Instant;

/// A timestamped position and heading for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTrace {
    pub player_id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub heading_z: f32,
    pub last_updated_at: Instant,
}

impl PlayerTrace {
    pub fn pose(&self) -> Pose {
        Pose {
            x: self.x,
            y: self.y,
            heading: self.heading_z,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEntitySynchronizer {
    self_id: PlayerId,
    traces: HashMap<PlayerId, PlayerTrace>,
    names: HashMap<PlayerId, String>,
    /// One entry per live avatar renderable.
    avatars: HashMap<PlayerId, Pose>,
    smoothing: f32,
}

impl RemoteEntitySynchronizer {
    pub fn new(self_id: PlayerId) -> Self {
        Self::with_smoothing(self_id, 1.0)
    }

    /// `smoothing` is the fraction of the gap closed per frame; anything at
    /// or above 1 (or not finite) snaps.
    pub fn with_smoothing(self_id: PlayerId, smoothing: f32) -> Self {
        let smoothing = if smoothing.is_finite() {
            smoothing.clamp(0.01, 1.0)
        } else {
            1.0
        };
        Self {
            self_id,
            traces: HashMap::new(),
            names: HashMap::new(),
            avatars: HashMap::new(),
            smoothing,
        }
    }

    pub fn apply_bulk_traces(
        &mut self,
        traces: HashMap<PlayerId, TraceData>,
        now: Instant,
        scene: &mut dyn SceneSink,
    ) {
        for (player_id, data) in traces {
            if player_id == self.self_id {
                continue;
            }

            let trace = PlayerTrace {
                player_id: player_id.clone(),
                x: data.x,
                y: data.y,
                heading_z: data.rot_z,
                last_updated_at: now,
            };

            if !self.avatars.contains_key(&player_id) {
                scene.add_avatar(&player_id);
                self.avatars.insert(player_id.clone(), trace.pose());
            }
            self.traces.insert(player_id, trace);
        }
    }

    pub fn apply_join(&mut self, player_id: PlayerId, player_name: String, scene: &mut dyn SceneSink) {
        if player_id == self.self_id {
            return;
        }
        if self.avatars.contains_key(&player_id) {
            debug!("Player {} already known", player_id);
        } else {
            scene.add_avatar(&player_id);
            self.avatars.insert(player_id.clone(), Pose::default());
        }
        self.names.insert(player_id, player_name);
    }

    pub fn apply_leave(&mut self, player_id: &str, scene: &mut dyn SceneSink) {
        if player_id == self.self_id {
            return;
        }
        if self.avatars.remove(player_id).is_some() {
            scene.remove_avatar(player_id);
        }
        self.traces.remove(player_id);
        self.names.remove(player_id);
    }

    /// Drops the whole remote view after a transport fault.
    pub fn reset(&mut self, scene: &mut dyn SceneSink) {
        for (player_id, _) in self.avatars.drain() {
            scene.remove_avatar(&player_id);
        }
        self.traces.clear();
        self.names.clear();
    }

    /// Moves every avatar toward its latest trace.
    pub fn advance_avatars(&mut self) {
        for (player_id, pose) in self.avatars.iter_mut() {
            let Some(trace) = self.traces.get(player_id) else {
                continue;
            };
            if self.smoothing >= 1.0 {
                *pose = trace.pose();
            } else {
                pose.x += (trace.x - pose.x) * self.smoothing;
                pose.y += (trace.y - pose.y) * self.smoothing;
                pose.heading += (trace.heading_z - pose.heading) * self.smoothing;
            }
        }
    }

    pub fn avatars(&self) -> impl Iterator<Item = (&PlayerId, &Pose)> {
        self.avatars.iter()
    }

    pub fn trace(&self, player_id: &str) -> Option<&PlayerTrace> {
        self.traces.get(player_id)
    }

    pub fn name(&self, player_id: &str) -> Option<&str> {
        self.names.get(player_id).map(String::as_str)
    }

    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    pub fn avatar_count(&self) -> usize {
        self.avatars.len()
    }
}
