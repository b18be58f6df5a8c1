use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ARENA_WIDTH: f32 = 89.0;
pub const ARENA_HEIGHT: f32 = 23.0;

pub const ACCELERATION: f32 = 0.005;
pub const BRAKE: f32 = 0.1;
pub const MAX_SPEED: f32 = 0.05;
pub const SPEED_DECAY: f32 = 0.98;
pub const TURN_SPEED: f32 = std::f32::consts::PI / 180.0;
pub const WAKE_SPEED_THRESHOLD: f32 = 0.01;

pub const PLAYER_HALF_WIDTH: f32 = 0.5;
pub const PLAYER_HALF_LENGTH: f32 = 1.0;

/// Width of the band along the arena edge where the hull scrapes the shore.
pub const SHORE_MARGIN: f32 = 1.0;

pub const TRACE_INTERVAL_MS: u64 = 10;
pub const FLOAT_AMPLITUDE: f32 = 0.1;

pub const MAX_DATAGRAM_SIZE: usize = 65_507;

pub type PlayerId = String;
pub type ItemId = String;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned box on the water plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn from_center(x: f32, y: f32, half_width: f32, half_height: f32) -> Self {
        Self {
            min_x: x - half_width,
            min_y: y - half_height,
            max_x: x + half_width,
            max_y: y + half_height,
        }
    }

    /// Touching edges count as an overlap.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max_x < self.min_x
            || other.min_x > self.max_x
            || other.max_y < self.min_y
            || other.min_y > self.max_y)
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn contains(&self, other: &Aabb) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// True when the box lies entirely beyond one of the half-extents of a
    /// plane centred on the origin.
    pub fn lies_outside(&self, half_width: f32, half_height: f32) -> bool {
        self.min_x > half_width
            || self.max_x < -half_width
            || self.min_y > half_height
            || self.max_y < -half_height
    }

    pub fn shrink(&self, margin: f32) -> Self {
        Self {
            min_x: self.min_x + margin,
            min_y: self.min_y + margin,
            max_x: self.max_x - margin,
            max_y: self.max_y - margin,
        }
    }
}

/// Bounding box of the hull at `heading` radians around the Z axis.
pub fn hull_footprint(x: f32, y: f32, heading: f32) -> Aabb {
    let (sin, cos) = heading.sin_cos();
    let half_x = cos.abs() * PLAYER_HALF_WIDTH + sin.abs() * PLAYER_HALF_LENGTH;
    let half_y = sin.abs() * PLAYER_HALF_WIDTH + cos.abs() * PLAYER_HALF_LENGTH;
    Aabb::from_center(x, y, half_x, half_y)
}

/// Unit vector the bow points at. Heading zero faces +Y.
pub fn heading_direction(heading: f32) -> (f32, f32) {
    let (sin, cos) = heading.sin_cos();
    (-sin, cos)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    #[serde(alias = "turtle")]
    Wildlife,
    #[serde(alias = "trash")]
    Litter,
}

impl ItemKind {
    pub fn score_delta(self) -> i32 {
        match self {
            ItemKind::Wildlife => -1,
            ItemKind::Litter => 1,
        }
    }

    /// Wildlife is modelled as a unit sphere, litter as a unit cube.
    pub fn half_extent(self, size: f32) -> f32 {
        match self {
            ItemKind::Wildlife => size,
            ItemKind::Litter => size / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemData {
    #[serde(alias = "type")]
    pub kind: ItemKind,
    pub position: Vec3,
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceData {
    pub x: f32,
    pub y: f32,
    pub rot_z: f32,
}

/// Commands the simulation hands to the network channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum OutgoingMessage {
    #[serde(rename = "session.init")]
    SessionInit {
        endpoint: String,
        player_id: PlayerId,
        player_name: String,
    },
    #[serde(rename = "game.start")]
    GameStart { player_id: PlayerId },
    #[serde(rename = "trace.change")]
    TraceChange {
        player_id: PlayerId,
        x: f32,
        y: f32,
        rotation_z: f32,
    },
    #[serde(rename = "item.collision")]
    ItemCollision {
        item_id: ItemId,
        score: i32,
        player_id: PlayerId,
        player_name: String,
    },
}

impl OutgoingMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            OutgoingMessage::SessionInit { .. } => "session.init",
            OutgoingMessage::GameStart { .. } => "game.start",
            OutgoingMessage::TraceChange { .. } => "trace.change",
            OutgoingMessage::ItemCollision { .. } => "item.collision",
        }
    }
}

/// Events the network channel hands to the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum IncomingMessage {
    #[serde(rename = "connect")]
    Connect,
    #[serde(rename = "disconnect")]
    Disconnect,
    #[serde(rename = "log")]
    Log { message: String },
    #[serde(rename = "server.info")]
    ServerInfo { server_id: String, game_duration: u32 },
    #[serde(rename = "game.on")]
    GameOn,
    #[serde(rename = "game.end")]
    GameEnd,
    #[serde(rename = "items.all")]
    ItemsAll(HashMap<ItemId, ItemData>),
    #[serde(rename = "item.new")]
    ItemNew { id: ItemId, data: ItemData },
    #[serde(rename = "item.destroy")]
    ItemDestroy { item_id: ItemId },
    #[serde(rename = "player.trace.all")]
    PlayerTraceAll(HashMap<PlayerId, TraceData>),
    #[serde(rename = "player.info.joined")]
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
    },
    #[serde(rename = "player.info.left")]
    PlayerLeft { player_id: PlayerId },
}

impl IncomingMessage {
    pub fn tag(&self) -> &'static str {
        match self {
            IncomingMessage::Connect => "connect",
            IncomingMessage::Disconnect => "disconnect",
            IncomingMessage::Log { .. } => "log",
            IncomingMessage::ServerInfo { .. } => "server.info",
            IncomingMessage::GameOn => "game.on",
            IncomingMessage::GameEnd => "game.end",
            IncomingMessage::ItemsAll(_) => "items.all",
            IncomingMessage::ItemNew { .. } => "item.new",
            IncomingMessage::ItemDestroy { .. } => "item.destroy",
            IncomingMessage::PlayerTraceAll(_) => "player.trace.all",
            IncomingMessage::PlayerJoined { .. } => "player.info.joined",
            IncomingMessage::PlayerLeft { .. } => "player.info.left",
        }
    }
}

/// An incoming message plus the channel's error indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub message: IncomingMessage,
    pub error: Option<String>,
}

impl Envelope {
    pub fn new(message: IncomingMessage) -> Self {
        Self {
            message,
            error: None,
        }
    }

    pub fn with_error(message: IncomingMessage, error: impl Into<String>) -> Self {
        Self {
            message,
            error: Some(error.into()),
        }
    }

    pub fn is_fault(&self) -> bool {
        self.error.is_some()
    }
}
