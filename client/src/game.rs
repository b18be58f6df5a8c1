//! Simulation state and the controller that owns it.
//!
//! Everything that changes during a match lives in [`SimulationState`],
//! owned by one [`GameController`]. Incoming envelopes and frames are
//! separate entry points; the caller never runs one inside the other.

use crate::collision::{CollisionEvent, CollisionResolver, HazardZone, ScoreState};
use crate::config::EngineConfig;
use crate::identity::PlayerIdentity;
use crate::items::ItemLifecycleManager;
use crate::movement::{InputFlags, MoveOutcome, MovementSimulator, Pose};
use crate::navigation::NavigationMask;
use crate::remote::{PlayerTrace, RemoteEntitySynchronizer};
use crate::scene::SceneSink;
use crate::session::{GameSession, SessionStatus};
use crate::throttle::RateLimiter;
use log::{debug, info, warn};
use shared::{hull_footprint, Envelope, IncomingMessage, OutgoingMessage};
use std::time::{Duration, Instant};

pub struct SimulationState {
    pub session: GameSession,
    pub items: ItemLifecycleManager,
    pub remote: RemoteEntitySynchronizer,
    pub collisions: CollisionResolver,
    pub movement: MovementSimulator,
    pub navigation: Option<NavigationMask>,
    /// Present once the match is on.
    pub local: Option<PlayerTrace>,
}

impl SimulationState {
    pub fn new(self_id: &str, config: &EngineConfig) -> Self {
        Self {
            session: GameSession::new(),
            items: ItemLifecycleManager::default(),
            remote: RemoteEntitySynchronizer::with_smoothing(
                self_id.to_string(),
                config.remote_smoothing,
            ),
            collisions: CollisionResolver::new(HazardZone::shoreline()),
            movement: MovementSimulator::new(),
            navigation: Some(NavigationMask::arena()),
            local: None,
        }
    }
}

/// What happened during one frame.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub moved: Option<MoveOutcome>,
    pub collisions: Vec<CollisionEvent>,
    pub trace_sent: bool,
    pub countdown_ticks: u32,
}

pub struct GameController {
    identity: PlayerIdentity,
    config: EngineConfig,
    state: SimulationState,
    outbox: Vec<OutgoingMessage>,
    trace_limiter: RateLimiter,
    trace_log_limiter: RateLimiter,
}

impl GameController {
    pub fn new(identity: PlayerIdentity, config: EngineConfig) -> Self {
        let state = SimulationState::new(&identity.player_id, &config);
        Self {
            trace_limiter: RateLimiter::new(config.trace_interval),
            trace_log_limiter: RateLimiter::new(Duration::from_secs(1)),
            identity,
            config,
            state,
            outbox: Vec::new(),
        }
    }

    /// User pressed start: Idle → Connecting. Queues the channel set-up and
    /// the join request.
    pub fn start(&mut self) -> bool {
        if !self.state.session.begin_connecting() {
            return false;
        }

        info!("Connecting to: {}", self.config.endpoint);
        self.outbox.push(OutgoingMessage::SessionInit {
            endpoint: self.config.endpoint.clone(),
            player_id: self.identity.player_id.clone(),
            player_name: self.identity.player_name.clone(),
        });
        self.outbox.push(OutgoingMessage::GameStart {
            player_id: self.identity.player_id.clone(),
        });
        true
    }

    /// Handles one envelope from the network channel, in arrival order.
    pub fn handle_envelope(&mut self, envelope: Envelope, now: Instant, scene: &mut dyn SceneSink) {
        if let Some(error) = &envelope.error {
            warn!("Channel fault on {}: {}", envelope.message.tag(), error);
            self.state.remote.reset(scene);
        }
        self.handle_message(envelope.message, now, scene);
    }

    fn handle_message(&mut self, message: IncomingMessage, now: Instant, scene: &mut dyn SceneSink) {
        let status = self.state.session.status();
        match message {
            IncomingMessage::Connect => info!("Channel connected"),
            IncomingMessage::Disconnect => info!("Channel disconnected"),
            IncomingMessage::Log { message } => info!("Server: {}", message),
            IncomingMessage::ServerInfo {
                server_id,
                game_duration,
            } => self.state.session.record_server_info(server_id, game_duration),
            IncomingMessage::GameOn => {
                if self.state.session.activate() {
                    self.state.movement.stop();
                    self.state.local = Some(PlayerTrace {
                        player_id: self.identity.player_id.clone(),
                        x: 0.0,
                        y: 0.0,
                        heading_z: 0.0,
                        last_updated_at: now,
                    });
                }
            }
            IncomingMessage::GameEnd => {
                if self.state.session.end() {
                    self.state.items.clear(scene);
                }
            }
            IncomingMessage::ItemsAll(snapshot) => {
                if status == SessionStatus::Ended {
                    debug!("Ignoring item snapshot after the match ended");
                    return;
                }
                self.state.items.apply_bulk_snapshot(snapshot, scene);
            }
            IncomingMessage::ItemNew { id, data } => {
                if status == SessionStatus::Ended {
                    debug!("Ignoring spawn of {} after the match ended", id);
                    return;
                }
                self.state.items.apply_spawn(id, data, scene);
            }
            IncomingMessage::ItemDestroy { item_id } => {
                self.state.items.apply_destroy(&item_id, scene);
            }
            IncomingMessage::PlayerTraceAll(traces) => {
                self.state.remote.apply_bulk_traces(traces, now, scene);
            }
            IncomingMessage::PlayerJoined {
                player_id,
                player_name,
            } => {
                info!("{} joined", player_name);
                self.state.remote.apply_join(player_id, player_name, scene);
            }
            IncomingMessage::PlayerLeft { player_id } => {
                self.state.remote.apply_leave(&player_id, scene);
            }
        }
    }

    /// One simulation pass: pose remote avatars, then (while the match runs)
    /// move, collide, report and advance the countdown.
    pub fn frame(
        &mut self,
        input: InputFlags,
        elapsed: Duration,
        now: Instant,
        scene: &mut dyn SceneSink,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        // Remote boats follow their traces whatever the match state
        self.state.remote.advance_avatars();
        if self.state.session.status() != SessionStatus::Active {
            return report;
        }

        let state = &mut self.state;
        match (state.local.as_mut(), state.navigation.as_ref()) {
            (Some(local), Some(mask)) => {
                let mut pose = local.pose();
                report.moved = Some(state.movement.step(&mut pose, input, mask, scene));
                local.x = pose.x;
                local.y = pose.y;
                local.heading_z = pose.heading;
                local.last_updated_at = now;

                let footprint = hull_footprint(pose.x, pose.y, pose.heading);
                report.collisions = state.collisions.resolve(
                    &footprint,
                    &mut state.items,
                    &self.identity,
                    &mut self.outbox,
                    scene,
                );

                if self.trace_limiter.try_fire(now) {
                    self.outbox.push(OutgoingMessage::TraceChange {
                        player_id: self.identity.player_id.clone(),
                        x: pose.x,
                        y: pose.y,
                        rotation_z: pose.heading,
                    });
                    report.trace_sent = true;
                }

                if self.trace_log_limiter.try_fire(now) {
                    debug!(
                        "Player on ({:.1}, {:.1}) heading to {:.1}",
                        pose.x, pose.y, pose.heading
                    );
                }
            }
            _ => debug!("No local player or navigation mask, skipping movement"),
        }

        report.countdown_ticks = state.session.advance(elapsed);
        report
    }

    /// Messages queued since the last drain, oldest first.
    pub fn drain_outgoing(&mut self) -> Vec<OutgoingMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn session(&self) -> &GameSession {
        &self.state.session
    }

    pub fn status(&self) -> SessionStatus {
        self.state.session.status()
    }

    pub fn score(&self) -> ScoreState {
        self.state.collisions.score()
    }

    pub fn items(&self) -> &ItemLifecycleManager {
        &self.state.items
    }

    pub fn remote(&self) -> &RemoteEntitySynchronizer {
        &self.state.remote
    }

    pub fn local_pose(&self) -> Option<Pose> {
        self.state.local.as_ref().map(PlayerTrace::pose)
    }

    /// Input is only read while the match is running.
    pub fn accepts_input(&self) -> bool {
        self.status() == SessionStatus::Active
    }

    #[cfg(test)]
    fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneRecorder;
    use shared::{ItemData, ItemKind, TraceData, Vec3};
    use std::collections::HashMap;

    fn controller() -> GameController {
        GameController::new(
            PlayerIdentity {
                player_id: "me".to_string(),
                player_name: "Skipper".to_string(),
            },
            EngineConfig::new("127.0.0.1:3000"),
        )
    }

    fn activate(game: &mut GameController, scene: &mut SceneRecorder, now: Instant) {
        game.start();
        game.handle_envelope(
            Envelope::new(IncomingMessage::ServerInfo {
                server_id: "srv".to_string(),
                game_duration: 60,
            }),
            now,
            scene,
        );
        game.handle_envelope(Envelope::new(IncomingMessage::GameOn), now, scene);
    }

    #[test]
    fn test_start_queues_init_then_join() {
        let mut game = controller();
        assert!(game.start());
        assert!(!game.start());

        let tags: Vec<&str> = game.drain_outgoing().iter().map(OutgoingMessage::tag).collect();
        assert_eq!(tags, vec!["session.init", "game.start"]);
        assert_eq!(game.status(), SessionStatus::Connecting);
        assert!(game.drain_outgoing().is_empty());
    }

    #[test]
    fn test_frame_before_game_on_does_nothing() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        game.start();
        game.drain_outgoing();

        let report = game.frame(
            InputFlags {
                forward: true,
                ..InputFlags::default()
            },
            Duration::from_millis(16),
            Instant::now(),
            &mut scene,
        );
        assert!(report.moved.is_none());
        assert!(game.drain_outgoing().is_empty());
    }

    fn trace_of(player_id: &str, x: f32, y: f32) -> Envelope {
        let mut traces = HashMap::new();
        traces.insert(player_id.to_string(), TraceData { x, y, rot_z: 0.5 });
        Envelope::new(IncomingMessage::PlayerTraceAll(traces))
    }

    fn avatar_position(game: &GameController, player_id: &str) -> Option<(f32, f32)> {
        game.remote()
            .avatars()
            .find(|(id, _)| id.as_str() == player_id)
            .map(|(_, pose)| (pose.x, pose.y))
    }

    #[test]
    fn test_avatars_follow_traces_while_connecting() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let now = Instant::now();
        game.start();

        game.handle_envelope(trace_of("a", 1.0, 2.0), now, &mut scene);
        game.handle_envelope(trace_of("a", 5.0, 6.0), now, &mut scene);
        game.frame(InputFlags::default(), Duration::from_millis(16), now, &mut scene);

        assert_eq!(game.status(), SessionStatus::Connecting);
        assert_eq!(avatar_position(&game, "a"), Some((5.0, 6.0)));
    }

    #[test]
    fn test_avatars_follow_traces_after_game_end() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let now = Instant::now();
        activate(&mut game, &mut scene, now);
        game.handle_envelope(trace_of("a", 1.0, 2.0), now, &mut scene);
        game.handle_envelope(Envelope::new(IncomingMessage::GameEnd), now, &mut scene);

        game.handle_envelope(trace_of("a", -3.0, 4.0), now, &mut scene);
        game.frame(InputFlags::default(), Duration::from_millis(16), now, &mut scene);

        assert_eq!(game.status(), SessionStatus::Ended);
        assert_eq!(avatar_position(&game, "a"), Some((-3.0, 4.0)));
    }

    #[test]
    fn test_missing_navigation_skips_movement_only() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let now = Instant::now();
        activate(&mut game, &mut scene, now);
        game.state_mut().navigation = None;

        let report = game.frame(InputFlags::default(), Duration::from_secs(1), now, &mut scene);
        assert!(report.moved.is_none());
        assert_eq!(report.countdown_ticks, 1);
        assert_eq!(game.session().remaining_seconds(), 59);
    }

    #[test]
    fn test_trace_reports_are_throttled() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let start = Instant::now();
        activate(&mut game, &mut scene, start);
        game.drain_outgoing();

        // Frames every 2 ms for 30 ms: one report per 10 ms window.
        let mut sent = 0;
        for step in 0..15u64 {
            let now = start + Duration::from_millis(step * 2);
            if game.frame(InputFlags::default(), Duration::from_millis(2), now, &mut scene).trace_sent {
                sent += 1;
            }
        }
        assert_eq!(sent, 3);

        let traces = game
            .drain_outgoing()
            .into_iter()
            .filter(|message| matches!(message, OutgoingMessage::TraceChange { .. }))
            .count();
        assert_eq!(traces, 3);
    }

    #[test]
    fn test_game_end_clears_items_and_keeps_remote_state() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let now = Instant::now();
        activate(&mut game, &mut scene, now);

        game.handle_envelope(
            Envelope::new(IncomingMessage::ItemNew {
                id: "i9".to_string(),
                data: ItemData {
                    kind: ItemKind::Wildlife,
                    position: Vec3::new(20.0, 5.0, 0.0),
                    size: 1.0,
                },
            }),
            now,
            &mut scene,
        );
        game.handle_envelope(
            Envelope::new(IncomingMessage::PlayerJoined {
                player_id: "other".to_string(),
                player_name: "Other".to_string(),
            }),
            now,
            &mut scene,
        );
        game.handle_envelope(Envelope::new(IncomingMessage::GameEnd), now, &mut scene);

        assert_eq!(game.status(), SessionStatus::Ended);
        assert!(game.items().is_empty());
        assert!(scene.items.is_empty());
        assert_eq!(game.remote().avatar_count(), 1);
        assert!(!game.session().countdown_armed());
        assert!(!game.accepts_input());
    }

    #[test]
    fn test_ended_ignores_new_spawns() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        let now = Instant::now();
        activate(&mut game, &mut scene, now);
        game.handle_envelope(Envelope::new(IncomingMessage::GameEnd), now, &mut scene);

        game.handle_envelope(
            Envelope::new(IncomingMessage::ItemNew {
                id: "late".to_string(),
                data: ItemData {
                    kind: ItemKind::Litter,
                    position: Vec3::default(),
                    size: 1.0,
                },
            }),
            now,
            &mut scene,
        );
        assert!(game.items().is_empty());
        assert_eq!(scene.item_requests, 0);
    }

    #[test]
    fn test_fault_envelope_still_dispatches_message() {
        let mut game = controller();
        let mut scene = SceneRecorder::new();
        game.start();

        game.handle_envelope(
            Envelope::with_error(
                IncomingMessage::ServerInfo {
                    server_id: "srv".to_string(),
                    game_duration: 45,
                },
                "lag spike",
            ),
            Instant::now(),
            &mut scene,
        );
        assert_eq!(game.session().duration_seconds(), Some(45));
    }
}
