//! # Regatta Client Library
//!
//! This library provides the client-side engine for the multiplayer clean-up
//! regatta: every player steers a boat around a strip of water, picks up
//! litter, steers clear of wildlife, and sees the other boats streamed in
//! from the match server.
//!
//! ## Architecture Overview
//!
//! The client keeps a locally simulated vessel consistent with sparse,
//! loosely ordered network updates. Two schedules cooperate without sharing
//! memory:
//!
//! ### Frame Loop
//! A single-threaded loop drives simulation and rendering. Each frame runs
//! exactly one simulate-then-render pass: movement, collision, throttled
//! trace reporting, countdown, then drawing. Incoming network envelopes are
//! handled between frames, one at a time and in arrival order.
//!
//! ### Network Channel
//! A dedicated worker thread owns the socket. The frame loop hands it
//! outgoing messages without waiting for acknowledgement and polls it for
//! incoming envelopes without blocking.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The explicit simulation state and the controller that owns it:
//! - Dispatch of every incoming message kind to exactly one handler
//! - The per-frame pass and the outgoing message queue
//! - Defensive reset of the remote view on channel faults
//!
//! ### Simulation Components
//! - `navigation`: where the vessel may sail
//! - `movement`: speed and heading integration under the navigation mask
//! - `items`: item lifecycle, out-of-bounds tagging, renderable pairing
//! - `remote`: mirror of other players' traces and their avatars
//! - `collision`: overlap tests, score bookkeeping, collision reports
//! - `session`: the match lifecycle state machine and its countdown
//! - `throttle`: the outgoing trace rate limiter
//!
//! ### Collaborator Seams
//! - `scene`: the [`scene::SceneSink`] trait through which the simulation
//!   requests and releases renderables and effects
//! - `network`: the channel worker
//! - `identity`: the persisted player id and display name
//!
//! ### Presentation (`input`, `rendering`)
//! Keyboard sampling and the macroquad renderer. Neither holds game logic.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::EngineConfig;
//! use client::game::GameController;
//! use client::identity::PlayerIdentity;
//! use client::movement::InputFlags;
//! use client::network::ChannelHandle;
//! use client::scene::SceneRecorder;
//! use std::time::{Duration, Instant};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let identity = PlayerIdentity::generate("Skipper");
//! let mut game = GameController::new(identity, EngineConfig::new("127.0.0.1:3000"));
//! let mut channel = ChannelHandle::spawn(0)?;
//! let mut scene = SceneRecorder::new();
//!
//! game.start();
//! loop {
//!     // Network turns, in arrival order
//!     while let Some(envelope) = channel.poll() {
//!         game.handle_envelope(envelope, Instant::now(), &mut scene);
//!     }
//!
//!     // One frame
//!     game.frame(InputFlags::default(), Duration::from_millis(16), Instant::now(), &mut scene);
//!     for message in game.drain_outgoing() {
//!         channel.post(message);
//!     }
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure Handling
//!
//! Nothing here surfaces an error to the player. Channel faults reset the
//! remote view; duplicate or unknown protocol events are ignored; a frame
//! without a local player or navigation mask simply skips movement.

pub mod collision;
pub mod config;
pub mod error;
pub mod game;
pub mod identity;
pub mod input;
pub mod items;
pub mod movement;
pub mod navigation;
pub mod network;
pub mod remote;
pub mod rendering;
pub mod scene;
pub mod session;
pub mod throttle;
