use clap::Parser;
use log::warn;
use macroquad::prelude::Conf;
use std::path::PathBuf;
use std::time::Duration;

use shared::TRACE_INTERVAL_MS;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Match server to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:3000")]
    pub server: String,

    /// Display name, stored alongside the player id
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Where the player id and name are kept between runs
    #[arg(short = 'i', long, default_value = ".regatta/identity.json")]
    pub identity: PathBuf,

    /// Simulate network round-trip latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    pub fake_ping: u64,

    /// Fraction of the gap to a remote player's latest trace closed per
    /// frame; 1.0 snaps straight to it
    #[arg(long, default_value = "1.0")]
    pub smooth_remote: f32,

    /// Window width
    #[arg(short = 'w', long, default_value = "1280")]
    pub width: usize,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "720")]
    pub height: usize,
}

impl Args {
    /// Window settings, sized from the command line so the first frame
    /// already has the requested dimensions.
    pub fn window_conf(&self) -> Conf {
        Conf {
            window_title: "Regatta".to_string(),
            window_width: i32::try_from(self.width).unwrap_or(i32::MAX),
            window_height: i32::try_from(self.height).unwrap_or(i32::MAX),
            high_dpi: true,
            ..Default::default()
        }
    }
}

/// Knobs the simulation reads at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub endpoint: String,
    pub trace_interval: Duration,
    pub remote_smoothing: f32,
}

impl EngineConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            trace_interval: Duration::from_millis(TRACE_INTERVAL_MS),
            remote_smoothing: 1.0,
        }
    }
}

impl From<&Args> for EngineConfig {
    fn from(args: &Args) -> Self {
        let remote_smoothing = if args.smooth_remote.is_finite() {
            args.smooth_remote
        } else {
            warn!("Ignoring --smooth-remote {}, snapping instead", args.smooth_remote);
            1.0
        };
        Self {
            remote_smoothing,
            ..Self::new(args.server.clone())
        }
    }
}
