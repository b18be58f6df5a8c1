use clap::Parser;
use client::config::{Args, EngineConfig};
use client::game::GameController;
use client::identity::PlayerIdentity;
use client::input::InputManager;
use client::network::ChannelHandle;
use client::rendering::Renderer;
use client::session::SessionStatus;
use log::{error, info};
use macroquad::prelude::*;
use std::time::{Duration, Instant};

fn window_conf() -> Conf {
    Args::parse().window_conf()
}

/// One running client: simulation, channel worker and renderer. Restarting
/// throws the whole thing away and builds a new one.
struct Client {
    game: GameController,
    channel: ChannelHandle,
    renderer: Renderer,
}

impl Client {
    fn new(args: &Args, identity: PlayerIdentity) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Client {
            game: GameController::new(identity, EngineConfig::from(args)),
            channel: ChannelHandle::spawn(args.fake_ping)?,
            renderer: Renderer::new(),
        })
    }

    /// Handles every envelope that arrived since the previous frame, one at
    /// a time and in order.
    fn drain_channel(&mut self) {
        while let Some(envelope) = self.channel.poll() {
            self.game
                .handle_envelope(envelope, Instant::now(), &mut self.renderer);
        }
    }

    fn flush_outgoing(&mut self) {
        for message in self.game.drain_outgoing() {
            self.channel.post(message);
        }
    }

    fn shutdown(self) {
        self.channel.shutdown();
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let identity = PlayerIdentity::load_or_create(&args.identity, args.name.as_deref())?;
    info!(
        "Playing as {} ({})",
        identity.player_name, identity.player_id
    );

    let mut input_manager = InputManager::new();
    let mut client = Client::new(&args, identity.clone())?;

    loop {
        client.drain_channel();

        let (flags, commands) = input_manager.update(client.game.accepts_input());

        if commands.restart && client.game.status() == SessionStatus::Ended {
            info!("Restarting");
            client.shutdown();
            client = Client::new(&args, identity.clone())?;
            next_frame().await;
            continue;
        }
        if commands.start && client.game.status() == SessionStatus::Idle {
            client.game.start();
        }

        let dt = get_frame_time();
        client.game.frame(
            flags,
            Duration::from_secs_f32(dt.max(0.0)),
            Instant::now(),
            &mut client.renderer,
        );
        client.flush_outgoing();

        client.renderer.render(&client.game, get_time() as f32, dt);

        if is_key_pressed(KeyCode::Escape) {
            break;
        }
        next_frame().await;
    }

    client.shutdown();
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Controls: arrows/WASD to steer, Enter to start, R to restart after the match");

    if let Err(e) = run(args).await {
        error!("Client error: {}", e);
    }
}
