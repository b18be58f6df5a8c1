use crate::game::GameController;
use crate::items::Item;
use crate::movement::Pose;
use crate::scene::{Effect, SceneSink};
use crate::session::SessionStatus;
use macroquad::prelude::*;
use shared::{heading_direction, ItemKind, ARENA_HEIGHT, ARENA_WIDTH, PLAYER_HALF_LENGTH, PLAYER_HALF_WIDTH};
use std::collections::{HashMap, HashSet};

/// World units visible from the top to the bottom of the window.
const VIEW_HEIGHT: f32 = 30.0;
const PARTICLE_LIFETIME: f32 = 0.2;
const PARTICLES_PER_EFFECT: usize = 10;

#[derive(Debug, Clone)]
struct Particle {
    x: f32,
    y: f32,
    age: f32,
    color: Color,
}

#[derive(Debug, Clone)]
pub struct HudState {
    pub status: SessionStatus,
    pub score: i32,
    pub remaining_seconds: u32,
    pub player_name: String,
    pub remote_players: usize,
}

impl HudState {
    pub fn from_game(game: &GameController) -> Self {
        Self {
            status: game.status(),
            score: game.score().value(),
            remaining_seconds: game.session().remaining_seconds(),
            player_name: game.identity().player_name.clone(),
            remote_players: game.remote().avatar_count(),
        }
    }
}

/// Draws the match top-down and keeps the renderables the simulation asked for.
pub struct Renderer {
    items: HashMap<String, Item>,
    avatars: HashSet<String>,
    particles: Vec<Particle>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            items: HashMap::new(),
            avatars: HashSet::new(),
            particles: Vec::new(),
        }
    }

    pub fn render(&mut self, game: &GameController, time: f32, dt: f32) {
        clear_background(Color::from_rgba(34, 102, 34, 255));

        let focus = game.local_pose().unwrap_or_default();
        let aspect = screen_width() / screen_height().max(1.0);
        set_camera(&Camera2D {
            target: vec2(focus.x, focus.y),
            zoom: vec2(2.0 / (VIEW_HEIGHT * aspect), 2.0 / VIEW_HEIGHT),
            ..Default::default()
        });

        self.draw_arena();
        self.draw_items(time);
        self.draw_avatars(game);
        if let Some(pose) = game.local_pose() {
            self.draw_boat(&pose, Color::from_rgba(165, 42, 42, 255));
        }
        self.draw_particles(dt);

        set_default_camera();
        self.draw_hud(HudState::from_game(game));
    }

    fn draw_arena(&self) {
        // Sand border, then the navigable water on top.
        draw_rectangle(
            -(ARENA_WIDTH + 1.0) / 2.0,
            -(ARENA_HEIGHT + 1.0) / 2.0,
            ARENA_WIDTH + 1.0,
            ARENA_HEIGHT + 1.0,
            Color::from_rgba(244, 164, 96, 255),
        );
        draw_rectangle(
            -ARENA_WIDTH / 2.0,
            -ARENA_HEIGHT / 2.0,
            ARENA_WIDTH,
            ARENA_HEIGHT,
            Color::from_rgba(0, 153, 255, 255),
        );
    }

    fn draw_items(&self, time: f32) {
        for item in self.items.values() {
            let half = item.apparent_half_extent(time);
            match item.kind {
                ItemKind::Wildlife => {
                    draw_circle(item.position.x, item.position.y, half, GREEN);
                }
                ItemKind::Litter => {
                    draw_rectangle(
                        item.position.x - half,
                        item.position.y - half,
                        half * 2.0,
                        half * 2.0,
                        RED,
                    );
                }
            }
        }
    }

    fn draw_avatars(&self, game: &GameController) {
        for (player_id, pose) in game.remote().avatars() {
            if self.avatars.contains(player_id) {
                self.draw_boat(pose, Color::from_rgba(51, 51, 51, 255));
            }
        }
    }

    fn draw_boat(&self, pose: &Pose, color: Color) {
        draw_rectangle_ex(
            pose.x,
            pose.y,
            PLAYER_HALF_WIDTH * 2.0,
            PLAYER_HALF_LENGTH * 2.0,
            DrawRectangleParams {
                offset: vec2(0.5, 0.5),
                rotation: pose.heading,
                color,
            },
        );

        let (dx, dy) = heading_direction(pose.heading);
        draw_line(
            pose.x,
            pose.y,
            pose.x + dx * PLAYER_HALF_LENGTH * 1.4,
            pose.y + dy * PLAYER_HALF_LENGTH * 1.4,
            0.1,
            WHITE,
        );
    }

    fn draw_particles(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.age += dt;
        }
        self.particles.retain(|particle| particle.age < PARTICLE_LIFETIME);

        for particle in &self.particles {
            draw_circle(particle.x, particle.y, 0.05, particle.color);
        }
    }

    fn draw_hud(&self, hud: HudState) {
        let panel = Color::from_rgba(0, 0, 0, 128);

        draw_rectangle(10.0, 10.0, 160.0, 60.0, panel);
        draw_text(&format!("Score: {}", hud.score), 18.0, 34.0, 24.0, WHITE);
        draw_text(&format!("Time: {}", hud.remaining_seconds), 18.0, 58.0, 20.0, WHITE);

        let opponents = format!("{} other players", hud.remote_players);
        draw_text(&opponents, 18.0, 90.0, 16.0, WHITE);

        let centre_x = screen_width() / 2.0;
        let centre_y = screen_height() / 2.0;
        match hud.status {
            SessionStatus::Idle => {
                draw_text("Press Enter to set sail", centre_x - 140.0, centre_y, 32.0, WHITE);
            }
            SessionStatus::Connecting => {
                draw_text("Waiting for the match...", centre_x - 150.0, centre_y, 32.0, WHITE);
            }
            SessionStatus::Active => {}
            SessionStatus::Ended => {
                draw_rectangle(centre_x - 160.0, centre_y - 70.0, 320.0, 140.0, panel);
                draw_text("Game Over", centre_x - 70.0, centre_y - 30.0, 32.0, WHITE);
                draw_text(&format!("Name: {}", hud.player_name), centre_x - 140.0, centre_y, 22.0, WHITE);
                draw_text(&format!("Score: {}", hud.score), centre_x - 140.0, centre_y + 25.0, 22.0, WHITE);
                draw_text("Press R to restart", centre_x - 140.0, centre_y + 55.0, 18.0, WHITE);
            }
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneSink for Renderer {
    fn add_item(&mut self, item: &Item) {
        self.items.insert(item.id.clone(), item.clone());
    }

    fn remove_item(&mut self, item_id: &str) {
        self.items.remove(item_id);
    }

    fn add_avatar(&mut self, player_id: &str) {
        self.avatars.insert(player_id.to_string());
    }

    fn remove_avatar(&mut self, player_id: &str) {
        self.avatars.remove(player_id);
    }

    fn spawn_effect(&mut self, effect: Effect) {
        let (x, y, color) = match effect {
            Effect::Wake { x, y } => (x, y, Color::from_rgba(255, 255, 255, 26)),
            Effect::Splash { x, y } => (x, y, Color::from_rgba(230, 245, 255, 90)),
        };
        for _ in 0..PARTICLES_PER_EFFECT {
            self.particles.push(Particle {
                x: x + macroquad::rand::gen_range(-0.5, 0.5),
                y: y - 0.5 + macroquad::rand::gen_range(0.0, 0.5),
                age: 0.0,
                color,
            });
        }
    }
}
