//! Match lifecycle: Idle → Connecting → Active → Ended.
//!
//! Ended is terminal. Leaving it means throwing the whole simulation away
//! and building a fresh one, which starts back in Idle.

use log::{debug, info, warn};
use std::time::Duration;

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Active,
    Ended,
}

/// One-second countdown continuation. Dropping it cancels it.
#[derive(Debug, Clone)]
struct Countdown {
    carried: Duration,
}

impl Countdown {
    fn new() -> Self {
        Self {
            carried: Duration::ZERO,
        }
    }

    /// Number of whole ticks that fell due during `elapsed`.
    fn advance(&mut self, elapsed: Duration) -> u32 {
        self.carried += elapsed;
        let mut ticks = 0;
        while self.carried >= TICK {
            self.carried -= TICK;
            ticks += 1;
        }
        ticks
    }
}

#[derive(Debug, Clone)]
pub struct GameSession {
    session_id: Option<String>,
    duration_seconds: Option<u32>,
    remaining_seconds: u32,
    status: SessionStatus,
    countdown: Option<Countdown>,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            session_id: None,
            duration_seconds: None,
            remaining_seconds: 0,
            status: SessionStatus::Idle,
            countdown: None,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn duration_seconds(&self) -> Option<u32> {
        self.duration_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn countdown_armed(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn begin_connecting(&mut self) -> bool {
        if self.status != SessionStatus::Idle {
            debug!("Start ignored in {:?}", self.status);
            return false;
        }
        self.status = SessionStatus::Connecting;
        true
    }

    pub fn record_server_info(&mut self, server_id: String, game_duration: u32) {
        info!("Connected to server {}", server_id);
        info!("Game duration {} seconds", game_duration);
        self.session_id = Some(server_id);
        self.duration_seconds = Some(game_duration);
    }

    /// Connecting → Active. Arms the countdown from the announced duration.
    pub fn activate(&mut self) -> bool {
        if self.status != SessionStatus::Connecting {
            debug!("game.on ignored in {:?}", self.status);
            return false;
        }

        let duration = match self.duration_seconds {
            Some(duration) => duration,
            None => {
                warn!("game.on arrived before server.info, no countdown duration");
                0
            }
        };

        self.remaining_seconds = duration;
        self.countdown = Some(Countdown::new());
        self.status = SessionStatus::Active;
        info!("Game on ({} seconds)", duration);
        true
    }

    /// Active → Ended. Cancels the countdown.
    pub fn end(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            debug!("game.end ignored in {:?}", self.status);
            return false;
        }
        self.countdown = None;
        self.status = SessionStatus::Ended;
        info!("Game over!");
        true
    }

    /// Runs the countdown continuation. Reaching zero does not end the
    /// match; the server's game.end does.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.status != SessionStatus::Active {
            return 0;
        }
        let Some(countdown) = self.countdown.as_mut() else {
            return 0;
        };

        let ticks = countdown.advance(elapsed);
        for _ in 0..ticks {
            self.tick_second();
        }
        ticks
    }

    fn tick_second(&mut self) {
        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            if self.remaining_seconds == 0 {
                info!("Countdown finished, waiting for game.end");
            }
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}
