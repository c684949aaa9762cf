//! Per-room timers for the zodiac server.
//!
//! A room runs at most two timers:
//!
//! - the **turn timer**, repeating every `timePerTurn` while a room-mode
//!   game is in progress;
//! - the **game timer**, a one-shot deadline for the whole classic game.
//!
//! Both live in a single [`Timers`] value owned by the room. Arming a
//! timer replaces any earlier timer of the same kind, so a room can never
//! have two turn timers running at once.
//!
//! # Integration
//!
//! [`Timers::next_fire`] is meant to sit inside the room actor's
//! `tokio::select!` loop next to the command channel:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle command */ }
//!         fired = room.timers_mut().next_fire() => {
//!             room.on_timer(fired);
//!         }
//!     }
//! }
//! ```
//!
//! With nothing armed, `next_fire` pends forever and the loop only reacts
//! to commands.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Which timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFired {
    /// The repeating turn timer. `tick` counts firings since it was armed,
    /// starting at 1.
    Turn { tick: u64 },
    /// The whole-game deadline passed. The game timer is disarmed.
    GameTimeout,
}

#[derive(Debug, Clone)]
struct Repeating {
    period: Duration,
    next: Instant,
    ticks: u64,
}

impl Repeating {
    async fn fire(&mut self) -> TimerFired {
        time::sleep_until(self.next).await;

        let now = Instant::now();
        self.ticks += 1;

        let late_by = now.saturating_duration_since(self.next);
        if late_by > self.period / 10 {
            warn!(
                tick = self.ticks,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "turn timer overrun, rescheduling from now"
            );
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }

        trace!(tick = self.ticks, "turn timer fired");
        TimerFired::Turn { tick: self.ticks }
    }
}

/// The timers of one room.
#[derive(Debug, Clone, Default)]
pub struct Timers {
    turn: Option<Repeating>,
    game: Option<Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the repeating turn timer, replacing any running one. The first
    /// firing is one `period` from now.
    pub fn rearm_turn(&mut self, period: Duration) {
        // A zero period would spin the actor loop.
        let period = period.max(Duration::from_millis(1));
        if self.turn.is_some() {
            debug!("replacing running turn timer");
        }
        self.turn = Some(Repeating {
            period,
            next: Instant::now() + period,
            ticks: 0,
        });
        debug!(period_ms = period.as_millis() as u64, "turn timer armed");
    }

    /// Arms the game timer to fire once, `after` from now, replacing any
    /// pending deadline.
    pub fn rearm_game(&mut self, after: Duration) {
        self.game = Some(Instant::now() + after);
        debug!(after_ms = after.as_millis() as u64, "game timer armed");
    }

    pub fn cancel_turn(&mut self) {
        if self.turn.take().is_some() {
            debug!("turn timer cancelled");
        }
    }

    pub fn cancel_game(&mut self) {
        if self.game.take().is_some() {
            debug!("game timer cancelled");
        }
    }

    /// Disarms both timers.
    pub fn cancel_all(&mut self) {
        self.cancel_turn();
        self.cancel_game();
    }

    pub fn is_turn_armed(&self) -> bool {
        self.turn.is_some()
    }

    pub fn is_game_armed(&self) -> bool {
        self.game.is_some()
    }

    /// Resolves when the earliest armed timer is due.
    ///
    /// Pends forever while nothing is armed. The future is cancel-safe:
    /// state only changes after the sleep has completed, so dropping it
    /// from a `select!` loses nothing.
    ///
    /// When both timers are due at the same instant the game timeout wins.
    pub async fn next_fire(&mut self) -> TimerFired {
        match (self.turn.as_mut(), self.game) {
            (Some(turn), Some(game)) if turn.next < game => turn.fire().await,
            (Some(turn), None) => turn.fire().await,
            (_, Some(game)) => {
                time::sleep_until(game).await;
                self.game = None;
                trace!("game timer fired");
                TimerFired::GameTimeout
            }
            (None, None) => std::future::pending().await,
        }
    }
}
