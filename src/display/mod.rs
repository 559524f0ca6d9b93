//! Live two-line status display for a running agent session.
//!
//! - `ansi`: escape-aware width and truncation
//! - `activity`: current activity from assistant messages
//! - `format`: token, duration and path formatting
//! - `usage`: token and cost accounting
//! - `clock`: spinner ticker
//! - `frame`: line composition and the terminal redraw protocol
//! - `state`: display state and its reducers

pub mod activity;
pub mod ansi;
pub mod clock;
pub mod format;
pub mod frame;
pub mod state;
pub mod usage;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub use clock::Clock;
pub use frame::{compose, Columns, FrameRenderer};
pub use state::{DisplayModel, DisplayState, ModelInfo, ThinkingLevel};

use crate::event::AgentEvent;

/// Default spinner interval.
pub const DEFAULT_TICK: Duration = Duration::from_millis(80);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Active,
    Stopped,
}

/// State shared between the caller and the clock task.
struct Session {
    phase: Phase,
    state: DisplayState,
    renderer: FrameRenderer,
    started_at: Instant,
}

impl Session {
    fn render(&mut self) {
        if self.phase == Phase::Active {
            self.renderer.render(&self.state, self.started_at.elapsed());
        }
    }

    fn tick(&mut self) {
        if self.phase == Phase::Active {
            self.state = self.state.advance_spinner();
            self.render();
        }
    }
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns the terminal while an agent request is in flight.
///
/// Events and clock ticks both go through one mutex, so at most one render
/// runs at a time. Dropping an active display stops it, which restores the
/// terminal on early returns as well.
pub struct StatusDisplay {
    session: Arc<Mutex<Session>>,
    clock: Clock,
    tick: Duration,
}

impl StatusDisplay {
    pub fn new(renderer: FrameRenderer, tick: Duration) -> Self {
        let session = Session {
            phase: Phase::Idle,
            state: DisplayState::new(DisplayModel::default(), None),
            renderer,
            started_at: Instant::now(),
        };

        Self {
            session: Arc::new(Mutex::new(session)),
            clock: Clock::new(),
            tick,
        }
    }

    /// Reset all counters, start the spinner and paint the first frame.
    pub fn start(&mut self, model: Option<ModelInfo>, thinking: ThinkingLevel) {
        let display_model = DisplayModel { model, thinking };
        tracing::debug!(model = ?display_model.label(), "status display started");

        let weak = Arc::downgrade(&self.session);
        self.clock.start(self.tick, move || {
            if let Some(session) = weak.upgrade() {
                lock(&session).tick();
            }
        });

        let mut session = lock(&self.session);
        if session.phase != Phase::Active {
            session.renderer.reset();
        }
        session.state = DisplayState::new(display_model, dirs::home_dir());
        session.started_at = Instant::now();
        session.phase = Phase::Active;
        session.render();
    }

    /// Fold `event` into the display and repaint. A no-op unless active.
    pub fn handle_event(&self, event: &AgentEvent) {
        let mut session = lock(&self.session);
        if session.phase != Phase::Active {
            return;
        }

        match session.state.reduce(event) {
            Some(next) => {
                session.state = next;
                session.render();
            }
            None => tracing::debug!(?event, "event ignored by status display"),
        }
    }

    /// Stop the spinner and blank the owned lines, leaving the cursor on the
    /// first of them. Later calls do nothing.
    pub fn stop(&mut self) {
        let mut session = lock(&self.session);
        if session.phase == Phase::Stopped {
            return;
        }

        session.phase = Phase::Stopped;
        self.clock.stop();
        session.renderer.clear();
        tracing::debug!(
            elapsed_ms = session.started_at.elapsed().as_millis() as u64,
            "status display stopped"
        );
    }

    pub fn is_active(&self) -> bool {
        lock(&self.session).phase == Phase::Active
    }

    /// Copy of the current display state.
    pub fn snapshot(&self) -> DisplayState {
        lock(&self.session).state.clone()
    }
}

impl Drop for StatusDisplay {
    fn drop(&mut self) {
        if self.is_active() {
            self.stop();
        }
    }
}
