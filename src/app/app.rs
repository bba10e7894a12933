use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossterm::event;
use log::info;
use ratatui::prelude::*;

use bf_core::GenerationOutcome;

use super::actions::{Action, ActionResult, apply_action, apply_outcome};
use super::events::handle_event;
use super::state::State;
use crate::constants::{EVENT_POLL_MS, IDLE_POLL_MS, RENDER_THROTTLE_MS, SPINNER_MS};
use crate::llms::{GenerationClient, spawn_generation};
use crate::ui;

/// Get current time in milliseconds since UNIX epoch
fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

pub struct App {
    pub state: State,
    client: Arc<dyn GenerationClient>,
    /// Last render time for throttling
    last_render_ms: u64,
    /// Last spinner animation update time
    last_spinner_ms: u64,
}

impl App {
    pub fn new(state: State, client: Arc<dyn GenerationClient>) -> Self {
        Self { state, client, last_render_ms: 0, last_spinner_ms: 0 }
    }

    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tx: Sender<GenerationOutcome>,
        rx: Receiver<GenerationOutcome>,
    ) -> io::Result<()> {
        info!("event loop started ({} backend)", self.client.name());

        loop {
            let current_ms = now_ms();

            // === INPUT FIRST ===
            if event::poll(Duration::ZERO)? {
                let evt = event::read()?;
                let Some(action) = handle_event(&evt, &self.state) else {
                    info!("quit with {} request(s) in flight", self.state.session.in_flight_count());
                    break;
                };
                self.handle_action(action, &tx);

                // Render immediately after input for instant feedback
                if self.state.dirty {
                    self.draw(terminal, current_ms)?;
                }
            }

            // === BACKGROUND PROCESSING ===
            self.process_outcomes(&rx);
            self.update_spinner_animation(current_ms);

            if self.state.dirty && current_ms.saturating_sub(self.last_render_ms) >= RENDER_THROTTLE_MS {
                self.draw(terminal, current_ms)?;
            }

            // Poll faster while requests are in flight so the spinner stays smooth
            let poll_ms = if self.state.session.in_flight_count() > 0 || self.state.dirty {
                EVENT_POLL_MS
            } else {
                IDLE_POLL_MS
            };
            let _ = event::poll(Duration::from_millis(poll_ms))?;
        }

        Ok(())
    }

    fn draw(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, current_ms: u64) -> io::Result<()> {
        terminal.draw(|frame| ui::render(frame, &self.state))?;
        self.state.dirty = false;
        self.last_render_ms = current_ms;
        Ok(())
    }

    fn handle_action(&mut self, action: Action, tx: &Sender<GenerationOutcome>) {
        if let ActionResult::Dispatch(job) = apply_action(&mut self.state, action) {
            // Detached: the worker reports back through `tx`
            let _ = spawn_generation(self.client.clone(), job, tx.clone());
        }
    }

    fn process_outcomes(&mut self, rx: &Receiver<GenerationOutcome>) {
        while let Ok(outcome) = rx.try_recv() {
            apply_outcome(&mut self.state, outcome);
        }
    }

    fn update_spinner_animation(&mut self, current_ms: u64) {
        if self.state.session.in_flight_count() == 0 {
            return;
        }
        if current_ms.saturating_sub(self.last_spinner_ms) >= SPINNER_MS {
            self.last_spinner_ms = current_ms;
            self.state.spinner_frame = self.state.spinner_frame.wrapping_add(1);
            self.state.dirty = true;
        }
    }
}
