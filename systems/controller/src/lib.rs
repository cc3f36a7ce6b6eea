#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Phase state machine that turns player input into planning and playback.
//!
//! The [`Controller`] owns the simulation [`Phase`] and the pause flag. Each
//! frame the adapter hands it the frame's [`InputEvent`]s and the current
//! monotonic timestamp; the controller applies the input first and then, while
//! moving, advances every movable by one planned cell whenever the playback
//! interval has elapsed.

use std::time::Duration;

use grid_sim_core::{InputEvent, Phase};
use grid_sim_world::World;
use tracing::{debug, info};

/// Drives the Planning → Moving → Finished cycle for a [`World`].
#[derive(Clone, Debug)]
pub struct Controller {
    phase: Phase,
    paused: bool,
    quit_requested: bool,
    step_interval: Duration,
    last_step_at: Duration,
}

impl Controller {
    /// Creates a controller in the planning phase.
    #[must_use]
    pub fn new(step_interval: Duration) -> Self {
        Self {
            phase: Phase::Planning,
            paused: false,
            quit_requested: false,
            step_interval,
            last_step_at: Duration::ZERO,
        }
    }

    /// Active simulation phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the pause flag is set.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether a quit event has been received.
    #[must_use]
    pub const fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Minimum time between playback ticks.
    #[must_use]
    pub const fn step_interval(&self) -> Duration {
        self.step_interval
    }

    /// Runs one frame: applies every event in order, then the playback update.
    pub fn frame(&mut self, world: &mut World, events: &[InputEvent], now: Duration) {
        for event in events {
            self.handle_input(world, *event, now);
        }
        let _ = self.update(world, now);
    }

    /// Applies a single input event.
    ///
    /// Reset, confirm, pause and quit are honoured in every phase. Selection
    /// and plan editing are only accepted while planning and not paused.
    pub fn handle_input(&mut self, world: &mut World, event: InputEvent, now: Duration) {
        match event {
            InputEvent::Quit => self.quit_requested = true,
            InputEvent::TogglePause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, phase = %self.phase, "pause toggled");
            }
            InputEvent::Reset => {
                world.reset_all();
                self.paused = false;
                self.transition(Phase::Planning);
            }
            InputEvent::Confirm => {
                if self.phase == Phase::Moving {
                    return;
                }
                world.start_movement();
                self.last_step_at = now;
                self.transition(Phase::Moving);
            }
            InputEvent::Plan(direction) => {
                if self.accepts_plan_edits() {
                    let planned = world.plan_selected(direction);
                    debug!(?direction, planned, "plan step");
                }
            }
            InputEvent::Undo => {
                if self.accepts_plan_edits() {
                    let _ = world.undo_selected();
                }
            }
            InputEvent::Clear => {
                if self.accepts_plan_edits() {
                    let _ = world.clear_selected();
                }
            }
            InputEvent::Click(pixel) => {
                if self.accepts_plan_edits() {
                    let selected = world.click(pixel);
                    debug!(x = pixel.x, y = pixel.y, selected, "click");
                }
            }
        }
    }

    /// Advances playback by one tick if moving, unpaused and the interval elapsed.
    ///
    /// Returns `true` when a playback tick ran. Reaching the end of every plan
    /// switches to [`Phase::Finished`] and forces the pause flag on.
    pub fn update(&mut self, world: &mut World, now: Duration) -> bool {
        if self.phase != Phase::Moving || self.paused {
            return false;
        }
        if now.saturating_sub(self.last_step_at) < self.step_interval {
            return false;
        }

        self.last_step_at = now;
        let advanced = world.advance_all();
        if world.all_done() {
            self.paused = true;
            self.transition(Phase::Finished);
        } else if advanced == 0 {
            debug!("playback stalled; every pending step is blocked");
        }
        true
    }

    fn accepts_plan_edits(&self) -> bool {
        self.phase == Phase::Planning && !self.paused
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            info!(from = %self.phase, to = %next, "phase changed");
        }
        self.phase = next;
    }
}
