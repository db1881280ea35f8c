// input.rs - Pointer events to pause toggling and editor-mode painting

use crate::patterns::Pattern;
use crate::simulation::{EngineState, SimulationHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A click, or a drag sample while the button is held, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub button: PointerButton,
    pub x: i32,
    pub y: i32,
}

impl PointerEvent {
    pub fn primary(x: i32, y: i32) -> Self {
        Self { button: PointerButton::Primary, x, y }
    }

    pub fn secondary(x: i32, y: i32) -> Self {
        Self { button: PointerButton::Secondary, x, y }
    }
}

/// What an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Entered editor mode with a cleared canvas.
    Paused,
    Resumed,
    /// A cell was set alive and the frame republished.
    Painted,
    Ignored,
}

/// Turns pointer input into engine transitions and grid edits.
///
/// Lives on the display thread. Edits only happen in editor mode, after
/// the simulation thread has parked between ticks.
pub struct InputBridge {
    sim: SimulationHandle,
}

impl InputBridge {
    pub fn new(sim: SimulationHandle) -> Self {
        Self { sim }
    }

    pub fn state(&self) -> EngineState {
        self.sim.state()
    }

    pub fn handle(&self, event: PointerEvent) -> InputOutcome {
        match event.button {
            PointerButton::Secondary => self.toggle_pause(),
            PointerButton::Primary => self.paint(event.x, event.y),
        }
    }

    /// Flips between running and editor mode.
    ///
    /// Entering editor mode throws the running generation away and shows
    /// an all-dead canvas.
    pub fn toggle_pause(&self) -> InputOutcome {
        match self.sim.state() {
            EngineState::Running => {
                // someone else paused first and already cleared the canvas
                if !self.sim.pause() {
                    return InputOutcome::Ignored;
                }
                self.sim.edit(|grid| grid.clear_to_dead());
                InputOutcome::Paused
            }
            EngineState::Paused => {
                self.sim.resume();
                InputOutcome::Resumed
            }
        }
    }

    /// Sets (x, y) alive when in editor mode. There is no erase.
    pub fn paint(&self, x: i32, y: i32) -> InputOutcome {
        match self.sim.edit(|grid| grid.set_cell(x, y, true)) {
            Some(true) => InputOutcome::Painted,
            _ => InputOutcome::Ignored,
        }
    }

    /// Sets every cell of `pattern` alive with its corner at (x, y),
    /// clipping whatever falls off the grid. Editor mode only.
    pub fn stamp(&self, pattern: &Pattern, x: i32, y: i32) -> InputOutcome {
        let painted = self.sim.edit(|grid| {
            let mut painted = 0;
            for &(dx, dy) in pattern.cells {
                if grid.set_cell(x.saturating_add(dx), y.saturating_add(dy), true) {
                    painted += 1;
                }
            }
            painted
        });
        match painted {
            Some(n) if n > 0 => InputOutcome::Painted,
            _ => InputOutcome::Ignored,
        }
    }
}
