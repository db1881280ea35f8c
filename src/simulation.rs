// simulation.rs - Background generation loop with cooperative pause/resume

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::CanvasError;
use crate::frame_buffer::FrameBuffer;
use crate::grid::Grid;

/// Whether the loop is ticking or sitting in editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    Paused,
}

/// Counts ticks in one-second windows.
#[derive(Debug, Clone)]
pub struct TickMeter {
    window_start: Instant,
    ticks: u32,
}

impl TickMeter {
    const WINDOW: Duration = Duration::from_secs(1);

    pub fn new(now: Instant) -> Self {
        Self { window_start: now, ticks: 0 }
    }

    /// Records one tick; returns the window's total once a second has passed.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        self.ticks += 1;
        if now.duration_since(self.window_start) < Self::WINDOW {
            return None;
        }
        let rate = self.ticks;
        self.restart(now);
        Some(rate)
    }

    pub fn restart(&mut self, now: Instant) {
        self.window_start = now;
        self.ticks = 0;
    }
}

struct Control {
    state: EngineState,
    /// Set by the loop while it sits between ticks waiting for a resume.
    parked: bool,
    stop: bool,
}

struct Shared {
    grid: Mutex<Grid>,
    frames: Arc<FrameBuffer>,
    control: Mutex<Control>,
    signal: Condvar,
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        relock(&self.control)
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, Control>) -> MutexGuard<'a, Control> {
        self.signal.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_grid(&self, grid: &Grid, scratch: &mut Vec<u32>) {
        scratch.resize(grid.len(), 0);
        grid.fill_pixels(scratch);
        self.frames.publish(scratch);
    }
}

/// Marks the loop parked when its thread exits, unwinding included, so
/// `pause` never waits on a thread that is gone.
struct ParkOnExit<'a>(&'a Shared);

impl Drop for ParkOnExit<'_> {
    fn drop(&mut self) {
        let mut control = self.0.control();
        control.parked = true;
        control.stop = true;
        self.0.signal.notify_all();
    }
}

/// Called once per second with the number of ticks completed in that second.
pub type TickReport = Box<dyn FnMut(u32) + Send>;

/// Owns the simulation thread. Dropping it stops and joins the thread.
pub struct SimulationLoop {
    handle: SimulationHandle,
    thread: Option<JoinHandle<()>>,
}

impl SimulationLoop {
    /// Publishes the grid's initial state and starts stepping it.
    pub fn spawn(
        grid: Grid,
        frames: Arc<FrameBuffer>,
        report: impl FnMut(u32) + Send + 'static,
    ) -> Result<Self, CanvasError> {
        if (grid.width(), grid.height()) != (frames.width(), frames.height()) {
            return Err(CanvasError::SizeMismatch {
                grid_width: grid.width(),
                grid_height: grid.height(),
                frame_width: frames.width(),
                frame_height: frames.height(),
            });
        }

        let shared = Arc::new(Shared {
            grid: Mutex::new(grid),
            frames,
            control: Mutex::new(Control {
                state: EngineState::Running,
                parked: false,
                stop: false,
            }),
            signal: Condvar::new(),
        });

        {
            let grid = relock(&shared.grid);
            shared.publish_grid(&grid, &mut Vec::new());
        }

        let worker = Arc::clone(&shared);
        let report: TickReport = Box::new(report);
        let thread = thread::Builder::new()
            .name("life-simulation".into())
            .spawn(move || run(&worker, report))
            .map_err(CanvasError::Spawn)?;

        Ok(Self {
            handle: SimulationHandle { shared },
            thread: Some(thread),
        })
    }

    /// A cloneable control handle for the display thread.
    pub fn handle(&self) -> SimulationHandle {
        self.handle.clone()
    }

    /// Signals the loop to finish its current tick and joins it.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        {
            let mut control = self.handle.shared.control();
            control.stop = true;
            self.handle.shared.signal.notify_all();
        }
        if thread.join().is_err() {
            log::error!("simulation thread panicked");
        }
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(shared: &Shared, mut report: TickReport) {
    let _park = ParkOnExit(shared);
    let mut meter = TickMeter::new(Instant::now());
    let mut scratch = Vec::new();
    log::info!("simulation thread started");

    loop {
        {
            let mut control = shared.control();
            if control.state == EngineState::Paused && !control.stop {
                control.parked = true;
                shared.signal.notify_all();
                while control.state == EngineState::Paused && !control.stop {
                    control = shared.wait(control);
                }
                control.parked = false;
                meter.restart(Instant::now());
            }
            if control.stop {
                break;
            }
        }

        {
            let mut grid = relock(&shared.grid);
            grid.step();
            shared.publish_grid(&grid, &mut scratch);
        }

        if let Some(rate) = meter.tick(Instant::now()) {
            log::debug!("{rate} ticks/s");
            report(rate);
        }
    }

    log::info!("simulation thread stopped");
}

/// Pause/resume and editor-mode access to a running [`SimulationLoop`].
#[derive(Clone)]
pub struct SimulationHandle {
    shared: Arc<Shared>,
}

impl SimulationHandle {
    pub fn state(&self) -> EngineState {
        self.shared.control().state
    }

    pub fn frames(&self) -> &Arc<FrameBuffer> {
        &self.shared.frames
    }

    /// Moves to `Paused` and blocks until the loop is between ticks.
    ///
    /// Returns false if the loop was already paused.
    pub fn pause(&self) -> bool {
        let mut control = self.shared.control();
        if control.state == EngineState::Paused {
            return false;
        }
        control.state = EngineState::Paused;
        self.shared.signal.notify_all();
        while !control.parked && control.state == EngineState::Paused {
            control = self.shared.wait(control);
        }
        log::info!("simulation paused");
        true
    }

    /// Moves to `Running`. Returns false if it was not paused.
    pub fn resume(&self) -> bool {
        let mut control = self.shared.control();
        if control.state == EngineState::Running {
            return false;
        }
        control.state = EngineState::Running;
        self.shared.signal.notify_all();
        log::info!("simulation resumed");
        true
    }

    /// Runs `edit` on the grid while paused and publishes the result.
    ///
    /// Returns `None` without touching the grid when the loop is running.
    pub fn edit<R>(&self, edit: impl FnOnce(&mut Grid) -> R) -> Option<R> {
        // Held across the edit so no resume can slip in before the publish.
        let control = self.shared.control();
        if control.state != EngineState::Paused || !control.parked {
            return None;
        }
        let mut grid = relock(&self.shared.grid);
        let out = edit(&mut grid);
        self.shared.publish_grid(&grid, &mut Vec::new());
        drop(grid);
        drop(control);
        Some(out)
    }

    /// Runs `read` against the current grid.
    pub fn inspect<R>(&self, read: impl FnOnce(&Grid) -> R) -> R {
        read(&relock(&self.shared.grid))
    }
}
