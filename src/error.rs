// error.rs - Errors raised while setting up the canvas

use thiserror::Error;

/// Failures that can happen before the simulation is running.
///
/// Once the loop is up nothing is reported: stray coordinates are
/// dropped and a vanished sink only skips the hand-off.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("drawable area {width}x{height} has no cells")]
    EmptyCanvas { width: usize, height: usize },

    #[error("grid is {grid_width}x{grid_height} but frames are {frame_width}x{frame_height}")]
    SizeMismatch {
        grid_width: usize,
        grid_height: usize,
        frame_width: usize,
        frame_height: usize,
    },

    #[error("failed to start the simulation thread")]
    Spawn(#[source] std::io::Error),
}
