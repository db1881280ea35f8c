// lib.rs - Live Game of Life canvas: rule engine, frame hand-off and editor input
//
// A simulation thread steps the grid and publishes finished frames through
// a double-buffered FrameBuffer; the display thread owns the window, pulls
// the latest frame and forwards pointer events to the InputBridge.

pub mod config;
pub mod error;
pub mod frame_buffer;
pub mod grid;
pub mod input;
pub mod patterns;
pub mod simulation;

pub use config::CanvasConfig;
pub use error::CanvasError;
pub use frame_buffer::{frame_channel, ChannelSink, FrameBuffer, FrameReceiver, FrameSink, FrameSurface};
pub use grid::{pack_rgba, Cell, Grid, Palette};
pub use input::{InputBridge, InputOutcome, PointerButton, PointerEvent};
pub use patterns::{Pattern, PATTERNS};
pub use simulation::{EngineState, SimulationHandle, SimulationLoop, TickMeter};
