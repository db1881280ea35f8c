// frame_buffer.rs - Front/back pixel surfaces and the hand-off to the display thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

/// One complete frame: `width * height` packed pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSurface {
    width: usize,
    height: usize,
    sequence: u64,
    pixels: Vec<u32>,
}

impl FrameSurface {
    /// A zeroed surface with sequence 0 (nothing published yet).
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sequence: 0,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Publish counter of the frame held by this surface.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(x + y * self.width).copied()
    }
}

/// Receives each newly published front surface.
///
/// Called on the publishing thread after the swap lock is released, so
/// implementations must hand the frame off without waiting on the display.
pub trait FrameSink: Send + Sync {
    /// False once the host surface has been torn down.
    fn is_alive(&self) -> bool;

    fn frame_ready(&self, front: Arc<FrameSurface>);
}

struct Surfaces {
    front: Arc<FrameSurface>,
    back: Arc<FrameSurface>,
    published: u64,
}

/// Double-buffered frame store shared by the simulation and display threads.
///
/// Readers only ever get whole surfaces behind an `Arc`; a surface that is
/// still held by a reader is never written in place, so a torn frame cannot
/// be observed.
pub struct FrameBuffer {
    width: usize,
    height: usize,
    surfaces: Mutex<Surfaces>,
    sink: Option<Arc<dyn FrameSink>>,
    sink_lost: AtomicBool,
}

impl FrameBuffer {
    /// A frame buffer with no display attached.
    pub fn new(width: usize, height: usize) -> Self {
        Self::build(width, height, None)
    }

    pub fn with_sink(width: usize, height: usize, sink: Arc<dyn FrameSink>) -> Self {
        Self::build(width, height, Some(sink))
    }

    fn build(width: usize, height: usize, sink: Option<Arc<dyn FrameSink>>) -> Self {
        Self {
            width,
            height,
            surfaces: Mutex::new(Surfaces {
                front: Arc::new(FrameSurface::blank(width, height)),
                back: Arc::new(FrameSurface::blank(width, height)),
                published: 0,
            }),
            sink,
            sink_lost: AtomicBool::new(false),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Copies `pixels` into the back surface, makes it the front and passes
    /// it to the sink.
    ///
    /// Returns the sequence number of the new front, or `None` when `pixels`
    /// does not match the surface size (nothing is swapped in that case).
    pub fn publish(&self, pixels: &[u32]) -> Option<u64> {
        if pixels.len() != self.width * self.height {
            log::warn!(
                "dropping frame of {} pixels, surfaces hold {}x{}",
                pixels.len(),
                self.width,
                self.height
            );
            return None;
        }

        let (front, sequence) = {
            let mut surfaces = self.surfaces.lock().unwrap_or_else(PoisonError::into_inner);
            surfaces.published += 1;
            let sequence = surfaces.published;

            // Clones only if a reader still holds the old front.
            let back = Arc::make_mut(&mut surfaces.back);
            back.pixels.copy_from_slice(pixels);
            back.sequence = sequence;

            let Surfaces { front, back, .. } = &mut *surfaces;
            std::mem::swap(front, back);
            (Arc::clone(front), sequence)
        };

        if let Some(sink) = &self.sink {
            if sink.is_alive() {
                sink.frame_ready(front);
            } else if !self.sink_lost.swap(true, Ordering::Relaxed) {
                log::info!("display sink is gone, frames are no longer handed off");
            }
        }
        Some(sequence)
    }

    /// The surface currently marked front.
    pub fn current_front(&self) -> Arc<FrameSurface> {
        let surfaces = self.surfaces.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&surfaces.front)
    }

    /// Number of frames published so far.
    pub fn published(&self) -> u64 {
        self.surfaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .published
    }
}

type Wake = Box<dyn Fn() + Send + Sync>;

/// [`FrameSink`] backed by a watch channel: only the newest frame is kept,
/// so a slow display skips frames instead of queueing them.
pub struct ChannelSink {
    tx: watch::Sender<Arc<FrameSurface>>,
    wake: Option<Wake>,
}

impl ChannelSink {
    /// Runs `wake` after every delivered frame, e.g. to request a repaint.
    pub fn with_wake(mut self, wake: impl Fn() + Send + Sync + 'static) -> Self {
        self.wake = Some(Box::new(wake));
        self
    }
}

impl FrameSink for ChannelSink {
    fn is_alive(&self) -> bool {
        !self.tx.is_closed()
    }

    fn frame_ready(&self, front: Arc<FrameSurface>) {
        if self.tx.send(front).is_ok() {
            if let Some(wake) = &self.wake {
                wake();
            }
        }
    }
}

/// Display-side end of [`frame_channel`]. Dropping it marks the sink dead.
pub struct FrameReceiver {
    rx: watch::Receiver<Arc<FrameSurface>>,
}

impl FrameReceiver {
    /// The newest frame if one arrived since the last call.
    pub fn latest(&mut self) -> Option<Arc<FrameSurface>> {
        match self.rx.has_changed() {
            Ok(true) => Some(Arc::clone(&self.rx.borrow_and_update())),
            _ => None,
        }
    }

    /// The newest frame, seen or not.
    pub fn current(&self) -> Arc<FrameSurface> {
        Arc::clone(&self.rx.borrow())
    }
}

/// A sink/receiver pair for a `width` x `height` canvas.
pub fn frame_channel(width: usize, height: usize) -> (ChannelSink, FrameReceiver) {
    let (tx, rx) = watch::channel(Arc::new(FrameSurface::blank(width, height)));
    (ChannelSink { tx, wake: None }, FrameReceiver { rx })
}
