use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use crossbeam::channel::{unbounded, Receiver, Sender};
use pausable_clock::PausableClock;

use crate::{
    algorithms::RunError,
    grid::{CellId, CellSnapshot, GridGraph},
    progress::ProgressHandle,
};

/// Consumer of the drawable changes a run produces.
///
/// Called from the thread doing the run, implementations should hand the data off quickly.
pub trait Renderer: Send + Sync {
    fn on_cell_changed(&self, cell: CellSnapshot);
    fn on_frame_boundary(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    CellChanged(CellSnapshot),
    FrameBoundary,
}

/// Forwards everything into a channel, so another thread (usually the UI one) can draw it.
#[derive(Debug, Clone)]
pub struct ChannelRenderer {
    sender: Sender<RenderEvent>,
}

impl ChannelRenderer {
    pub fn new() -> (Self, Receiver<RenderEvent>) {
        let (sender, receiver) = unbounded();
        (Self { sender }, receiver)
    }
}

impl Renderer for ChannelRenderer {
    fn on_cell_changed(&self, cell: CellSnapshot) {
        // nobody listening anymore, the run itself doesn't care
        let _ = self.sender.send(RenderEvent::CellChanged(cell));
    }

    fn on_frame_boundary(&self) {
        let _ = self.sender.send(RenderEvent::FrameBoundary);
    }
}

/// Animation delay shared between the controller and a running algorithm.
#[derive(Debug, Clone, Default)]
pub struct AnimationDelay(Arc<AtomicU64>);

impl AnimationDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Arc::new(AtomicU64::new(ms)))
    }

    pub fn set_millis(&self, ms: u64) {
        self.0.store(ms, Ordering::Relaxed);
    }

    pub fn millis(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn get(&self) -> Duration {
        Duration::from_millis(self.millis())
    }
}

/// Step pacing of a run.
///
/// Every algorithm calls [`AnimationClock::tick`] after each drawable change. With a zero delay
/// that only checks for cancellation, otherwise it waits out the delay (and any pause) and tells
/// the renderer a frame is ready.
#[derive(Clone)]
pub struct AnimationClock {
    delay: AnimationDelay,
    renderer: Option<Arc<dyn Renderer>>,
    progress: ProgressHandle,
    pause: Arc<PausableClock>,
}

impl AnimationClock {
    pub fn new(
        delay: AnimationDelay,
        renderer: Option<Arc<dyn Renderer>>,
        progress: ProgressHandle,
        pause: Arc<PausableClock>,
    ) -> Self {
        Self {
            delay,
            renderer,
            progress,
            pause,
        }
    }

    /// No renderer, no delay.
    pub fn batch() -> Self {
        Self::new(
            AnimationDelay::default(),
            None,
            ProgressHandle::new(),
            Arc::new(PausableClock::default()),
        )
    }

    pub fn progress(&self) -> &ProgressHandle {
        &self.progress
    }

    pub fn delay(&self) -> &AnimationDelay {
        &self.delay
    }

    pub fn is_animated(&self) -> bool {
        self.delay.millis() > 0
    }

    /// Fails when the run was cancelled.
    pub fn check(&self) -> Result<(), RunError> {
        if self.progress.is_stopped() {
            return Err(RunError::Cancelled);
        }

        Ok(())
    }

    pub fn cell_changed(&self, grid: &mut GridGraph, id: CellId) {
        if !self.is_animated() {
            return;
        }

        if let Some(renderer) = &self.renderer {
            renderer.on_cell_changed(grid.snapshot(id));
        }
    }

    pub fn tick(&self) -> Result<(), RunError> {
        self.check()?;

        // a pause taken while animated holds even if the delay drops to zero meanwhile
        if self.pause.is_paused() {
            self.pause.wait_for_resume();
            self.check()?;
        }

        let delay = self.delay.get();
        if delay.is_zero() {
            return Ok(());
        }

        thread::sleep(delay);
        if let Some(renderer) = &self.renderer {
            renderer.on_frame_boundary();
        }

        Ok(())
    }

    /// Hands `ids` to the renderer and closes the frame right away, animated or not.
    pub fn redraw(&self, grid: &mut GridGraph, ids: &[CellId]) {
        let Some(renderer) = &self.renderer else {
            return;
        };

        for &id in ids {
            renderer.on_cell_changed(grid.snapshot(id));
        }
        renderer.on_frame_boundary();
    }

    /// Hands the final state of every cell to the renderer.
    pub fn finish(&self, grid: &mut GridGraph) {
        let ids: Vec<_> = grid.ids().collect();
        self.redraw(grid, &ids);
    }
}

impl fmt::Debug for AnimationClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationClock")
            .field("delay", &self.delay)
            .field("renderer", &self.renderer.is_some())
            .field("progress", &self.progress)
            .field("paused", &self.pause.is_paused())
            .finish()
    }
}
