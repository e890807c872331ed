use crate::clock::Clock;
use crate::motion;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use torusfield_scene::{Scene, SceneError};

/// Errors that end a running loop.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("scene update failed: {0}")]
    Scene(#[from] SceneError),
    #[error("frame sink failed: {0}")]
    Sink(String),
}

/// Timing of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    /// Zero-based tick counter.
    pub frame: u64,
    pub elapsed: f64,
    /// Seconds since the previous tick. Informational only.
    pub delta: f64,
}

/// Where the loop is between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Scheduled,
    Executing,
    Stopped,
}

/// Signals a [`FrameLoop`] to stop after the current tick.
///
/// Cloneable and `Send`, so a window close or Ctrl-C handler on another
/// thread can stop the loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives each animated frame: camera control update, then render.
pub trait FrameSink {
    fn frame(&mut self, scene: &mut Scene, timing: FrameTiming) -> Result<(), FrameError>;
}

impl<F> FrameSink for F
where
    F: FnMut(&mut Scene, FrameTiming) -> Result<(), FrameError>,
{
    fn frame(&mut self, scene: &mut Scene, timing: FrameTiming) -> Result<(), FrameError> {
        self(scene, timing)
    }
}

/// Drives the animation one tick at a time.
///
/// Windowed hosts call [`FrameLoop::tick`] from their redraw callback;
/// headless hosts call [`FrameLoop::run`] with a sink.
pub struct FrameLoop<C: Clock> {
    clock: C,
    previous_time: f64,
    frame: u64,
    phase: LoopPhase,
    stop: StopHandle,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            previous_time: 0.0,
            frame: 0,
            phase: LoopPhase::Scheduled,
            stop: StopHandle::default(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn frames(&self) -> u64 {
        self.frame
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Read the clock and write this frame's rotations. Returns `None` once
    /// the loop has been stopped.
    pub fn tick(&mut self, scene: &mut Scene) -> Result<Option<FrameTiming>, FrameError> {
        if self.stop.is_stopped() {
            self.phase = LoopPhase::Stopped;
            return Ok(None);
        }
        self.phase = LoopPhase::Executing;

        let elapsed = self.clock.elapsed();
        let delta = elapsed - self.previous_time;
        self.previous_time = elapsed;

        let result = motion::animate(scene, elapsed);
        self.phase = LoopPhase::Scheduled;
        result?;

        let timing = FrameTiming {
            frame: self.frame,
            elapsed,
            delta,
        };
        self.frame += 1;
        Ok(Some(timing))
    }

    /// Tick and hand each frame to `sink` until stopped or an error occurs.
    pub fn run(&mut self, scene: &mut Scene, sink: &mut impl FrameSink) -> Result<u64, FrameError> {
        tracing::debug!("frame loop started");
        let start = self.frame;
        while let Some(timing) = self.tick(scene)? {
            self.phase = LoopPhase::Executing;
            let result = sink.frame(scene, timing);
            self.phase = LoopPhase::Scheduled;
            result?;
        }
        let ran = self.frame - start;
        tracing::debug!(frames = ran, "frame loop stopped");
        Ok(ran)
    }
}
