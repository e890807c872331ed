//! Frame Loop: reads the clock, animates the rings and the knot, hands each
//! frame to a sink.
//!
//! # Invariants
//! - Ticks run strictly one after another; `tick` takes `&mut self`.
//! - The knot turns at a fixed rate; only the rings follow the speed.
//! - A stopped loop never ticks again.

pub mod clock;
pub mod frame_loop;
pub mod motion;

pub use clock::{Clock, FixedStepClock, ManualClock, SystemClock};
pub use frame_loop::{FrameError, FrameLoop, FrameSink, FrameTiming, LoopPhase, StopHandle};
pub use motion::{KNOT_RATE, RingRotation, animate, knot_rotation, ring_rotations};

pub fn crate_info() -> &'static str {
    "torusfield-frame v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("frame"));
    }
}
