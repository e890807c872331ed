use std::time::Instant;

/// Monotonic source of elapsed seconds since the clock started.
pub trait Clock {
    fn elapsed(&mut self) -> f64;
}

/// Wall clock, started on construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed(&mut self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now += seconds.max(0.0);
    }

    pub fn set(&mut self, seconds: f64) {
        self.now = self.now.max(seconds);
    }
}

impl Clock for ManualClock {
    fn elapsed(&mut self) -> f64 {
        self.now
    }
}

/// Advances by a fixed step on every read. Headless simulation uses it to
/// replay a given frame rate without sleeping.
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    step: f64,
    reads: u64,
}

impl FixedStepClock {
    pub fn new(step: f64) -> Self {
        Self {
            step: step.max(0.0),
            reads: 0,
        }
    }

    pub fn from_fps(fps: f64) -> Self {
        Self::new(if fps > 0.0 { 1.0 / fps } else { 0.0 })
    }
}

impl Clock for FixedStepClock {
    fn elapsed(&mut self) -> f64 {
        let now = self.reads as f64 * self.step;
        self.reads += 1;
        now
    }
}
