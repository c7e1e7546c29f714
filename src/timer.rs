use std::time::{Duration, Instant};

pub struct FrameTimer {
    last: Instant,
}

impl FrameTimer {
    pub fn new() -> FrameTimer {
        FrameTimer { last: Instant::now() }
    }

    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Time since the previous call (or since construction/restart).
    pub fn elapsed_and_restart(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed
    }
}
