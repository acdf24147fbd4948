use std::time::Instant;

/// Per-frame timer. `tick` reports the seconds since the previous tick
/// and rolls the baseline forward, so held-key movement scales with
/// real elapsed time rather than frame count.
#[derive(Debug)]
pub struct Clock {
    previous: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            previous: Instant::now(),
        }
    }

    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.previous).as_secs_f32();
        self.previous = now;
        dt
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
