use std::time::Instant;

/// Millisecond timestamps for the frame loop. Only differences matter.
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    pub fn advance_ms(&mut self, delta_ms: f64) {
        self.now_ms += delta_ms;
    }

    pub fn set_ms(&mut self, now_ms: f64) {
        self.now_ms = now_ms;
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_advanced() {
        let mut clock = ManualClock::new(100.0);
        assert_eq!(clock.now_ms(), 100.0);
        clock.advance_ms(16.0);
        assert_eq!(clock.now_ms(), 116.0);
        clock.set_ms(5.0);
        assert_eq!(clock.now_ms(), 5.0);
    }

    #[test]
    fn monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let first = clock.now_ms();
        let second = clock.now_ms();
        assert!(second >= first);
    }
}
