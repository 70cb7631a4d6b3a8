//! Game clock

use serde::{Deserialize, Serialize};

/// Monotonic game time, advanced once per frame tick.
///
/// Every timed effect in the core is keyed by an absolute timestamp read from
/// this clock, so effects never drift with frame-rate changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameClock {
    now: f64,
    frame: u64,
    /// Time not yet consumed by fixed physics steps
    #[serde(skip)]
    accumulator: f64,
}

impl GameClock {
    /// Create a clock at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in seconds
    #[inline]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of frame ticks so far
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance by one frame. Negative deltas are treated as zero.
    pub fn advance(&mut self, delta_time: f64) {
        let dt = delta_time.max(0.0);
        self.now += dt;
        self.accumulator += dt;
        self.frame += 1;
    }

    /// Consume the accumulated time in fixed steps, returning how many steps
    /// are due (capped at `max_steps`; the excess is dropped).
    pub fn fixed_steps(&mut self, step: f64, max_steps: u32) -> u32 {
        if step <= 0.0 {
            return 0;
        }
        let mut steps = 0;
        while self.accumulator >= step && steps < max_steps {
            self.accumulator -= step;
            steps += 1;
        }
        if steps == max_steps && self.accumulator >= step {
            log::debug!(
                "Dropping {:.3}s of physics time after {} substeps",
                self.accumulator,
                steps
            );
            self.accumulator = 0.0;
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = GameClock::new();
        clock.advance(0.5);
        clock.advance(-1.0);
        assert_eq!(clock.now(), 0.5);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_fixed_steps() {
        let mut clock = GameClock::new();
        clock.advance(0.625);
        assert_eq!(clock.fixed_steps(0.25, 8), 2);
        clock.advance(0.125);
        // 0.125 carried over plus 0.125 now
        assert_eq!(clock.fixed_steps(0.25, 8), 1);
    }

    #[test]
    fn test_fixed_steps_cap() {
        let mut clock = GameClock::new();
        clock.advance(1.0);
        assert_eq!(clock.fixed_steps(0.1, 3), 3);
        assert_eq!(clock.fixed_steps(0.1, 3), 0);
    }
}
