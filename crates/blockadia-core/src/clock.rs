//! Simulation clock.
//!
//! Logical time only: the clock advances by whatever step the caller passes
//! to [`Simulation::tick`](crate::Simulation::tick), so tests can run ten
//! simulated seconds without waiting.

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Elapsed milliseconds would overflow.
    #[error("simulation time overflow")]
    TimeOverflow,
}

/// Tick counter plus elapsed simulated milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    tick: u64,
    now_ms: u64,
}

impl SimClock {
    /// A clock at tick 0, time 0.
    pub const fn new() -> Self {
        Self { tick: 0, now_ms: 0 }
    }

    /// Advance by one tick of `dt_ms`. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// [`ClockError::TickOverflow`] or [`ClockError::TimeOverflow`].
    pub fn advance(&mut self, dt_ms: u64) -> Result<u64, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let now_ms = self
            .now_ms
            .checked_add(dt_ms)
            .ok_or(ClockError::TimeOverflow)?;
        self.tick = tick;
        self.now_ms = now_ms;
        Ok(tick)
    }

    /// Ticks completed.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulated milliseconds elapsed.
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_tick_and_time() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance(100), Ok(1));
        assert_eq!(clock.advance(16), Ok(2));
        assert_eq!(clock.now_ms(), 116);
    }

    #[test]
    fn overflow_leaves_clock_untouched() {
        let mut clock = SimClock::new();
        assert!(clock.advance(u64::MAX).is_ok());
        assert_eq!(clock.advance(1), Err(ClockError::TimeOverflow));
        assert_eq!(clock.tick(), 1);
    }
}
