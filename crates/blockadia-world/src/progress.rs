//! Tick-advanced timers.
//!
//! Timers hold elapsed time only; they never call back. The owner advances
//! them once per simulation step and acts on the returned step. Dropping a
//! timer is its cancellation: nothing can fire afterwards.

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// One advance of a [`ProgressTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerStep {
    /// Percent after the advance.
    pub percent: u8,
    /// Whether the percent value changed.
    pub changed: bool,
    /// Whether the timer reached 100% on this advance.
    pub finished: bool,
}

/// A one-shot countdown reported as a 0-100 percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressTimer {
    total_ms: u64,
    elapsed_ms: u64,
}

impl ProgressTimer {
    /// Create a timer lasting `total_ms`.
    ///
    /// # Errors
    ///
    /// [`WorldError::ZeroDuration`] if `total_ms` is zero.
    pub const fn new(total_ms: u64) -> Result<Self, WorldError> {
        if total_ms == 0 {
            return Err(WorldError::ZeroDuration);
        }
        Ok(Self {
            total_ms,
            elapsed_ms: 0,
        })
    }

    /// Configured duration.
    pub const fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Time accumulated so far, capped at the duration.
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Whether the timer has run out.
    pub const fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.total_ms
    }

    /// Progress in whole percent, rounded down.
    pub fn percent(&self) -> u8 {
        let scaled = self
            .elapsed_ms
            .saturating_mul(100)
            .checked_div(self.total_ms)
            .unwrap_or(100)
            .min(100);
        u8::try_from(scaled).unwrap_or(100)
    }

    /// Add `dt_ms` of elapsed time.
    pub fn advance(&mut self, dt_ms: u64) -> TimerStep {
        let before = self.percent();
        let was_finished = self.is_finished();
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms).min(self.total_ms);
        let percent = self.percent();
        TimerStep {
            percent,
            changed: percent != before,
            finished: !was_finished && self.is_finished(),
        }
    }
}

/// A periodic timer that fires once per elapsed period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatingTimer {
    period_ms: u64,
    accumulated_ms: u64,
}

impl RepeatingTimer {
    /// Create a timer with the given period.
    ///
    /// # Errors
    ///
    /// [`WorldError::ZeroDuration`] if `period_ms` is zero.
    pub const fn new(period_ms: u64) -> Result<Self, WorldError> {
        if period_ms == 0 {
            return Err(WorldError::ZeroDuration);
        }
        Ok(Self {
            period_ms,
            accumulated_ms: 0,
        })
    }

    /// Configured period.
    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Add `dt_ms` and return how many periods completed.
    pub fn advance(&mut self, dt_ms: u64) -> u64 {
        let total = self.accumulated_ms.saturating_add(dt_ms);
        let fires = total.checked_div(self.period_ms).unwrap_or(0);
        self.accumulated_ms = total.checked_rem(self.period_ms).unwrap_or(0);
        fires
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_rejected() {
        assert_eq!(ProgressTimer::new(0), Err(WorldError::ZeroDuration));
        assert_eq!(RepeatingTimer::new(0), Err(WorldError::ZeroDuration));
    }

    #[test]
    fn one_percent_per_hundred_ms_over_ten_seconds() {
        let mut timer = ProgressTimer::new(10_000).unwrap();
        let step = timer.advance(100);
        assert_eq!(step.percent, 1);
        assert!(step.changed);
        assert!(!step.finished);
        for _ in 0..98 {
            timer.advance(100);
        }
        assert_eq!(timer.percent(), 99);
        let last = timer.advance(100);
        assert!(last.finished);
        assert_eq!(last.percent, 100);
    }

    #[test]
    fn finish_fires_once() {
        let mut timer = ProgressTimer::new(500).unwrap();
        assert!(timer.advance(2_000).finished);
        let again = timer.advance(100);
        assert!(!again.finished);
        assert!(!again.changed);
    }

    #[test]
    fn small_steps_report_unchanged_percent() {
        let mut timer = ProgressTimer::new(10_000).unwrap();
        assert!(!timer.advance(16).changed);
        assert!(!timer.advance(16).changed);
    }

    #[test]
    fn repeating_timer_carries_remainder() {
        let mut timer = RepeatingTimer::new(2_000).unwrap();
        assert_eq!(timer.advance(1_500), 0);
        assert_eq!(timer.advance(600), 1);
        assert_eq!(timer.advance(3_900), 2);
        assert_eq!(timer.advance(0), 0);
    }
}
