//! Straight-line unit movement.
//!
//! A [`Movement`] interpolates between two pixel points over a duration
//! derived from distance and speed. Arrival is reported exactly once, by the
//! advance that completes the interpolation; the owner then drops the
//! movement.

use blockadia_types::{TilePos, WorldPoint};

/// Result of advancing a movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveStep {
    /// Still travelling; the new position.
    Moving(WorldPoint),
    /// Reached the destination on this advance.
    Arrived(WorldPoint),
}

/// An in-flight straight-line move to the centre of a target tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    from: WorldPoint,
    to: WorldPoint,
    target: TilePos,
    duration_ms: u64,
    elapsed_ms: u64,
}

impl Movement {
    /// Plan a move from `from` to `to` (the centre of `target`) at
    /// `speed` pixels per second. A non-positive speed arrives on the next
    /// advance.
    pub fn new(from: WorldPoint, to: WorldPoint, target: TilePos, speed: f32) -> Self {
        Self {
            from,
            to,
            target,
            duration_ms: travel_ms(from.distance(to), speed),
            elapsed_ms: 0,
        }
    }

    /// Destination tile.
    pub const fn target(&self) -> TilePos {
        self.target
    }

    /// Total travel time.
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Interpolated position.
    #[allow(clippy::cast_precision_loss)]
    pub fn position(&self) -> WorldPoint {
        if self.duration_ms == 0 {
            return self.to;
        }
        // Millisecond durations of on-map moves are tiny compared with 2^24.
        let t = self.elapsed_ms as f32 / self.duration_ms as f32;
        self.from.lerp(self.to, t)
    }

    /// Add `dt_ms` of travel.
    pub fn advance(&mut self, dt_ms: u64) -> MoveStep {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms).min(self.duration_ms);
        if self.elapsed_ms >= self.duration_ms {
            MoveStep::Arrived(self.to)
        } else {
            MoveStep::Moving(self.position())
        }
    }
}

/// Milliseconds needed to cover `distance` pixels at `speed` px/s, rounded up.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn travel_ms(distance: f32, speed: f32) -> u64 {
    if speed <= 0.0 || !distance.is_finite() || distance <= 0.0 {
        return 0;
    }
    (distance * 1000.0 / speed).ceil() as u64
}
