//! Placed but unfinished buildings.

use serde::{Deserialize, Serialize};

use blockadia_types::{BuildingKind, ConstructionSnapshot, SiteId, TilePos};

use crate::building::blueprint;
use crate::error::WorldError;
use crate::grid::Grid;
use crate::progress::{ProgressTimer, TimerStep};

/// A construction site counting down to a completed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionSite {
    /// Site identifier.
    pub id: SiteId,
    /// Building that will replace the site.
    pub kind: BuildingKind,
    /// Top-left footprint tile.
    pub origin: TilePos,
    timer: ProgressTimer,
}

impl ConstructionSite {
    /// Start a site that completes after `build_ms`.
    ///
    /// # Errors
    ///
    /// [`WorldError::ZeroDuration`] if `build_ms` is zero.
    pub const fn new(
        id: SiteId,
        kind: BuildingKind,
        origin: TilePos,
        build_ms: u64,
    ) -> Result<Self, WorldError> {
        let timer = match ProgressTimer::new(build_ms) {
            Ok(timer) => timer,
            Err(err) => return Err(err),
        };
        Ok(Self {
            id,
            kind,
            origin,
            timer,
        })
    }

    /// Footprint edge length.
    pub const fn size(&self) -> u8 {
        blueprint(self.kind).size
    }

    /// Whether `tile` is part of the footprint.
    pub fn covers(&self, tile: TilePos) -> bool {
        Grid::footprint(self.origin, self.size()).any(|t| t == tile)
    }

    /// Build progress in percent.
    pub fn progress(&self) -> u8 {
        self.timer.percent()
    }

    /// Whether the site is ready to become a building.
    pub const fn is_complete(&self) -> bool {
        self.timer.is_finished()
    }

    /// Advance the build timer.
    pub fn advance(&mut self, dt_ms: u64) -> TimerStep {
        self.timer.advance(dt_ms)
    }

    /// State for the UI.
    pub fn snapshot(&self) -> ConstructionSnapshot {
        ConstructionSnapshot {
            id: self.id,
            kind: self.kind,
            origin: self.origin,
            size: self.size(),
            progress: self.progress(),
        }
    }
}
