//! Build mode, placement and construction.
//!
//! The UI spends the placement cost with `spendResources` before it sends
//! `enterBuildMode`; build mode itself never touches the ledger. While
//! active, pointer moves refresh a ghost footprint and a click confirms
//! placement. A refused confirm keeps build mode open so the player can try
//! another tile.

use blockadia_types::{
    BuildModeState, BuildingId, BuildingKind, ConstructionCompleted, ConstructionProgress,
    GhostPreview, Notification, SiteId, TilePos,
};
use blockadia_world::{ConstructionSite, PlacementError, PlacementPlan, blueprint, placement};
use tracing::{debug, info};

use crate::error::SimError;
use crate::simulation::Simulation;

/// An active build mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Kind being placed.
    pub kind: BuildingKind,
    /// Last ghost footprint sent to the UI.
    pub ghost: Option<GhostPreview>,
}

impl Simulation {
    /// Enter build mode for the build-menu key `key`.
    ///
    /// # Errors
    ///
    /// [`SimError::UnknownBuildingKind`], or
    /// [`PlacementError::NotPlaceable`] for the village.
    pub fn enter_build_mode(&mut self, key: &str) -> Result<(), SimError> {
        let kind = BuildingKind::from_key(key)
            .ok_or_else(|| SimError::UnknownBuildingKind(key.to_owned()))?;
        if !blueprint(kind).placeable {
            return Err(PlacementError::NotPlaceable(kind).into());
        }
        self.build_mode = Some(BuildMode { kind, ghost: None });
        info!(kind = ?kind, "Build mode entered");
        self.publish_build_mode();
        Ok(())
    }

    /// Leave build mode without placing. Nothing is refunded.
    ///
    /// # Errors
    ///
    /// [`SimError::NotInBuildMode`].
    pub fn cancel_build_mode(&mut self) -> Result<(), SimError> {
        let mode = self.build_mode.take().ok_or(SimError::NotInBuildMode)?;
        info!(kind = ?mode.kind, "Build mode cancelled");
        self.publish_build_mode();
        Ok(())
    }

    /// Move the ghost footprint. Outside build mode this does nothing.
    pub fn pointer_move(&mut self, tile: TilePos) {
        let Some(mode) = self.build_mode else {
            return;
        };
        let units = self.unit_tiles();
        let valid = placement::validate(&self.world, mode.kind, tile, &units).is_ok();
        let ghost = GhostPreview {
            kind: mode.kind,
            origin: tile,
            size: blueprint(mode.kind).size,
            valid,
        };
        if mode.ghost == Some(ghost) {
            return;
        }
        self.build_mode = Some(BuildMode {
            ghost: Some(ghost),
            ..mode
        });
        self.publish_build_mode();
    }

    /// Place a construction site with its origin at `tile`.
    ///
    /// # Errors
    ///
    /// [`SimError::NotInBuildMode`], or [`SimError::Placement`] naming the
    /// broken rule. Build mode stays active on a placement error.
    pub fn confirm_placement(&mut self, tile: TilePos) -> Result<SiteId, SimError> {
        let mode = self.build_mode.ok_or(SimError::NotInBuildMode)?;
        let units = self.unit_tiles();
        let plan = placement::validate(&self.world, mode.kind, tile, &units).map_err(|err| {
            debug!(kind = ?mode.kind, %tile, error = %err, "Placement refused");
            SimError::from(err)
        })?;
        let site_id = self.place_site(plan)?;
        self.build_mode = None;
        self.publish_build_mode();
        Ok(site_id)
    }

    fn place_site(&mut self, plan: PlacementPlan) -> Result<SiteId, SimError> {
        if let Some(node_id) = plan.consumed_node {
            if let Some(node) = self.world.remove_node(node_id) {
                self.on_node_removed(node_id, node.tile);
            }
        }
        let site_id = SiteId::from_random_bytes(self.next_id_bytes());
        let build_ms = self.config.economy.build_ms.for_kind(plan.kind);
        let site = ConstructionSite::new(site_id, plan.kind, plan.origin, build_ms)?;
        let snapshot = site.snapshot();
        self.world.add_site(site)?;
        info!(site_id = %site_id, kind = ?plan.kind, origin = %plan.origin, "Construction started");
        self.publish(Notification::ConstructionStarted(snapshot));
        Ok(site_id)
    }

    fn publish_build_mode(&mut self) {
        let state = BuildModeState {
            kind: self.build_mode.map(|m| m.kind),
            ghost: self.build_mode.and_then(|m| m.ghost),
        };
        self.publish(Notification::BuildModeChanged(state));
    }

    // -----------------------------------------------------------------------
    // Tick phase
    // -----------------------------------------------------------------------

    /// Advance every construction site, completing finished ones.
    pub(crate) fn advance_construction(&mut self, dt_ms: u64) -> Result<(), SimError> {
        for site_id in self.world.site_ids() {
            let Some(site) = self.world.site_mut(site_id) else {
                continue;
            };
            let step = site.advance(dt_ms);
            if step.finished {
                self.complete_construction(site_id)?;
            } else if step.changed {
                self.publish(Notification::ConstructionProgress(ConstructionProgress {
                    site_id,
                    progress: step.percent,
                }));
            }
        }
        Ok(())
    }

    fn complete_construction(&mut self, site_id: SiteId) -> Result<(), SimError> {
        let building_id = BuildingId::from_random_bytes(self.next_id_bytes());
        let building = self.world.complete_site(site_id, building_id)?.snapshot();
        let bonus = blueprint(building.kind).population_bonus;
        info!(site_id = %site_id, building_id = %building_id, kind = ?building.kind, "Construction complete");
        self.publish(Notification::ConstructionCompleted(ConstructionCompleted {
            site_id,
            building,
        }));
        if bonus > 0 {
            self.population_cap = self.population_cap.saturating_add(bonus);
            info!(population_cap = self.population_cap, "Population cap raised");
            self.publish_population();
        }
        Ok(())
    }
}
