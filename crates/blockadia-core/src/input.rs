//! Pointer input: what a click on a tile means.
//!
//! Dispatch order for `clickTile`:
//!
//! 1. Build mode active: confirm placement.
//! 2. A unit stands on the tile: toggle its selection.
//! 3. A node: gather with the selected villager, or toggle selection.
//! 4. A drop: pick up with the selected villager, or toggle selection.
//! 5. A building: open its modal.
//! 6. A construction site: nothing.
//! 7. Anything else: move the selected unit there, or clear the selection.

use blockadia_types::{Notification, TilePos, UnitId};
use blockadia_world::WorldError;
use tracing::debug;

use crate::error::SimError;
use crate::selection::Selection;
use crate::simulation::Simulation;

impl Simulation {
    /// Handle a click on `tile`.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`], or the error of whatever the click
    /// resolved to (placement, gather, move).
    pub fn click_tile(&mut self, tile: TilePos) -> Result<(), SimError> {
        if !self.world.grid().in_bounds(tile) {
            return Err(WorldError::OutOfBounds(tile).into());
        }
        if self.build_mode.is_some() {
            return self.confirm_placement(tile).map(|_| ());
        }

        if let Some(unit_id) = self.unit_at(tile) {
            self.toggle_selection(Selection::Unit(unit_id));
            return Ok(());
        }

        let villager = self
            .selection
            .unit()
            .filter(|id| self.units.get(id).is_some_and(|u| u.is_villager()));

        if let Some(node_id) = self.world.node_at(tile).map(|n| n.id) {
            return match villager {
                Some(unit_id) => self.command_gather(unit_id, node_id),
                None => {
                    self.toggle_selection(Selection::Node(node_id));
                    Ok(())
                }
            };
        }

        if let Some(drop_id) = self.world.drop_at(tile).map(|d| d.id) {
            return match villager {
                Some(unit_id) => self.command_pickup(unit_id, drop_id),
                None => {
                    self.toggle_selection(Selection::Drop(drop_id));
                    Ok(())
                }
            };
        }

        if let Some(snapshot) = self.world.building_at(tile).map(|b| b.snapshot()) {
            debug!(building_id = %snapshot.id, "Building modal opened");
            self.publish(Notification::OpenVillageModal(snapshot));
            return Ok(());
        }

        if self.world.site_at(tile).is_some() {
            return Ok(());
        }

        match self.selection.unit() {
            Some(unit_id) => self.command_move(unit_id, tile),
            None => {
                self.clear_selection();
                Ok(())
            }
        }
    }

    /// The lowest-id unit standing on `tile`.
    pub fn unit_at(&self, tile: TilePos) -> Option<UnitId> {
        let grid = self.world.grid();
        self.units
            .values()
            .find(|u| u.tile(grid) == tile)
            .map(|u| u.id)
    }
}
