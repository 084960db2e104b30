//! Villager tasks: walking, gathering, pickup and delivery.
//!
//! A gather trip is a loop: walk to a tile next to the node, dwell, reserve
//! a load from the node, carry it to the village drop point, credit the
//! ledger, settle the node and walk back. Redirecting a loaded villager
//! settles its load and drops it on the ground, so cargo is never destroyed
//! and never keeps units of the node locked.

use blockadia_ledger::EntryReason;
use blockadia_types::{
    Cargo, DropId, FloatingText, NodeDepleted, NodeId, Notification, TilePos, UnitId,
};
use blockadia_world::{Depletion, WorldError};
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::movement::{MoveStep, Movement};
use crate::simulation::Simulation;
use crate::unit::{SoldierTask, UnitBody, VillagerTask, WalkGoal};

impl Simulation {
    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Send a unit to a tile. A loaded villager drops its load first.
    ///
    /// # Errors
    ///
    /// [`SimError::UnitNotFound`], or [`WorldError::OutOfBounds`].
    pub fn command_move(&mut self, unit_id: UnitId, tile: TilePos) -> Result<(), SimError> {
        if !self.world.grid().in_bounds(tile) {
            return Err(WorldError::OutOfBounds(tile).into());
        }
        let is_villager = self
            .units
            .get(&unit_id)
            .ok_or(SimError::UnitNotFound(unit_id))?
            .is_villager();
        let body = if is_villager {
            self.drop_carried(unit_id)?;
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Tile))
        } else {
            UnitBody::Soldier(SoldierTask::Walking)
        };
        self.start_walk(unit_id, tile, body)?;
        debug!(unit_id = %unit_id, %tile, "Move ordered");
        Ok(())
    }

    /// Send a villager to work a node.
    ///
    /// # Errors
    ///
    /// [`SimError::UnitNotFound`], [`SimError::NotAVillager`],
    /// [`SimError::NodeGone`], or [`SimError::NoApproachTile`] when all four
    /// sides of the node are blocked (the villager is left idle).
    pub fn command_gather(&mut self, unit_id: UnitId, node_id: NodeId) -> Result<(), SimError> {
        self.require_villager(unit_id)?;
        let node_tile = self
            .world
            .node(node_id)
            .map(|n| n.tile)
            .ok_or(SimError::NodeGone(node_id))?;
        self.drop_carried(unit_id)?;
        self.walk_to_node(unit_id, node_id, node_tile)
    }

    /// Send a villager to pick up a drop.
    ///
    /// # Errors
    ///
    /// [`SimError::UnitNotFound`], [`SimError::NotAVillager`] or
    /// [`SimError::DropGone`].
    pub fn command_pickup(&mut self, unit_id: UnitId, drop_id: DropId) -> Result<(), SimError> {
        self.require_villager(unit_id)?;
        if self.world.drop_pile(drop_id).is_none() {
            return Err(SimError::DropGone(drop_id));
        }
        self.drop_carried(unit_id)?;
        // The load may have merged into the target pile; the id is unchanged
        // in that case and the pickup takes the whole pile.
        let tile = self
            .world
            .drop_pile(drop_id)
            .map(|d| d.tile)
            .ok_or(SimError::DropGone(drop_id))?;
        self.start_walk(
            unit_id,
            tile,
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Pickup(drop_id))),
        )
    }

    fn require_villager(&self, unit_id: UnitId) -> Result<(), SimError> {
        let unit = self
            .units
            .get(&unit_id)
            .ok_or(SimError::UnitNotFound(unit_id))?;
        if !unit.is_villager() {
            return Err(SimError::NotAVillager(unit_id));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Walking
    // -----------------------------------------------------------------------

    /// Replace the unit's task and movement with a walk to `tile`.
    pub(crate) fn start_walk(
        &mut self,
        unit_id: UnitId,
        tile: TilePos,
        body: UnitBody,
    ) -> Result<(), SimError> {
        let destination = self.world.grid().tile_center(tile);
        let unit = self
            .units
            .get_mut(&unit_id)
            .ok_or(SimError::UnitNotFound(unit_id))?;
        let speed = self.config.units.speed(unit.kind());
        unit.movement = Some(Movement::new(unit.position, destination, tile, speed));
        unit.body = body;
        Ok(())
    }

    fn walk_to_node(
        &mut self,
        unit_id: UnitId,
        node_id: NodeId,
        node_tile: TilePos,
    ) -> Result<(), SimError> {
        let Some(approach) = self.world.approach_tile(node_tile) else {
            self.set_idle(unit_id);
            return Err(SimError::NoApproachTile(node_id));
        };
        self.start_walk(
            unit_id,
            approach,
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Gather(node_id))),
        )
    }

    fn walk_to_drop_point(
        &mut self,
        unit_id: UnitId,
        cargo: Cargo,
        source: Option<NodeId>,
    ) -> Result<(), SimError> {
        let drop_point = self
            .world
            .drop_point(self.village)
            .ok_or(SimError::BuildingNotFound(self.village))?;
        self.start_walk(
            unit_id,
            drop_point,
            UnitBody::Villager(VillagerTask::Returning { cargo, source }),
        )
    }

    pub(crate) fn set_idle(&mut self, unit_id: UnitId) {
        if let Some(unit) = self.units.get_mut(&unit_id) {
            unit.movement = None;
            unit.body = match unit.body {
                UnitBody::Villager(_) => UnitBody::Villager(VillagerTask::Idle),
                UnitBody::Soldier(_) => UnitBody::Soldier(SoldierTask::Idle),
            };
        }
    }

    // -----------------------------------------------------------------------
    // Dropping cargo
    // -----------------------------------------------------------------------

    /// Put a returning villager's load on the ground near it and leave the
    /// villager idle. No-op for a villager that carries nothing.
    ///
    /// The load is settled against its node first, so the pile owes the
    /// node nothing and merges with any pile of the same kind. The search
    /// spirals out to the configured radius, then to the whole map.
    pub(crate) fn drop_carried(&mut self, unit_id: UnitId) -> Result<(), SimError> {
        let Some(unit) = self.units.get(&unit_id) else {
            return Ok(());
        };
        let UnitBody::Villager(VillagerTask::Returning { cargo, source }) = unit.body else {
            return Ok(());
        };
        let here = unit.tile(self.world.grid());
        self.set_idle(unit_id);
        if let Some(node_id) = source {
            self.settle_source(node_id, cargo.amount);
        }

        let grid = *self.world.grid();
        let near = self.config.units.drop_search_radius;
        let whole_map = grid.width().max(grid.height());
        let tile = self
            .world
            .find_drop_tile(here, near, &cargo)
            .or_else(|| self.world.find_drop_tile(here, whole_map, &cargo));

        let Some(tile) = tile else {
            // The whole-map search covers the unit's own tile, so this only
            // happens on a map with no empty tile left at all.
            warn!(
                unit_id = %unit_id,
                kind = ?cargo.kind,
                amount = cargo.amount,
                "No tile for dropped cargo, crediting directly"
            );
            return self.credit_load(cargo);
        };

        let new_id = DropId::from_random_bytes(self.next_id_bytes());
        let outcome = self.world.place_drop(new_id, tile, cargo)?;
        debug!(
            unit_id = %unit_id,
            drop_id = %outcome.id,
            tile = %outcome.tile,
            merged = outcome.merged,
            amount = cargo.amount,
            "Cargo dropped"
        );
        if self.selection.is_drop(outcome.id) {
            self.refresh_resource_selection();
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tick phase
    // -----------------------------------------------------------------------

    /// Step every unit's movement and gathering countdown.
    pub(crate) fn advance_units(&mut self, dt_ms: u64) -> Result<(), SimError> {
        let ids: Vec<UnitId> = self.units.keys().copied().collect();
        for id in ids {
            let Some(unit) = self.units.get_mut(&id) else {
                continue;
            };
            let arrived = match unit.movement.as_mut().map(|m| m.advance(dt_ms)) {
                Some(MoveStep::Moving(position)) => {
                    unit.position = position;
                    false
                }
                Some(MoveStep::Arrived(position)) => {
                    unit.position = position;
                    unit.movement = None;
                    true
                }
                None => false,
            };
            if arrived {
                self.on_arrival(id)?;
            } else {
                self.advance_gathering(id, dt_ms)?;
            }
        }
        Ok(())
    }

    fn on_arrival(&mut self, unit_id: UnitId) -> Result<(), SimError> {
        let Some(body) = self.units.get(&unit_id).map(|u| u.body) else {
            return Ok(());
        };
        match body {
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Gather(node))) => {
                if self.world.node(node).is_some() {
                    let remaining_ms = self.config.units.gather_ms;
                    self.set_body(
                        unit_id,
                        UnitBody::Villager(VillagerTask::Gathering { node, remaining_ms }),
                    );
                } else {
                    debug!(unit_id = %unit_id, node_id = %node, "Gather target gone on arrival");
                    self.set_idle(unit_id);
                }
            }
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Pickup(drop_id))) => {
                match self.world.take_drop(drop_id) {
                    Some(pile) => {
                        if self.selection.is_drop(drop_id) {
                            self.clear_selection();
                        }
                        debug!(unit_id = %unit_id, drop_id = %drop_id, amount = pile.cargo.amount, "Drop picked up");
                        self.walk_to_drop_point(unit_id, pile.cargo, None)?;
                    }
                    None => self.set_idle(unit_id),
                }
            }
            UnitBody::Villager(VillagerTask::Returning { cargo, source }) => {
                self.deliver(unit_id, cargo, source)?;
            }
            UnitBody::Villager(VillagerTask::Walking(WalkGoal::Tile))
            | UnitBody::Soldier(SoldierTask::Walking) => self.set_idle(unit_id),
            UnitBody::Villager(VillagerTask::Idle | VillagerTask::Gathering { .. })
            | UnitBody::Soldier(SoldierTask::Idle | SoldierTask::Attacking) => {}
        }
        Ok(())
    }

    fn advance_gathering(&mut self, unit_id: UnitId, dt_ms: u64) -> Result<(), SimError> {
        let Some(UnitBody::Villager(VillagerTask::Gathering { node, remaining_ms })) =
            self.units.get(&unit_id).map(|u| u.body)
        else {
            return Ok(());
        };
        if self.world.node(node).is_none() {
            debug!(unit_id = %unit_id, node_id = %node, "Node gone while gathering");
            self.set_idle(unit_id);
            return Ok(());
        }

        let remaining_ms = remaining_ms.saturating_sub(dt_ms);
        if remaining_ms > 0 {
            self.set_body(
                unit_id,
                UnitBody::Villager(VillagerTask::Gathering { node, remaining_ms }),
            );
            return Ok(());
        }

        let requested = self.config.units.cargo_amount;
        let Some(target) = self.world.node_mut(node) else {
            self.set_idle(unit_id);
            return Ok(());
        };
        let kind = target.kind.yields();
        let amount = target.reserve(requested);
        if amount == 0 {
            debug!(unit_id = %unit_id, node_id = %node, "Node fully reserved, going idle");
            self.set_idle(unit_id);
            return Ok(());
        }
        self.walk_to_drop_point(unit_id, Cargo::new(kind, amount), Some(node))
    }

    fn set_body(&mut self, unit_id: UnitId, body: UnitBody) {
        if let Some(unit) = self.units.get_mut(&unit_id) {
            unit.body = body;
        }
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    /// Credit a load at the drop point, then head back to the source node if
    /// it still stands.
    fn deliver(
        &mut self,
        unit_id: UnitId,
        cargo: Cargo,
        source: Option<NodeId>,
    ) -> Result<(), SimError> {
        self.set_idle(unit_id);
        self.credit_load(cargo)?;
        if let Some(node_id) = source {
            self.settle_source(node_id, cargo.amount);
        }

        if let Some(drop_point) = self.world.drop_point(self.village) {
            self.publish(Notification::FloatingText(FloatingText {
                tile: drop_point,
                text: format!("+{}", cargo.amount),
                resource: Some(cargo.kind),
            }));
        }

        let Some(node_id) = source else {
            return Ok(());
        };
        let Some(node_tile) = self.world.node(node_id).map(|n| n.tile) else {
            return Ok(());
        };
        match self.walk_to_node(unit_id, node_id, node_tile) {
            Err(SimError::NoApproachTile(_)) => {
                debug!(unit_id = %unit_id, node_id = %node_id, "Node unreachable, staying idle");
                Ok(())
            }
            other => other,
        }
    }

    /// Credit a load to the ledger.
    fn credit_load(&mut self, cargo: Cargo) -> Result<(), SimError> {
        if cargo.amount == 0 {
            return Ok(());
        }
        let at_ms = self.now_ms();
        self.ledger
            .credit(at_ms, EntryReason::Delivery, cargo.as_wallet())?;
        self.publish_wallet();
        Ok(())
    }

    /// Take a reserved load out of its node for good.
    fn settle_source(&mut self, node_id: NodeId, amount: u32) {
        let tile = self.world.node(node_id).map(|n| n.tile);
        match self.world.settle_node(node_id, amount) {
            Some(Depletion::Exhausted) => {
                if let Some(tile) = tile {
                    self.on_node_removed(node_id, tile);
                }
            }
            Some(Depletion::Remaining(left)) => {
                debug!(node_id = %node_id, remaining = left, "Node settled");
                if self.selection.is_node(node_id) {
                    self.refresh_resource_selection();
                }
            }
            None => {}
        }
    }

    /// Announce a node that left the map and drop it from the selection.
    pub(crate) fn on_node_removed(&mut self, node_id: NodeId, tile: TilePos) {
        info!(node_id = %node_id, %tile, "Resource node depleted");
        self.publish(Notification::NodeDepleted(NodeDepleted { node_id, tile }));
        if self.selection.is_node(node_id) {
            self.clear_selection();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_types::{NodeKind, ResourceKind};

    use super::*;
    use crate::config::SimulationConfig;
    use crate::unit::Unit;

    fn bare() -> Simulation {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        Simulation::new(config).unwrap()
    }

    fn first_villager(sim: &Simulation) -> UnitId {
        sim.villager_ids().first().copied().unwrap()
    }

    fn run(sim: &mut Simulation, ms: u64) {
        for _ in 0..ms / 100 {
            sim.tick(100).unwrap();
        }
    }

    #[test]
    fn move_reaches_tile_and_idles() {
        let mut sim = bare();
        let id = first_villager(&sim);
        sim.command_move(id, TilePos::new(30, 20)).unwrap();
        run(&mut sim, 5_000);
        let unit: &Unit = sim.unit(id).unwrap();
        assert_eq!(unit.tile(sim.grid()), TilePos::new(30, 20));
        assert!(unit.is_idle_villager());
    }

    #[test]
    fn move_out_of_bounds_is_refused() {
        let mut sim = bare();
        let id = first_villager(&sim);
        assert!(matches!(
            sim.command_move(id, TilePos::new(-1, 0)),
            Err(SimError::World { .. })
        ));
    }

    #[test]
    fn redirect_drops_cargo() {
        let mut sim = bare();
        let id = first_villager(&sim);
        let node = sim.seed_node(NodeKind::Tree, TilePos::new(30, 30), 1000).unwrap();
        if let Some(unit) = sim.units.get_mut(&id) {
            unit.body = UnitBody::Villager(VillagerTask::Returning {
                cargo: Cargo::new(ResourceKind::Wood, 10),
                source: Some(node),
            });
        }
        sim.command_move(id, TilePos::new(10, 10)).unwrap();
        assert_eq!(sim.world().drops().total_amount(), 10);
        let tree = sim.world().node(node).unwrap();
        assert_eq!((tree.quantity, tree.reserved), (990, 0));
        assert_eq!(sim.unit(id).unwrap().cargo(), None);
    }

    #[test]
    fn full_map_credits_dropped_cargo() {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        config.world.width = 8;
        config.world.height = 8;
        config.units.initial_villagers = 1;
        let mut sim = Simulation::new(config).unwrap();
        let id = first_villager(&sim);

        let free: Vec<TilePos> = (0..8)
            .flat_map(|x| (0..8).map(move |y| TilePos::new(x, y)))
            .filter(|tile| sim.world().is_static_free(*tile))
            .collect();
        for tile in free {
            sim.seed_node(NodeKind::Stone, tile, 1000).unwrap();
        }
        if let Some(unit) = sim.units.get_mut(&id) {
            unit.body = UnitBody::Villager(VillagerTask::Returning {
                cargo: Cargo::new(ResourceKind::Wood, 10),
                source: None,
            });
        }
        let before = sim.wallet().wood;

        sim.command_move(id, TilePos::new(0, 0)).unwrap();
        assert_eq!(sim.world().drops().total_amount(), 0);
        assert_eq!(before.checked_add(10), Some(sim.wallet().wood));
    }

    #[test]
    fn gather_on_missing_node_is_refused() {
        let mut sim = bare();
        let id = first_villager(&sim);
        let node = sim.seed_node(NodeKind::Tree, TilePos::new(30, 30), 1000).unwrap();
        sim.world.remove_node(node);
        assert!(matches!(
            sim.command_gather(id, node),
            Err(SimError::NodeGone(_))
        ));
    }

    #[test]
    fn surrounded_node_leaves_villager_idle() {
        let mut sim = bare();
        let id = first_villager(&sim);
        let center = TilePos::new(20, 20);
        let node = sim.seed_node(NodeKind::Stone, center, 1000).unwrap();
        for tile in center.cardinal_neighbors() {
            sim.seed_node(NodeKind::Stone, tile, 1000).unwrap();
        }
        assert!(matches!(
            sim.command_gather(id, node),
            Err(SimError::NoApproachTile(_))
        ));
        assert!(sim.unit(id).unwrap().is_idle_villager());
    }
}
