//! Building commands and the building tick phase.
//!
//! Upgrades and recruitment pay through the ledger when they start; workers
//! move between the roaming population and a building's slots; stationed
//! workers produce on a repeating timer.

use blockadia_ledger::EntryReason;
use blockadia_types::{BuildingId, Celebration, FloatingText, Notification, UnitId, UnitKind};
use blockadia_world::Building;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::simulation::Simulation;

impl Simulation {
    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Spawn a villager next to the village, subject to the population cap.
    ///
    /// # Errors
    ///
    /// [`SimError::PopulationCapReached`].
    pub fn spawn_villager(&mut self) -> Result<UnitId, SimError> {
        self.ensure_room()?;
        self.spawn_near(UnitKind::Villager, self.village)
    }

    /// Pay for and start a building upgrade.
    ///
    /// # Errors
    ///
    /// [`SimError::BuildingNotFound`], a [`SimError::World`] refusal
    /// (not upgradable, at max level, already upgrading), or a
    /// [`SimError::Ledger`] shortfall.
    pub fn request_upgrade(&mut self, building_id: BuildingId) -> Result<(), SimError> {
        self.building_ref(building_id)?.check_upgrade()?;

        let cost = self.config.economy.upgrade_cost;
        let at_ms = self.now_ms();
        self.ledger.debit(at_ms, EntryReason::Upgrade, cost)?;

        let duration_ms = self.config.economy.upgrade_ms;
        let patch = self
            .world
            .building_mut(building_id)
            .ok_or(SimError::BuildingNotFound(building_id))?
            .start_upgrade(duration_ms)?;
        info!(building_id = %building_id, duration_ms, "Upgrade started");
        self.publish_wallet();
        self.publish(Notification::BuildingUpdate(patch));
        Ok(())
    }

    /// Pay for and start training a unit.
    ///
    /// # Errors
    ///
    /// [`SimError::BuildingNotFound`], a [`SimError::World`] refusal
    /// (cannot recruit, already recruiting),
    /// [`SimError::PopulationCapReached`], or a [`SimError::Ledger`]
    /// shortfall.
    pub fn request_recruit(&mut self, building_id: BuildingId) -> Result<(), SimError> {
        let unit = self.building_ref(building_id)?.check_recruit()?;
        self.ensure_room()?;

        let cost = self.config.economy.recruit_costs.for_unit(unit);
        if !cost.is_empty() {
            let at_ms = self.now_ms();
            self.ledger.debit(at_ms, EntryReason::Recruit, cost)?;
        }

        let duration_ms = self.config.economy.recruit_ms.for_unit(unit);
        let patch = self
            .world
            .building_mut(building_id)
            .ok_or(SimError::BuildingNotFound(building_id))?
            .start_recruit(duration_ms)?;
        info!(building_id = %building_id, unit = ?unit, duration_ms, "Recruitment started");
        self.publish_wallet();
        self.publish(Notification::BuildingUpdate(patch));
        self.publish_population();
        Ok(())
    }

    /// Station an idle villager in a building.
    ///
    /// The selected villager is used when it is idle; otherwise the idle
    /// villager nearest the building (ties broken by id).
    ///
    /// # Errors
    ///
    /// [`SimError::BuildingNotFound`], a [`SimError::World`] refusal (no
    /// worker slots, slots full), or [`SimError::NoIdleVillager`].
    pub fn assign_villager(&mut self, building_id: BuildingId) -> Result<(), SimError> {
        let building = self.building_ref(building_id)?;
        building.check_assign()?;
        let origin = building.origin;

        let grid = self.world.grid();
        let selected = self
            .selection
            .unit()
            .filter(|id| self.units.get(id).is_some_and(|u| u.is_idle_villager()));
        let chosen = selected.or_else(|| {
            self.units
                .values()
                .filter(|u| u.is_idle_villager())
                .min_by_key(|u| (u.tile(grid).chebyshev(origin), u.id))
                .map(|u| u.id)
        });
        let villager = chosen.ok_or(SimError::NoIdleVillager(building_id))?;

        let period_ms = self.config.economy.production_period_ms;
        let patch = self
            .world
            .building_mut(building_id)
            .ok_or(SimError::BuildingNotFound(building_id))?
            .assign_worker(period_ms)?;
        if self.selection.is_unit(villager) {
            self.clear_selection();
        }
        self.units.remove(&villager);
        info!(building_id = %building_id, unit_id = %villager, "Villager assigned");
        self.publish(Notification::BuildingUpdate(patch));
        self.publish_population();
        Ok(())
    }

    /// Release one worker from a building as a fresh idle villager.
    ///
    /// # Errors
    ///
    /// [`SimError::BuildingNotFound`] or [`SimError::World`] when the
    /// building has no workers.
    pub fn unassign_villager(&mut self, building_id: BuildingId) -> Result<(), SimError> {
        let patch = self
            .world
            .building_mut(building_id)
            .ok_or(SimError::BuildingNotFound(building_id))?
            .unassign_worker()?;
        let unit_id = self.spawn_near(UnitKind::Villager, building_id)?;
        info!(building_id = %building_id, unit_id = %unit_id, "Villager unassigned");
        self.publish(Notification::BuildingUpdate(patch));
        Ok(())
    }

    fn building_ref(&self, building_id: BuildingId) -> Result<&Building, SimError> {
        self.world
            .building(building_id)
            .ok_or(SimError::BuildingNotFound(building_id))
    }

    // -----------------------------------------------------------------------
    // Tick phase
    // -----------------------------------------------------------------------

    /// Advance upgrade, recruit and production timers on every building.
    pub(crate) fn advance_buildings(&mut self, dt_ms: u64) -> Result<(), SimError> {
        let rule = self.production_rule();
        for building_id in self.world.building_ids() {
            let Some(building) = self.world.building_mut(building_id) else {
                continue;
            };
            let outcome = building.advance(dt_ms, rule)?;
            let level = building.level();
            let origin = building.origin;

            if let Some(patch) = outcome.patch {
                self.publish(Notification::BuildingUpdate(patch));
            }

            if outcome.upgraded {
                info!(building_id = %building_id, level, "Upgrade complete");
                self.publish(Notification::Celebration(Celebration { building_id, level }));
            }

            if let Some(unit) = outcome.recruited {
                match self.ensure_room() {
                    Ok(()) => {
                        self.spawn_near(unit, building_id)?;
                    }
                    Err(err) => {
                        warn!(building_id = %building_id, unit = ?unit, error = %err, "Recruit finished over the cap, discarded");
                        self.publish_population();
                    }
                }
            }

            if let Some(cargo) = outcome.produced {
                let at_ms = self.now_ms();
                self.ledger
                    .credit(at_ms, EntryReason::Production, cargo.as_wallet())?;
                debug!(building_id = %building_id, kind = ?cargo.kind, amount = cargo.amount, "Production credited");
                self.publish_wallet();
                self.publish(Notification::FloatingText(FloatingText {
                    tile: origin,
                    text: format!("+{}", cargo.amount),
                    resource: Some(cargo.kind),
                }));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_types::{BuildingKind, ResourceWallet, TilePos};

    use super::*;
    use crate::config::SimulationConfig;

    fn bare() -> Simulation {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        Simulation::new(config).unwrap()
    }

    fn add_building(sim: &mut Simulation, kind: BuildingKind, origin: TilePos) -> BuildingId {
        let id = BuildingId::from_random_bytes(sim.next_id_bytes());
        sim.world.add_building(Building::new(id, kind, origin)).unwrap();
        id
    }

    #[test]
    fn spawn_villager_respects_cap() {
        let mut sim = bare();
        for _ in 0..4 {
            sim.spawn_villager().unwrap();
        }
        assert_eq!(sim.units().count(), 5);
        assert!(matches!(
            sim.spawn_villager(),
            Err(SimError::PopulationCapReached { headcount: 5, cap: 5 })
        ));
    }

    #[test]
    fn upgrade_charges_and_blocks_second_request() {
        let mut sim = bare();
        let village = sim.village_id();
        sim.request_upgrade(village).unwrap();
        assert_eq!(sim.wallet(), ResourceWallet::new(100, 0, 50, 50));
        assert!(sim.request_upgrade(village).is_err());
        assert_eq!(sim.wallet(), ResourceWallet::new(100, 0, 50, 50));
    }

    #[test]
    fn upgrade_completes_with_celebration() {
        let mut sim = bare();
        let village = sim.village_id();
        sim.request_upgrade(village).unwrap();
        sim.bridge.drain();
        for _ in 0..100 {
            sim.tick(100).unwrap();
        }
        let building = sim.world().building(village).unwrap();
        assert_eq!(building.level(), 2);
        assert!(!building.is_upgrading());
        let celebrations = sim
            .bridge
            .drain()
            .into_iter()
            .filter(|n| matches!(n, Notification::Celebration(_)))
            .count();
        assert_eq!(celebrations, 1);
        assert!(sim.request_upgrade(village).is_err());
    }

    #[test]
    fn recruit_time_comes_from_config() {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        config.economy.recruit_ms.villager = 500;
        let mut sim = Simulation::new(config).unwrap();
        let village = sim.village_id();
        sim.request_recruit(village).unwrap();
        for _ in 0..4 {
            sim.tick(100).unwrap();
        }
        assert_eq!(sim.units().count(), 1);
        sim.tick(100).unwrap();
        assert_eq!(sim.units().count(), 2);
    }

    #[test]
    fn assign_then_unassign_keeps_headcount() {
        let mut sim = bare();
        let mine = add_building(&mut sim, BuildingKind::GoldMine, TilePos::new(10, 10));
        sim.assign_villager(mine).unwrap();
        assert_eq!(sim.units().count(), 0);
        assert_eq!(sim.population().assigned, 1);
        assert_eq!(sim.headcount(), 1);
        sim.unassign_villager(mine).unwrap();
        assert_eq!(sim.units().count(), 1);
        assert_eq!(sim.population().assigned, 0);
    }

    #[test]
    fn production_credits_every_period() {
        let mut sim = bare();
        let mine = add_building(&mut sim, BuildingKind::GoldMine, TilePos::new(10, 10));
        sim.assign_villager(mine).unwrap();
        let before = sim.wallet().gold;
        for _ in 0..20 {
            sim.tick(100).unwrap();
        }
        assert_eq!(sim.wallet().gold, before + 2);
    }

    #[test]
    fn assign_without_idle_villager_is_refused() {
        let mut sim = bare();
        let mine = add_building(&mut sim, BuildingKind::StoneMine, TilePos::new(10, 10));
        sim.assign_villager(mine).unwrap();
        assert!(matches!(
            sim.assign_villager(mine),
            Err(SimError::NoIdleVillager(_))
        ));
    }
}
