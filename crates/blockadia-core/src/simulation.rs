//! The simulation state and its tick.
//!
//! [`Simulation`] owns every piece of mutable state: the clock, the seeded
//! RNG, the world map, the ledger, the roaming units, the current selection
//! and build mode, and the outbox of pending notifications. Behaviour is
//! split across sibling modules that each add an `impl Simulation` block:
//!
//! - `tasks` -- villager movement, gathering, pickup and delivery.
//! - `buildings` -- upgrades, recruitment, workers and production.
//! - `build_mode` -- ghost preview, placement and construction.
//! - `selection` / `input` -- click dispatch and the inspector.
//! - `bridge` -- command routing and notification flushing.
//!
//! Each tick runs four phases in a fixed order:
//!
//! 1. **Clock** -- advance the tick counter and simulated time.
//! 2. **Units** -- step movements, fire arrivals, count down gathering.
//! 3. **Buildings** -- upgrade and recruit timers, worker production.
//! 4. **Construction** -- site timers and completion.
//!
//! Given the same seed, configuration and command sequence, two runs
//! produce identical state and identical notifications.

use std::collections::BTreeMap;

use blockadia_ledger::Ledger;
use blockadia_types::{
    BuildingId, Language, NodeId, NodeKind, Notification, PopulationSnapshot, ResourceWallet,
    TilePos, UnitId, UnitKind, UnitSpawned,
};
use blockadia_world::{
    Grid, ProductionRule, ResourceNode, UnitTiles, WorldMap, create_starting_world,
    random_id_bytes,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::bridge::EventBridge;
use crate::build_mode::BuildMode;
use crate::clock::SimClock;
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::selection::Selection;
use crate::unit::Unit;

/// Summary of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick that just ran.
    pub tick: u64,
    /// Simulated time after the tick.
    pub now_ms: u64,
    /// Roaming units at the end of the tick.
    pub units: usize,
    /// Notifications waiting in the outbox.
    pub pending_notifications: usize,
}

/// The whole simulation.
#[derive(Debug)]
pub struct Simulation {
    pub(crate) config: SimulationConfig,
    pub(crate) clock: SimClock,
    pub(crate) rng: StdRng,
    pub(crate) world: WorldMap,
    pub(crate) ledger: Ledger,
    pub(crate) units: BTreeMap<UnitId, Unit>,
    pub(crate) village: BuildingId,
    pub(crate) selection: Selection,
    pub(crate) build_mode: Option<BuildMode>,
    pub(crate) language: Language,
    pub(crate) population_cap: u32,
    pub(crate) bridge: EventBridge,
}

impl Simulation {
    /// Generate the starting world and place the initial villagers.
    ///
    /// The outbox starts with a `resourceUpdate` and a `populationUpdate`
    /// so a freshly attached UI can draw its HUD.
    ///
    /// # Errors
    ///
    /// [`SimError::InvalidConfig`] for a zero timer or speed, or a
    /// [`SimError::World`] if the grid cannot hold the village.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        validate_config(&config)?;

        let mut rng = StdRng::seed_from_u64(config.world.seed);
        let starting = create_starting_world(config.grid(), &config.generation_params(), &mut rng)?;
        let ledger = Ledger::new(config.economy.starting_wallet);
        let population_cap = config.population.initial_cap;

        let mut sim = Self {
            clock: SimClock::new(),
            rng,
            world: starting.map,
            ledger,
            units: BTreeMap::new(),
            village: starting.village,
            selection: Selection::None,
            build_mode: None,
            language: Language::default(),
            population_cap,
            bridge: EventBridge::new(),
            config,
        };

        for _ in 0..sim.config.units.initial_villagers {
            if sim.ensure_room().is_err() {
                warn!("Initial villagers exceed the population cap, skipping the rest");
                break;
            }
            sim.spawn_near(UnitKind::Villager, sim.village)?;
        }

        sim.publish_wallet();
        sim.publish_population();

        info!(
            seed = sim.config.world.seed,
            nodes = sim.world.nodes().len(),
            villagers = sim.units.len(),
            "Simulation created"
        );
        Ok(sim)
    }

    /// Run one tick of `dt_ms` simulated milliseconds.
    ///
    /// # Errors
    ///
    /// [`SimError::Clock`] on clock overflow, or a world/ledger error from
    /// one of the phases. Errors here mean broken internal state, not a
    /// refused command.
    pub fn tick(&mut self, dt_ms: u64) -> Result<TickSummary, SimError> {
        let tick = self.clock.advance(dt_ms)?;
        self.advance_units(dt_ms)?;
        self.advance_buildings(dt_ms)?;
        self.advance_construction(dt_ms)?;

        let summary = TickSummary {
            tick,
            now_ms: self.clock.now_ms(),
            units: self.units.len(),
            pending_notifications: self.bridge.len(),
        };
        debug!(
            tick = summary.tick,
            now_ms = summary.now_ms,
            pending = summary.pending_notifications,
            "Tick complete"
        );
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Active configuration.
    pub const fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulation clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// World map.
    pub const fn world(&self) -> &WorldMap {
        &self.world
    }

    /// Grid geometry.
    pub const fn grid(&self) -> &Grid {
        self.world.grid()
    }

    /// Resource ledger.
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Current resource counters.
    pub const fn wallet(&self) -> ResourceWallet {
        self.ledger.wallet()
    }

    /// Roaming units in id order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// Look up a unit.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Ids of all roaming villagers.
    pub fn villager_ids(&self) -> Vec<UnitId> {
        self.units
            .values()
            .filter(|u| u.is_villager())
            .map(|u| u.id)
            .collect()
    }

    /// The central village.
    pub const fn village_id(&self) -> BuildingId {
        self.village
    }

    /// Current selection.
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Build mode, if active.
    pub const fn build_mode(&self) -> Option<&BuildMode> {
        self.build_mode.as_ref()
    }

    /// Language for in-world labels.
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Current population cap, before the hard unit cap is applied.
    pub const fn population_cap(&self) -> u32 {
        self.population_cap
    }

    /// Place an extra resource node. Used by scripted scenarios.
    ///
    /// # Errors
    ///
    /// [`SimError::World`] if the tile is out of bounds or occupied.
    pub fn seed_node(
        &mut self,
        kind: NodeKind,
        tile: TilePos,
        quantity: u32,
    ) -> Result<NodeId, SimError> {
        let id = NodeId::from_random_bytes(self.next_id_bytes());
        self.world.add_node(ResourceNode::new(id, kind, tile, quantity))?;
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    /// Roaming, stationed and in-training units.
    pub fn headcount(&self) -> u32 {
        let roaming = u32::try_from(self.units.len()).unwrap_or(u32::MAX);
        let (stationed, training) = self.world.buildings().fold((0_u32, 0_u32), |(s, t), b| {
            (
                s.saturating_add(u32::from(b.workers())),
                t.saturating_add(u32::from(b.is_recruiting())),
            )
        });
        roaming.saturating_add(stationed).saturating_add(training)
    }

    /// Population cap clamped by the hard unit cap.
    pub fn effective_cap(&self) -> u32 {
        self.population_cap.min(self.config.population.unit_cap)
    }

    /// HUD population figures.
    pub fn population(&self) -> PopulationSnapshot {
        let assigned = self
            .world
            .buildings()
            .map(|b| u32::from(b.workers()))
            .fold(0_u32, u32::saturating_add);
        PopulationSnapshot {
            current: u32::try_from(self.units.len()).unwrap_or(u32::MAX),
            assigned,
            max: self.population_cap,
        }
    }

    /// Refuse if one more unit would break the cap.
    pub(crate) fn ensure_room(&self) -> Result<(), SimError> {
        let headcount = self.headcount();
        let cap = self.effective_cap();
        if headcount >= cap {
            return Err(SimError::PopulationCapReached { headcount, cap });
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Sixteen bytes from the seeded RNG for a new identifier.
    pub(crate) fn next_id_bytes(&mut self) -> [u8; 16] {
        random_id_bytes(&mut self.rng)
    }

    /// Tiles currently under roaming units.
    pub(crate) fn unit_tiles(&self) -> UnitTiles {
        let grid = self.world.grid();
        self.units.values().map(|u| u.tile(grid)).collect()
    }

    pub(crate) const fn production_rule(&self) -> ProductionRule {
        ProductionRule {
            period_ms: self.config.economy.production_period_ms,
            per_worker: self.config.economy.production_per_worker,
        }
    }

    pub(crate) const fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub(crate) fn publish(&mut self, notification: Notification) {
        self.bridge.push(notification);
    }

    pub(crate) fn publish_wallet(&mut self) {
        let wallet = self.ledger.wallet();
        self.publish(Notification::ResourceUpdate(wallet));
    }

    pub(crate) fn publish_population(&mut self) {
        let population = self.population();
        self.publish(Notification::PopulationUpdate(population));
    }

    /// Spawn a unit next to a building's footprint.
    ///
    /// Falls back to the building's drop point when every ring tile out to
    /// the search radius is taken. The cap is not checked here.
    pub(crate) fn spawn_near(
        &mut self,
        kind: UnitKind,
        building: BuildingId,
    ) -> Result<UnitId, SimError> {
        let (origin, size) = self
            .world
            .building(building)
            .map(|b| (b.origin, b.size()))
            .ok_or(SimError::BuildingNotFound(building))?;
        let units = self.unit_tiles();
        let radius = self.config.units.spawn_search_radius;
        let tile = match self.world.find_spawn_tile(origin, size, radius, &units) {
            Some(tile) => tile,
            None => {
                let size = i32::from(size);
                let fallback = origin.offset(size / 2, size);
                debug!(%fallback, "No free spawn tile, using the drop point");
                fallback
            }
        };

        let id = UnitId::from_random_bytes(self.next_id_bytes());
        let position = self.world.grid().tile_center(tile);
        self.units.insert(id, Unit::new(id, kind, position));
        info!(unit_id = %id, kind = ?kind, %tile, "Unit spawned");
        self.publish(Notification::UnitSpawned(UnitSpawned { id, kind, tile }));
        self.publish_population();
        Ok(id)
    }
}

fn validate_config(config: &SimulationConfig) -> Result<(), SimError> {
    let economy = &config.economy;
    let units = &config.units;
    let zero_timer = [
        ("economy.upgrade_ms", economy.upgrade_ms),
        ("economy.production_period_ms", economy.production_period_ms),
        ("world.tick_interval_ms", config.world.tick_interval_ms),
    ]
    .into_iter()
    .find(|(_, value)| *value == 0);
    if let Some((name, _)) = zero_timer {
        return Err(SimError::InvalidConfig {
            reason: format!("{name} must be greater than zero"),
        });
    }
    let recruit = &economy.recruit_ms;
    if recruit.villager == 0 || recruit.soldier == 0 {
        return Err(SimError::InvalidConfig {
            reason: "economy.recruit_ms times must be greater than zero".to_owned(),
        });
    }
    if let Some((kind, _)) = economy.build_ms.entries().into_iter().find(|(_, ms)| *ms == 0) {
        return Err(SimError::InvalidConfig {
            reason: format!("economy.build_ms.{kind} must be greater than zero"),
        });
    }
    if units.villager_speed <= 0.0 || units.soldier_speed <= 0.0 {
        return Err(SimError::InvalidConfig {
            reason: "unit speeds must be positive".to_owned(),
        });
    }
    if units.cargo_amount == 0 {
        return Err(SimError::InvalidConfig {
            reason: "units.cargo_amount must be greater than zero".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_world_has_village_and_villager() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert!(sim.world().building(sim.village_id()).is_some());
        assert_eq!(sim.villager_ids().len(), 1);
        assert_eq!(sim.wallet(), ResourceWallet::new(200, 100, 100, 50));
        assert_eq!(sim.population().current, 1);
        assert_eq!(sim.population().max, 5);
    }

    #[test]
    fn same_seed_same_world() {
        let a = Simulation::new(SimulationConfig::default()).unwrap();
        let b = Simulation::new(SimulationConfig::default()).unwrap();
        let tiles_a: Vec<_> = a.world().nodes().iter().map(|n| n.tile).collect();
        let tiles_b: Vec<_> = b.world().nodes().iter().map(|n| n.tile).collect();
        assert_eq!(tiles_a, tiles_b);
        assert_eq!(a.villager_ids(), b.villager_ids());
    }

    #[test]
    fn zero_upgrade_time_is_rejected() {
        let mut config = SimulationConfig::default();
        config.economy.upgrade_ms = 0;
        assert!(matches!(
            Simulation::new(config),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn zero_build_time_is_rejected() {
        let mut config = SimulationConfig::default();
        config.economy.build_ms.lumber_mill = 0;
        let err = Simulation::new(config).unwrap_err();
        assert!(err.to_string().contains("lumber_mill"));
    }

    #[test]
    fn tick_advances_clock() {
        let mut sim = Simulation::new(SimulationConfig::default()).unwrap();
        let summary = sim.tick(100).unwrap();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.now_ms, 100);
    }
}
