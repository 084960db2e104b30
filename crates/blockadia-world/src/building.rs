//! Completed buildings: blueprints, upgrade and recruit timers, worker slots
//! and passive production.

use serde::{Deserialize, Serialize};

use blockadia_types::{
    BuildingId, BuildingKind, BuildingPatch, BuildingSnapshot, Cargo, NodeKind, ResourceKind,
    ResourceWallet, TilePos, UnitKind,
};

use crate::error::WorldError;
use crate::grid::Grid;
use crate::progress::{ProgressTimer, RepeatingTimer};

/// Highest level a building can reach.
pub const MAX_LEVEL: u8 = 2;

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

/// Static per-kind building rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blueprint {
    /// The kind described.
    pub kind: BuildingKind,
    /// Footprint edge length in tiles.
    pub size: u8,
    /// Placement cost, spent by the UI before entering build mode.
    pub cost: ResourceWallet,
    /// Worker slots; zero for kinds that take no workers.
    pub max_workers: u8,
    /// Resource produced by stationed workers.
    pub produces: Option<ResourceKind>,
    /// Unit this kind trains.
    pub recruits: Option<UnitKind>,
    /// Deposit the origin tile must sit on.
    pub required_node: Option<NodeKind>,
    /// Whether a tree must stand next to the footprint.
    pub needs_adjacent_tree: bool,
    /// Population cap added on completion.
    pub population_bonus: u32,
    /// Whether the kind can be upgraded to [`MAX_LEVEL`].
    pub upgradable: bool,
    /// Whether the player can place this kind from the build menu.
    pub placeable: bool,
}

const fn mine(kind: BuildingKind, node: NodeKind, produces: ResourceKind) -> Blueprint {
    Blueprint {
        kind,
        size: 2,
        cost: ResourceWallet::new(50, 20, 0, 0),
        max_workers: 4,
        produces: Some(produces),
        recruits: None,
        required_node: Some(node),
        needs_adjacent_tree: false,
        population_bonus: 0,
        upgradable: false,
        placeable: true,
    }
}

/// Return the blueprint for a building kind.
pub const fn blueprint(kind: BuildingKind) -> Blueprint {
    match kind {
        BuildingKind::Village => Blueprint {
            kind,
            size: 3,
                cost: ResourceWallet::ZERO,
            max_workers: 0,
            produces: None,
            recruits: Some(UnitKind::Villager),
            required_node: None,
            needs_adjacent_tree: false,
            population_bonus: 0,
            upgradable: true,
            placeable: false,
        },
        BuildingKind::Farm => Blueprint {
            kind,
            size: 2,
            cost: ResourceWallet::new(50, 0, 50, 0),
            max_workers: 0,
            produces: None,
            recruits: None,
            required_node: None,
            needs_adjacent_tree: false,
            population_bonus: 5,
            upgradable: false,
            placeable: true,
        },
        BuildingKind::Barracks => Blueprint {
            kind,
            size: 3,
                cost: ResourceWallet::new(100, 50, 0, 0),
            max_workers: 0,
            produces: None,
            recruits: Some(UnitKind::Soldier),
            required_node: None,
            needs_adjacent_tree: false,
            population_bonus: 0,
            upgradable: false,
            placeable: true,
        },
        BuildingKind::GoldMine => mine(kind, NodeKind::Gold, ResourceKind::Gold),
        BuildingKind::StoneMine => mine(kind, NodeKind::Stone, ResourceKind::Stone),
        BuildingKind::MetalMine => mine(kind, NodeKind::Metal, ResourceKind::Metal),
        BuildingKind::LumberMill => Blueprint {
            kind,
            size: 3,
                cost: ResourceWallet::new(80, 20, 0, 0),
            max_workers: 4,
            produces: Some(ResourceKind::Wood),
            recruits: None,
            required_node: None,
            needs_adjacent_tree: true,
            population_bonus: 0,
            upgradable: false,
            placeable: true,
        },
    }
}

// ---------------------------------------------------------------------------
// Runtime state
// ---------------------------------------------------------------------------

/// Rate at which stationed workers produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductionRule {
    /// Production period.
    pub period_ms: u64,
    /// Units produced per worker per period.
    pub per_worker: u32,
}

/// A running recruitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecruitOrder {
    /// Unit being trained.
    pub unit: UnitKind,
    timer: ProgressTimer,
}

/// Everything that happened to a building during one advance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildingTick {
    /// Fields that changed, if any.
    pub patch: Option<BuildingPatch>,
    /// The upgrade finished on this advance.
    pub upgraded: bool,
    /// A recruitment finished on this advance.
    pub recruited: Option<UnitKind>,
    /// Production credited on this advance.
    pub produced: Option<Cargo>,
}

/// A completed building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Building identifier.
    pub id: BuildingId,
    /// Building kind.
    pub kind: BuildingKind,
    /// Top-left footprint tile.
    pub origin: TilePos,
    level: u8,
    upgrade: Option<ProgressTimer>,
    recruit: Option<RecruitOrder>,
    workers: u8,
    /// Created on first assignment and kept afterwards, idle at zero workers.
    production: Option<RepeatingTimer>,
}

impl Building {
    /// A level-1 building with no timers.
    pub const fn new(id: BuildingId, kind: BuildingKind, origin: TilePos) -> Self {
        Self {
            id,
            kind,
            origin,
            level: 1,
            upgrade: None,
            recruit: None,
            workers: 0,
            production: None,
        }
    }

    /// Static rules for this building.
    pub const fn blueprint(&self) -> Blueprint {
        blueprint(self.kind)
    }

    /// Footprint edge length.
    pub const fn size(&self) -> u8 {
        self.blueprint().size
    }

    /// Whether `tile` is part of the footprint.
    pub fn covers(&self, tile: TilePos) -> bool {
        Grid::footprint(self.origin, self.size()).any(|t| t == tile)
    }

    /// Current level.
    pub const fn level(&self) -> u8 {
        self.level
    }

    /// Whether an upgrade is running.
    pub const fn is_upgrading(&self) -> bool {
        self.upgrade.is_some()
    }

    /// Whether a recruitment is running.
    pub const fn is_recruiting(&self) -> bool {
        self.recruit.is_some()
    }

    /// Stationed workers.
    pub const fn workers(&self) -> u8 {
        self.workers
    }

    /// Whether the production timer has been created.
    pub const fn has_production_timer(&self) -> bool {
        self.production.is_some()
    }

    /// Check that an upgrade may start, without starting it.
    ///
    /// # Errors
    ///
    /// [`WorldError::NotUpgradable`], [`WorldError::AlreadyMaxLevel`] or
    /// [`WorldError::AlreadyUpgrading`].
    pub const fn check_upgrade(&self) -> Result<(), WorldError> {
        if !self.blueprint().upgradable {
            return Err(WorldError::NotUpgradable { kind: self.kind });
        }
        if self.level >= MAX_LEVEL {
            return Err(WorldError::AlreadyMaxLevel(self.id));
        }
        if self.upgrade.is_some() {
            return Err(WorldError::AlreadyUpgrading(self.id));
        }
        Ok(())
    }

    /// Start the upgrade timer.
    ///
    /// # Errors
    ///
    /// Any error from [`check_upgrade`](Self::check_upgrade), or
    /// [`WorldError::ZeroDuration`].
    pub fn start_upgrade(&mut self, duration_ms: u64) -> Result<BuildingPatch, WorldError> {
        self.check_upgrade()?;
        self.upgrade = Some(ProgressTimer::new(duration_ms)?);
        let mut patch = BuildingPatch::for_building(self.id);
        patch.is_upgrading = Some(true);
        patch.upgrade_progress = Some(0);
        Ok(patch)
    }

    /// Check that a recruitment may start and return the unit it would
    /// train.
    ///
    /// # Errors
    ///
    /// [`WorldError::CannotRecruit`] or [`WorldError::AlreadyRecruiting`].
    pub const fn check_recruit(&self) -> Result<UnitKind, WorldError> {
        let Some(unit) = self.blueprint().recruits else {
            return Err(WorldError::CannotRecruit { kind: self.kind });
        };
        if self.recruit.is_some() {
            return Err(WorldError::AlreadyRecruiting(self.id));
        }
        Ok(unit)
    }

    /// Start training a unit for `duration_ms`.
    ///
    /// # Errors
    ///
    /// Any error from [`check_recruit`](Self::check_recruit), or
    /// [`WorldError::ZeroDuration`].
    pub fn start_recruit(&mut self, duration_ms: u64) -> Result<BuildingPatch, WorldError> {
        let unit = self.check_recruit()?;
        self.recruit = Some(RecruitOrder {
            unit,
            timer: ProgressTimer::new(duration_ms)?,
        });
        let mut patch = BuildingPatch::for_building(self.id);
        patch.is_recruiting = Some(true);
        patch.recruit_progress = Some(0);
        Ok(patch)
    }

    /// Check that a worker slot is open.
    ///
    /// # Errors
    ///
    /// [`WorldError::NoWorkerSlots`] or [`WorldError::WorkersFull`].
    pub const fn check_assign(&self) -> Result<(), WorldError> {
        let max = self.blueprint().max_workers;
        if max == 0 {
            return Err(WorldError::NoWorkerSlots { kind: self.kind });
        }
        if self.workers >= max {
            return Err(WorldError::WorkersFull {
                building: self.id,
                max,
            });
        }
        Ok(())
    }

    /// Station one more worker, creating the production timer on first use.
    ///
    /// # Errors
    ///
    /// Any error from [`check_assign`](Self::check_assign), or
    /// [`WorldError::ZeroDuration`].
    pub fn assign_worker(&mut self, production_period_ms: u64) -> Result<BuildingPatch, WorldError> {
        self.check_assign()?;
        if self.production.is_none() {
            self.production = Some(RepeatingTimer::new(production_period_ms)?);
        }
        self.workers = self
            .workers
            .checked_add(1)
            .ok_or(WorldError::ArithmeticOverflow)?;
        Ok(self.workers_patch())
    }

    /// Release one worker. The production timer stays.
    ///
    /// # Errors
    ///
    /// [`WorldError::NoWorkers`] if the building is empty.
    pub fn unassign_worker(&mut self) -> Result<BuildingPatch, WorldError> {
        self.workers = self
            .workers
            .checked_sub(1)
            .ok_or(WorldError::NoWorkers(self.id))?;
        Ok(self.workers_patch())
    }

    fn workers_patch(&self) -> BuildingPatch {
        let mut patch = BuildingPatch::for_building(self.id);
        patch.assigned_villagers = Some(self.workers);
        patch
    }

    /// Advance every timer on this building by `dt_ms`.
    ///
    /// # Errors
    ///
    /// [`WorldError::ArithmeticOverflow`] if production output overflows.
    pub fn advance(&mut self, dt_ms: u64, rule: ProductionRule) -> Result<BuildingTick, WorldError> {
        let mut tick = BuildingTick::default();
        let mut patch = BuildingPatch::for_building(self.id);
        let mut dirty = false;

        if let Some(timer) = self.upgrade.as_mut() {
            let step = timer.advance(dt_ms);
            if step.changed {
                patch.upgrade_progress = Some(step.percent);
                dirty = true;
            }
            if step.finished {
                self.upgrade = None;
                self.level = MAX_LEVEL;
                patch.level = Some(self.level);
                patch.is_upgrading = Some(false);
                tick.upgraded = true;
                dirty = true;
            }
        }

        if let Some(order) = self.recruit.as_mut() {
            let step = order.timer.advance(dt_ms);
            if step.changed {
                patch.recruit_progress = Some(step.percent);
                dirty = true;
            }
            if step.finished {
                tick.recruited = Some(order.unit);
                self.recruit = None;
                patch.is_recruiting = Some(false);
                dirty = true;
            }
        }

        let produces = self.blueprint().produces;
        if let (Some(timer), Some(resource)) = (self.production.as_mut(), produces) {
            let fires = timer.advance(dt_ms);
            if fires > 0 && self.workers > 0 {
                let per_fire = rule
                    .per_worker
                    .checked_mul(u32::from(self.workers))
                    .ok_or(WorldError::ArithmeticOverflow)?;
                let fires = u32::try_from(fires).map_err(|_err| WorldError::ArithmeticOverflow)?;
                let amount = per_fire
                    .checked_mul(fires)
                    .ok_or(WorldError::ArithmeticOverflow)?;
                if amount > 0 {
                    tick.produced = Some(Cargo::new(resource, amount));
                }
            }
        }

        if dirty {
            tick.patch = Some(patch);
        }
        Ok(tick)
    }

    /// Full state for the inspector.
    pub fn snapshot(&self) -> BuildingSnapshot {
        BuildingSnapshot {
            id: self.id,
            kind: self.kind,
            origin: self.origin,
            size: self.size(),
            level: self.level,
            is_upgrading: self.is_upgrading(),
            upgrade_progress: self.upgrade.map_or(0, |t| t.percent()),
            is_recruiting: self.is_recruiting(),
            recruit_progress: self.recruit.map_or(0, |r| r.timer.percent()),
            assigned_villagers: self.workers,
            max_workers: self.blueprint().max_workers,
        }
    }
}
