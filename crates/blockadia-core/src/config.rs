//! Configuration loading and typed config structures for the Blockadia
//! simulation.
//!
//! The canonical configuration lives in `blockadia-config.yaml` at the
//! project root. Every field has a default, so a partial file (or no file at
//! all) yields a playable world.

use std::path::Path;

use serde::Deserialize;

use blockadia_types::{BuildingKind, NodeKind, ResourceWallet, UnitKind};
use blockadia_world::{ClusterSpec, GenerationParams, Grid};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `blockadia-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Grid size, seed and tick length.
    #[serde(default)]
    pub world: WorldConfig,

    /// Resource cluster generation.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Starting wallet, costs and production rates.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Unit speeds, gathering and search radii.
    #[serde(default)]
    pub units: UnitsConfig,

    /// Population caps.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Headless run bounds.
    #[serde(default)]
    pub simulation: RunConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Grid geometry from the `world` section.
    pub fn grid(&self) -> Grid {
        Grid::new(self.world.width, self.world.height, self.world.tile_size)
    }

    /// Generation inputs from the `generation` section.
    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            clusters: self.generation.clusters.clone(),
            margin: self.generation.margin,
            node_quantity: self.generation.node_quantity,
            village_clearance: self.generation.village_clearance,
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Random seed for generation and identifiers.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Grid columns.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid rows.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Pixels per tile edge.
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    /// Simulated milliseconds per engine tick.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            width: default_width(),
            height: default_height(),
            tile_size: default_tile_size(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Resource cluster generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationConfig {
    /// Cluster families, placed in order.
    #[serde(default = "default_clusters")]
    pub clusters: Vec<ClusterSpec>,

    /// Cluster centres stay this far from the map edge.
    #[serde(default = "default_margin")]
    pub margin: u32,

    /// Starting quantity of every node.
    #[serde(default = "default_node_quantity")]
    pub node_quantity: u32,

    /// Minimum distance between nodes and the village footprint.
    #[serde(default = "default_village_clearance")]
    pub village_clearance: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            clusters: default_clusters(),
            margin: default_margin(),
            node_quantity: default_node_quantity(),
            village_clearance: default_village_clearance(),
        }
    }
}

/// Costs charged by the simulation itself for recruitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RecruitCosts {
    /// Cost of training a villager.
    #[serde(default = "default_villager_cost")]
    pub villager: ResourceWallet,

    /// Cost of training a soldier.
    #[serde(default = "default_soldier_cost")]
    pub soldier: ResourceWallet,
}

impl RecruitCosts {
    /// Cost for one unit kind.
    pub const fn for_unit(&self, kind: UnitKind) -> ResourceWallet {
        match kind {
            UnitKind::Villager => self.villager,
            UnitKind::Soldier => self.soldier,
        }
    }
}

impl Default for RecruitCosts {
    fn default() -> Self {
        Self {
            villager: default_villager_cost(),
            soldier: default_soldier_cost(),
        }
    }
}

/// Training time per unit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RecruitTimes {
    /// Villager training time.
    #[serde(default = "default_villager_recruit_ms")]
    pub villager: u64,

    /// Soldier training time.
    #[serde(default = "default_soldier_recruit_ms")]
    pub soldier: u64,
}

impl RecruitTimes {
    /// Training time for one unit kind.
    pub const fn for_unit(&self, kind: UnitKind) -> u64 {
        match kind {
            UnitKind::Villager => self.villager,
            UnitKind::Soldier => self.soldier,
        }
    }
}

impl Default for RecruitTimes {
    fn default() -> Self {
        Self {
            villager: default_villager_recruit_ms(),
            soldier: default_soldier_recruit_ms(),
        }
    }
}

/// Construction time per placeable building kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BuildTimes {
    /// Farm construction time.
    #[serde(default = "default_farm_build_ms")]
    pub farm: u64,

    /// Barracks construction time.
    #[serde(default = "default_build_ms")]
    pub barracks: u64,

    /// Gold mine construction time.
    #[serde(default = "default_build_ms")]
    pub gold_mine: u64,

    /// Stone mine construction time.
    #[serde(default = "default_build_ms")]
    pub stone_mine: u64,

    /// Metal mine construction time.
    #[serde(default = "default_build_ms")]
    pub metal_mine: u64,

    /// Lumber mill construction time.
    #[serde(default = "default_build_ms")]
    pub lumber_mill: u64,
}

impl BuildTimes {
    /// Construction time for a kind. The village is never built, so it has
    /// none.
    pub const fn for_kind(&self, kind: BuildingKind) -> u64 {
        match kind {
            BuildingKind::Village => 0,
            BuildingKind::Farm => self.farm,
            BuildingKind::Barracks => self.barracks,
            BuildingKind::GoldMine => self.gold_mine,
            BuildingKind::StoneMine => self.stone_mine,
            BuildingKind::MetalMine => self.metal_mine,
            BuildingKind::LumberMill => self.lumber_mill,
        }
    }

    /// Every placeable kind with its time, in build-menu order.
    pub const fn entries(&self) -> [(&'static str, u64); 6] {
        [
            ("farm", self.farm),
            ("barracks", self.barracks),
            ("gold_mine", self.gold_mine),
            ("stone_mine", self.stone_mine),
            ("metal_mine", self.metal_mine),
            ("lumber_mill", self.lumber_mill),
        ]
    }
}

impl Default for BuildTimes {
    fn default() -> Self {
        let other = default_build_ms();
        Self {
            farm: default_farm_build_ms(),
            barracks: other,
            gold_mine: other,
            stone_mine: other,
            metal_mine: other,
            lumber_mill: other,
        }
    }
}

/// Economy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Wallet at world creation.
    #[serde(default = "default_starting_wallet")]
    pub starting_wallet: ResourceWallet,

    /// Cost of the village upgrade.
    #[serde(default = "default_upgrade_cost")]
    pub upgrade_cost: ResourceWallet,

    /// Duration of the village upgrade.
    #[serde(default = "default_upgrade_ms")]
    pub upgrade_ms: u64,

    /// Recruitment costs per unit kind.
    #[serde(default)]
    pub recruit_costs: RecruitCosts,

    /// Recruitment times per unit kind.
    #[serde(default)]
    pub recruit_ms: RecruitTimes,

    /// Construction times per building kind.
    #[serde(default)]
    pub build_ms: BuildTimes,

    /// Passive production period.
    #[serde(default = "default_production_period_ms")]
    pub production_period_ms: u64,

    /// Units produced per stationed worker per period.
    #[serde(default = "default_production_per_worker")]
    pub production_per_worker: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_wallet: default_starting_wallet(),
            upgrade_cost: default_upgrade_cost(),
            upgrade_ms: default_upgrade_ms(),
            recruit_costs: RecruitCosts::default(),
            recruit_ms: RecruitTimes::default(),
            build_ms: BuildTimes::default(),
            production_period_ms: default_production_period_ms(),
            production_per_worker: default_production_per_worker(),
        }
    }
}

/// Unit behaviour parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UnitsConfig {
    /// Villager walking speed in pixels per second.
    #[serde(default = "default_villager_speed")]
    pub villager_speed: f32,

    /// Soldier walking speed in pixels per second.
    #[serde(default = "default_soldier_speed")]
    pub soldier_speed: f32,

    /// Dwell time at a node before the load is ready.
    #[serde(default = "default_gather_ms")]
    pub gather_ms: u64,

    /// Units carried per trip.
    #[serde(default = "default_cargo_amount")]
    pub cargo_amount: u32,

    /// Villagers placed next to the village at start.
    #[serde(default = "default_initial_villagers")]
    pub initial_villagers: u32,

    /// Ring radius searched for a tile to drop redirected cargo on.
    #[serde(default = "default_drop_search_radius")]
    pub drop_search_radius: u32,

    /// Ring radius searched around a building for a spawn tile.
    #[serde(default = "default_spawn_search_radius")]
    pub spawn_search_radius: u32,
}

impl UnitsConfig {
    /// Walking speed for a unit kind.
    pub const fn speed(&self, kind: UnitKind) -> f32 {
        match kind {
            UnitKind::Villager => self.villager_speed,
            UnitKind::Soldier => self.soldier_speed,
        }
    }
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            villager_speed: default_villager_speed(),
            soldier_speed: default_soldier_speed(),
            gather_ms: default_gather_ms(),
            cargo_amount: default_cargo_amount(),
            initial_villagers: default_initial_villagers(),
            drop_search_radius: default_drop_search_radius(),
            spawn_search_radius: default_spawn_search_radius(),
        }
    }
}

/// Population caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PopulationConfig {
    /// Population cap before any farm is built.
    #[serde(default = "default_initial_cap")]
    pub initial_cap: u32,

    /// Hard ceiling on units, regardless of farms.
    #[serde(default = "default_unit_cap")]
    pub unit_cap: u32,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            initial_cap: default_initial_cap(),
            unit_cap: default_unit_cap(),
        }
    }
}

/// Headless engine run bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stop after this many ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Sleep between ticks to match wall-clock time.
    #[serde(default)]
    pub realtime: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
            realtime: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

const fn default_width() -> u32 {
    80
}

const fn default_height() -> u32 {
    60
}

const fn default_tile_size() -> u32 {
    32
}

const fn default_tick_interval_ms() -> u64 {
    100
}

fn default_clusters() -> Vec<ClusterSpec> {
    vec![
        ClusterSpec {
            kind: NodeKind::Tree,
            clusters: 8,
            nodes_per_cluster: 12,
            spread: 3,
        },
        ClusterSpec {
            kind: NodeKind::Stone,
            clusters: 3,
            nodes_per_cluster: 5,
            spread: 2,
        },
        ClusterSpec {
            kind: NodeKind::Gold,
            clusters: 3,
            nodes_per_cluster: 4,
            spread: 2,
        },
        ClusterSpec {
            kind: NodeKind::Metal,
            clusters: 3,
            nodes_per_cluster: 4,
            spread: 2,
        },
    ]
}

const fn default_margin() -> u32 {
    3
}

const fn default_node_quantity() -> u32 {
    1000
}

const fn default_village_clearance() -> u32 {
    2
}

const fn default_starting_wallet() -> ResourceWallet {
    ResourceWallet::new(200, 100, 100, 50)
}

const fn default_upgrade_cost() -> ResourceWallet {
    ResourceWallet::new(100, 100, 50, 0)
}

const fn default_upgrade_ms() -> u64 {
    10_000
}

const fn default_villager_cost() -> ResourceWallet {
    ResourceWallet::new(30, 0, 20, 0)
}

const fn default_soldier_cost() -> ResourceWallet {
    ResourceWallet::new(0, 0, 30, 20)
}

const fn default_villager_recruit_ms() -> u64 {
    2_000
}

const fn default_soldier_recruit_ms() -> u64 {
    3_000
}

const fn default_farm_build_ms() -> u64 {
    7_000
}

const fn default_build_ms() -> u64 {
    10_000
}

const fn default_production_period_ms() -> u64 {
    2_000
}

const fn default_production_per_worker() -> u32 {
    2
}

const fn default_villager_speed() -> f32 {
    200.0
}

const fn default_soldier_speed() -> f32 {
    250.0
}

const fn default_gather_ms() -> u64 {
    1_000
}

const fn default_cargo_amount() -> u32 {
    10
}

const fn default_initial_villagers() -> u32 {
    1
}

const fn default_drop_search_radius() -> u32 {
    2
}

const fn default_spawn_search_radius() -> u32 {
    3
}

const fn default_initial_cap() -> u32 {
    5
}

const fn default_unit_cap() -> u32 {
    20
}

const fn default_max_ticks() -> u64 {
    3_000
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_values() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 80);
        assert_eq!(config.world.height, 60);
        assert_eq!(config.world.tile_size, 32);
        assert_eq!(
            config.economy.starting_wallet,
            ResourceWallet::new(200, 100, 100, 50)
        );
        assert_eq!(config.units.cargo_amount, 10);
        assert_eq!(config.population.unit_cap, 20);
        assert_eq!(config.generation.clusters.len(), 4);
    }

    #[test]
    fn parse_partial_yaml_fills_defaults() {
        let yaml = r"
world:
  seed: 7
economy:
  starting_wallet:
    wood: 500
units:
  villager_speed: 400.0
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.width, 80);
        assert_eq!(config.economy.starting_wallet, ResourceWallet::new(500, 0, 0, 0));
        assert!((config.units.villager_speed - 400.0).abs() < f32::EPSILON);
        assert_eq!(config.units.gather_ms, 1_000);
        assert_eq!(config.economy.recruit_costs.soldier, ResourceWallet::new(0, 0, 30, 20));
    }

    #[test]
    fn timings_default_and_override() {
        let defaults = EconomyConfig::default();
        assert_eq!(defaults.build_ms.for_kind(BuildingKind::Farm), 7_000);
        assert_eq!(defaults.build_ms.for_kind(BuildingKind::LumberMill), 10_000);
        assert_eq!(defaults.recruit_ms.for_unit(UnitKind::Villager), 2_000);
        assert_eq!(defaults.recruit_ms.for_unit(UnitKind::Soldier), 3_000);

        let yaml = r"
economy:
  recruit_ms:
    soldier: 1500
  build_ms:
    farm: 3000
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.economy.recruit_ms.soldier, 1_500);
        assert_eq!(config.economy.recruit_ms.villager, 2_000);
        assert_eq!(config.economy.build_ms.farm, 3_000);
        assert_eq!(config.economy.build_ms.barracks, 10_000);
    }

    #[test]
    fn parse_cluster_list() {
        let yaml = r"
generation:
  clusters:
    - kind: gold
      clusters: 1
      nodes_per_cluster: 3
      spread: 1
";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.generation.clusters.len(), 1);
        assert_eq!(
            config.generation.clusters.first().map(|c| c.kind),
            Some(NodeKind::Gold)
        );
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let config = SimulationConfig::parse(include_str!("../../../blockadia-config.yaml")).unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = SimulationConfig::parse("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(matches!(
            SimulationConfig::parse("world: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = SimulationConfig::from_file(Path::new("/nonexistent/blockadia.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
