//! Read-only render snapshot.
//!
//! [`Simulation::view`] collects everything a renderer draws each frame,
//! with in-world labels already translated into the active language.

use blockadia_types::{
    BuildModeState, BuildingSnapshot, Cargo, ConstructionSnapshot, DropId, NodeId, NodeKind,
    PopulationSnapshot, ResourceWallet, TilePos, UnitActivity, UnitId, UnitKind, WorldPoint,
};
use blockadia_world::Building;
use serde::Serialize;

use crate::labels::{self, LabelKey};
use crate::simulation::Simulation;
use crate::unit::Unit;

/// A unit as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitView {
    /// Unit identifier.
    pub id: UnitId,
    /// Villager or soldier.
    pub kind: UnitKind,
    /// Pixel position.
    pub position: WorldPoint,
    /// Current activity.
    pub activity: UnitActivity,
    /// Load carried.
    pub cargo: Option<Cargo>,
    /// Status label above the unit.
    pub label: Option<&'static str>,
}

/// A resource node as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    /// Node identifier.
    pub id: NodeId,
    /// Node kind.
    pub kind: NodeKind,
    /// Tile.
    pub tile: TilePos,
    /// Units left.
    pub remaining: u32,
}

/// A dropped resource as drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropView {
    /// Drop identifier.
    pub id: DropId,
    /// Tile.
    pub tile: TilePos,
    /// The pile.
    pub cargo: Cargo,
}

/// A completed building as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingView {
    /// Building state.
    #[serde(flatten)]
    pub snapshot: BuildingSnapshot,
    /// Pixel centre of the footprint, where the label is anchored.
    pub center: WorldPoint,
    /// Status label above the building.
    pub label: Option<&'static str>,
}

/// A construction site as drawn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteView {
    /// Site state.
    #[serde(flatten)]
    pub snapshot: ConstructionSnapshot,
    /// Pixel centre of the footprint.
    pub center: WorldPoint,
    /// Status label above the site.
    pub label: &'static str,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldView {
    /// Tick counter.
    pub tick: u64,
    /// Simulated time.
    pub now_ms: u64,
    /// Resource counters.
    pub wallet: ResourceWallet,
    /// HUD population.
    pub population: PopulationSnapshot,
    /// Roaming units.
    pub units: Vec<UnitView>,
    /// Resource nodes.
    pub nodes: Vec<NodeView>,
    /// Dropped resources.
    pub drops: Vec<DropView>,
    /// Completed buildings.
    pub buildings: Vec<BuildingView>,
    /// Construction sites.
    pub sites: Vec<SiteView>,
    /// Build mode and ghost.
    pub build_mode: BuildModeState,
}

impl Simulation {
    /// Snapshot the world for rendering.
    pub fn view(&self) -> WorldView {
        let language = self.language;
        let grid = self.world.grid();
        WorldView {
            tick: self.clock.tick(),
            now_ms: self.clock.now_ms(),
            wallet: self.ledger.wallet(),
            population: self.population(),
            units: self
                .units
                .values()
                .map(|unit| UnitView {
                    id: unit.id,
                    kind: unit.kind(),
                    position: unit.position,
                    activity: unit.activity(),
                    cargo: unit.cargo(),
                    label: self
                        .unit_label(unit)
                        .map(|key| labels::text(key, language)),
                })
                .collect(),
            nodes: self
                .world
                .nodes()
                .iter()
                .map(|node| NodeView {
                    id: node.id,
                    kind: node.kind,
                    tile: node.tile,
                    remaining: node.quantity,
                })
                .collect(),
            drops: self
                .world
                .drops()
                .iter()
                .map(|pile| DropView {
                    id: pile.id,
                    tile: pile.tile,
                    cargo: pile.cargo,
                })
                .collect(),
            buildings: self
                .world
                .buildings()
                .map(|building| BuildingView {
                    snapshot: building.snapshot(),
                    center: grid.footprint_center(building.origin, building.size()),
                    label: building_label(building).map(|key| labels::text(key, language)),
                })
                .collect(),
            sites: self
                .world
                .sites()
                .map(|site| SiteView {
                    snapshot: site.snapshot(),
                    center: grid.footprint_center(site.origin, site.size()),
                    label: labels::text(LabelKey::Building, language),
                })
                .collect(),
            build_mode: BuildModeState {
                kind: self.build_mode.map(|m| m.kind),
                ghost: self.build_mode.and_then(|m| m.ghost),
            },
        }
    }

    fn unit_label(&self, unit: &Unit) -> Option<LabelKey> {
        if unit.activity() != UnitActivity::Gathering {
            return None;
        }
        let node = self.world.node(unit.target_node()?)?;
        Some(if node.kind == NodeKind::Tree {
            LabelKey::Chopping
        } else {
            LabelKey::Mining
        })
    }
}

fn building_label(building: &Building) -> Option<LabelKey> {
    if building.is_recruiting() {
        Some(LabelKey::Training)
    } else if building.is_upgrading() {
        Some(LabelKey::Building)
    } else if building.workers() > 0 {
        Some(LabelKey::Working)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use blockadia_types::Language;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::error::SimError;

    fn bare() -> Simulation {
        let mut config = SimulationConfig::default();
        config.generation.clusters.clear();
        Simulation::new(config).unwrap()
    }

    #[test]
    fn view_lists_village_and_villager() {
        let sim = bare();
        let view = sim.view();
        assert_eq!(view.buildings.len(), 1);
        assert_eq!(view.units.len(), 1);
        assert!(view.nodes.is_empty());
        assert_eq!(view.build_mode.kind, None);
    }

    #[test]
    fn building_center_sits_mid_footprint() {
        let sim = bare();
        let view = sim.view();
        let village = view.buildings.first().unwrap();
        assert_eq!(village.center, sim.grid().tile_center(TilePos::new(40, 30)));
    }

    #[test]
    fn site_label_follows_language() -> Result<(), SimError> {
        let mut sim = bare();
        sim.enter_build_mode("farm")?;
        sim.confirm_placement(TilePos::new(5, 5))?;
        sim.language = Language::De;
        let view = sim.view();
        assert_eq!(view.sites.first().map(|s| s.label), Some("Bauarbeiten..."));
        Ok(())
    }

    #[test]
    fn view_serializes_camel_case() {
        let sim = bare();
        let json = serde_json::to_value(sim.view()).unwrap();
        assert!(json.get("nowMs").is_some());
        assert!(json.get("buildMode").is_some());
    }
}
