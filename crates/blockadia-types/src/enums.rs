//! Enumeration types for the Blockadia simulation.
//!
//! Serialized names are the lowercase / `snake_case` strings the UI sends and
//! receives (`"gold_mine"`, `"wood"`, `"pl"`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// One of the four counters in the settlement wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// Lumber from trees.
    Wood,
    /// Quarried stone.
    Stone,
    /// Gold ore.
    Gold,
    /// Iron ore.
    Metal,
}

impl ResourceKind {
    /// All resource kinds in wallet order.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Stone, Self::Gold, Self::Metal];
}

/// The kind of a depletable resource node placed on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NodeKind {
    /// A single tree; forests are clusters of these.
    Tree,
    /// A stone deposit.
    Stone,
    /// A gold deposit.
    Gold,
    /// An iron deposit.
    Metal,
}

impl NodeKind {
    /// The wallet resource a villager carries away from this node.
    pub const fn yields(self) -> ResourceKind {
        match self {
            Self::Tree => ResourceKind::Wood,
            Self::Stone => ResourceKind::Stone,
            Self::Gold => ResourceKind::Gold,
            Self::Metal => ResourceKind::Metal,
        }
    }
}

// ---------------------------------------------------------------------------
// Buildings
// ---------------------------------------------------------------------------

/// Every building the settlement can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildingKind {
    /// The town hall present from the first tick. Upgradable to level 2.
    Village,
    /// Raises the population cap.
    Farm,
    /// Recruits soldiers.
    Barracks,
    /// Produces gold from assigned workers. Must sit on a gold deposit.
    GoldMine,
    /// Produces stone from assigned workers. Must sit on a stone deposit.
    StoneMine,
    /// Produces metal from assigned workers. Must sit on an iron deposit.
    MetalMine,
    /// Produces wood from assigned workers. Must stand next to trees.
    LumberMill,
}

impl BuildingKind {
    /// Parse the build-menu string used by the UI (`"lumber_mill"` etc.).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "village" => Some(Self::Village),
            "farm" => Some(Self::Farm),
            "barracks" => Some(Self::Barracks),
            "gold_mine" => Some(Self::GoldMine),
            "stone_mine" => Some(Self::StoneMine),
            "metal_mine" => Some(Self::MetalMine),
            "lumber_mill" => Some(Self::LumberMill),
            _ => None,
        }
    }

    /// The build-menu string for this kind.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Village => "village",
            Self::Farm => "farm",
            Self::Barracks => "barracks",
            Self::GoldMine => "gold_mine",
            Self::StoneMine => "stone_mine",
            Self::MetalMine => "metal_mine",
            Self::LumberMill => "lumber_mill",
        }
    }
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// The two unit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UnitKind {
    /// Gathers resources and staffs production buildings.
    Villager,
    /// Movement-only military unit.
    Soldier,
}

/// What a unit is doing, as reported to the UI.
///
/// Villagers use `Idle`, `Walking`, `Gathering` and `Returning`. Soldiers use
/// `Idle` and `Walking`; `Attacking` is reserved for combat and never
/// produced by the current state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum UnitActivity {
    /// Standing still with no task.
    Idle,
    /// Moving toward a tile, node or dropped resource.
    Walking,
    /// Working a resource node.
    Gathering,
    /// Carrying cargo back to the village.
    Returning,
    /// Reserved.
    Attacking,
}

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Language used for in-world text labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Polish.
    Pl,
    /// German.
    De,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_yields_matching_resource() {
        assert_eq!(NodeKind::Tree.yields(), ResourceKind::Wood);
        assert_eq!(NodeKind::Metal.yields(), ResourceKind::Metal);
    }

    #[test]
    fn building_keys_roundtrip() {
        for kind in [
            BuildingKind::Village,
            BuildingKind::Farm,
            BuildingKind::Barracks,
            BuildingKind::GoldMine,
            BuildingKind::StoneMine,
            BuildingKind::MetalMine,
            BuildingKind::LumberMill,
        ] {
            assert_eq!(BuildingKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(BuildingKind::from_key("castle"), None);
    }

    #[test]
    fn serde_names_match_keys() {
        let json = serde_json::to_string(&BuildingKind::LumberMill).ok();
        assert_eq!(json.as_deref(), Some("\"lumber_mill\""));
        let lang: Result<Language, _> = serde_json::from_str("\"de\"");
        assert_eq!(lang.ok(), Some(Language::De));
    }
}
