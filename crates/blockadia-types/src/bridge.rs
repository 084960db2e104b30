//! The command/notification contract between the simulation and the UI.
//!
//! Both directions are plain tagged JSON objects:
//!
//! ```json
//! { "type": "requestUpgrade", "payload": { "buildingId": "..." } }
//! { "type": "resourceUpdate", "payload": { "wood": 210, "stone": 100, "gold": 100, "metal": 50 } }
//! ```
//!
//! Variant names serialize in `camelCase` so they match the event names the
//! presentation layer listens for.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingKind, Language, ResourceKind, UnitKind};
use crate::ids::{BuildingId, NodeId, SiteId, UnitId};
use crate::structs::{
    BuildingPatch, BuildingSnapshot, ConstructionSnapshot, GhostPreview, PopulationSnapshot,
    ResourceSelection, ResourceWallet, TilePos, UnitSelection,
};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Payload for commands addressed to one building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BuildingTarget {
    /// The building the command applies to.
    pub building_id: BuildingId,
}

/// Payload for pointer commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PointerTarget {
    /// Tile under the pointer.
    pub tile: TilePos,
}

/// A command issued by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Manually spawn a villager next to the village.
    SpawnVillager,
    /// Switch the in-world label language.
    LanguageChange(Language),
    /// Debit the wallet.
    SpendResources(ResourceWallet),
    /// Start the upgrade timer on a building.
    RequestUpgrade(BuildingTarget),
    /// Start the recruit timer on a building.
    RequestRecruit(BuildingTarget),
    /// Begin placing a building; the payload is the build-menu key.
    EnterBuildMode(String),
    /// Leave build mode without placing.
    CancelBuildMode,
    /// Station an idle villager inside a building.
    AssignVillager(BuildingTarget),
    /// Release a stationed worker back onto the map.
    UnassignVillager(BuildingTarget),
    /// Primary click on a tile.
    ClickTile(PointerTarget),
    /// Pointer moved over a tile.
    PointerMove(PointerTarget),
}

impl Command {
    /// Parse an inbound bridge message.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The wire name of this command, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SpawnVillager => "spawnVillager",
            Self::LanguageChange(_) => "languageChange",
            Self::SpendResources(_) => "spendResources",
            Self::RequestUpgrade(_) => "requestUpgrade",
            Self::RequestRecruit(_) => "requestRecruit",
            Self::EnterBuildMode(_) => "enterBuildMode",
            Self::CancelBuildMode => "cancelBuildMode",
            Self::AssignVillager(_) => "assignVillager",
            Self::UnassignVillager(_) => "unassignVillager",
            Self::ClickTile(_) => "clickTile",
            Self::PointerMove(_) => "pointerMove",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A resource node was exhausted and removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NodeDepleted {
    /// The removed node.
    pub node_id: NodeId,
    /// The tile it freed.
    pub tile: TilePos,
}

/// A transient "+N" indicator above a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FloatingText {
    /// Where the indicator appears.
    pub tile: TilePos,
    /// Text to show.
    pub text: String,
    /// Resource the amount refers to, used for colouring.
    pub resource: Option<ResourceKind>,
}

/// One-shot effect played when a building finishes its upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Celebration {
    /// The upgraded building.
    pub building_id: BuildingId,
    /// Its new level.
    pub level: u8,
}

/// Construction site progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ConstructionProgress {
    /// The site.
    pub site_id: SiteId,
    /// Progress in percent.
    pub progress: u8,
}

/// A construction site turned into a building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ConstructionCompleted {
    /// The site that was removed.
    pub site_id: SiteId,
    /// The building that replaced it.
    pub building: BuildingSnapshot,
}

/// Current build-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildModeState {
    /// Kind being placed, or `None` when build mode is off.
    pub kind: Option<BuildingKind>,
    /// Ghost under the pointer, once the pointer has moved.
    pub ghost: Option<GhostPreview>,
}

/// A new unit appeared on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UnitSpawned {
    /// The unit.
    pub id: UnitId,
    /// Villager or soldier.
    pub kind: UnitKind,
    /// Tile it spawned on.
    pub tile: TilePos,
}

/// A state change published to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// Full wallet after any credit or debit.
    ResourceUpdate(ResourceWallet),
    /// Population counters after any change.
    PopulationUpdate(PopulationSnapshot),
    /// A building was clicked; open its inspector.
    OpenVillageModal(BuildingSnapshot),
    /// Partial building state keyed by id.
    BuildingUpdate(BuildingPatch),
    /// Resource inspector contents, or `None` when cleared.
    ResourceSelection(Option<ResourceSelection>),
    /// Unit inspector contents, or `None` when cleared.
    UnitSelection(Option<UnitSelection>),
    /// A node was exhausted.
    NodeDepleted(NodeDepleted),
    /// Floating indicator.
    FloatingText(FloatingText),
    /// Upgrade celebration.
    Celebration(Celebration),
    /// A construction site was placed.
    ConstructionStarted(ConstructionSnapshot),
    /// A construction site advanced.
    ConstructionProgress(ConstructionProgress),
    /// A construction site completed.
    ConstructionCompleted(ConstructionCompleted),
    /// Build mode entered, left, or its ghost moved.
    BuildModeChanged(BuildModeState),
    /// A unit was spawned.
    UnitSpawned(UnitSpawned),
}

impl Notification {
    /// The wire name of this notification, for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ResourceUpdate(_) => "resourceUpdate",
            Self::PopulationUpdate(_) => "populationUpdate",
            Self::OpenVillageModal(_) => "openVillageModal",
            Self::BuildingUpdate(_) => "buildingUpdate",
            Self::ResourceSelection(_) => "resourceSelection",
            Self::UnitSelection(_) => "unitSelection",
            Self::NodeDepleted(_) => "nodeDepleted",
            Self::FloatingText(_) => "floatingText",
            Self::Celebration(_) => "celebration",
            Self::ConstructionStarted(_) => "constructionStarted",
            Self::ConstructionProgress(_) => "constructionProgress",
            Self::ConstructionCompleted(_) => "constructionCompleted",
            Self::BuildModeChanged(_) => "buildModeChanged",
            Self::UnitSpawned(_) => "unitSpawned",
        }
    }

    /// Serialize for the outbound channel.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unit_command() {
        let cmd = Command::from_json(r#"{"type":"spawnVillager"}"#);
        assert_eq!(cmd.ok(), Some(Command::SpawnVillager));
    }

    #[test]
    fn parses_building_command() {
        let raw = r#"{"type":"requestUpgrade","payload":{"buildingId":"67e55044-10b1-426f-9247-bb680e5fe0c8"}}"#;
        let cmd = Command::from_json(raw);
        assert!(matches!(cmd, Ok(Command::RequestUpgrade(_))));
    }

    #[test]
    fn parses_spend_and_build_mode() {
        let spend = Command::from_json(r#"{"type":"spendResources","payload":{"wood":50,"gold":50}}"#);
        assert_eq!(
            spend.ok(),
            Some(Command::SpendResources(ResourceWallet::new(50, 0, 50, 0)))
        );
        let build = Command::from_json(r#"{"type":"enterBuildMode","payload":"farm"}"#);
        assert_eq!(build.ok(), Some(Command::EnterBuildMode("farm".to_owned())));
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Command::from_json(r#"{"type":"demolish"}"#).is_err());
    }

    #[test]
    fn notification_tag_matches_name() {
        let note = Notification::ResourceUpdate(ResourceWallet::new(1, 2, 3, 4));
        let value: Option<serde_json::Value> =
            note.to_json().ok().and_then(|s| serde_json::from_str(&s).ok());
        let tag = value
            .as_ref()
            .and_then(|v| v.get("type"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(tag, Some(note.name()));
    }

    #[test]
    fn cleared_selection_serializes_null_payload() {
        let note = Notification::ResourceSelection(None);
        let json = note.to_json().ok();
        assert_eq!(
            json.as_deref(),
            Some(r#"{"type":"resourceSelection","payload":null}"#)
        );
    }
}
