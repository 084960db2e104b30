//! Core value types shared by every crate and by the UI.
//!
//! Positions come in two flavours: [`TilePos`] is the logical grid cell used
//! for occupancy and placement, [`WorldPoint`] is the continuous pixel-space
//! position a unit occupies while it moves between tile centres.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{BuildingKind, NodeKind, ResourceKind, UnitActivity, UnitKind};
use crate::ids::{BuildingId, DropId, NodeId, SiteId, UnitId};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A single cell of the world grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct TilePos {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl TilePos {
    /// Create a tile coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the tile shifted by `(dx, dy)`, saturating at the `i32` range.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The four cardinal neighbours in the order left, right, up, down.
    pub const fn cardinal_neighbors(self) -> [Self; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// Chebyshev (king-move) distance to another tile.
    pub const fn chebyshev(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

impl core::fmt::Display for TilePos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A continuous position in pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldPoint {
    /// Horizontal pixel coordinate.
    pub x: f32,
    /// Vertical pixel coordinate.
    pub y: f32,
}

impl WorldPoint {
    /// Create a point.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Self) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation toward `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet
// ---------------------------------------------------------------------------

/// The settlement's four resource counters.
///
/// Also used as an "amounts" bundle for costs and credits. All arithmetic is
/// checked: a subtraction that would underflow any counter yields `None`
/// instead of a negative or wrapped value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceWallet {
    /// Wood counter.
    pub wood: u32,
    /// Stone counter.
    pub stone: u32,
    /// Gold counter.
    pub gold: u32,
    /// Metal counter.
    pub metal: u32,
}

impl ResourceWallet {
    /// A wallet with every counter at zero.
    pub const ZERO: Self = Self {
        wood: 0,
        stone: 0,
        gold: 0,
        metal: 0,
    };

    /// Create a wallet from explicit counters.
    pub const fn new(wood: u32, stone: u32, gold: u32, metal: u32) -> Self {
        Self {
            wood,
            stone,
            gold,
            metal,
        }
    }

    /// A bundle holding `amount` of a single resource.
    pub const fn single(kind: ResourceKind, amount: u32) -> Self {
        match kind {
            ResourceKind::Wood => Self::new(amount, 0, 0, 0),
            ResourceKind::Stone => Self::new(0, amount, 0, 0),
            ResourceKind::Gold => Self::new(0, 0, amount, 0),
            ResourceKind::Metal => Self::new(0, 0, 0, amount),
        }
    }

    /// Read one counter.
    pub const fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Wood => self.wood,
            ResourceKind::Stone => self.stone,
            ResourceKind::Gold => self.gold,
            ResourceKind::Metal => self.metal,
        }
    }

    /// Whether every counter is zero.
    pub const fn is_empty(&self) -> bool {
        self.wood == 0 && self.stone == 0 && self.gold == 0 && self.metal == 0
    }

    /// Whether this wallet holds at least `cost` of every resource.
    pub const fn covers(&self, cost: &Self) -> bool {
        self.wood >= cost.wood
            && self.stone >= cost.stone
            && self.gold >= cost.gold
            && self.metal >= cost.metal
    }

    /// The first resource for which this wallet falls short of `cost`.
    pub fn first_shortfall(&self, cost: &Self) -> Option<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind) < cost.get(*kind))
    }

    /// Counter-wise addition; `None` on overflow.
    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        Some(Self {
            wood: self.wood.checked_add(other.wood)?,
            stone: self.stone.checked_add(other.stone)?,
            gold: self.gold.checked_add(other.gold)?,
            metal: self.metal.checked_add(other.metal)?,
        })
    }

    /// Counter-wise subtraction; `None` if any counter would go negative.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        Some(Self {
            wood: self.wood.checked_sub(other.wood)?,
            stone: self.stone.checked_sub(other.stone)?,
            gold: self.gold.checked_sub(other.gold)?,
            metal: self.metal.checked_sub(other.metal)?,
        })
    }
}

/// Resources carried by a single villager or lying on the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cargo {
    /// What is carried.
    pub kind: ResourceKind,
    /// How much.
    pub amount: u32,
}

impl Cargo {
    /// Create a cargo bundle.
    pub const fn new(kind: ResourceKind, amount: u32) -> Self {
        Self { kind, amount }
    }

    /// The cargo expressed as a wallet credit.
    pub const fn as_wallet(&self) -> ResourceWallet {
        ResourceWallet::single(self.kind, self.amount)
    }
}

// ---------------------------------------------------------------------------
// Snapshots sent to the UI
// ---------------------------------------------------------------------------

/// Full state of one building, sent when its inspector opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BuildingSnapshot {
    /// Building identifier.
    pub id: BuildingId,
    /// Building kind.
    pub kind: BuildingKind,
    /// Top-left footprint tile.
    pub origin: TilePos,
    /// Footprint edge length in tiles.
    pub size: u8,
    /// Current level (1 or 2).
    pub level: u8,
    /// Whether an upgrade timer is running.
    pub is_upgrading: bool,
    /// Upgrade progress in percent.
    pub upgrade_progress: u8,
    /// Whether a recruitment timer is running.
    pub is_recruiting: bool,
    /// Recruitment progress in percent.
    pub recruit_progress: u8,
    /// Workers stationed inside.
    pub assigned_villagers: u8,
    /// Worker slots available (zero for buildings that take no workers).
    pub max_workers: u8,
}

/// A partial building update keyed by building id.
///
/// Only the fields that changed are present; the UI patches its open
/// inspector when `id` matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct BuildingPatch {
    /// Building the patch applies to.
    pub id: BuildingId,
    /// New level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// New upgrading flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_upgrading: Option<bool>,
    /// New upgrade progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_progress: Option<u8>,
    /// New recruiting flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recruiting: Option<bool>,
    /// New recruit progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruit_progress: Option<u8>,
    /// New worker count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_villagers: Option<u8>,
}

impl BuildingPatch {
    /// An empty patch for `id`.
    pub fn for_building(id: BuildingId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Population counters shown in the HUD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationSnapshot {
    /// Free-roaming units (villagers and soldiers).
    pub current: u32,
    /// Villagers stationed inside buildings.
    pub assigned: u32,
    /// Current population cap.
    pub max: u32,
}

/// Where a resource inspector selection points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceSource {
    /// A standing resource node.
    Node(NodeId),
    /// A pile of dropped cargo.
    Drop(DropId),
}

/// Resource inspector payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ResourceSelection {
    /// The selected entity.
    pub source: ResourceSource,
    /// Node kind for standing nodes; `None` for dropped cargo.
    pub node_kind: Option<NodeKind>,
    /// The wallet resource it yields.
    pub kind: ResourceKind,
    /// Units left.
    pub remaining: u32,
    /// Display scale for the inspector bar. Not a real cap.
    pub nominal_max: u32,
}

/// Unit inspector payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UnitSelection {
    /// The selected unit.
    pub id: UnitId,
    /// Villager or soldier.
    pub kind: UnitKind,
    /// Tile under the unit.
    pub tile: TilePos,
    /// Current activity.
    pub activity: UnitActivity,
    /// Cargo carried, if any.
    pub cargo: Option<Cargo>,
}

/// Build-mode ghost footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GhostPreview {
    /// Kind being placed.
    pub kind: BuildingKind,
    /// Top-left footprint tile under the pointer.
    pub origin: TilePos,
    /// Footprint edge length.
    pub size: u8,
    /// Whether confirming here would succeed.
    pub valid: bool,
}

/// Progress of a placed but unfinished building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ConstructionSnapshot {
    /// Site identifier.
    pub id: SiteId,
    /// Target building kind.
    pub kind: BuildingKind,
    /// Top-left footprint tile.
    pub origin: TilePos,
    /// Footprint edge length.
    pub size: u8,
    /// Build progress in percent.
    pub progress: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wallet_sub_rejects_underflow() {
        let wallet = ResourceWallet::new(10, 5, 0, 0);
        assert_eq!(wallet.checked_sub(&ResourceWallet::new(0, 0, 1, 0)), None);
        assert_eq!(
            wallet.checked_sub(&ResourceWallet::new(10, 1, 0, 0)),
            Some(ResourceWallet::new(0, 4, 0, 0))
        );
    }

    #[test]
    fn wallet_shortfall_reports_first_missing_kind() {
        let wallet = ResourceWallet::new(100, 0, 10, 0);
        let cost = ResourceWallet::new(50, 0, 20, 5);
        assert!(!wallet.covers(&cost));
        assert_eq!(wallet.first_shortfall(&cost), Some(ResourceKind::Gold));
    }

    #[test]
    fn wallet_deserializes_partial_payload() {
        let wallet: Result<ResourceWallet, _> = serde_json::from_str(r#"{"wood":50,"gold":50}"#);
        assert_eq!(wallet.ok(), Some(ResourceWallet::new(50, 0, 50, 0)));
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(TilePos::new(0, 0).chebyshev(TilePos::new(3, -2)), 3);
    }

    #[test]
    fn lerp_clamps() {
        let a = WorldPoint::new(0.0, 0.0);
        let b = WorldPoint::new(10.0, 0.0);
        assert!((a.lerp(b, 2.0).x - 10.0).abs() < f32::EPSILON);
        assert!((a.lerp(b, 0.5).x - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn building_patch_skips_absent_fields() {
        let mut patch = BuildingPatch::for_building(BuildingId::from_random_bytes([1; 16]));
        patch.upgrade_progress = Some(40);
        let json = serde_json::to_value(&patch).ok();
        let obj = json.as_ref().and_then(|v| v.as_object());
        assert!(obj.is_some_and(|o| o.contains_key("upgradeProgress")));
        assert!(obj.is_some_and(|o| !o.contains_key("level")));
    }
}
