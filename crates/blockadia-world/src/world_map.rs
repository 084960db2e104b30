//! The world container: grid, occupancy index and every static entity.
//!
//! [`WorldMap`] keeps the occupancy index in step with the registries. Every
//! insertion claims tiles and every removal releases them, so the index is
//! never consulted separately from the collections it describes.

use std::collections::{BTreeMap, BTreeSet};

use blockadia_types::{BuildingId, Cargo, DropId, NodeId, SiteId, TilePos};

use crate::building::Building;
use crate::construction::ConstructionSite;
use crate::drops::{DropRegistry, DroppedResource};
use crate::error::WorldError;
use crate::grid::Grid;
use crate::occupancy::{OccupancyIndex, Occupant};
use crate::resource::{Depletion, NodeRegistry, ResourceNode};

/// Tiles currently under units, supplied by the owner of the unit list.
pub type UnitTiles = BTreeSet<TilePos>;

/// Where a dropped load ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropOutcome {
    /// The pile holding the load.
    pub id: DropId,
    /// Its tile.
    pub tile: TilePos,
    /// Whether the load was merged into an existing pile.
    pub merged: bool,
}

/// All static world state.
#[derive(Debug, Clone)]
pub struct WorldMap {
    grid: Grid,
    occupancy: OccupancyIndex,
    nodes: NodeRegistry,
    drops: DropRegistry,
    buildings: BTreeMap<BuildingId, Building>,
    sites: BTreeMap<SiteId, ConstructionSite>,
}

impl WorldMap {
    /// Create an empty world on `grid`.
    pub const fn new(grid: Grid) -> Self {
        Self {
            grid,
            occupancy: OccupancyIndex::new(),
            nodes: NodeRegistry::new(),
            drops: DropRegistry::new(),
            buildings: BTreeMap::new(),
            sites: BTreeMap::new(),
        }
    }

    /// Grid geometry.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The occupancy index.
    pub const fn occupancy(&self) -> &OccupancyIndex {
        &self.occupancy
    }

    // -----------------------------------------------------------------------
    // Occupancy queries
    // -----------------------------------------------------------------------

    /// Whether `tile` is in bounds and holds no building, site, node or drop.
    pub fn is_static_free(&self, tile: TilePos) -> bool {
        self.grid.in_bounds(tile) && self.occupancy.is_free(tile)
    }

    /// Whether anything, units included, occupies `tile`.
    pub fn is_occupied(&self, tile: TilePos, units: &UnitTiles) -> bool {
        !self.occupancy.is_free(tile) || units.contains(&tile)
    }

    /// Whether a `size`-square footprint at `origin` is in bounds and empty.
    pub fn can_place(&self, origin: TilePos, size: u8, units: &UnitTiles) -> bool {
        self.grid.footprint_in_bounds(origin, size)
            && Grid::footprint(origin, size).all(|tile| !self.is_occupied(tile, units))
    }

    /// The first in-bounds cardinal neighbour of a node tile a villager can
    /// stand on: empty, or holding a drop. Order: left, right, up, down.
    pub fn approach_tile(&self, node_tile: TilePos) -> Option<TilePos> {
        node_tile.cardinal_neighbors().into_iter().find(|tile| {
            self.grid.in_bounds(*tile)
                && matches!(self.occupancy.occupant(*tile), None | Some(Occupant::Drop(_)))
        })
    }

    /// Nearest tile within `radius` of `center` where a load can lie: either
    /// empty or holding a pile it merges with.
    pub fn find_drop_tile(
        &self,
        center: TilePos,
        radius: u32,
        cargo: &Cargo,
    ) -> Option<TilePos> {
        self.grid.spiral(center, radius).find(|tile| {
            match self.occupancy.occupant(*tile) {
                None => true,
                Some(Occupant::Drop(id)) => self
                    .drops
                    .get(id)
                    .is_some_and(|d| d.accepts(cargo)),
                Some(_) => false,
            }
        })
    }

    /// Nearest free tile around a footprint, searching rings out to
    /// `radius`. Tiles under units are skipped.
    pub fn find_spawn_tile(
        &self,
        origin: TilePos,
        size: u8,
        radius: u32,
        units: &UnitTiles,
    ) -> Option<TilePos> {
        (1..=radius)
            .flat_map(|d| self.grid.perimeter(origin, size, d))
            .find(|tile| self.is_static_free(*tile) && !units.contains(tile))
    }

    // -----------------------------------------------------------------------
    // Resource nodes
    // -----------------------------------------------------------------------

    /// All nodes.
    pub const fn nodes(&self) -> &NodeRegistry {
        &self.nodes
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id)
    }

    /// Look up a node mutably.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut ResourceNode> {
        self.nodes.get_mut(id)
    }

    /// The node standing on `tile`.
    pub fn node_at(&self, tile: TilePos) -> Option<&ResourceNode> {
        match self.occupancy.occupant(tile) {
            Some(Occupant::Node(id)) => self.nodes.get(id),
            _ => None,
        }
    }

    /// Place a node.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] or [`WorldError::TileOccupied`].
    pub fn add_node(&mut self, node: ResourceNode) -> Result<(), WorldError> {
        if !self.grid.in_bounds(node.tile) {
            return Err(WorldError::OutOfBounds(node.tile));
        }
        self.occupancy.claim(node.tile, Occupant::Node(node.id))?;
        self.nodes.insert(node);
        Ok(())
    }

    /// Remove a node and free its tile.
    pub fn remove_node(&mut self, id: NodeId) -> Option<ResourceNode> {
        let node = self.nodes.remove(id)?;
        self.occupancy.release(node.tile, Occupant::Node(id));
        Some(node)
    }

    /// Settle a delivered load against its source node, removing the node
    /// when exhausted. `None` if the node no longer exists.
    pub fn settle_node(&mut self, id: NodeId, delivered: u32) -> Option<Depletion> {
        let depletion = self.nodes.get_mut(id)?.settle(delivered);
        if depletion == Depletion::Exhausted {
            self.remove_node(id);
        }
        Some(depletion)
    }

    // -----------------------------------------------------------------------
    // Dropped resources
    // -----------------------------------------------------------------------

    /// All dropped resources.
    pub const fn drops(&self) -> &DropRegistry {
        &self.drops
    }

    /// Look up a drop.
    pub fn drop_pile(&self, id: DropId) -> Option<&DroppedResource> {
        self.drops.get(id)
    }

    /// The drop lying on `tile`.
    pub fn drop_at(&self, tile: TilePos) -> Option<&DroppedResource> {
        match self.occupancy.occupant(tile) {
            Some(Occupant::Drop(id)) => self.drops.get(id),
            _ => None,
        }
    }

    /// Put a load on `tile`, merging into a compatible pile already there.
    ///
    /// # Errors
    ///
    /// [`WorldError::TileOccupied`] if something else holds the tile,
    /// [`WorldError::OutOfBounds`], or [`WorldError::ArithmeticOverflow`]
    /// when a merge would overflow.
    pub fn place_drop(
        &mut self,
        new_id: DropId,
        tile: TilePos,
        cargo: Cargo,
    ) -> Result<DropOutcome, WorldError> {
        if !self.grid.in_bounds(tile) {
            return Err(WorldError::OutOfBounds(tile));
        }
        if let Some(Occupant::Drop(existing)) = self.occupancy.occupant(tile) {
            if let Some(pile) = self
                .drops
                .get_mut(existing)
                .filter(|pile| pile.accepts(&cargo))
            {
                pile.cargo.amount = pile
                    .cargo
                    .amount
                    .checked_add(cargo.amount)
                    .ok_or(WorldError::ArithmeticOverflow)?;
                return Ok(DropOutcome {
                    id: existing,
                    tile,
                    merged: true,
                });
            }
        }
        self.occupancy.claim(tile, Occupant::Drop(new_id))?;
        self.drops.insert(DroppedResource {
            id: new_id,
            tile,
            cargo,
        });
        Ok(DropOutcome {
            id: new_id,
            tile,
            merged: false,
        })
    }

    /// Remove a drop and free its tile.
    pub fn take_drop(&mut self, id: DropId) -> Option<DroppedResource> {
        let drop = self.drops.remove(id)?;
        self.occupancy.release(drop.tile, Occupant::Drop(id));
        Some(drop)
    }

    // -----------------------------------------------------------------------
    // Buildings
    // -----------------------------------------------------------------------

    /// All buildings in id order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// Ids of all buildings.
    pub fn building_ids(&self) -> Vec<BuildingId> {
        self.buildings.keys().copied().collect()
    }

    /// Look up a building.
    pub fn building(&self, id: BuildingId) -> Option<&Building> {
        self.buildings.get(&id)
    }

    /// Look up a building mutably.
    pub fn building_mut(&mut self, id: BuildingId) -> Option<&mut Building> {
        self.buildings.get_mut(&id)
    }

    /// The building covering `tile`.
    pub fn building_at(&self, tile: TilePos) -> Option<&Building> {
        match self.occupancy.occupant(tile) {
            Some(Occupant::Building(id)) => self.buildings.get(&id),
            _ => None,
        }
    }

    /// Add a completed building, claiming its footprint.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] or [`WorldError::TileOccupied`].
    pub fn add_building(&mut self, building: Building) -> Result<(), WorldError> {
        let size = building.size();
        if !self.grid.footprint_in_bounds(building.origin, size) {
            return Err(WorldError::OutOfBounds(building.origin));
        }
        self.occupancy
            .claim_footprint(building.origin, size, Occupant::Building(building.id))?;
        self.buildings.insert(building.id, building);
        Ok(())
    }

    /// The tile villagers deliver cargo to: just below the middle of the
    /// building's footprint.
    pub fn drop_point(&self, id: BuildingId) -> Option<TilePos> {
        let building = self.buildings.get(&id)?;
        let size = i32::from(building.size());
        Some(building.origin.offset(size / 2, size))
    }

    // -----------------------------------------------------------------------
    // Construction sites
    // -----------------------------------------------------------------------

    /// All sites in id order.
    pub fn sites(&self) -> impl Iterator<Item = &ConstructionSite> {
        self.sites.values()
    }

    /// Ids of all sites.
    pub fn site_ids(&self) -> Vec<SiteId> {
        self.sites.keys().copied().collect()
    }

    /// Look up a site.
    pub fn site(&self, id: SiteId) -> Option<&ConstructionSite> {
        self.sites.get(&id)
    }

    /// Look up a site mutably.
    pub fn site_mut(&mut self, id: SiteId) -> Option<&mut ConstructionSite> {
        self.sites.get_mut(&id)
    }

    /// The site covering `tile`.
    pub fn site_at(&self, tile: TilePos) -> Option<&ConstructionSite> {
        match self.occupancy.occupant(tile) {
            Some(Occupant::Site(id)) => self.sites.get(&id),
            _ => None,
        }
    }

    /// Add a construction site, claiming its footprint.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] or [`WorldError::TileOccupied`].
    pub fn add_site(&mut self, site: ConstructionSite) -> Result<(), WorldError> {
        let size = site.size();
        if !self.grid.footprint_in_bounds(site.origin, size) {
            return Err(WorldError::OutOfBounds(site.origin));
        }
        self.occupancy
            .claim_footprint(site.origin, size, Occupant::Site(site.id))?;
        self.sites.insert(site.id, site);
        Ok(())
    }

    /// Replace a site with a level-1 building of its kind.
    ///
    /// # Errors
    ///
    /// [`WorldError::SiteNotFound`], or a footprint error if the building
    /// cannot claim the freed tiles.
    pub fn complete_site(
        &mut self,
        site_id: SiteId,
        building_id: BuildingId,
    ) -> Result<&Building, WorldError> {
        let site = self
            .sites
            .remove(&site_id)
            .ok_or(WorldError::SiteNotFound(site_id))?;
        self.occupancy
            .release_footprint(site.origin, site.size(), Occupant::Site(site_id));
        self.add_building(Building::new(building_id, site.kind, site.origin))?;
        self.buildings
            .get(&building_id)
            .ok_or(WorldError::BuildingNotFound(building_id))
    }
}
