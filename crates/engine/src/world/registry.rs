use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::grid::{Cell, GridMap};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct InteriorId(String);

impl InteriorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InteriorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which stored map a piece of content is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum MapRef {
    Exterior,
    Interior(InteriorId),
}

impl fmt::Display for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapRef::Exterior => f.write_str("exterior"),
            MapRef::Interior(id) => write!(f, "interior:{id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InteriorDef {
    pub map: GridMap,
    pub player_start: Cell,
    /// Exterior cell the player lands on when leaving.
    pub outside_door: Cell,
    pub label: String,
    pub building_label: String,
}

impl InteriorDef {
    /// Exit door sits at the bottom-centre of every interior.
    pub fn exit_door(&self) -> Cell {
        Cell::new(
            (self.map.width() / 2) as i32,
            self.map.height() as i32 - 1,
        )
    }
}

/// Building footprint record consumed by label drawing and door lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingLabel {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub label: String,
    pub door: Cell,
    pub interior: Option<InteriorId>,
}

/// Owns the live map plus every stored interior.
#[derive(Debug, Clone)]
pub struct MapRegistry {
    active: GridMap,
    interiors: BTreeMap<InteriorId, InteriorDef>,
    buildings: Vec<BuildingLabel>,
}

impl MapRegistry {
    pub fn new(exterior: GridMap, buildings: Vec<BuildingLabel>) -> Self {
        Self {
            active: exterior,
            interiors: BTreeMap::new(),
            buildings,
        }
    }

    pub fn register_interior(&mut self, id: InteriorId, def: InteriorDef) -> Option<InteriorDef> {
        self.interiors.insert(id, def)
    }

    pub fn active(&self) -> &GridMap {
        &self.active
    }

    pub(crate) fn active_mut(&mut self) -> &mut GridMap {
        &mut self.active
    }

    pub fn interior(&self, id: &InteriorId) -> Option<&InteriorDef> {
        self.interiors.get(id)
    }

    pub(crate) fn interior_mut(&mut self, id: &InteriorId) -> Option<&mut InteriorDef> {
        self.interiors.get_mut(id)
    }

    pub fn interior_ids(&self) -> impl Iterator<Item = &InteriorId> {
        self.interiors.keys()
    }

    pub fn buildings(&self) -> &[BuildingLabel] {
        &self.buildings
    }

    pub fn building_at_door(&self, cell: Cell) -> Option<&BuildingLabel> {
        self.buildings.iter().find(|building| building.door == cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::{CollisionClass, TileId};

    fn registry() -> MapRegistry {
        let exterior =
            GridMap::filled(10, 10, TileId::Grass, CollisionClass::Walkable).expect("exterior");
        let building = BuildingLabel {
            x: 2,
            y: 2,
            width: 3,
            label: "TEST".to_string(),
            door: Cell::new(3, 4),
            interior: Some(InteriorId::new("test")),
        };
        MapRegistry::new(exterior, vec![building])
    }

    #[test]
    fn building_lookup_matches_door_cell_only() {
        let registry = registry();
        assert_eq!(
            registry
                .building_at_door(Cell::new(3, 4))
                .map(|b| b.label.as_str()),
            Some("TEST")
        );
        assert!(registry.building_at_door(Cell::new(2, 4)).is_none());
    }

    #[test]
    fn exit_door_is_bottom_centre() {
        let def = InteriorDef {
            map: GridMap::filled(12, 10, TileId::FloorWood, CollisionClass::Walkable)
                .expect("interior"),
            player_start: Cell::new(6, 8),
            outside_door: Cell::new(3, 5),
            label: "Test".to_string(),
            building_label: "TEST".to_string(),
        };
        assert_eq!(def.exit_door(), Cell::new(6, 9));
    }

    #[test]
    fn missing_interior_lookup_is_none() {
        let mut registry = registry();
        assert!(registry.interior(&InteriorId::new("nowhere")).is_none());
        assert!(registry.interior_mut(&InteriorId::new("nowhere")).is_none());
    }
}
