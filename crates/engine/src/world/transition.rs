use std::mem;

use tracing::{debug, info, warn};

use super::actor::{Actor, Direction};
use super::grid::{Cell, GridMap};
use super::registry::{InteriorId, MapRef, MapRegistry};
use super::tile::{CollisionClass, TileId};

/// Exterior state parked while the player is indoors.
#[derive(Debug, Clone)]
pub struct ExteriorSnapshot {
    map: GridMap,
    return_cell: Cell,
}

impl ExteriorSnapshot {
    pub fn map(&self) -> &GridMap {
        &self.map
    }

    pub fn return_cell(&self) -> Cell {
        self.return_cell
    }
}

#[derive(Debug, Clone, Default)]
pub enum Location {
    #[default]
    Exterior,
    Interior {
        id: InteriorId,
        snapshot: ExteriorSnapshot,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SceneTransition {
    location: Location,
}

impl SceneTransition {
    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn is_indoors(&self) -> bool {
        matches!(self.location, Location::Interior { .. })
    }

    pub fn interior_id(&self) -> Option<&InteriorId> {
        match &self.location {
            Location::Exterior => None,
            Location::Interior { id, .. } => Some(id),
        }
    }

    pub fn current_map(&self) -> MapRef {
        match &self.location {
            Location::Exterior => MapRef::Exterior,
            Location::Interior { id, .. } => MapRef::Interior(id.clone()),
        }
    }

    /// Swaps the live map for interior `id`. Unknown ids and calls made while
    /// already indoors leave everything untouched.
    pub fn enter_interior(
        &mut self,
        id: &InteriorId,
        registry: &mut MapRegistry,
        actor: &mut Actor,
    ) -> bool {
        if self.is_indoors() {
            debug!(interior = %id, "enter_interior_ignored_indoors");
            return false;
        }
        let Some(def) = registry.interior(id) else {
            warn!(interior = %id, "enter_interior_unknown_id");
            return false;
        };
        let interior_map = def.map.clone();
        let start = def.player_start;

        let exterior = mem::replace(registry.active_mut(), interior_map);
        self.location = Location::Interior {
            id: id.clone(),
            snapshot: ExteriorSnapshot {
                map: exterior,
                return_cell: actor.target(),
            },
        };
        actor.teleport(start, Direction::Up);
        info!(interior = %id, x = start.x, y = start.y, "interior_entered");
        true
    }

    /// Restores the exterior and drops the actor on the building's outside
    /// door, or on the saved cell when the interior is gone.
    pub fn exit_interior(&mut self, registry: &mut MapRegistry, actor: &mut Actor) -> bool {
        let Location::Interior { id, snapshot } = mem::take(&mut self.location) else {
            debug!("exit_interior_ignored_outdoors");
            return false;
        };

        let landing = registry
            .interior(&id)
            .map(|def| def.outside_door)
            .unwrap_or(snapshot.return_cell);
        *registry.active_mut() = snapshot.map;
        actor.teleport(landing, Direction::Down);
        info!(interior = %id, x = landing.x, y = landing.y, "interior_exited");
        true
    }

    /// Writes one object cell into every copy of `target`: the stored
    /// interior, the live map when it is showing `target`, and the parked
    /// exterior while indoors.
    pub fn write_object(
        &mut self,
        registry: &mut MapRegistry,
        target: &MapRef,
        cell: Cell,
        tile: TileId,
        collision: CollisionClass,
    ) -> bool {
        match target {
            MapRef::Exterior => match &mut self.location {
                Location::Exterior => write_cell(registry.active_mut(), cell, tile, collision),
                Location::Interior { snapshot, .. } => {
                    write_cell(&mut snapshot.map, cell, tile, collision)
                }
            },
            MapRef::Interior(id) => {
                let Some(def) = registry.interior_mut(id) else {
                    debug!(interior = %id, "write_object_unknown_interior");
                    return false;
                };
                let stored = write_cell(&mut def.map, cell, tile, collision);
                if self.interior_id() == Some(id) {
                    write_cell(registry.active_mut(), cell, tile, collision);
                }
                stored
            }
        }
    }
}

fn write_cell(map: &mut GridMap, cell: Cell, tile: TileId, collision: CollisionClass) -> bool {
    map.set_object(cell, tile) && map.set_collision(cell, collision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::registry::InteriorDef;

    fn office() -> InteriorId {
        InteriorId::new("office")
    }

    fn setup() -> (MapRegistry, Actor) {
        let mut exterior =
            GridMap::filled(10, 8, TileId::Grass, CollisionClass::Walkable).expect("exterior");
        exterior.place(Cell::new(4, 2), TileId::Door);
        exterior.place(Cell::new(1, 1), TileId::Tree);

        let mut registry = MapRegistry::new(exterior, Vec::new());
        registry.register_interior(
            office(),
            InteriorDef {
                map: GridMap::filled(6, 5, TileId::FloorWood, CollisionClass::Walkable)
                    .expect("interior"),
                player_start: Cell::new(3, 3),
                outside_door: Cell::new(4, 3),
                label: "Office".to_string(),
                building_label: "OFFICE".to_string(),
            },
        );
        (registry, Actor::spawn(Cell::new(4, 3)))
    }

    #[test]
    fn enter_then_exit_restores_exterior_exactly() {
        let (mut registry, mut actor) = setup();
        let before = registry.active().fingerprint();
        let mut transition = SceneTransition::default();

        assert!(transition.enter_interior(&office(), &mut registry, &mut actor));
        assert!(transition.is_indoors());
        assert_eq!(registry.active().width(), 6);
        assert_eq!(actor.target(), Cell::new(3, 3));
        assert_eq!(actor.facing(), Direction::Up);

        assert!(transition.exit_interior(&mut registry, &mut actor));
        assert!(!transition.is_indoors());
        assert_eq!(registry.active().fingerprint(), before);
        assert_eq!(actor.target(), Cell::new(4, 3));
        assert_eq!(actor.facing(), Direction::Down);
    }

    #[test]
    fn unknown_interior_is_a_no_op() {
        let (mut registry, mut actor) = setup();
        let before = registry.active().fingerprint();
        let mut transition = SceneTransition::default();

        assert!(!transition.enter_interior(
            &InteriorId::new("vault"),
            &mut registry,
            &mut actor
        ));
        assert_eq!(registry.active().fingerprint(), before);
        assert_eq!(actor.target(), Cell::new(4, 3));
        assert!(!transition.exit_interior(&mut registry, &mut actor));
    }

    #[test]
    fn interior_write_reaches_live_and_stored_copies() {
        let (mut registry, mut actor) = setup();
        let mut transition = SceneTransition::default();
        transition.enter_interior(&office(), &mut registry, &mut actor);

        let cell = Cell::new(2, 1);
        assert!(transition.write_object(
            &mut registry,
            &MapRef::Interior(office()),
            cell,
            TileId::Evidence,
            CollisionClass::Walkable,
        ));
        assert_eq!(registry.active().object_at(cell), Some(TileId::Evidence));
        let stored = registry.interior(&office()).expect("stored");
        assert_eq!(stored.map.object_at(cell), Some(TileId::Evidence));

        transition.exit_interior(&mut registry, &mut actor);
        transition.enter_interior(&office(), &mut registry, &mut actor);
        assert_eq!(registry.active().object_at(cell), Some(TileId::Evidence));
    }

    #[test]
    fn exterior_write_while_indoors_lands_in_snapshot() {
        let (mut registry, mut actor) = setup();
        let mut transition = SceneTransition::default();
        transition.enter_interior(&office(), &mut registry, &mut actor);

        let cell = Cell::new(7, 6);
        transition.write_object(
            &mut registry,
            &MapRef::Exterior,
            cell,
            TileId::Evidence,
            CollisionClass::Walkable,
        );
        assert_eq!(registry.active().object_at(cell), Some(TileId::Empty));

        transition.exit_interior(&mut registry, &mut actor);
        assert_eq!(registry.active().object_at(cell), Some(TileId::Evidence));
    }

    #[test]
    fn write_to_missing_interior_fails_quietly() {
        let (mut registry, _) = setup();
        let mut transition = SceneTransition::default();
        assert!(!transition.write_object(
            &mut registry,
            &MapRef::Interior(InteriorId::new("vault")),
            Cell::new(0, 0),
            TileId::Evidence,
            CollisionClass::Walkable,
        ));
    }
}
