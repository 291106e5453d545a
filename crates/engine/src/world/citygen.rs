use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::grid::{Cell, GridMap, GridMapError};
use super::interiors;
use super::registry::{BuildingLabel, InteriorId};
use super::tile::{CollisionClass, TileId};

pub const CITY_WIDTH: u32 = 40;
pub const CITY_HEIGHT: u32 = 30;
pub const PLAYER_START: Cell = Cell::new(8, 10);

const HORIZONTAL_ROADS: [i32; 2] = [9, 21];
const VERTICAL_ROADS: [i32; 2] = [14, 29];
const LAMP_ROWS: [i32; 2] = [9, 24];
const LAMP_SPACING: usize = 5;

struct BuildingPlan {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    label: &'static str,
    interior: &'static str,
}

#[rustfmt::skip]
const BUILDINGS: [BuildingPlan; 7] = [
    BuildingPlan { x: 2, y: 2, width: 6, height: 4, label: "COMISARÍA", interior: interiors::COMISARIA },
    BuildingPlan { x: 19, y: 2, width: 5, height: 4, label: "ESCENA DEL CRIMEN", interior: interiors::CRIME_SCENE },
    BuildingPlan { x: 34, y: 2, width: 5, height: 4, label: "BIBLIOTECA", interior: interiors::BIBLIOTECA },
    BuildingPlan { x: 2, y: 14, width: 6, height: 4, label: "APARTAMENTOS", interior: interiors::APARTAMENTOS },
    BuildingPlan { x: 19, y: 14, width: 5, height: 4, label: "RESTAURANTE", interior: interiors::RESTAURANTE },
    BuildingPlan { x: 34, y: 14, width: 5, height: 4, label: "HOSPITAL", interior: interiors::HOSPITAL },
    BuildingPlan { x: 34, y: 26, width: 5, height: 3, label: "CASA ???", interior: interiors::CASA },
];

const PARK: (i32, i32, i32, i32) = (2, 26, 8, 3);
const CRIME_SCENE_BLOCK: (i32, i32, i32, i32) = (19, 2, 5, 4);

#[rustfmt::skip]
const LOOSE_TREES: [(i32, i32); 16] = [
    (0, 0), (1, 0), (38, 0), (39, 0),
    (0, 29), (1, 29), (38, 29), (39, 29),
    (13, 5), (18, 5), (13, 15), (18, 15),
    (28, 5), (33, 5), (28, 15), (33, 15),
];

const STREET_PROPS: [(i32, i32, TileId); 8] = [
    (13, 9, TileId::Bench),
    (18, 9, TileId::Bench),
    (13, 24, TileId::Bench),
    (18, 24, TileId::Bench),
    (8, 9, TileId::Hydrant),
    (25, 12, TileId::Hydrant),
    (9, 12, TileId::Trash),
    (26, 9, TileId::Trash),
];

#[derive(Debug, Clone)]
pub struct CityLayout {
    pub map: GridMap,
    pub buildings: Vec<BuildingLabel>,
}

/// Builds the exterior city. `seed` only varies grass texture, never collision.
/// `npc_cells` are marked INTERACTIVE once the street is dressed.
pub fn generate_city(seed: u64, npc_cells: &[Cell]) -> Result<CityLayout, GridMapError> {
    let mut map = GridMap::filled(CITY_WIDTH, CITY_HEIGHT, TileId::Grass, CollisionClass::Walkable)?;
    scatter_grass(&mut map, seed);
    lay_roads(&mut map);

    let mut buildings = Vec::with_capacity(BUILDINGS.len());
    for plan in &BUILDINGS {
        buildings.push(place_building(&mut map, plan));
    }
    let (px, py, pw, ph) = PARK;
    place_park(&mut map, px, py, pw, ph);
    let (bx, by, bw, bh) = CRIME_SCENE_BLOCK;
    place_crime_scene(&mut map, bx, by, bw, bh);
    dress_streets(&mut map);

    for cell in npc_cells {
        if map.collision_class_at(*cell) == Some(CollisionClass::Walkable) {
            map.set_collision(*cell, CollisionClass::Interactive);
        } else {
            debug!(x = cell.x, y = cell.y, "npc_cell_not_walkable");
        }
    }

    debug!(
        seed,
        building_count = buildings.len(),
        fingerprint = %map.fingerprint(),
        "city_generated"
    );
    Ok(CityLayout { map, buildings })
}

fn scatter_grass(map: &mut GridMap, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells = map.cells().collect::<Vec<_>>();
    for cell in cells {
        let variant = if rng.gen_bool(0.7) {
            TileId::Grass
        } else if rng.gen_bool(0.5) {
            TileId::Grass2
        } else {
            TileId::Grass3
        };
        map.set_floor(cell, variant);
    }
}

fn lay_roads(map: &mut GridMap) {
    let width = map.width() as i32;
    let height = map.height() as i32;

    for top in HORIZONTAL_ROADS {
        for x in 0..width {
            map.set_floor(Cell::new(x, top), TileId::Sidewalk);
            map.set_floor(Cell::new(x, top + 1), TileId::RoadH);
            map.set_floor(Cell::new(x, top + 2), TileId::RoadH);
            map.set_floor(Cell::new(x, top + 3), TileId::Sidewalk);
        }
    }
    for left in VERTICAL_ROADS {
        for y in 0..height {
            map.set_floor(Cell::new(left, y), TileId::Sidewalk);
            map.set_floor(Cell::new(left + 1, y), TileId::RoadV);
            map.set_floor(Cell::new(left + 2, y), TileId::RoadV);
            map.set_floor(Cell::new(left + 3, y), TileId::Sidewalk);
        }
    }
    for top in HORIZONTAL_ROADS {
        for left in VERTICAL_ROADS {
            for (dx, dy) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
                map.set_floor(Cell::new(left + dx, top + dy), TileId::RoadCross);
            }
        }
    }
}

fn place_building(map: &mut GridMap, plan: &BuildingPlan) -> BuildingLabel {
    let door = Cell::new(plan.x + plan.width / 2, plan.y + plan.height - 1);

    for y in plan.y..plan.y + plan.height {
        for x in plan.x..plan.x + plan.width {
            let cell = Cell::new(x, y);
            let tile = if y == plan.y {
                TileId::Roof
            } else if cell == door {
                TileId::Door
            } else if y == plan.y + 1 && x % 2 == 0 {
                TileId::Window
            } else {
                TileId::Wall
            };
            map.place(cell, tile);
        }
    }

    BuildingLabel {
        x: plan.x,
        y: plan.y,
        width: plan.width,
        label: plan.label.to_string(),
        door,
        interior: Some(InteriorId::new(plan.interior)),
    }
}

fn place_park(map: &mut GridMap, start_x: i32, start_y: i32, width: i32, height: i32) {
    for y in start_y..start_y + height {
        for x in start_x..start_x + width {
            let cell = Cell::new(x, y);
            map.set_floor(cell, TileId::Grass2);
            if (x + y) % 3 == 0 {
                map.place(cell, TileId::Tree2);
            } else if (x + y) % 5 == 0 {
                map.place(cell, TileId::Bench);
            }
        }
    }
}

fn place_crime_scene(map: &mut GridMap, bx: i32, by: i32, bw: i32, bh: i32) {
    map.place_if_empty(Cell::new(bx - 1, by + bh + 1), TileId::PoliceCar);
    map.place_if_empty(Cell::new(bx + bw, by + bh + 1), TileId::PoliceCar);

    // Tape is a decal: object layer only, collision untouched.
    let tape_row = by + bh + 1;
    for x in bx - 1..=bx + bw {
        tape_if_empty(map, Cell::new(x, tape_row));
    }
    for y in by..by + bh {
        tape_if_empty(map, Cell::new(bx - 1, y));
        tape_if_empty(map, Cell::new(bx + bw, y));
    }

    let chalk = Cell::new(bx + bw / 2, by + bh);
    if map.object_at(chalk) == Some(TileId::Empty) {
        map.set_object(chalk, TileId::ChalkOutline);
    }

    for cone in [
        Cell::new(bx - 1, by + bh),
        Cell::new(bx + bw, by + bh),
        Cell::new(bx - 1, by + bh + 1),
        Cell::new(bx + bw, by + bh + 1),
    ] {
        map.place_if_empty(cone, TileId::Cone);
    }
}

fn tape_if_empty(map: &mut GridMap, cell: Cell) {
    if map.object_at(cell) == Some(TileId::Empty) {
        map.set_object(cell, TileId::CrimeTape);
    }
}

fn dress_streets(map: &mut GridMap) {
    for (x, y) in LOOSE_TREES {
        map.place(Cell::new(x, y), TileId::Tree);
    }
    for row in LAMP_ROWS {
        for x in (2..map.width() as i32).step_by(LAMP_SPACING) {
            map.place_if_empty(Cell::new(x, row), TileId::Lamp);
        }
    }
    for (x, y, tile) in STREET_PROPS {
        map.place_if_empty(Cell::new(x, y), tile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(seed: u64) -> CityLayout {
        generate_city(seed, &[]).expect("city")
    }

    #[test]
    fn every_building_has_one_interactive_door_at_bottom_centre() {
        let layout = city(7);
        for building in &layout.buildings {
            let plan = BUILDINGS
                .iter()
                .find(|plan| plan.label == building.label)
                .expect("plan");
            let mut interactive = Vec::new();
            for y in plan.y..plan.y + plan.height {
                for x in plan.x..plan.x + plan.width {
                    let cell = Cell::new(x, y);
                    match layout.map.collision_class_at(cell) {
                        Some(CollisionClass::Interactive) => interactive.push(cell),
                        Some(CollisionClass::Solid) => {}
                        other => panic!("{} has {other:?} at {cell:?}", building.label),
                    }
                }
            }
            assert_eq!(interactive, vec![building.door], "{}", building.label);
            assert_eq!(building.door.y, plan.y + plan.height - 1);
            assert_eq!(building.door.x, plan.x + plan.width / 2);
            assert_eq!(layout.map.object_at(building.door), Some(TileId::Door));
        }
    }

    #[test]
    fn seed_varies_floor_but_not_collision() {
        let a = city(1);
        let b = city(2);
        let floors_differ = a
            .map
            .cells()
            .any(|cell| a.map.floor_at(cell) != b.map.floor_at(cell));
        let collision_equal = a
            .map
            .cells()
            .all(|cell| a.map.collision_class_at(cell) == b.map.collision_class_at(cell));

        assert!(floors_differ);
        assert!(collision_equal);
        assert_eq!(city(1).map.fingerprint(), a.map.fingerprint());
    }

    #[test]
    fn roads_cross_at_four_intersections() {
        let layout = city(3);
        let crossings = layout
            .map
            .cells()
            .filter(|cell| layout.map.floor_at(*cell) == Some(TileId::RoadCross))
            .count();
        assert_eq!(crossings, 16);
        assert_eq!(layout.map.floor_at(Cell::new(0, 10)), Some(TileId::RoadH));
        assert_eq!(layout.map.floor_at(Cell::new(15, 0)), Some(TileId::RoadV));
        assert_eq!(layout.map.floor_at(Cell::new(8, 9)), Some(TileId::Sidewalk));
    }

    #[test]
    fn crime_scene_dressing_surrounds_its_building() {
        let layout = city(4);
        let map = &layout.map;
        assert_eq!(map.object_at(Cell::new(18, 7)), Some(TileId::PoliceCar));
        assert_eq!(map.object_at(Cell::new(24, 7)), Some(TileId::PoliceCar));
        assert_eq!(map.object_at(Cell::new(21, 6)), Some(TileId::ChalkOutline));
        assert_eq!(map.object_at(Cell::new(18, 6)), Some(TileId::Cone));
        assert_eq!(map.object_at(Cell::new(20, 7)), Some(TileId::CrimeTape));
        assert!(map.is_walkable(Cell::new(20, 7)));
        assert!(map.is_walkable(Cell::new(21, 6)));
    }

    #[test]
    fn spawn_is_on_the_road_below_a_solid_hydrant() {
        let layout = city(5);
        assert!(layout.map.is_walkable(PLAYER_START));
        assert_eq!(layout.map.object_at(Cell::new(8, 9)), Some(TileId::Hydrant));
        assert_eq!(
            layout.map.collision_class_at(Cell::new(8, 9)),
            Some(CollisionClass::Solid)
        );
    }

    #[test]
    fn npc_cells_become_interactive() {
        let layout = generate_city(9, &[Cell::new(25, 26)]).expect("city");
        assert_eq!(
            layout.map.collision_class_at(Cell::new(25, 26)),
            Some(CollisionClass::Interactive)
        );
    }
}
