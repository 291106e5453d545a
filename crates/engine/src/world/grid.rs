use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::tile::{collision_class_of, CollisionClass, TileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridMapError {
    #[error("{layer} layer has {actual} cells, expected {expected}")]
    LayerSizeMismatch {
        layer: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
}

/// Three parallel row-major layers sharing one set of dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    width: u32,
    height: u32,
    floor: Vec<TileId>,
    objects: Vec<TileId>,
    collision: Vec<CollisionClass>,
}

impl GridMap {
    pub fn new(
        width: u32,
        height: u32,
        floor: Vec<TileId>,
        objects: Vec<TileId>,
        collision: Vec<CollisionClass>,
    ) -> Result<Self, GridMapError> {
        if width == 0 || height == 0 {
            return Err(GridMapError::EmptyDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        check_layer("floor", expected, floor.len())?;
        check_layer("objects", expected, objects.len())?;
        check_layer("collision", expected, collision.len())?;

        Ok(Self {
            width,
            height,
            floor,
            objects,
            collision,
        })
    }

    /// Uniform floor, no objects, one collision class everywhere.
    pub fn filled(
        width: u32,
        height: u32,
        floor: TileId,
        collision: CollisionClass,
    ) -> Result<Self, GridMapError> {
        let count = width as usize * height as usize;
        Self::new(
            width,
            height,
            vec![floor; count],
            vec![TileId::Empty; count],
            vec![collision; count],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as u32, cell.y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// True iff `cell` is in bounds and not SOLID.
    pub fn is_walkable(&self, cell: Cell) -> bool {
        matches!(
            self.collision_class_at(cell),
            Some(CollisionClass::Walkable | CollisionClass::Interactive)
        )
    }

    pub fn collision_class_at(&self, cell: Cell) -> Option<CollisionClass> {
        self.index_of(cell).map(|index| self.collision[index])
    }

    pub fn floor_at(&self, cell: Cell) -> Option<TileId> {
        self.index_of(cell).map(|index| self.floor[index])
    }

    pub fn object_at(&self, cell: Cell) -> Option<TileId> {
        self.index_of(cell).map(|index| self.objects[index])
    }

    pub fn set_floor(&mut self, cell: Cell, tile: TileId) -> bool {
        let Some(index) = self.index_of(cell) else {
            return false;
        };
        self.floor[index] = tile;
        true
    }

    pub fn set_object(&mut self, cell: Cell, tile: TileId) -> bool {
        let Some(index) = self.index_of(cell) else {
            return false;
        };
        self.objects[index] = tile;
        true
    }

    pub fn set_collision(&mut self, cell: Cell, class: CollisionClass) -> bool {
        let Some(index) = self.index_of(cell) else {
            return false;
        };
        self.collision[index] = class;
        true
    }

    /// Writes `tile` into the object layer with its default collision class.
    pub fn place(&mut self, cell: Cell, tile: TileId) -> bool {
        self.set_object(cell, tile) && self.set_collision(cell, collision_class_of(tile))
    }

    /// Places `tile` only on an empty, walkable cell.
    pub fn place_if_empty(&mut self, cell: Cell, tile: TileId) -> bool {
        let free = self.object_at(cell) == Some(TileId::Empty)
            && self.collision_class_at(cell) == Some(CollisionClass::Walkable);
        free && self.place(cell, tile)
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| Cell::new(x, y)))
    }

    pub fn count_objects(&self, tile: TileId) -> usize {
        self.objects.iter().filter(|object| **object == tile).count()
    }

    /// SHA-256 over dimensions and all three layers, lowercase hex.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for tile in &self.floor {
            hasher.update(tile.code().to_le_bytes());
        }
        for tile in &self.objects {
            hasher.update(tile.code().to_le_bytes());
        }
        let collision = self
            .collision
            .iter()
            .map(|class| class.as_byte())
            .collect::<Vec<_>>();
        hasher.update(&collision);

        hasher
            .finalize()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}

fn check_layer(layer: &'static str, expected: usize, actual: usize) -> Result<(), GridMapError> {
    if expected == actual {
        Ok(())
    } else {
        Err(GridMapError::LayerSizeMismatch {
            layer,
            expected,
            actual,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_map() -> GridMap {
        GridMap::filled(4, 3, TileId::FloorWood, CollisionClass::Walkable).expect("grid")
    }

    #[test]
    fn new_rejects_mismatched_layers() {
        let err = GridMap::new(
            2,
            2,
            vec![TileId::Grass; 4],
            vec![TileId::Empty; 3],
            vec![CollisionClass::Walkable; 4],
        )
        .expect_err("objects layer is short");

        assert_eq!(
            err,
            GridMapError::LayerSizeMismatch {
                layer: "objects",
                expected: 4,
                actual: 3,
            }
        );
    }

    #[test]
    fn out_of_bounds_cells_are_not_walkable() {
        let map = small_map();
        assert!(!map.is_walkable(Cell::new(-1, 0)));
        assert!(!map.is_walkable(Cell::new(4, 0)));
        assert!(!map.is_walkable(Cell::new(0, 3)));
        assert_eq!(map.collision_class_at(Cell::new(0, -1)), None);
    }

    #[test]
    fn interactive_cells_count_as_walkable() {
        let mut map = small_map();
        map.place(Cell::new(1, 1), TileId::Door);
        assert_eq!(
            map.collision_class_at(Cell::new(1, 1)),
            Some(CollisionClass::Interactive)
        );
        assert!(map.is_walkable(Cell::new(1, 1)));

        map.place(Cell::new(2, 1), TileId::Table);
        assert!(!map.is_walkable(Cell::new(2, 1)));
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut map = small_map();
        let before = map.fingerprint();
        assert!(!map.place(Cell::new(9, 9), TileId::Tree));
        assert!(!map.set_floor(Cell::new(-1, 0), TileId::Grass));
        assert_eq!(map.fingerprint(), before);
    }

    #[test]
    fn place_if_empty_skips_occupied_and_blocked_cells() {
        let mut map = small_map();
        map.place(Cell::new(0, 0), TileId::Rug);
        map.set_collision(Cell::new(1, 0), CollisionClass::Solid);

        assert!(!map.place_if_empty(Cell::new(0, 0), TileId::Lamp));
        assert!(!map.place_if_empty(Cell::new(1, 0), TileId::Lamp));
        assert!(map.place_if_empty(Cell::new(2, 0), TileId::Lamp));
        assert_eq!(map.object_at(Cell::new(0, 0)), Some(TileId::Rug));
        assert_eq!(map.object_at(Cell::new(2, 0)), Some(TileId::Lamp));
    }

    #[test]
    fn fingerprint_tracks_every_layer() {
        let base = small_map();
        let mut floor_changed = base.clone();
        floor_changed.set_floor(Cell::new(3, 2), TileId::FloorTile);
        let mut collision_changed = base.clone();
        collision_changed.set_collision(Cell::new(3, 2), CollisionClass::Solid);

        assert_eq!(base.fingerprint(), small_map().fingerprint());
        assert_ne!(base.fingerprint(), floor_changed.fingerprint());
        assert_ne!(base.fingerprint(), collision_changed.fingerprint());
        assert_eq!(base.fingerprint().len(), 64);
    }

    #[test]
    fn cells_iterate_row_major() {
        let map = small_map();
        let cells = map.cells().take(5).collect::<Vec<_>>();
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[3], Cell::new(3, 0));
        assert_eq!(cells[4], Cell::new(0, 1));
    }
}
