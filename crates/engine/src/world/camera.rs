use serde::Serialize;

use super::actor::Vec2;
use super::grid::{Cell, GridMap};

/// Source tiles are 16 px drawn at 3x.
pub const TILE_SOURCE_PX: u32 = 16;
pub const TILE_SCALE: u32 = 3;
pub const TILE_PX: f32 = (TILE_SOURCE_PX * TILE_SCALE) as f32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Inclusive-exclusive cell range the renderer has to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisibleCells {
    pub min: Cell,
    pub max: Cell,
}

impl VisibleCells {
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        (self.min.y..self.max.y)
            .flat_map(move |y| (self.min.x..self.max.x).map(move |x| Cell::new(x, y)))
    }
}

/// Top-left corner of the viewport in world pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Camera {
    pub offset: Vec2,
}

impl Camera {
    /// Centres on the actor, then per axis either centres a map smaller than
    /// the viewport or clamps to the map extent.
    pub fn follow(&mut self, actor_px: Vec2, map: &GridMap, viewport: Viewport) {
        let map_w = map.width() as f32 * TILE_PX;
        let map_h = map.height() as f32 * TILE_PX;
        let view_w = viewport.width as f32;
        let view_h = viewport.height as f32;

        let centred_x = actor_px.x - view_w / 2.0 + TILE_PX / 2.0;
        let centred_y = actor_px.y - view_h / 2.0 + TILE_PX / 2.0;

        self.offset = Vec2 {
            x: fit_axis(centred_x, map_w, view_w),
            y: fit_axis(centred_y, map_h, view_h),
        };
    }

    pub fn world_to_screen(&self, world_px: Vec2) -> (i32, i32) {
        let x = world_px.x - self.offset.x;
        let y = world_px.y - self.offset.y;
        (x.round() as i32, y.round() as i32)
    }

    pub fn cell_to_screen(&self, cell: Cell) -> (i32, i32) {
        self.world_to_screen(Vec2::from_cell(cell).scaled(TILE_PX))
    }

    pub fn visible_cells(&self, map: &GridMap, viewport: Viewport) -> VisibleCells {
        let left = (self.offset.x / TILE_PX).floor() as i32;
        let top = (self.offset.y / TILE_PX).floor() as i32;
        let right = ((self.offset.x + viewport.width as f32) / TILE_PX).ceil() as i32;
        let bottom = ((self.offset.y + viewport.height as f32) / TILE_PX).ceil() as i32;

        VisibleCells {
            min: Cell::new(left.max(0), top.max(0)),
            max: Cell::new(
                right.clamp(0, map.width() as i32),
                bottom.clamp(0, map.height() as i32),
            ),
        }
    }
}

fn fit_axis(centred: f32, map_extent: f32, view_extent: f32) -> f32 {
    if map_extent <= view_extent {
        -(view_extent - map_extent) / 2.0
    } else {
        centred.clamp(0.0, map_extent - view_extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::{CollisionClass, TileId};

    fn map(width: u32, height: u32) -> GridMap {
        GridMap::filled(width, height, TileId::Grass, CollisionClass::Walkable).expect("map")
    }

    const VIEW: Viewport = Viewport {
        width: 800,
        height: 600,
    };

    #[test]
    fn small_map_is_centred_not_followed() {
        let interior = map(12, 10);
        let mut camera = Camera::default();
        camera.follow(Vec2::new(TILE_PX, TILE_PX), &interior, VIEW);

        assert_eq!(camera.offset.x, -(800.0 - 576.0) / 2.0);
        assert_eq!(camera.offset.y, -(600.0 - 480.0) / 2.0);

        let before = camera.offset;
        camera.follow(Vec2::new(8.0 * TILE_PX, 7.0 * TILE_PX), &interior, VIEW);
        assert_eq!(camera.offset, before);
    }

    #[test]
    fn large_map_clamps_at_edges() {
        let city = map(40, 30);
        let mut camera = Camera::default();

        camera.follow(Vec2::new(0.0, 0.0), &city, VIEW);
        assert_eq!(camera.offset, Vec2::new(0.0, 0.0));

        camera.follow(Vec2::new(39.0 * TILE_PX, 29.0 * TILE_PX), &city, VIEW);
        assert_eq!(camera.offset, Vec2::new(1920.0 - 800.0, 1440.0 - 600.0));
    }

    #[test]
    fn large_map_centres_actor_tile_mid_map() {
        let city = map(40, 30);
        let mut camera = Camera::default();
        let actor = Vec2::new(20.0 * TILE_PX, 15.0 * TILE_PX);
        camera.follow(actor, &city, VIEW);

        let (sx, sy) = camera.world_to_screen(actor);
        assert_eq!(sx + TILE_PX as i32 / 2, 400);
        assert_eq!(sy + TILE_PX as i32 / 2, 300);
    }

    #[test]
    fn visible_range_is_clamped_to_map() {
        let city = map(40, 30);
        let camera = Camera {
            offset: Vec2::new(100.0, 0.0),
        };
        let range = camera.visible_cells(&city, VIEW);
        assert_eq!(range.min, Cell::new(2, 0));
        assert_eq!(range.max, Cell::new(19, 13));
        assert_eq!(range.iter().count(), 17 * 13);

        let centred = Camera {
            offset: Vec2::new(-112.0, -60.0),
        };
        let small = centred.visible_cells(&map(12, 10), VIEW);
        assert_eq!(small.min, Cell::new(0, 0));
        assert_eq!(small.max, Cell::new(12, 10));
    }
}
