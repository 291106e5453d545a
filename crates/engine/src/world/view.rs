use serde::Serialize;

use super::actor::{Direction, Vec2};
use super::camera::VisibleCells;
use super::dialogue::{DialogueBox, Toast};
use super::grid::Cell;
use super::npc::NpcKind;
use super::registry::{BuildingLabel, MapRef};
use super::riddle::{RiddleId, RiddleOption, RiddlePhase};
use super::tile::TileId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TileView {
    pub cell: Cell,
    pub floor: TileId,
    pub object: TileId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcMarker {
    pub cell: Cell,
    pub name: String,
    pub kind: NpcKind,
}

/// Everything a renderer needs for one frame. Tiles cover `visible` in
/// row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameView {
    pub map: MapRef,
    pub map_label: Option<String>,
    pub visible: VisibleCells,
    pub tiles: Vec<TileView>,
    pub actor_cell: Cell,
    pub actor_px: Vec2,
    pub actor_facing: Direction,
    pub camera_offset: Vec2,
    pub buildings: Vec<BuildingLabel>,
    pub npcs: Vec<NpcMarker>,
}

impl FrameView {
    pub fn tile_at(&self, cell: Cell) -> Option<&TileView> {
        self.tiles.iter().find(|tile| tile.cell == cell)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiddlePrompt {
    pub id: RiddleId,
    pub location: String,
    pub question: String,
    pub options: Vec<RiddleOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HudSnapshot {
    pub solved: usize,
    pub total: usize,
    pub elapsed_seconds: u64,
    pub stage: u32,
    pub location: String,
    pub player: Cell,
    pub facing: Direction,
    pub phase: RiddlePhase,
    pub riddle: Option<RiddlePrompt>,
    pub clues: Vec<String>,
    pub dialogue: Option<DialogueBox>,
    pub toast: Option<Toast>,
}
