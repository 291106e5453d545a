mod accusation;
mod actor;
mod camera;
mod citygen;
mod dialogue;
mod game_world;
mod grid;
mod interiors;
mod movement;
mod npc;
mod quest;
mod registry;
mod riddle;
mod tile;
mod transition;
mod view;

pub use accusation::{AccusationAttempt, AccusationBoard, Suspect};
pub use actor::{Actor, Direction, Vec2, INTERPOLATION_FACTOR, SNAP_EPSILON};
pub use camera::{Camera, Viewport, VisibleCells, TILE_PX, TILE_SCALE, TILE_SOURCE_PX};
pub use citygen::{generate_city, CityLayout, CITY_HEIGHT, CITY_WIDTH, PLAYER_START};
pub use dialogue::{
    DialogueBox, Notices, Toast, BUILDING_LABEL_TOAST_TICKS, ENTER_TOAST_TICKS, EXIT_TOAST_TICKS,
    POINT_OF_INTEREST_TOAST_TICKS,
};
pub use game_world::{GameWorld, FRAMES_PER_SECOND};
pub use grid::{Cell, GridMap, GridMapError};
pub use interiors::{
    build_interiors, APARTAMENTOS, BIBLIOTECA, CASA, COMISARIA, CRIME_SCENE, HOSPITAL,
    RESTAURANTE,
};
pub use movement::{plan_move, MoveCooldown, MovePlan, MOVE_COOLDOWN_TICKS};
pub use npc::{NpcDef, NpcKind, NpcRoster, NpcTopic, NPC_SEARCH_OFFSETS};
pub use quest::{QuestState, StageDef, StageTable, TalkOutcome};
pub use registry::{BuildingLabel, InteriorDef, InteriorId, MapRef, MapRegistry};
pub use riddle::{AnswerOutcome, RiddleDef, RiddleId, RiddleOption, RiddlePhase, RiddleSession};
pub use tile::{collision_class_of, draw_spec_of, CollisionClass, DrawSpec, TileId};
pub use transition::{ExteriorSnapshot, Location, SceneTransition};
pub use view::{FrameView, HudSnapshot, NpcMarker, RiddlePrompt, TileView};
