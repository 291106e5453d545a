use tracing::{debug, info, warn};

use crate::app::InputSnapshot;
use crate::content::CaseDatabase;

use super::accusation::AccusationBoard;
use super::actor::{Actor, Direction};
use super::camera::{Camera, Viewport, TILE_PX};
use super::citygen::{generate_city, PLAYER_START};
use super::dialogue::{
    Notices, BUILDING_LABEL_TOAST_TICKS, ENTER_TOAST_TICKS, EXIT_TOAST_TICKS,
    POINT_OF_INTEREST_TOAST_TICKS,
};
use super::grid::{Cell, GridMap, GridMapError};
use super::interiors::build_interiors;
use super::movement::{plan_move, MoveCooldown, MovePlan};
use super::npc::NpcRoster;
use super::quest::{QuestState, TalkOutcome};
use super::registry::{InteriorId, MapRef, MapRegistry};
use super::riddle::{RiddleId, RiddlePhase, RiddleSession};
use super::tile::{CollisionClass, TileId};
use super::transition::SceneTransition;
use super::view::{FrameView, HudSnapshot, NpcMarker, RiddlePrompt, TileView};

/// Simulation frames per in-game second, matching the default loop rate.
pub const FRAMES_PER_SECOND: u64 = 60;

const EXIT_TOAST: &str = "🚪 Saliste del edificio";
const POINT_OF_INTEREST_TOAST: &str = "🔍 Lugar de interés...";

/// The whole game state: maps, player, camera, storyline and overlays.
#[derive(Debug, Clone)]
pub struct GameWorld {
    case: CaseDatabase,
    registry: MapRegistry,
    transition: SceneTransition,
    actor: Actor,
    camera: Camera,
    viewport: Viewport,
    cooldown: MoveCooldown,
    quest: QuestState,
    riddles: RiddleSession,
    npcs: NpcRoster,
    notices: Notices,
    accusations: AccusationBoard,
    frames: u64,
}

impl GameWorld {
    pub fn new(case: CaseDatabase, seed: u64, viewport: Viewport) -> Result<Self, GridMapError> {
        let npcs = NpcRoster::new(case.npcs().to_vec());
        let layout = generate_city(seed, &npcs.cells())?;
        let mut registry = MapRegistry::new(layout.map, layout.buildings);
        for (id, def) in build_interiors()? {
            registry.register_interior(id, def);
        }

        for riddle in case.riddles() {
            if let MapRef::Interior(id) = &riddle.map {
                if registry.interior(id).is_none() {
                    warn!(riddle = %riddle.id, interior = %id, "riddle_bound_to_unknown_interior");
                }
            }
        }

        let riddles = RiddleSession::new(case.riddles().len());
        let accusations = AccusationBoard::new(
            case.suspects().to_vec(),
            case.culprit().map(str::to_string),
        );
        let mut world = Self {
            case,
            registry,
            transition: SceneTransition::default(),
            actor: Actor::spawn(PLAYER_START),
            camera: Camera::default(),
            viewport,
            cooldown: MoveCooldown::default(),
            quest: QuestState::default(),
            riddles,
            npcs,
            notices: Notices::default(),
            accusations,
            frames: 0,
        };
        world.follow_actor();

        info!(
            seed,
            riddles = world.riddles.total(),
            npcs = world.npcs.npcs().len(),
            interiors = world.registry.interior_ids().count(),
            "world_created"
        );
        Ok(world)
    }

    /// One simulation frame: modal input, movement and riddle trigger, actor
    /// easing, camera follow, then counters.
    pub fn frame(&mut self, input: &InputSnapshot) {
        self.handle_modal_input(input);
        self.handle_movement(input);
        self.actor.advance();
        self.follow_actor();
        self.frames += 1;
        self.notices.tick();
    }

    pub fn case(&self) -> &CaseDatabase {
        &self.case
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn active_map(&self) -> &GridMap {
        self.registry.active()
    }

    pub fn registry(&self) -> &MapRegistry {
        &self.registry
    }

    pub fn transition(&self) -> &SceneTransition {
        &self.transition
    }

    pub fn quest(&self) -> &QuestState {
        &self.quest
    }

    pub fn riddles(&self) -> &RiddleSession {
        &self.riddles
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn accusations(&self) -> &AccusationBoard {
        &self.accusations
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.frames / FRAMES_PER_SECOND
    }

    pub fn is_complete(&self) -> bool {
        self.riddles.phase() == RiddlePhase::Complete
    }

    /// Modal overlays and riddle screens turn movement into a no-op.
    pub fn movement_blocked(&self) -> bool {
        self.riddles.blocks_movement() || self.notices.is_dialogue_open()
    }

    /// True when a held direction would be acted on this frame.
    pub fn ready_for_move(&self) -> bool {
        !self.movement_blocked() && !self.actor.is_moving() && self.cooldown.is_ready()
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.follow_actor();
    }

    pub fn accuse(&mut self, suspect_id: &str) -> bool {
        self.accusations.accuse(suspect_id)
    }

    /// Attempts one step, bypassing the cooldown. Interactive targets run the
    /// interaction handler and are only entered when it does not consume them.
    pub fn try_move(&mut self, direction: Direction) -> MovePlan {
        let plan = plan_move(&mut self.actor, self.registry.active(), direction);
        match plan {
            MovePlan::Commit(cell) => self.actor.commit(cell),
            MovePlan::Interact(cell) => {
                if !self.handle_interaction(cell) {
                    self.actor.commit(cell);
                }
            }
            MovePlan::Busy | MovePlan::OutOfBounds | MovePlan::Blocked => {}
        }
        plan
    }

    /// Interact key: nearby NPC first, otherwise the cell ahead.
    pub fn interact(&mut self) -> bool {
        if !self.transition.is_indoors() {
            if let Some(index) = self.npcs.find_nearby(self.actor.rounded_cell()) {
                self.talk_to(index);
                return true;
            }
        }
        let front = self.actor.front_cell();
        self.handle_interaction(front)
    }

    /// Resolves an interaction with `cell`. Returns true when it consumed the
    /// step (talk, enter, exit).
    pub fn handle_interaction(&mut self, cell: Cell) -> bool {
        match self.transition.interior_id().cloned() {
            None => {
                if let Some(index) = self.npcs.at(cell) {
                    self.talk_to(index);
                    return true;
                }
                if let Some(building) = self.registry.building_at_door(cell) {
                    match building.interior.clone() {
                        Some(id) => {
                            self.enter_interior(&id);
                            return true;
                        }
                        None => {
                            let message = format!("📍 {}", building.label);
                            self.notices
                                .show_toast(message, BUILDING_LABEL_TOAST_TICKS);
                            return false;
                        }
                    }
                }
            }
            Some(id) => {
                let is_exit = self
                    .registry
                    .interior(&id)
                    .is_some_and(|def| def.exit_door() == cell);
                if is_exit {
                    self.exit_interior();
                    return true;
                }
            }
        }

        self.notices
            .show_toast(POINT_OF_INTEREST_TOAST, POINT_OF_INTEREST_TOAST_TICKS);
        false
    }

    /// Enables `id` and drops its evidence marker on every copy of the bound
    /// map. Unknown ids only log.
    pub fn enable_riddle(&mut self, id: RiddleId) -> bool {
        let Some(riddle) = self.case.riddle(id) else {
            debug!(riddle = %id, "enable_unknown_riddle");
            return false;
        };
        let newly_enabled = self.quest.enable(id);
        if !self.quest.is_solved(id) {
            self.transition.write_object(
                &mut self.registry,
                &riddle.map,
                riddle.cell,
                TileId::Evidence,
                CollisionClass::Walkable,
            );
        }
        debug!(riddle = %id, map = %riddle.map, newly_enabled, "riddle_enabled");
        newly_enabled
    }

    pub fn enter_interior(&mut self, id: &InteriorId) -> bool {
        if !self
            .transition
            .enter_interior(id, &mut self.registry, &mut self.actor)
        {
            return false;
        }
        if let Some(def) = self.registry.interior(id) {
            let message = format!("🏠 {}", def.label);
            self.notices.show_toast(message, ENTER_TOAST_TICKS);
        }
        self.follow_actor();
        true
    }

    pub fn exit_interior(&mut self) -> bool {
        if !self
            .transition
            .exit_interior(&mut self.registry, &mut self.actor)
        {
            return false;
        }
        self.notices.show_toast(EXIT_TOAST, EXIT_TOAST_TICKS);
        self.follow_actor();
        true
    }

    pub fn view(&self) -> FrameView {
        let map = self.registry.active();
        let visible = self.camera.visible_cells(map, self.viewport);
        let tiles = visible
            .iter()
            .filter_map(|cell| {
                Some(TileView {
                    cell,
                    floor: map.floor_at(cell)?,
                    object: map.object_at(cell)?,
                })
            })
            .collect();

        let indoors = self.transition.interior_id();
        let map_label = indoors
            .and_then(|id| self.registry.interior(id))
            .map(|def| def.label.clone());
        let (buildings, npcs) = if indoors.is_some() {
            (Vec::new(), Vec::new())
        } else {
            let npcs = self
                .npcs
                .npcs()
                .iter()
                .map(|npc| NpcMarker {
                    cell: npc.cell,
                    name: npc.name.clone(),
                    kind: npc.kind,
                })
                .collect();
            (self.registry.buildings().to_vec(), npcs)
        };

        FrameView {
            map: self.transition.current_map(),
            map_label,
            visible,
            tiles,
            actor_cell: self.actor.target(),
            actor_px: self.actor.pixel_position(TILE_PX),
            actor_facing: self.actor.facing(),
            camera_offset: self.camera.offset,
            buildings,
            npcs,
        }
    }

    pub fn hud(&self) -> HudSnapshot {
        let riddle = self
            .riddles
            .active_riddle()
            .and_then(|id| self.case.riddle(id))
            .map(|def| RiddlePrompt {
                id: def.id,
                location: def.location.clone(),
                question: def.question.clone(),
                options: def.options.clone(),
            });
        let location = match self.transition.interior_id() {
            Some(id) => self
                .registry
                .interior(id)
                .map(|def| def.label.clone())
                .unwrap_or_else(|| id.to_string()),
            None => "Ciudad".to_string(),
        };

        HudSnapshot {
            solved: self.riddles.solved_count(),
            total: self.riddles.total(),
            elapsed_seconds: self.elapsed_seconds(),
            stage: self.quest.stage(),
            location,
            player: self.actor.target(),
            facing: self.actor.facing(),
            phase: self.riddles.phase(),
            riddle,
            clues: self.riddles.clues().to_vec(),
            dialogue: self.notices.dialogue().cloned(),
            toast: self.notices.toast().cloned(),
        }
    }

    fn handle_modal_input(&mut self, input: &InputSnapshot) {
        match self.riddles.phase() {
            RiddlePhase::Finale | RiddlePhase::Complete | RiddlePhase::Result { .. } => {
                if input.confirm_pressed() {
                    self.riddles.acknowledge();
                }
                return;
            }
            RiddlePhase::Active { .. } => {
                if let Some(option) = input.option_pressed() {
                    self.select_option(usize::from(option));
                }
                return;
            }
            RiddlePhase::Idle => {}
        }

        if self.notices.is_dialogue_open() {
            if input.interact_pressed() || input.confirm_pressed() {
                self.notices.close_dialogue();
            }
            return;
        }
        if input.interact_pressed() {
            self.interact();
        }
    }

    fn handle_movement(&mut self, input: &InputSnapshot) {
        if self.movement_blocked() {
            return;
        }
        if self.cooldown.poll() {
            if let Some(direction) = input.move_direction() {
                self.try_move(direction);
                self.cooldown.restart();
            }
        }
        self.check_for_riddle();
    }

    fn check_for_riddle(&mut self) {
        if self.riddles.phase() != RiddlePhase::Idle {
            return;
        }
        let map = self.transition.current_map();
        let hit = self
            .case
            .riddle_at(&map, self.actor.target())
            .map(|riddle| riddle.id)
            .filter(|id| self.quest.is_enabled(*id) && !self.quest.is_solved(*id));
        if let Some(id) = hit {
            self.riddles.activate(id);
        }
    }

    fn select_option(&mut self, index: usize) {
        let Some(id) = self.riddles.active_riddle() else {
            return;
        };
        let Some(riddle) = self.case.riddle(id) else {
            return;
        };
        let Some(outcome) = self.riddles.select_option(index, riddle, &mut self.quest) else {
            return;
        };
        if outcome.newly_solved {
            self.transition.write_object(
                &mut self.registry,
                &riddle.map,
                riddle.cell,
                TileId::Empty,
                CollisionClass::Walkable,
            );
        }
    }

    fn talk_to(&mut self, index: usize) {
        let Some(drives_case) = self.npcs.get(index).map(|npc| npc.drives_case) else {
            return;
        };
        if drives_case {
            match self.quest.talk(self.case.stages()) {
                TalkOutcome::Waiting { speaker, line } | TalkOutcome::Finale { speaker, line } => {
                    self.notices.open_dialogue(speaker, line);
                    return;
                }
                TalkOutcome::Advanced {
                    speaker,
                    line,
                    enabled,
                } => {
                    if let Some(id) = enabled {
                        self.enable_riddle(id);
                    }
                    self.notices.open_dialogue(speaker, line);
                    return;
                }
                TalkOutcome::Silent => {}
            }
        }
        if let Some((title, body)) = self.npcs.next_line(index) {
            self.notices.open_dialogue(title, body);
        }
    }

    fn follow_actor(&mut self) {
        let actor_px = self.actor.pixel_position(TILE_PX);
        self.camera
            .follow(actor_px, self.registry.active(), self.viewport);
    }

    #[cfg(test)]
    pub(crate) fn place_actor(&mut self, cell: Cell, facing: Direction) {
        self.actor.teleport(cell, facing);
    }
}
