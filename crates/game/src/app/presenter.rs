use engine::world::{
    draw_spec_of, DialogueBox, FrameView, GameWorld, HudSnapshot, NpcKind, RiddlePhase, TileId,
    Toast,
};

use super::preferences::CharacterId;

const ACTOR_GLYPH: char = '@';

fn npc_glyph(kind: NpcKind) -> char {
    match kind {
        NpcKind::Witness => '!',
        NpcKind::Suspect => '?',
        NpcKind::Civilian => '&',
    }
}

/// Draws the visible cells as text, one row per line, followed by the labels
/// of any building whose door is on screen.
pub(crate) fn render_look(view: &FrameView) -> Vec<String> {
    let mut lines = Vec::new();
    let title = view.map_label.as_deref().unwrap_or("Ciudad");
    lines.push(format!(
        "== {title} == ({}, {}) mirando {}",
        view.actor_cell.x,
        view.actor_cell.y,
        view.actor_facing.as_str()
    ));

    for y in view.visible.min.y..view.visible.max.y {
        let mut row = String::new();
        for x in view.visible.min.x..view.visible.max.x {
            row.push(glyph_at(view, engine::Cell::new(x, y)));
        }
        lines.push(row.trim_end().to_string());
    }

    for building in &view.buildings {
        let door = building.door;
        let on_screen = (view.visible.min.x..view.visible.max.x).contains(&door.x)
            && (view.visible.min.y..view.visible.max.y).contains(&door.y);
        if on_screen {
            lines.push(format!("  puerta ({}, {}): {}", door.x, door.y, building.label));
        }
    }
    lines
}

fn glyph_at(view: &FrameView, cell: engine::Cell) -> char {
    if cell == view.actor_cell {
        return ACTOR_GLYPH;
    }
    if let Some(npc) = view.npcs.iter().find(|npc| npc.cell == cell) {
        return npc_glyph(npc.kind);
    }
    match view.tile_at(cell) {
        Some(tile) if tile.object != TileId::Empty => draw_spec_of(tile.object).glyph,
        Some(tile) => draw_spec_of(tile.floor).glyph,
        None => ' ',
    }
}

pub(crate) fn render_status(hud: &HudSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(hud)
}

fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Remembers what was last printed so each present only reports changes.
#[derive(Debug)]
pub(crate) struct ScreenTracker {
    character: CharacterId,
    last_phase: RiddlePhase,
    last_dialogue: Option<DialogueBox>,
    last_toast: Option<Toast>,
}

impl ScreenTracker {
    pub(crate) fn new(character: CharacterId) -> Self {
        Self {
            character,
            last_phase: RiddlePhase::Idle,
            last_dialogue: None,
            last_toast: None,
        }
    }

    pub(crate) fn banner(&self, world: &GameWorld) -> Vec<String> {
        vec![
            format!("=== {} ===", world.case().title()),
            format!("Detective: {}", self.character.display_name()),
            "Escribe 'help' para ver los comandos.".to_string(),
        ]
    }

    pub(crate) fn collect_changes(&mut self, world: &GameWorld, out: &mut Vec<String>) {
        let hud = world.hud();

        if is_fresh_toast(self.last_toast.as_ref(), hud.toast.as_ref()) {
            if let Some(toast) = &hud.toast {
                out.push(toast.message.clone());
            }
        }
        self.last_toast = hud.toast.clone();

        if hud.dialogue != self.last_dialogue {
            if let Some(dialogue) = &hud.dialogue {
                out.push(format!("[{}]", dialogue.title));
                out.extend(dialogue.body.lines().map(|line| format!("  {line}")));
                out.push("  (interact o confirm para cerrar)".to_string());
            }
            self.last_dialogue = hud.dialogue.clone();
        }

        if hud.phase != self.last_phase {
            self.describe_phase(world, &hud, out);
            self.last_phase = hud.phase;
        }
    }

    fn describe_phase(&self, world: &GameWorld, hud: &HudSnapshot, out: &mut Vec<String>) {
        match hud.phase {
            RiddlePhase::Idle => {}
            RiddlePhase::Active { .. } => {
                let Some(prompt) = &hud.riddle else {
                    return;
                };
                out.push(format!("🔎 {}", prompt.location));
                out.extend(prompt.question.lines().map(|line| format!("  {line}")));
                for option in &prompt.options {
                    out.push(format!("  {}) {}", option.label, option.text));
                }
                out.push("  (option 1-4 para responder)".to_string());
            }
            RiddlePhase::Result { correct: true, .. } => {
                out.push("✅ ¡CORRECTO!".to_string());
                if let Some(clue) = hud.clues.last() {
                    out.push(format!("  {clue}"));
                }
                out.push(format!("  Pistas: {}/{}", hud.solved, hud.total));
                out.push("  (confirm para continuar)".to_string());
            }
            RiddlePhase::Result { correct: false, .. } => {
                out.push("❌ INCORRECTO".to_string());
                out.push("  (confirm para intentarlo de nuevo)".to_string());
            }
            RiddlePhase::Finale => {
                out.push("🏆 ¡CASO RESUELTO!".to_string());
                out.push("  Has reunido todas las pistas:".to_string());
                out.extend(hud.clues.iter().map(|clue| format!("  - {clue}")));
                if let Some(name) = culprit_name(world) {
                    out.push(format!("  El asesino es: {}", name.to_uppercase()));
                }
                out.push("  (confirm para continuar)".to_string());
            }
            RiddlePhase::Complete => {
                out.push("🎉 ¡FELICIDADES!".to_string());
                out.push(format!("  Has resuelto el caso de {}", world.case().title()));
                out.push(format!("  Tiempo: {}", format_clock(hud.elapsed_seconds)));
            }
        }
    }
}

fn is_fresh_toast(previous: Option<&Toast>, current: Option<&Toast>) -> bool {
    match (previous, current) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(previous), Some(current)) => {
            previous.message != current.message
                || current.remaining_ticks > previous.remaining_ticks
        }
    }
}

fn culprit_name(world: &GameWorld) -> Option<&str> {
    let culprit = world.case().culprit()?;
    world
        .case()
        .suspects()
        .iter()
        .find(|suspect| suspect.id == culprit)
        .map(|suspect| suspect.name.as_str())
}
