use std::collections::HashMap;

use crate::world::{Cell, MapRef, NpcDef, RiddleDef, RiddleId, StageTable, Suspect};

/// Compiled case content: riddles, NPCs, storyline stages, suspects.
#[derive(Debug, Default, Clone)]
pub struct CaseDatabase {
    title: String,
    riddles: Vec<RiddleDef>,
    riddle_index_by_id: HashMap<RiddleId, usize>,
    npcs: Vec<NpcDef>,
    stages: StageTable,
    suspects: Vec<Suspect>,
    culprit: Option<String>,
}

impl CaseDatabase {
    pub(crate) fn from_parts(
        title: String,
        mut riddles: Vec<RiddleDef>,
        npcs: Vec<NpcDef>,
        stages: StageTable,
        suspects: Vec<Suspect>,
        culprit: Option<String>,
    ) -> Self {
        riddles.sort_by_key(|riddle| riddle.id);
        let riddle_index_by_id = riddles
            .iter()
            .enumerate()
            .map(|(idx, riddle)| (riddle.id, idx))
            .collect();
        Self {
            title,
            riddles,
            riddle_index_by_id,
            npcs,
            stages,
            suspects,
            culprit,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn riddle(&self, id: RiddleId) -> Option<&RiddleDef> {
        self.riddle_index_by_id
            .get(&id)
            .and_then(|idx| self.riddles.get(*idx))
    }

    /// Riddles in ascending id order.
    pub fn riddles(&self) -> &[RiddleDef] {
        &self.riddles
    }

    pub fn riddle_at(&self, map: &MapRef, cell: Cell) -> Option<&RiddleDef> {
        self.riddles
            .iter()
            .find(|riddle| riddle.cell == cell && &riddle.map == map)
    }

    pub fn npcs(&self) -> &[NpcDef] {
        &self.npcs
    }

    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    pub fn suspects(&self) -> &[Suspect] {
        &self.suspects
    }

    pub fn culprit(&self) -> Option<&str> {
        self.culprit.as_deref()
    }
}
