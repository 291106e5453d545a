use serde::Serialize;
use tracing::debug;

use super::grid::Cell;

/// Same cell, the four neighbours, then the four diagonals.
pub const NPC_SEARCH_OFFSETS: [(i32, i32); 9] = [
    (0, 0),
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NpcKind {
    Witness,
    Suspect,
    Civilian,
}

impl NpcKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "witness" => Some(Self::Witness),
            "suspect" => Some(Self::Suspect),
            "civilian" => Some(Self::Civilian),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Witness => "witness",
            Self::Suspect => "suspect",
            Self::Civilian => "civilian",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcTopic {
    pub question: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NpcDef {
    pub id: String,
    pub name: String,
    pub kind: NpcKind,
    pub cell: Cell,
    pub greeting: String,
    pub topics: Vec<NpcTopic>,
    pub clue: String,
    pub suspicion: Option<u8>,
    /// The witness whose talks drive the storyline stages. Other NPCs never
    /// gate a stage.
    pub drives_case: bool,
}

/// Exterior NPCs plus how often each has been talked to.
#[derive(Debug, Clone, Default)]
pub struct NpcRoster {
    npcs: Vec<NpcDef>,
    talks: Vec<u32>,
}

impl NpcRoster {
    pub fn new(npcs: Vec<NpcDef>) -> Self {
        let talks = vec![0; npcs.len()];
        Self { npcs, talks }
    }

    pub fn npcs(&self) -> &[NpcDef] {
        &self.npcs
    }

    pub fn get(&self, index: usize) -> Option<&NpcDef> {
        self.npcs.get(index)
    }

    pub fn cells(&self) -> Vec<Cell> {
        self.npcs.iter().map(|npc| npc.cell).collect()
    }

    pub fn at(&self, cell: Cell) -> Option<usize> {
        self.npcs.iter().position(|npc| npc.cell == cell)
    }

    /// First NPC found scanning `NPC_SEARCH_OFFSETS` around `origin`.
    pub fn find_nearby(&self, origin: Cell) -> Option<usize> {
        NPC_SEARCH_OFFSETS
            .iter()
            .find_map(|&(dx, dy)| self.at(origin.offset(dx, dy)))
    }

    #[cfg(test)]
    fn talk_count(&self, index: usize) -> u32 {
        self.talks.get(index).copied().unwrap_or(0)
    }

    /// Title and body for an NPC outside the storyline: the greeting first,
    /// then each topic in turn.
    pub fn next_line(&mut self, index: usize) -> Option<(String, String)> {
        let npc = self.npcs.get(index)?;
        let count = self.talks.get_mut(index)?;

        let body = match (*count, npc.topics.len()) {
            (0, _) | (_, 0) => npc.greeting.clone(),
            (n, len) => {
                let topic = &npc.topics[(n as usize - 1) % len];
                format!("{}\n\n{}", topic.question, topic.response)
            }
        };
        *count += 1;
        debug!(npc = %npc.id, talks = *count, "npc_talked");
        Some((npc.name.clone(), body))
    }
}
