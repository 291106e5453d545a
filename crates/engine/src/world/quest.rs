use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use super::riddle::RiddleId;

/// One row of the storyline: what must be solved to leave this stage and
/// what unlocks when leaving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDef {
    pub stage: u32,
    pub required_riddle: Option<RiddleId>,
    pub enables: Option<RiddleId>,
    pub speaker: String,
    pub waiting_line: String,
    pub advance_line: String,
}

/// Ordered stage rows. The last row is terminal: satisfying it yields the
/// finale line instead of advancing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageTable {
    stages: Vec<StageDef>,
}

impl StageTable {
    /// Rows must be numbered 0..n without gaps; callers validate that.
    pub fn new(mut stages: Vec<StageDef>) -> Self {
        stages.sort_by_key(|stage| stage.stage);
        Self { stages }
    }

    pub fn get(&self, stage: u32) -> Option<&StageDef> {
        self.stages.get(stage as usize)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn is_terminal(&self, stage: u32) -> bool {
        stage as usize + 1 >= self.stages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDef> {
        self.stages.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TalkOutcome {
    Waiting {
        speaker: String,
        line: String,
    },
    Advanced {
        speaker: String,
        line: String,
        enabled: Option<RiddleId>,
    },
    Finale {
        speaker: String,
        line: String,
    },
    /// Stage has no row; nothing to say.
    Silent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestState {
    stage: u32,
    enabled: BTreeSet<RiddleId>,
    solved: BTreeSet<RiddleId>,
}

impl QuestState {
    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn is_enabled(&self, id: RiddleId) -> bool {
        self.enabled.contains(&id)
    }

    pub fn is_solved(&self, id: RiddleId) -> bool {
        self.solved.contains(&id)
    }

    pub fn enabled(&self) -> impl Iterator<Item = RiddleId> + '_ {
        self.enabled.iter().copied()
    }

    pub fn solved_count(&self) -> usize {
        self.solved.len()
    }

    /// Returns true only the first time `id` is enabled.
    pub fn enable(&mut self, id: RiddleId) -> bool {
        self.enabled.insert(id)
    }

    /// Returns true only the first time `id` is solved.
    pub fn mark_solved(&mut self, id: RiddleId) -> bool {
        self.solved.insert(id)
    }

    /// Runs one conversation with the gating witness against `table`.
    pub fn talk(&mut self, table: &StageTable) -> TalkOutcome {
        let Some(row) = table.get(self.stage) else {
            return TalkOutcome::Silent;
        };

        if let Some(required) = row.required_riddle {
            if !self.is_solved(required) {
                return TalkOutcome::Waiting {
                    speaker: row.speaker.clone(),
                    line: row.waiting_line.clone(),
                };
            }
        }

        if table.is_terminal(self.stage) {
            return TalkOutcome::Finale {
                speaker: row.speaker.clone(),
                line: row.advance_line.clone(),
            };
        }

        let enabled = row.enables;
        let outcome = TalkOutcome::Advanced {
            speaker: row.speaker.clone(),
            line: row.advance_line.clone(),
            enabled,
        };
        self.stage += 1;
        if let Some(id) = enabled {
            self.enable(id);
        }
        info!(stage = self.stage, enabled = ?enabled, "quest_stage_advanced");
        outcome
    }
}
