use std::fmt;

use serde::Serialize;
use tracing::info;

use super::grid::Cell;
use super::quest::QuestState;
use super::registry::MapRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RiddleId(pub u32);

impl fmt::Display for RiddleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiddleOption {
    pub label: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiddleDef {
    pub id: RiddleId,
    /// Place name shown above the question.
    pub location: String,
    pub question: String,
    pub options: Vec<RiddleOption>,
    pub correct_index: usize,
    pub clue_text: String,
    pub map: MapRef,
    pub cell: Cell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum RiddlePhase {
    #[default]
    Idle,
    Active {
        id: RiddleId,
    },
    Result {
        id: RiddleId,
        correct: bool,
    },
    Finale,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub id: RiddleId,
    pub correct: bool,
    /// True only for the answer that first solved the riddle.
    pub newly_solved: bool,
}

/// Modal riddle flow plus the clues gathered so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RiddleSession {
    phase: RiddlePhase,
    clues: Vec<String>,
    solved_count: usize,
    total: usize,
}

impl RiddleSession {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> RiddlePhase {
        self.phase
    }

    pub fn clues(&self) -> &[String] {
        &self.clues
    }

    pub fn solved_count(&self) -> usize {
        self.solved_count
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn active_riddle(&self) -> Option<RiddleId> {
        match self.phase {
            RiddlePhase::Active { id } | RiddlePhase::Result { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Any non-idle phase freezes movement.
    pub fn blocks_movement(&self) -> bool {
        self.phase != RiddlePhase::Idle
    }

    pub fn activate(&mut self, id: RiddleId) -> bool {
        if self.phase != RiddlePhase::Idle {
            return false;
        }
        self.phase = RiddlePhase::Active { id };
        info!(riddle = %id, "riddle_activated");
        true
    }

    /// Grades `index` against the active riddle. Out-of-range indices and
    /// calls outside the active phase are ignored.
    pub fn select_option(
        &mut self,
        index: usize,
        riddle: &RiddleDef,
        quest: &mut QuestState,
    ) -> Option<AnswerOutcome> {
        let RiddlePhase::Active { id } = self.phase else {
            return None;
        };
        if id != riddle.id || index >= riddle.options.len() {
            return None;
        }

        let correct = index == riddle.correct_index;
        let newly_solved = correct && quest.mark_solved(id);
        if newly_solved {
            self.solved_count += 1;
            if !self.clues.contains(&riddle.clue_text) {
                self.clues.push(riddle.clue_text.clone());
            }
        }
        self.phase = RiddlePhase::Result { id, correct };
        info!(riddle = %id, option = index, correct, "riddle_answered");

        Some(AnswerOutcome {
            id,
            correct,
            newly_solved,
        })
    }

    /// Confirms the current screen: result to idle/retry/finale, finale to complete.
    pub fn acknowledge(&mut self) {
        self.phase = match self.phase {
            RiddlePhase::Result { correct: true, .. } if self.solved_count >= self.total => {
                info!(solved = self.solved_count, "finale_reached");
                RiddlePhase::Finale
            }
            RiddlePhase::Result { correct: true, .. } => RiddlePhase::Idle,
            RiddlePhase::Result { id, correct: false } => RiddlePhase::Active { id },
            RiddlePhase::Finale => RiddlePhase::Complete,
            other => other,
        };
    }
}
