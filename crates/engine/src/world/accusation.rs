use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suspect {
    pub id: String,
    pub name: String,
    pub suspicion: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccusationAttempt {
    pub suspect_id: String,
    pub correct: bool,
}

/// Suspects and past accusations. Nothing in the dialogue chain calls this
/// yet; frontends may expose it directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccusationBoard {
    suspects: Vec<Suspect>,
    culprit: Option<String>,
    attempts: Vec<AccusationAttempt>,
}

impl AccusationBoard {
    pub fn new(suspects: Vec<Suspect>, culprit: Option<String>) -> Self {
        Self {
            suspects,
            culprit,
            attempts: Vec::new(),
        }
    }

    pub fn suspects(&self) -> &[Suspect] {
        &self.suspects
    }

    pub fn attempts(&self) -> &[AccusationAttempt] {
        &self.attempts
    }

    /// Highest suspicion first; ties keep declaration order.
    pub fn ranked(&self) -> Vec<&Suspect> {
        let mut ranked = self.suspects.iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.suspicion.cmp(&a.suspicion));
        ranked
    }

    /// Records an attempt. Unknown suspects are not recorded and return false.
    pub fn accuse(&mut self, suspect_id: &str) -> bool {
        if !self.suspects.iter().any(|suspect| suspect.id == suspect_id) {
            return false;
        }
        let correct = self.culprit.as_deref() == Some(suspect_id);
        self.attempts.push(AccusationAttempt {
            suspect_id: suspect_id.to_string(),
            correct,
        });
        info!(suspect = suspect_id, correct, "accusation_made");
        correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> AccusationBoard {
        AccusationBoard::new(
            vec![
                Suspect {
                    id: "suspect2".to_string(),
                    name: "Ana López".to_string(),
                    suspicion: 60,
                },
                Suspect {
                    id: "suspect1".to_string(),
                    name: "Carlos Mendez".to_string(),
                    suspicion: 75,
                },
            ],
            Some("suspect1".to_string()),
        )
    }

    #[test]
    fn accuse_reports_match_and_records_attempts() {
        let mut board = board();
        assert!(!board.accuse("suspect2"));
        assert!(board.accuse("suspect1"));
        assert_eq!(board.attempts().len(), 2);
        assert!(board.attempts()[1].correct);
    }

    #[test]
    fn unknown_suspect_is_ignored() {
        let mut board = board();
        assert!(!board.accuse("nobody"));
        assert!(board.attempts().is_empty());
    }

    #[test]
    fn ranking_orders_by_suspicion() {
        let board = board();
        let names = board
            .ranked()
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Carlos Mendez", "Ana López"]);
    }
}
