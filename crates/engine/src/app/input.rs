use crate::world::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Confirm,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
            InputAction::Confirm => 5,
            InputAction::Quit => 6,
        }
    }
}

/// One tick worth of input. Movement actions are held states; interact,
/// confirm and the option index are presses seen this tick only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
    option_pressed: Option<u8>,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_down(InputAction::Quit)
    }

    pub fn interact_pressed(&self) -> bool {
        self.is_down(InputAction::Interact)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.is_down(InputAction::Confirm)
    }

    /// Zero-based riddle option chosen this tick.
    pub fn option_pressed(&self) -> Option<u8> {
        self.option_pressed
    }

    /// Held direction, first match in up/down/left/right order.
    pub fn move_direction(&self) -> Option<Direction> {
        [
            (InputAction::MoveUp, Direction::Up),
            (InputAction::MoveDown, Direction::Down),
            (InputAction::MoveLeft, Direction::Left),
            (InputAction::MoveRight, Direction::Right),
        ]
        .into_iter()
        .find_map(|(action, direction)| self.is_down(action).then_some(direction))
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_direction(self, direction: Direction) -> Self {
        let action = match direction {
            Direction::Up => InputAction::MoveUp,
            Direction::Down => InputAction::MoveDown,
            Direction::Left => InputAction::MoveLeft,
            Direction::Right => InputAction::MoveRight,
        };
        self.with_action_down(action, true)
    }

    pub fn with_option_pressed(mut self, option: Option<u8>) -> Self {
        self.option_pressed = option;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn up_wins_over_other_held_directions() {
        let input = InputSnapshot::empty()
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveUp, true);
        assert_eq!(input.move_direction(), Some(Direction::Up));
    }

    #[test]
    fn empty_snapshot_has_no_intent() {
        let input = InputSnapshot::empty();
        assert_eq!(input.move_direction(), None);
        assert!(!input.interact_pressed());
        assert!(!input.confirm_pressed());
        assert!(!input.quit_requested());
        assert_eq!(input.option_pressed(), None);
    }

    #[test]
    fn with_direction_sets_matching_action() {
        let input = InputSnapshot::empty().with_direction(Direction::Left);
        assert!(input.is_down(InputAction::MoveLeft));
        assert_eq!(input.move_direction(), Some(Direction::Left));
    }
}
