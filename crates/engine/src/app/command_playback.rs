use std::collections::VecDeque;

use crate::world::{Direction, FrameView, GameWorld, HudSnapshot};

use super::console_commands::ConsoleCommand;
use super::input::{InputAction, InputSnapshot};

/// World state captured when a `look` or `status` reaches the front of the
/// queue, before any later command runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleReport {
    Look(FrameView),
    Status(HudSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Playing {
    Move { direction: Direction, remaining: u32 },
    Wait { remaining: u32 },
}

/// Turns queued console commands into one input snapshot per tick.
///
/// Commands run strictly in order. A `move` holds its direction only on the
/// ticks the world would act on it, and finishes once the actor settles or a
/// modal screen opens.
#[derive(Debug, Default)]
pub struct CommandPlayback {
    queue: VecDeque<ConsoleCommand>,
    current: Option<Playing>,
    reports: Vec<ConsoleReport>,
    quit_requested: bool,
}

impl CommandPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: ConsoleCommand) {
        self.queue.push_back(command);
    }

    pub fn extend(&mut self, commands: impl IntoIterator<Item = ConsoleCommand>) {
        self.queue.extend(commands);
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.queue.is_empty()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn drain_reports_into(&mut self, out: &mut Vec<ConsoleReport>) {
        out.append(&mut self.reports);
    }

    pub fn snapshot_for_tick(&mut self, world: &GameWorld) -> InputSnapshot {
        loop {
            if let Some(playing) = self.current.as_mut() {
                match playing {
                    Playing::Move {
                        direction,
                        remaining,
                    } => {
                        if world.movement_blocked() {
                            self.current = None;
                            continue;
                        }
                        if *remaining == 0 {
                            if world.actor().is_moving() {
                                return InputSnapshot::empty();
                            }
                            self.current = None;
                            continue;
                        }
                        if world.ready_for_move() {
                            *remaining -= 1;
                            return InputSnapshot::empty().with_direction(*direction);
                        }
                        return InputSnapshot::empty();
                    }
                    Playing::Wait { remaining } => {
                        if *remaining == 0 {
                            self.current = None;
                            continue;
                        }
                        *remaining -= 1;
                        if *remaining == 0 {
                            self.current = None;
                        }
                        return InputSnapshot::empty();
                    }
                }
            }

            let Some(command) = self.queue.pop_front() else {
                return InputSnapshot::empty();
            };
            match command {
                ConsoleCommand::Move { direction, steps } => {
                    self.current = Some(Playing::Move {
                        direction,
                        remaining: steps,
                    });
                }
                ConsoleCommand::Wait { ticks } => {
                    self.current = Some(Playing::Wait { remaining: ticks });
                }
                ConsoleCommand::Interact => {
                    return InputSnapshot::empty().with_action_down(InputAction::Interact, true);
                }
                ConsoleCommand::Confirm => {
                    return InputSnapshot::empty().with_action_down(InputAction::Confirm, true);
                }
                ConsoleCommand::SelectOption { index } => {
                    return InputSnapshot::empty().with_option_pressed(Some(index));
                }
                ConsoleCommand::Look => self.reports.push(ConsoleReport::Look(world.view())),
                ConsoleCommand::Status => self.reports.push(ConsoleReport::Status(world.hud())),
                ConsoleCommand::Quit => {
                    self.quit_requested = true;
                    self.queue.clear();
                    return InputSnapshot::empty().with_action_down(InputAction::Quit, true);
                }
            }
        }
    }
}
