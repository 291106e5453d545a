use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use engine::app::{
    CommandPlayback, ConsoleCommandProcessor, ConsoleReport, Frontend, InputSnapshot,
    MetricsHandle,
};
use engine::world::GameWorld;
use tracing::{debug, info, warn};

use super::preferences::CharacterId;
use super::presenter::{render_look, render_status, ScreenTracker};

/// Spawns the stdin reader. The channel disconnects at end of input.
pub(crate) fn spawn_stdin_reader() -> io::Result<Receiver<String>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("stdin_reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(line).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(error = %error, "stdin_read_failed");
                        break;
                    }
                }
            }
            debug!("stdin_closed");
        })?;
    Ok(receiver)
}

/// Text frontend: console lines in, change reports out.
pub(crate) struct ConsoleFrontend<W: Write> {
    lines: Receiver<String>,
    processor: ConsoleCommandProcessor,
    playback: CommandPlayback,
    tracker: ScreenTracker,
    out: W,
    pending_output: Vec<String>,
    input_closed: bool,
    announced: bool,
}

impl<W: Write> ConsoleFrontend<W> {
    pub(crate) fn new(lines: Receiver<String>, out: W, character: CharacterId) -> Self {
        Self {
            lines,
            processor: ConsoleCommandProcessor::new(),
            playback: CommandPlayback::new(),
            tracker: ScreenTracker::new(character),
            out,
            pending_output: Vec::new(),
            input_closed: false,
            announced: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.out
    }

    fn pump_lines(&mut self) {
        loop {
            match self.lines.try_recv() {
                Ok(line) => {
                    self.processor.process_line(&line, &mut self.pending_output);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.input_closed {
                        info!("console_input_closed");
                        self.input_closed = true;
                    }
                    break;
                }
            }
        }

        let mut commands = Vec::new();
        self.processor.drain_pending_commands_into(&mut commands);
        self.playback.extend(commands);
    }

    fn write_reports(&mut self) {
        let mut reports = Vec::new();
        self.playback.drain_reports_into(&mut reports);
        for report in reports {
            match report {
                ConsoleReport::Look(view) => self.pending_output.extend(render_look(&view)),
                ConsoleReport::Status(hud) => match render_status(&hud) {
                    Ok(json) => self.pending_output.push(json),
                    Err(error) => {
                        warn!(error = %error, "status_encode_failed");
                        self.pending_output.push(format!("error: {error}"));
                    }
                },
            }
        }
    }
}

impl<W: Write> Frontend for ConsoleFrontend<W> {
    fn snapshot_for_tick(&mut self, world: &GameWorld) -> InputSnapshot {
        self.pump_lines();
        self.playback.snapshot_for_tick(world)
    }

    fn present(&mut self, world: &GameWorld, _metrics: &MetricsHandle) -> io::Result<()> {
        if !self.announced {
            self.announced = true;
            let mut banner = self.tracker.banner(world);
            banner.append(&mut self.pending_output);
            self.pending_output = banner;
        }
        // Lines may arrive on iterations that ran no tick.
        self.pump_lines();
        self.tracker.collect_changes(world, &mut self.pending_output);
        self.write_reports();

        if self.pending_output.is_empty() {
            return Ok(());
        }
        for line in self.pending_output.drain(..) {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()
    }

    fn quit_requested(&self) -> bool {
        self.playback.quit_requested() || (self.input_closed && self.playback.is_idle())
    }
}

#[cfg(test)]
mod tests {
    use engine::world::Viewport;
    use engine::{builtin_case, run_app, LoopConfig};

    use super::*;

    fn world() -> GameWorld {
        GameWorld::new(builtin_case().expect("case"), 11, Viewport::default()).expect("world")
    }

    fn scripted(lines: &[&str]) -> Receiver<String> {
        let (sender, receiver) = mpsc::channel();
        for line in lines {
            sender.send(line.to_string()).expect("send");
        }
        receiver
    }

    fn fast_config() -> LoopConfig {
        LoopConfig {
            target_tps: 1_000,
            max_ticks_per_frame: 50,
            max_present_fps: None,
            ..LoopConfig::default()
        }
    }

    fn run_script(lines: &[&str]) -> (GameWorld, String) {
        let mut world = world();
        let mut frontend = ConsoleFrontend::new(scripted(lines), Vec::new(), CharacterId::Robot);
        run_app(fast_config(), &mut world, &mut frontend).expect("loop");
        let output = String::from_utf8(frontend.into_output()).expect("utf8");
        (world, output)
    }

    #[test]
    fn end_of_input_quits_after_queued_commands() {
        let (world, output) = run_script(&["move right 2", "status"]);

        assert_eq!(world.actor().target().x, 10);
        assert!(output.contains("Detective: IA Calculator"));
        assert!(output.contains("\"solved\": 0"));
    }

    #[test]
    fn quit_command_stops_before_later_commands() {
        let (world, _) = run_script(&["quit", "move right 3"]);
        assert_eq!(world.actor().target().x, 8);
    }

    #[test]
    fn status_before_move_shows_starting_cell() {
        let (world, output) = run_script(&["status", "move right 1"]);

        let block = output
            .lines()
            .skip_while(|line| *line != "{")
            .take_while(|line| *line != "}")
            .chain(["}"])
            .collect::<Vec<_>>()
            .join("\n");
        let status: serde_json::Value = serde_json::from_str(&block).expect("parse status");
        assert_eq!(status["player"]["x"], 8);
        assert_eq!(world.actor().target().x, 9);
    }

    #[test]
    fn help_and_errors_are_printed() {
        let (_, output) = run_script(&["help", "bogus"]);

        assert!(output.contains("move <dir:up|down|left|right> [steps:u32] - Walk in a direction"));
        assert!(output.contains("error: unknown command 'bogus'. try: help"));
    }

    #[test]
    fn look_draws_the_actor() {
        let (_, output) = run_script(&["look"]);
        assert!(output.contains("== Ciudad == (8, 10) mirando down"));
        assert!(output.contains('@'));
    }
}
