use std::collections::{HashMap, VecDeque};

use tracing::warn;

use crate::content::RIDDLE_OPTION_COUNT;
use crate::world::Direction;

const MAX_PENDING_COMMANDS: usize = 128;
const MAX_MOVE_STEPS: u32 = 64;
const MAX_WAIT_TICKS: u32 = 60 * 60;

/// Intent queued for the simulation. Expanded into per-tick input by
/// [`super::CommandPlayback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Move { direction: Direction, steps: u32 },
    Interact,
    SelectOption { index: u8 },
    Confirm,
    Wait { ticks: u32 },
    Look,
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalAction {
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Local(LocalAction),
    Queueable(ConsoleCommand),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParseError {
    reason: String,
    usage: String,
}

impl CommandParseError {
    pub fn new(reason: impl Into<String>, usage: &str) -> Self {
        Self {
            reason: reason.into(),
            usage: usage.to_string(),
        }
    }
}

type ParseFn = dyn Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync;
type BuiltinParse = fn(&[String]) -> Result<ParsedCommand, CommandParseError>;

const BUILTIN_COMMANDS: [(&str, &str, &str, BuiltinParse); 9] = [
    ("help", "List commands", "", parse_help_command),
    (
        "move",
        "Walk in a direction",
        "<dir:up|down|left|right> [steps:u32]",
        parse_move_command,
    ),
    (
        "interact",
        "Talk, open a door or inspect the cell ahead",
        "",
        parse_interact_command,
    ),
    (
        "option",
        "Answer the open riddle",
        "<choice:1-4|a-d>",
        parse_option_command,
    ),
    (
        "confirm",
        "Continue past a result or the finale",
        "",
        parse_confirm_command,
    ),
    ("wait", "Let ticks pass", "<ticks:u32>", parse_wait_command),
    ("look", "Print the visible map", "", parse_look_command),
    ("status", "Print the HUD as JSON", "", parse_status_command),
    ("quit", "Quit app", "", parse_quit_command),
];

struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

pub struct ConsoleCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl Default for ConsoleCommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandRegistry {
    pub fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in BUILTIN_COMMANDS {
            if let Err(error) = registry.register(name, help, arg_schema, parse) {
                warn!(command = name, error = %error, "builtin_command_rejected");
            }
        }
        registry
    }

    pub fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse: Box::new(parse),
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    /// Registration order.
    pub fn iter_specs_in_order(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.specs.iter().map(|spec| {
            (
                spec.name.as_str(),
                spec.help.as_str(),
                spec.arg_schema.as_str(),
            )
        })
    }
}

/// Parses console lines. Local actions answer immediately into the output
/// buffer; everything else is queued for the loop.
pub struct ConsoleCommandProcessor {
    registry: ConsoleCommandRegistry,
    pending_commands: VecDeque<ConsoleCommand>,
}

impl Default for ConsoleCommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandProcessor {
    pub fn new() -> Self {
        Self {
            registry: ConsoleCommandRegistry::with_builtins(),
            pending_commands: VecDeque::new(),
        }
    }

    pub fn registry_mut(&mut self) -> &mut ConsoleCommandRegistry {
        &mut self.registry
    }

    pub fn drain_pending_commands_into(&mut self, out: &mut Vec<ConsoleCommand>) {
        out.extend(self.pending_commands.drain(..));
    }

    pub fn process_line(&mut self, raw_line: &str, output: &mut Vec<String>) {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() {
            return;
        }

        let tokens = match tokenize_line(trimmed) {
            Ok(tokens) => tokens,
            Err(reason) => {
                output.push(format!("error: {reason}. usage: help"));
                return;
            }
        };
        let Some((command_name, args)) = tokens.split_first() else {
            return;
        };

        let Some(spec) = self.registry.lookup(command_name) else {
            output.push(format!(
                "error: unknown command '{}'. try: help",
                command_name
            ));
            return;
        };

        match (spec.parse)(args) {
            Ok(ParsedCommand::Local(action)) => self.apply_local_action(output, action),
            Ok(ParsedCommand::Queueable(command)) => self.push_queueable(command),
            Err(error) => {
                output.push(format!("error: {}. usage: {}", error.reason, error.usage));
            }
        }
    }

    fn apply_local_action(&self, output: &mut Vec<String>, action: LocalAction) {
        match action {
            LocalAction::Help => {
                for (name, help, arg_schema) in self.registry.iter_specs_in_order() {
                    let line = if arg_schema.is_empty() {
                        format!("{name} - {help}")
                    } else {
                        format!("{name} {arg_schema} - {help}")
                    };
                    output.push(line);
                }
            }
        }
    }

    fn push_queueable(&mut self, command: ConsoleCommand) {
        if self.pending_commands.len() == MAX_PENDING_COMMANDS {
            self.pending_commands.pop_front();
        }
        self.pending_commands.push_back(command);
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }
    if seen_token_content {
        tokens.push(current);
    }

    Ok(tokens)
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Local(LocalAction::Help))
}

fn parse_move_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "move <dir> [steps]";
    let (direction, steps) = match args {
        [direction] => (direction, None),
        [direction, steps] => (direction, Some(steps)),
        _ => {
            return Err(CommandParseError::new(
                "expected <dir> or <dir> <steps>",
                USAGE,
            ))
        }
    };

    let direction = parse_direction(direction).ok_or_else(|| {
        CommandParseError::new(
            format!("unknown direction '{direction}' (expected up|down|left|right)"),
            USAGE,
        )
    })?;
    let steps = match steps {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(steps) if (1..=MAX_MOVE_STEPS).contains(&steps) => steps,
            _ => {
                return Err(CommandParseError::new(
                    format!("invalid step count '{raw}' (expected 1-{MAX_MOVE_STEPS})"),
                    USAGE,
                ))
            }
        },
    };

    Ok(ParsedCommand::Queueable(ConsoleCommand::Move {
        direction,
        steps,
    }))
}

fn parse_direction(raw: &str) -> Option<Direction> {
    match raw.to_ascii_lowercase().as_str() {
        "up" | "w" | "north" => Some(Direction::Up),
        "down" | "s" | "south" => Some(Direction::Down),
        "left" | "a" | "west" => Some(Direction::Left),
        "right" | "d" | "east" => Some(Direction::Right),
        _ => None,
    }
}

fn parse_interact_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "interact")?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::Interact))
}

fn parse_option_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "option <choice>";
    let [choice] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <choice>",
            USAGE,
        ));
    };

    let index = parse_option_index(choice).ok_or_else(|| {
        CommandParseError::new(
            format!("invalid choice '{choice}' (expected 1-4 or a-d)"),
            USAGE,
        )
    })?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::SelectOption {
        index,
    }))
}

/// Maps `1`-`4` or `a`-`d` to a zero-based option index.
fn parse_option_index(raw: &str) -> Option<u8> {
    let mut chars = raw.chars();
    let ch = chars.next()?.to_ascii_lowercase();
    if chars.next().is_some() {
        return None;
    }
    let index = match ch {
        '1'..='9' => ch as u32 - '1' as u32,
        'a'..='z' => ch as u32 - 'a' as u32,
        _ => return None,
    };
    if (index as usize) < RIDDLE_OPTION_COUNT {
        u8::try_from(index).ok()
    } else {
        None
    }
}

fn parse_confirm_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "confirm")?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::Confirm))
}

fn parse_wait_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "wait <ticks>";
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <ticks>",
            USAGE,
        ));
    };
    match raw.parse::<u32>() {
        Ok(ticks) if (1..=MAX_WAIT_TICKS).contains(&ticks) => {
            Ok(ParsedCommand::Queueable(ConsoleCommand::Wait { ticks }))
        }
        _ => Err(CommandParseError::new(
            format!("invalid tick count '{raw}' (expected 1-{MAX_WAIT_TICKS})"),
            USAGE,
        )),
    }
}

fn parse_look_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "look")?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::Look))
}

fn parse_status_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::Status))
}

fn parse_quit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ParsedCommand::Queueable(ConsoleCommand::Quit))
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::new("unexpected extra arguments", usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_lines(processor: &mut ConsoleCommandProcessor, lines: &[&str]) -> Vec<String> {
        let mut output = Vec::new();
        for line in lines {
            processor.process_line(line, &mut output);
        }
        output
    }

    fn drain(processor: &mut ConsoleCommandProcessor) -> Vec<ConsoleCommand> {
        let mut queued = Vec::new();
        processor.drain_pending_commands_into(&mut queued);
        queued
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let mut processor = ConsoleCommandProcessor::new();
        let lines = run_lines(&mut processor, &["help"]);

        assert_eq!(lines.len(), BUILTIN_COMMANDS.len());
        assert_eq!(lines[0], "help - List commands");
        assert_eq!(
            lines[1],
            "move <dir:up|down|left|right> [steps:u32] - Walk in a direction"
        );
        assert_eq!(lines[8], "quit - Quit app");
        assert!(drain(&mut processor).is_empty());
    }

    #[test]
    fn unknown_command_reports_clear_error() {
        let mut processor = ConsoleCommandProcessor::new();
        assert_eq!(
            run_lines(&mut processor, &["dance"]),
            vec!["error: unknown command 'dance'. try: help"]
        );
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let mut processor = ConsoleCommandProcessor::new();
        run_lines(&mut processor, &["INTERACT", "Confirm"]);
        assert_eq!(
            drain(&mut processor),
            vec![ConsoleCommand::Interact, ConsoleCommand::Confirm]
        );
    }

    #[test]
    fn move_defaults_to_one_step_and_accepts_aliases() {
        let mut processor = ConsoleCommandProcessor::new();
        run_lines(&mut processor, &["move up", "move W 3", "move east 2"]);
        assert_eq!(
            drain(&mut processor),
            vec![
                ConsoleCommand::Move {
                    direction: Direction::Up,
                    steps: 1
                },
                ConsoleCommand::Move {
                    direction: Direction::Up,
                    steps: 3
                },
                ConsoleCommand::Move {
                    direction: Direction::Right,
                    steps: 2
                },
            ]
        );
    }

    #[test]
    fn bad_args_report_usage_hint() {
        let mut processor = ConsoleCommandProcessor::new();
        let lines = run_lines(&mut processor, &["move sideways", "move up 0", "wait soon"]);
        assert_eq!(
            lines,
            vec![
                "error: unknown direction 'sideways' (expected up|down|left|right). usage: move <dir> [steps]",
                "error: invalid step count '0' (expected 1-64). usage: move <dir> [steps]",
                "error: invalid tick count 'soon' (expected 1-3600). usage: wait <ticks>",
            ]
        );
        assert!(drain(&mut processor).is_empty());
    }

    #[test]
    fn option_accepts_digits_and_letters() {
        let mut processor = ConsoleCommandProcessor::new();
        let lines = run_lines(&mut processor, &["option 1", "option C", "option 5", "option e"]);

        assert_eq!(
            drain(&mut processor),
            vec![
                ConsoleCommand::SelectOption { index: 0 },
                ConsoleCommand::SelectOption { index: 2 },
            ]
        );
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("error: invalid choice '5'"));
    }

    #[test]
    fn extra_arguments_are_rejected() {
        let mut processor = ConsoleCommandProcessor::new();
        assert_eq!(
            run_lines(&mut processor, &["look around"]),
            vec!["error: unexpected extra arguments. usage: look"]
        );
    }

    #[test]
    fn tokenizer_handles_quotes_and_errors() {
        assert_eq!(
            tokenize_line("move \"up\"  2").expect("tokens"),
            vec!["move", "up", "2"]
        );
        assert_eq!(tokenize_line("say \"\"").expect("tokens"), vec!["say", ""]);
        assert!(tokenize_line("move \"up").is_err());
    }

    #[test]
    fn registering_duplicate_name_fails() {
        let mut registry = ConsoleCommandRegistry::with_builtins();
        let result = registry.register("QUIT", "again", "", parse_quit_command);
        assert!(result.is_err());
        assert!(registry.register("  ", "blank", "", parse_quit_command).is_err());
    }

    #[test]
    fn pending_queue_is_bounded() {
        let mut processor = ConsoleCommandProcessor::new();
        let mut output = Vec::new();
        for _ in 0..(MAX_PENDING_COMMANDS + 4) {
            processor.process_line("status", &mut output);
        }
        processor.process_line("quit", &mut output);

        let queued = drain(&mut processor);
        assert_eq!(queued.len(), MAX_PENDING_COMMANDS);
        assert_eq!(queued.last(), Some(&ConsoleCommand::Quit));
    }
}
