mod command_playback;
mod console_commands;
mod input;
mod loop_runner;
mod metrics;

pub use command_playback::{CommandPlayback, ConsoleReport};
pub use console_commands::{
    CommandParseError, ConsoleCommand, ConsoleCommandProcessor, ConsoleCommandRegistry,
    LocalAction, ParsedCommand,
};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, run_app_with_metrics, AppError, Frontend, LoopConfig};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
