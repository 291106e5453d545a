use std::io;
use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::AppWiring;
use super::console_frontend::{spawn_stdin_reader, ConsoleFrontend};

pub(crate) fn run(mut app: AppWiring) -> ExitCode {
    let lines = match spawn_stdin_reader() {
        Ok(lines) => lines,
        Err(err) => {
            error!(error = %err, "stdin_reader_spawn_failed");
            return ExitCode::FAILURE;
        }
    };
    let mut frontend = ConsoleFrontend::new(lines, io::stdout(), app.character);

    if let Err(err) = run_app(app.config, &mut app.world, &mut frontend) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
