mod bootstrap;
mod console_frontend;
mod loop_runner;
mod preferences;
mod presenter;

use std::process::ExitCode;

use tracing::error;

pub(crate) fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
