use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod world;

pub use app::{
    run_app, run_app_with_metrics, AppError, CommandPlayback, ConsoleCommand,
    ConsoleCommandProcessor, ConsoleReport, Frontend, InputAction, InputSnapshot, LoopConfig,
    LoopMetricsSnapshot, MetricsHandle,
};
pub use content::{
    builtin_case, load_case_database, write_text_atomic, CaseDatabase, ContentCompileError,
    ContentError, ContentErrorCode, SourceLocation,
};
pub use world::{
    Cell, Direction, FrameView, GameWorld, GridMap, GridMapError, HudSnapshot, RiddlePhase,
    TileId, Viewport,
};

pub const ROOT_ENV_VAR: &str = "DETECTIVE_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub base_content_dir: PathBuf,
    /// Holds the stored player preference.
    pub config_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create config directory at {path}: {source}")]
    CreateConfigDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "DETECTIVE_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/detective\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    app_paths_under(root)
}

fn app_paths_under(root: PathBuf) -> Result<AppPaths, StartupError> {
    let base_content_dir = root.join("assets").join("base");
    let config_dir = root.join("config");

    fs::create_dir_all(&config_dir).map_err(|source| StartupError::CreateConfigDir {
        path: config_dir.clone(),
        source,
    })?;

    Ok(AppPaths {
        root,
        base_content_dir,
        config_dir,
    })
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(&PathBuf::from(value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            exe_dir
                .ancestors()
                .find(|candidate| is_repo_marker(candidate))
                .map(normalize_path)
                .ok_or_else(|| StartupError::RootNotFound {
                    start_dir: normalize_path(&exe_dir),
                    env_var: ROOT_ENV_VAR,
                })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let temp = TempDir::new().expect("temp");
        fs::create_dir_all(temp.path().join("assets")).expect("mkdir");
        assert!(!is_repo_marker(temp.path()));

        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("write");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn app_paths_create_config_dir() {
        let temp = TempDir::new().expect("temp");
        let paths = app_paths_under(temp.path().to_path_buf()).expect("paths");

        assert!(paths.config_dir.is_dir());
        assert_eq!(paths.base_content_dir, temp.path().join("assets").join("base"));
    }
}
