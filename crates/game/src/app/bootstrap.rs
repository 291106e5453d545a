use std::env;

use engine::world::{GameWorld, Viewport};
use engine::{load_case_database, resolve_app_paths, AppError, LoopConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::preferences::{resolve_character, CharacterId, PreferenceStore};

pub(crate) const SEED_ENV_VAR: &str = "DETECTIVE_SEED";
pub(crate) const CHARACTER_ENV_VAR: &str = "DETECTIVE_CHARACTER";
const DEFAULT_WORLD_SEED: u64 = 0x5eed;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) world: GameWorld,
    pub(crate) character: CharacterId,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Detective Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        base_content_dir = %app_paths.base_content_dir.display(),
        config_dir = %app_paths.config_dir.display(),
        "startup"
    );

    let case = load_case_database(&app_paths)?;
    let store = PreferenceStore::in_dir(&app_paths.config_dir);
    let character_override = env::var(CHARACTER_ENV_VAR).ok();
    let character = resolve_character(&store, character_override.as_deref());

    let seed = parse_seed(env::var(SEED_ENV_VAR).ok().as_deref());
    let world = GameWorld::new(case, seed, Viewport::default())?;

    Ok(AppWiring {
        config: LoopConfig::default(),
        world,
        character,
    })
}

/// Logs go to stderr so they never interleave with console output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_seed(raw: Option<&str>) -> u64 {
    match raw {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                warn!(
                    env_var = SEED_ENV_VAR,
                    value,
                    fallback_seed = DEFAULT_WORLD_SEED,
                    "invalid_seed_using_default"
                );
                DEFAULT_WORLD_SEED
            }
        },
        None => DEFAULT_WORLD_SEED,
    }
}
