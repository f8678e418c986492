use engine::content::load_layout_file;
use engine::{resolve_app_paths, AppError, LoopConfig, Scene};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay;

const WORLD_FILE_ENV_VAR: &str = "CROSSROADS_WORLD";
const DEFAULT_WORLD_FILE: &str = "crossroads.json";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Crossroads Startup ===");

    let paths = resolve_app_paths()?;
    let world_name = world_file_from_env();
    let world_path = paths.world_file(&world_name)?;
    info!(root = %paths.root.display(), world = %world_path.display(), "app_paths_resolved");

    let layout = load_layout_file(&world_path)?;
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: gameplay::build_scene(layout),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn world_file_from_env() -> String {
    std::env::var(WORLD_FILE_ENV_VAR)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_WORLD_FILE.to_string())
}
