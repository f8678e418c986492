use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod physics;

pub use app::{
    run_app, world_to_screen_px, AppError, Camera2D, DrawRect, HudState, InputAction,
    InputSnapshot, LoopConfig, Renderer, Scene, SceneCommand, SceneWorld, Viewport,
    PIXELS_PER_WORLD,
};
pub use content::{
    load_layout_file, parse_layout, AreaKind, ContentCard, LayoutError, PropDescriptor, PropKind,
    PropRole, ResolvedProp, TransitionDef, WorldLayout, ZoneDef,
};
pub use physics::{
    direction_from_yaw, yaw_from_direction, Aabb, Boundary, BoxSize, Collider, ColliderId,
    CollisionHit, CollisionKind, CollisionSystem, EntityId, PositionSource, PushableBody,
    PushableStep, PushableTuning, SimpleRng, Transform, TransformStore, Vec2, Vec3,
};

pub const ROOT_ENV_VAR: &str = "CROSSROADS_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
    pub world_dir: PathBuf,
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
    #[error(
        "CROSSROADS_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/crossroads\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
    #[error("world file name must be a plain file name inside {world_dir}: {name}")]
    InvalidWorldFileName { name: String, world_dir: PathBuf },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = resolve_root()?;
    Ok(app_paths_for_root(root))
}

pub fn app_paths_for_root(root: PathBuf) -> AppPaths {
    let assets_dir = root.join("assets");
    let world_dir = assets_dir.join("world");
    AppPaths {
        root,
        assets_dir,
        world_dir,
    }
}

impl AppPaths {
    /// Resolves a layout file name against the world directory. Only bare
    /// file names are accepted.
    pub fn world_file(&self, name: &str) -> Result<PathBuf, StartupError> {
        let candidate = Path::new(name);
        let is_plain = !name.is_empty()
            && candidate.components().count() == 1
            && candidate.file_name().is_some_and(|file| file == candidate.as_os_str());
        if !is_plain {
            return Err(StartupError::InvalidWorldFileName {
                name: name.to_string(),
                world_dir: self.world_dir.clone(),
            });
        }
        Ok(self.world_dir.join(candidate))
    }
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
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

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
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
        let temp = TempDir::new().expect("tempdir");
        fs::create_dir_all(temp.path().join("assets")).expect("assets");
        assert!(!is_repo_marker(temp.path()));

        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn repo_marker_requires_crates_or_assets() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(temp.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        assert!(!is_repo_marker(temp.path()));
        fs::create_dir_all(temp.path().join("crates")).expect("crates");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn world_file_joins_plain_names() {
        let paths = app_paths_for_root(PathBuf::from("/game"));
        let resolved = paths.world_file("crossroads.json").expect("plain name");
        assert_eq!(resolved, PathBuf::from("/game/assets/world/crossroads.json"));
    }

    #[test]
    fn world_file_rejects_paths() {
        let paths = app_paths_for_root(PathBuf::from("/game"));
        for name in ["", "../secrets.json", "nested/world.json", "/abs.json"] {
            assert!(
                matches!(
                    paths.world_file(name),
                    Err(StartupError::InvalidWorldFileName { .. })
                ),
                "{name:?} should be rejected"
            );
        }
    }
}
