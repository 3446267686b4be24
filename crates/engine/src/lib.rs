use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod editor;
pub mod world;

pub use app::{
    render_world, run_app, AppError, DrawCommand, FrameCanvas, GameLoop, InputAction,
    InputSnapshot, LoopConfig, ManualClock, MonotonicClock, NullSink, RenderSink, Renderer,
    TimeSource,
};
pub use content::{
    export_to_file, import_from_file, DocumentError, FileGameStore, GameDocument, ImportJob,
    ImportSlot, StorageError,
};
pub use editor::{EditorMode, EditorState, PointerOutcome};
pub use world::{
    create_behavior, Behavior, BehaviorType, EngineError, Entity, EntityId, FrameReport,
    GameEngine, GameEvent, GameState, Layer, LayerId, Settings,
};

pub const ROOT_ENV_VAR: &str = "EMOJI_RPG_ROOT";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub levels_dir: PathBuf,
    pub saves_dir: PathBuf,
    pub exports_dir: PathBuf,
}

impl AppPaths {
    /// Directory layout under a project root. Nothing is created.
    pub fn under(root: PathBuf) -> Self {
        let cache_dir = root.join("cache");
        Self {
            levels_dir: root.join("levels"),
            saves_dir: cache_dir.join("saves"),
            exports_dir: cache_dir.join("exports"),
            root,
        }
    }

    /// Absolute form of a level path. A relative path that does not exist
    /// from the working directory is taken relative to the project root.
    pub fn resolve_level(&self, path: &Path) -> PathBuf {
        if path.is_relative() && !path.exists() {
            normalize_path(&self.root.join(path))
        } else {
            normalize_path(path)
        }
    }
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
    #[error("failed to create save directory at {path}: {source}")]
    CreateSaveDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "EMOJI_RPG_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or levels/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or levels/.\n\
Set {env_var} explicitly, for example:\n\
Bash/zsh: export {env_var}=\"/path/to/emoji-rpg\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let paths = AppPaths::under(resolve_root()?);

    fs::create_dir_all(&paths.saves_dir).map_err(|source| StartupError::CreateSaveDir {
        path: paths.saves_dir.clone(),
        source,
    })?;

    Ok(paths)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
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
    let has_levels = path.join("levels").is_dir();

    cargo_toml && (has_crates || has_levels)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn repo_marker_requires_cargo_toml() {
        let temp = TempDir::new().expect("temp");
        fs::create_dir(temp.path().join("levels")).expect("levels");
        assert!(!is_repo_marker(temp.path()));

        fs::write(temp.path().join("Cargo.toml"), "[workspace]").expect("manifest");
        assert!(is_repo_marker(temp.path()));
    }

    #[test]
    fn paths_hang_off_the_root() {
        let paths = AppPaths::under(PathBuf::from("/game"));
        assert_eq!(paths.levels_dir, PathBuf::from("/game/levels"));
        assert_eq!(paths.saves_dir, PathBuf::from("/game/cache/saves"));
        assert_eq!(paths.exports_dir, PathBuf::from("/game/cache/exports"));
    }

    #[test]
    fn relative_level_paths_resolve_against_the_root() {
        let temp = TempDir::new().expect("temp");
        let levels = temp.path().join("levels");
        fs::create_dir(&levels).expect("levels");
        fs::write(levels.join("01_meadow.json"), "{}").expect("level");
        let paths = AppPaths::under(normalize_path(temp.path()));

        let resolved = paths.resolve_level(Path::new("levels/01_meadow.json"));
        assert_eq!(resolved, normalize_path(&levels.join("01_meadow.json")));
        assert!(resolved.is_absolute());
    }
}
