use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::content::{export_to_file, FileGameStore, GameDocument, ImportSlot, DOCUMENT_EXTENSION};
use crate::world::{FrameReport, GameEngine, GameEvent, GameState};
use crate::{resolve_app_paths, StartupError};

use super::input::ActionStates;
use super::{
    GameLoop, InputAction, InputSnapshot, MonotonicClock, RenderSink, Renderer, TimeSource,
};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Fixed RNG seed for reproducible AI movement; entropy when `None`.
    pub rng_seed: Option<u64>,
    /// Level imported in the background right after startup.
    pub startup_level: Option<PathBuf>,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Emoji RPG".to_string(),
            window_width: 800,
            window_height: 600,
            rng_seed: None,
            startup_level: None,
            max_render_fps: Some(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        levels_dir = %app_paths.levels_dir.display(),
        saves_dir = %app_paths.saves_dir.display(),
        exports_dir = %app_paths.exports_dir.display(),
        "startup"
    );

    let mut engine = GameEngine::default();
    if let Some(seed) = config.rng_seed {
        engine.reseed(seed);
    }
    let mut session = Session::new(
        GameLoop::new(engine, MonotonicClock::new()),
        FileGameStore::new(&app_paths.saves_dir),
        app_paths.exports_dir.clone(),
        list_level_files(&app_paths.levels_dir),
    );
    match &config.startup_level {
        Some(path) => session.request_level(&app_paths.resolve_level(path)),
        None => session.game_loop.start(),
    }

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let (buffer_width, buffer_height) = (config.window_width, config.window_height);
    let mut renderer = Renderer::new(Arc::clone(&window), buffer_width, buffer_height)
        .map_err(AppError::CreateRenderer)?;
    if let Err(error) = renderer.set_world_size(session.game_loop.engine().settings()) {
        warn!(error = %error, "renderer_resize_failed");
    }

    event_loop.set_control_flow(ControlFlow::Poll);

    let render_frame_target =
        target_frame_duration(normalize_render_fps_cap(config.max_render_fps));
    let mut input_collector = InputCollector::default();
    let mut last_present_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let input = input_collector.snapshot_for_tick();
                    let mut level_changed = session.poll_import();
                    level_changed |= session.handle_commands(&input);
                    if level_changed {
                        if let Err(error) =
                            renderer.set_world_size(session.game_loop.engine().settings())
                        {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                            return;
                        }
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    session.step(&input, &mut renderer.canvas());
                    if let Err(error) = renderer.present() {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    let next_title =
                        format_title(&config.window_title, session.game_loop.engine().state());
                    if last_applied_title.as_deref() != Some(next_title.as_str()) {
                        window.set_title(&next_title);
                        last_applied_title = Some(next_title);
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                session.game_loop.stop();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Everything the windowed loop drives besides the window itself.
struct Session<C: TimeSource> {
    game_loop: GameLoop<C>,
    store: FileGameStore,
    exports_dir: PathBuf,
    imports: ImportSlot,
    levels: Vec<PathBuf>,
    current_level: Option<PathBuf>,
    pending_level: Option<PathBuf>,
    /// Level that was current when the save slot was last written.
    saved_level: Option<PathBuf>,
}

impl<C: TimeSource> Session<C> {
    fn new(
        game_loop: GameLoop<C>,
        store: FileGameStore,
        exports_dir: PathBuf,
        levels: Vec<PathBuf>,
    ) -> Self {
        Self {
            game_loop,
            store,
            exports_dir,
            imports: ImportSlot::default(),
            levels,
            current_level: None,
            pending_level: None,
            saved_level: None,
        }
    }

    fn request_level(&mut self, path: &Path) {
        match self.imports.begin(path) {
            Ok(()) => self.pending_level = Some(path.to_path_buf()),
            Err(error) => warn!(path = %path.display(), error = %error, "level_request_rejected"),
        }
    }

    /// Returns true when a finished import replaced the running level.
    fn poll_import(&mut self) -> bool {
        let Some(result) = self.imports.poll() else {
            return false;
        };
        let path = self.pending_level.take();
        match result {
            Ok(document) => {
                let started = self.start_document(&document);
                if started {
                    self.current_level = path;
                }
                started
            }
            Err(error) => {
                warn!(error = %error, "level_import_failed");
                false
            }
        }
    }

    fn start_document(&mut self, document: &GameDocument) -> bool {
        match self.game_loop.restart_with(document) {
            Ok(()) => true,
            Err(error) => {
                warn!(error = %error, "level_start_failed");
                false
            }
        }
    }

    /// Applies the single-press commands of one frame. Returns true when the
    /// world was replaced.
    fn handle_commands(&mut self, input: &InputSnapshot) -> bool {
        if input.pause_pressed() {
            self.game_loop.toggle_pause();
        }
        if input.save_pressed() {
            self.save_current();
        }
        if input.export_pressed() {
            self.export_current();
        }
        if input.load_pressed() {
            return self.load_current();
        }
        false
    }

    fn save_current(&mut self) {
        let document = self.game_loop.engine().export_game();
        match self.store.save_current(&document) {
            Ok(()) => {
                self.saved_level = self.current_level.clone();
                info!(entities = document.entity_count(), "current_game_saved");
            }
            Err(error) => warn!(error = %error, "current_game_save_failed"),
        }
    }

    fn load_current(&mut self) -> bool {
        match self.store.load_current() {
            Ok(Some(document)) => {
                let started = self.start_document(&document);
                if started {
                    self.current_level = self.saved_level.clone();
                }
                started
            }
            Ok(None) => {
                info!("current_game_missing");
                false
            }
            Err(error) => {
                warn!(error = %error, "current_game_load_failed");
                false
            }
        }
    }

    fn export_current(&self) -> Option<PathBuf> {
        let document = self.game_loop.engine().export_game();
        match export_to_file(&document, &self.exports_dir, None) {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(error = %error, "game_export_failed");
                None
            }
        }
    }

    fn step(&mut self, input: &InputSnapshot, sink: &mut dyn RenderSink) -> FrameReport {
        let report = self.game_loop.tick(input, sink);
        if !report.ran {
            self.game_loop.redraw(sink);
        }
        for event in &report.events {
            self.handle_game_event(event);
        }
        report
    }

    fn handle_game_event(&mut self, event: &GameEvent) {
        let score = self.game_loop.engine().state().score;
        match event {
            GameEvent::Win => info!(score, "level_won"),
            GameEvent::Lose => info!(score, "level_lost"),
            GameEvent::NextLevel => {
                match next_level_path(&self.levels, self.current_level.as_deref()) {
                    Some(path) => self.request_level(&path),
                    None => info!(score, "no_next_level"),
                }
            }
            GameEvent::Trigger { action } => info!(action = action.as_str(), "trigger_fired"),
        }
    }
}

/// Sorted `.json` files of the levels directory; empty when it is missing.
fn list_level_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut levels: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
        })
        .collect();
    levels.sort();
    levels
}

/// The level after `current` in playlist order. Without a current level the
/// playlist starts from the top; the last level has no successor. A current
/// path that matches no entry exactly is matched by file name.
fn next_level_path(levels: &[PathBuf], current: Option<&Path>) -> Option<PathBuf> {
    let next_index = match current {
        Some(current) => {
            let position = levels.iter().position(|level| level == current).or_else(|| {
                let name = current.file_name()?;
                levels.iter().position(|level| level.file_name() == Some(name))
            })?;
            position + 1
        }
        None => 0,
    };
    levels.get(next_index).cloned()
}

fn format_title(base: &str, state: &GameState) -> String {
    let mut title = format!("{base} | score {}", state.score);
    if state.paused {
        title.push_str(" | paused");
    } else if !state.running {
        title.push_str(" | stopped");
    }
    title
}

/// Press-edge tracker for one key: held repeats do not retrigger.
#[derive(Debug, Default, Clone, Copy)]
struct KeyEdge {
    is_down: bool,
    pressed_edge: bool,
}

impl KeyEdge {
    fn handle(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    jump: KeyEdge,
    pause: KeyEdge,
    save: KeyEdge,
    load: KeyEdge,
    export: KeyEdge,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_physical_key(key_event.physical_key, key_event.state);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed);
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed);
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed);
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed);
            }
            KeyCode::Space => {
                self.action_states.set(InputAction::Jump, is_pressed);
                self.jump.handle(state);
            }
            KeyCode::KeyP => self.pause.handle(state),
            KeyCode::F5 => self.save.handle(state),
            KeyCode::F6 => self.export.handle(state),
            KeyCode::F9 => self.load.handle(state),
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            _ => {}
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.action_states,
            self.jump.take(),
            self.pause.take(),
            self.save.take(),
            self.load.take(),
            self.export.take(),
            self.quit_requested,
        )
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::app::{DrawCommand, ManualClock, NullSink};
    use crate::world::EntityId;

    fn press(input: &mut InputCollector, code: KeyCode) {
        input.handle_physical_key(PhysicalKey::Code(code), ElementState::Pressed);
    }

    fn release(input: &mut InputCollector, code: KeyCode) {
        input.handle_physical_key(PhysicalKey::Code(code), ElementState::Released);
    }

    fn session_in(temp: &TempDir, levels: Vec<PathBuf>) -> Session<ManualClock> {
        Session::new(
            GameLoop::new(GameEngine::with_seed(7), ManualClock::new(0.0)),
            FileGameStore::new(temp.path().join("saves")),
            temp.path().join("exports"),
            levels,
        )
    }

    fn write_level(dir: &Path, name: &str, title: &str) -> PathBuf {
        let path = dir.join(name);
        let document = json!({
            "metadata": {"title": title},
            "layers": [{"id": "l", "entities": [
                {"id": "hero", "emoji": "🦸", "x": 10, "y": 10, "behavior": {"type": "player"}}
            ]}]
        });
        fs::write(&path, document.to_string()).expect("write level");
        path
    }

    fn wait_for_import(session: &mut Session<ManualClock>) -> bool {
        let deadline = Instant::now() + Duration::from_secs(10);
        while session.imports.is_busy() {
            if session.poll_import() {
                return true;
            }
            assert!(Instant::now() < deadline, "import did not finish");
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn wasd_and_arrow_keys_map_to_actions() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyW);
        press(&mut input, KeyCode::ArrowLeft);

        let snapshot = input.snapshot_for_tick();
        assert!(snapshot.is_down(InputAction::MoveUp));
        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert_eq!(snapshot.movement_axes(), (-1.0, -1.0));
    }

    #[test]
    fn key_release_clears_action_state() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::KeyD);
        release(&mut input, KeyCode::KeyD);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveRight));
    }

    #[test]
    fn jump_is_edge_triggered_but_stays_held() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Space);
        let first = input.snapshot_for_tick();
        press(&mut input, KeyCode::Space);
        let second = input.snapshot_for_tick();

        assert!(first.jump_pressed());
        assert!(!second.jump_pressed());
        assert!(second.is_down(InputAction::Jump));

        release(&mut input, KeyCode::Space);
        press(&mut input, KeyCode::Space);
        assert!(input.snapshot_for_tick().jump_pressed());
    }

    #[test]
    fn command_keys_fire_once_per_press() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::F5);
        press(&mut input, KeyCode::F9);
        press(&mut input, KeyCode::KeyP);
        press(&mut input, KeyCode::F6);
        let first = input.snapshot_for_tick();
        assert!(first.save_pressed());
        assert!(first.load_pressed());
        assert!(first.pause_pressed());
        assert!(first.export_pressed());

        press(&mut input, KeyCode::F5);
        let second = input.snapshot_for_tick();
        assert!(!second.save_pressed());
        assert!(!second.load_pressed());
        assert!(!second.pause_pressed());
        assert!(!second.export_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::default();
        press(&mut input, KeyCode::Escape);
        assert!(input.quit_requested);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn next_level_walks_the_sorted_playlist() {
        let levels = vec![PathBuf::from("a.json"), PathBuf::from("b.json")];
        assert_eq!(next_level_path(&levels, None), Some(PathBuf::from("a.json")));
        assert_eq!(
            next_level_path(&levels, Some(Path::new("a.json"))),
            Some(PathBuf::from("b.json"))
        );
        assert_eq!(next_level_path(&levels, Some(Path::new("b.json"))), None);
        assert_eq!(next_level_path(&levels, Some(Path::new("other.json"))), None);
    }

    #[test]
    fn relative_startup_level_still_finds_its_successor() {
        let root = PathBuf::from("/game");
        let levels = vec![
            root.join("levels").join("01_meadow.json"),
            root.join("levels").join("02_cave.json"),
        ];
        assert_eq!(
            next_level_path(&levels, Some(Path::new("levels/01_meadow.json"))),
            Some(root.join("levels").join("02_cave.json"))
        );
        assert_eq!(next_level_path(&levels, Some(Path::new("levels/02_cave.json"))), None);
    }

    #[test]
    fn level_listing_keeps_only_json_files_in_order() {
        let temp = TempDir::new().expect("temp");
        fs::write(temp.path().join("b.json"), "{}").expect("b");
        fs::write(temp.path().join("a.JSON"), "{}").expect("a");
        fs::write(temp.path().join("notes.txt"), "x").expect("txt");

        let names: Vec<String> = list_level_files(temp.path())
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JSON".to_string(), "b.json".to_string()]);
        assert!(list_level_files(&temp.path().join("missing")).is_empty());
    }

    #[test]
    fn title_reflects_score_and_run_state() {
        let mut state = GameState::default();
        assert_eq!(format_title("Game", &state), "Game | score 0 | stopped");
        state.running = true;
        state.score = 4;
        assert_eq!(format_title("Game", &state), "Game | score 4");
        state.paused = true;
        assert_eq!(format_title("Game", &state), "Game | score 4 | paused");
    }

    #[test]
    fn requested_level_loads_and_starts() {
        let temp = TempDir::new().expect("temp");
        let level = write_level(temp.path(), "one.json", "One");
        let mut session = session_in(&temp, vec![level.clone()]);

        session.request_level(&level);
        assert!(wait_for_import(&mut session));
        assert_eq!(session.current_level.as_deref(), Some(level.as_path()));
        assert_eq!(session.game_loop.engine().metadata().title, "One");
        assert!(session.game_loop.engine().state().running);
    }

    #[test]
    fn failed_import_keeps_the_current_world() {
        let temp = TempDir::new().expect("temp");
        let mut session = session_in(&temp, Vec::new());
        session.game_loop.start();

        session.request_level(&temp.path().join("missing.json"));
        assert!(!wait_for_import(&mut session));
        assert!(session.current_level.is_none());
        assert!(session.game_loop.engine().state().running);
    }

    #[test]
    fn save_then_load_restores_the_current_slot() {
        let temp = TempDir::new().expect("temp");
        let level = write_level(temp.path(), "one.json", "One");
        let mut session = session_in(&temp, Vec::new());
        session.request_level(&level);
        assert!(wait_for_import(&mut session));

        session.handle_commands(&InputSnapshot::empty().with_save_pressed(true));
        session
            .game_loop
            .engine_mut()
            .remove_entity(&EntityId::from("hero"));
        assert_eq!(session.game_loop.engine().entity_count(), 0);

        let replaced = session.handle_commands(&InputSnapshot::empty().with_load_pressed(true));
        assert!(replaced);
        assert!(session
            .game_loop
            .engine()
            .entity(&EntityId::from("hero"))
            .is_some());
    }

    #[test]
    fn loading_the_slot_restores_the_level_it_was_saved_from() {
        let temp = TempDir::new().expect("temp");
        let first = write_level(temp.path(), "a.json", "First");
        let second = write_level(temp.path(), "b.json", "Second");
        let mut session = session_in(&temp, vec![first.clone(), second.clone()]);
        session.request_level(&first);
        assert!(wait_for_import(&mut session));
        session.handle_commands(&InputSnapshot::empty().with_save_pressed(true));

        session.handle_game_event(&GameEvent::NextLevel);
        assert!(wait_for_import(&mut session));
        assert_eq!(session.current_level.as_deref(), Some(second.as_path()));

        assert!(session.handle_commands(&InputSnapshot::empty().with_load_pressed(true)));
        assert_eq!(session.current_level.as_deref(), Some(first.as_path()));
        assert_eq!(session.game_loop.engine().metadata().title, "First");
    }

    #[test]
    fn load_without_a_saved_slot_changes_nothing() {
        let temp = TempDir::new().expect("temp");
        let mut session = session_in(&temp, Vec::new());
        assert!(!session.handle_commands(&InputSnapshot::empty().with_load_pressed(true)));
    }

    #[test]
    fn export_writes_into_the_exports_dir() {
        let temp = TempDir::new().expect("temp");
        let session = session_in(&temp, Vec::new());
        let path = session.export_current().expect("exported");
        assert_eq!(path, temp.path().join("exports").join("emoji-rpg-game.json"));
        assert!(path.is_file());
    }

    #[test]
    fn pause_command_toggles_a_running_game() {
        let temp = TempDir::new().expect("temp");
        let mut session = session_in(&temp, Vec::new());
        session.game_loop.start();

        session.handle_commands(&InputSnapshot::empty().with_pause_pressed(true));
        assert!(session.game_loop.engine().state().paused);
        session.handle_commands(&InputSnapshot::empty().with_pause_pressed(true));
        assert!(!session.game_loop.engine().state().paused);
    }

    #[test]
    fn next_level_event_imports_the_following_level() {
        let temp = TempDir::new().expect("temp");
        let first = write_level(temp.path(), "a.json", "First");
        let second = write_level(temp.path(), "b.json", "Second");
        let mut session = session_in(&temp, vec![first.clone(), second.clone()]);
        session.request_level(&first);
        assert!(wait_for_import(&mut session));

        session.handle_game_event(&GameEvent::NextLevel);
        assert!(wait_for_import(&mut session));
        assert_eq!(session.current_level.as_deref(), Some(second.as_path()));
        assert_eq!(session.game_loop.engine().metadata().title, "Second");
    }

    #[test]
    fn stopped_session_still_draws() {
        #[derive(Default)]
        struct CountingSink {
            commands: usize,
        }
        impl RenderSink for CountingSink {
            fn draw(&mut self, _command: DrawCommand<'_>) {
                self.commands += 1;
            }
        }

        let temp = TempDir::new().expect("temp");
        let mut session = session_in(&temp, Vec::new());
        let mut sink = CountingSink::default();
        let report = session.step(&InputSnapshot::empty(), &mut sink);
        assert!(!report.ran);
        assert_eq!(sink.commands, 1);

        let report = session.step(&InputSnapshot::empty(), &mut NullSink);
        assert!(!report.ran);
    }
}
