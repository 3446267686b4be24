use tracing::info;

use super::clock::TimeSource;
use super::input::InputSnapshot;
use super::rendering::RenderSink;
use crate::content::GameDocument;
use crate::world::{EngineError, FrameReport, GameEngine};

/// Drives a [`GameEngine`] from a [`TimeSource`]. The windowed runner calls
/// [`GameLoop::tick`] once per redraw; tests step it with a manual clock.
pub struct GameLoop<C: TimeSource> {
    engine: GameEngine,
    clock: C,
    frames_run: u64,
}

impl<C: TimeSource> GameLoop<C> {
    pub fn new(engine: GameEngine, clock: C) -> Self {
        Self {
            engine,
            clock,
            frames_run: 0,
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn start(&mut self) {
        self.engine.start(self.clock.now_ms());
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn resume(&mut self) {
        self.engine.resume(self.clock.now_ms());
    }

    pub fn stop(&mut self) {
        self.engine.stop();
    }

    pub fn toggle_pause(&mut self) {
        if self.engine.state().paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Loads a document and starts running it from the current clock time.
    pub fn restart_with(&mut self, document: &GameDocument) -> Result<(), EngineError> {
        self.engine.load_game(document)?;
        self.start();
        info!(title = document.metadata.title.as_str(), "level_started");
        Ok(())
    }

    /// Runs exactly one frame if one is scheduled.
    pub fn tick(&mut self, input: &InputSnapshot, sink: &mut dyn RenderSink) -> FrameReport {
        let report = self.engine.frame(self.clock.now_ms(), input, sink);
        if report.ran {
            self.frames_run = self.frames_run.saturating_add(1);
        }
        report
    }

    /// Draws the current world without advancing it; used while stopped.
    pub fn redraw(&self, sink: &mut dyn RenderSink) {
        self.engine.render(sink);
    }
}
