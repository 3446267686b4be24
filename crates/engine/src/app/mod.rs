mod clock;
mod game_loop;
mod input;
mod loop_runner;
mod rendering;

pub use clock::{ManualClock, MonotonicClock, TimeSource};
pub use game_loop::GameLoop;
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{
    render_world, DrawCommand, FrameCanvas, NullSink, RenderSink, Renderer,
    SELECTION_OUTLINE_WIDTH_PX,
};
