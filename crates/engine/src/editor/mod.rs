//! Headless level editor. A front-end feeds pointer positions in world pixels
//! and reads selection state back; all changes go through [`GameEngine`]
//! operations so arena and layer membership stay in sync.
//!
//! [`GameEngine`]: crate::world::GameEngine

mod layers;
mod state;

pub use state::{
    EditorMode, EditorState, PointerOutcome, DEFAULT_EDITOR_GRID_SIZE, MAX_ZOOM, MIN_ZOOM,
    ZOOM_STEP,
};
