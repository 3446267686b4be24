pub const DEFAULT_WORLD_WIDTH: f64 = 800.0;
pub const DEFAULT_WORLD_HEIGHT: f64 = 600.0;
pub const DEFAULT_GRAVITY: f64 = 0.5;
pub const DEFAULT_FRICTION: f64 = 0.1;
pub const DEFAULT_GRID_SIZE: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub width: f64,
    pub height: f64,
    pub gravity: f64,
    pub friction: f64,
    pub grid_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            gravity: DEFAULT_GRAVITY,
            friction: DEFAULT_FRICTION,
            grid_size: DEFAULT_GRID_SIZE,
        }
    }
}

/// Run state of the loop. `paused` is only meaningful while `running`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GameState {
    pub running: bool,
    pub paused: bool,
    pub score: i64,
    pub time: f64,
}

impl GameState {
    pub fn is_updating(&self) -> bool {
        self.running && !self.paused
    }
}
