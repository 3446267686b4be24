#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Win,
    Lose,
    NextLevel,
    Trigger { action: String },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Win => "game:win",
            Self::Lose => "game:lose",
            Self::NextLevel => "game:nextLevel",
            Self::Trigger { .. } => "game:trigger",
        }
    }

    /// Win and lose end the run; the loop is not rescheduled after them.
    pub fn ends_run(&self) -> bool {
        matches!(self, Self::Win | Self::Lose)
    }
}

#[derive(Debug, Default)]
pub struct EventQueue {
    current_frame: Vec<GameEvent>,
}

impl EventQueue {
    pub fn emit(&mut self, event: GameEvent) {
        self.current_frame.push(event);
    }

    pub fn iter_emitted_so_far(&self) -> impl Iterator<Item = &GameEvent> {
        self.current_frame.iter()
    }

    pub fn len(&self) -> usize {
        self.current_frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current_frame.is_empty()
    }

    pub fn drain_frame(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.current_frame)
    }

    pub fn clear(&mut self) {
        self.current_frame.clear();
    }
}
