#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Per-frame view of the keyboard: held actions plus single-frame press edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    jump_pressed: bool,
    pause_pressed: bool,
    save_pressed: bool,
    load_pressed: bool,
    export_pressed: bool,
    quit_requested: bool,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        actions: ActionStates,
        jump_pressed: bool,
        pause_pressed: bool,
        save_pressed: bool,
        load_pressed: bool,
        export_pressed: bool,
        quit_requested: bool,
    ) -> Self {
        Self {
            actions,
            jump_pressed,
            pause_pressed,
            save_pressed,
            load_pressed,
            export_pressed,
            quit_requested,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_pause_pressed(mut self, pause_pressed: bool) -> Self {
        self.pause_pressed = pause_pressed;
        self
    }

    pub fn with_save_pressed(mut self, save_pressed: bool) -> Self {
        self.save_pressed = save_pressed;
        self
    }

    pub fn with_load_pressed(mut self, load_pressed: bool) -> Self {
        self.load_pressed = load_pressed;
        self
    }

    pub fn with_export_pressed(mut self, export_pressed: bool) -> Self {
        self.export_pressed = export_pressed;
        self
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn pause_pressed(&self) -> bool {
        self.pause_pressed
    }

    pub fn save_pressed(&self) -> bool {
        self.save_pressed
    }

    pub fn load_pressed(&self) -> bool {
        self.load_pressed
    }

    pub fn export_pressed(&self) -> bool {
        self.export_pressed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Signed axis pair from opposing actions: (-1, 0 or 1) per axis.
    pub fn movement_axes(&self) -> (f64, f64) {
        let mut x = 0.0;
        let mut y = 0.0;
        if self.is_down(InputAction::MoveLeft) {
            x -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            x += 1.0;
        }
        if self.is_down(InputAction::MoveUp) {
            y -= 1.0;
        }
        if self.is_down(InputAction::MoveDown) {
            y += 1.0;
        }
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_directions_cancel() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveDown, true);
        assert_eq!(snapshot.movement_axes(), (0.0, 1.0));
    }

    #[test]
    fn release_clears_action() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveUp, true)
            .with_action_down(InputAction::MoveUp, false);
        assert!(!snapshot.is_down(InputAction::MoveUp));
        assert_eq!(snapshot.movement_axes(), (0.0, 0.0));
    }
}
