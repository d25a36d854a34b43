//! Controller state - button bits for the current and previous frame
//!
//! The game edge-triggers rotation, hold and hard drop, so it needs to know
//! what was held on the previous frame. Both human input and the AI control
//! mapper write into the same structure.

use crate::types::Buttons;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controller {
    buttons: Buttons,
    prev: Buttons,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, buttons: Buttons) {
        self.buttons.insert(buttons);
    }

    pub fn release(&mut self, buttons: Buttons) {
        self.buttons.remove(buttons);
    }

    /// Replace this frame's buttons wholesale
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.buttons = buttons;
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    /// Buttons held on the previous frame
    pub fn previous(&self) -> Buttons {
        self.prev
    }

    pub fn is_pressed(&self, button: Buttons) -> bool {
        self.buttons.contains(button)
    }

    /// Pressed this frame but not on the previous one
    pub fn is_newly_pressed(&self, button: Buttons) -> bool {
        self.buttons.contains(button) && !self.prev.contains(button)
    }

    /// Roll this frame's buttons into history and start an empty frame
    pub fn end_frame(&mut self) {
        self.prev = self.buttons;
        self.buttons = Buttons::NONE;
    }
}
