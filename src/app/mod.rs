//! The `app` module holds the terminal front end's state and input handling.
//!
//! Domain state lives in the library's `Console`; the files here translate
//! key presses into console operations and keep per-screen cursors.

/// `actions` module: wizard and home actions triggered by keys.
mod actions;
/// `init` module: builds `App` from the loaded settings.
mod init;
/// `keyboard` module: routes key events to the screen on top.
mod keyboard;
/// `state` module: the `App` struct and overlay types.
mod state;
/// `tick` module: applies finished requests and due timers.
mod tick;

pub use state::{App, InputPromptState, OverlayState, WizardView};

use crate::event::Event;

impl App {
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick => self.on_tick(),
            Event::Key(key) => self.handle_key(key),
            Event::Resize => {}
        }
    }
}
