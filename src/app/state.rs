//! Defines the state the terminal front end keeps on top of the console.
//!
//! The `Console` holds every piece of domain state. `App` only adds what the
//! screens need: cursors, search queries, filters and the upload prompt.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use agent_console::Console;
use agent_console::catalog::AgentCategory;
use agent_console::model::SourceType;

/// The main application state.
pub struct App {
    /// Flag to indicate if the application should quit.
    pub should_quit: bool,
    /// Owner of the wizard, registry, catalogs and in-flight requests.
    pub console: Console,
    /// Directory relative paths typed into the upload prompt resolve against.
    pub workspace_root: PathBuf,
    /// Backend root shown in the status bar.
    pub backend_url: String,
    /// The message currently displayed in the status bar.
    pub status_message: String,
    /// Highlighted row of the completed agent list.
    pub home_cursor: usize,
    /// First visible line of the article view.
    pub article_scroll: u16,
    pub wizard_view: WizardView,
    /// The currently active overlay, if any.
    pub overlay: Option<OverlayState>,
    pub(crate) last_tick: Instant,
    pub(crate) tick_rate: Duration,
}

/// Per-step presentation state of the wizard overlay.
#[derive(Debug, Clone, Default)]
pub struct WizardView {
    /// Highlighted row within the filtered list of the current step.
    pub cursor: usize,
    pub query: String,
    /// True while keystrokes edit `query`.
    pub searching: bool,
    pub category: AgentCategory,
    /// `None` shows every data source type.
    pub source_type: Option<SourceType>,
}

impl WizardView {
    /// Clears the cursor and search, keeping the filters.
    pub fn reset_step(&mut self) {
        self.cursor = 0;
        self.query.clear();
        self.searching = false;
    }

    /// Moves the cursor by `delta`, wrapping within `len` rows.
    pub fn move_cursor(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let len = len as isize;
        let index = (self.cursor as isize + delta).rem_euclid(len);
        self.cursor = index as usize;
    }

    pub fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
    }
}

/// Represents the state of any active overlay panel.
#[derive(Debug, Clone)]
pub enum OverlayState {
    UploadPrompt(InputPromptState),
}

/// State for the input prompt overlay.
#[derive(Debug, Clone)]
pub struct InputPromptState {
    /// The title displayed at the top of the prompt.
    pub title: String,
    /// The current value entered by the user.
    pub value: String,
    /// Placeholder text to display when the input is empty.
    pub placeholder: String,
}

impl InputPromptState {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: String::new(),
            placeholder: placeholder.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_wraps_in_both_directions() {
        let mut view = WizardView::default();
        view.move_cursor(-1, 3);
        assert_eq!(view.cursor, 2);
        view.move_cursor(1, 3);
        assert_eq!(view.cursor, 0);
        view.move_cursor(1, 0);
        assert_eq!(view.cursor, 0);
    }

    #[test]
    fn clamp_keeps_the_cursor_inside_the_list() {
        let mut view = WizardView {
            cursor: 5,
            ..WizardView::default()
        };
        view.clamp(2);
        assert_eq!(view.cursor, 1);
        view.clamp(0);
        assert_eq!(view.cursor, 0);
    }
}
