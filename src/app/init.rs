use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::debug;

use agent_console::Console;
use agent_console::config::ConsoleSettings;
use agent_console::gateway::HttpGateway;

use super::{App, WizardView};

impl App {
    /// Creates the application state around an HTTP-backed console.
    pub fn new(settings: &ConsoleSettings, workspace_root: PathBuf) -> Self {
        debug!("Initializing App against {}", settings.base_url);
        let gateway = HttpGateway::new(settings.base_url.clone());
        let backend_url = gateway.base_url().to_string();
        let console = Console::new(Arc::new(gateway), settings.console_options());

        Self {
            should_quit: false,
            console,
            workspace_root,
            backend_url,
            status_message: String::from("n new agent · g generate · v view · q quit"),
            home_cursor: 0,
            article_scroll: 0,
            wizard_view: WizardView::default(),
            overlay: None,
            last_tick: Instant::now(),
            tick_rate: settings.tick_rate(),
        }
    }
}
