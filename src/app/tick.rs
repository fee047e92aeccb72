use std::time::Instant;

use agent_console::tracker::OperationKind;

use super::App;

impl App {
    /// Called on every tick of the event loop: applies finished requests and
    /// runs due timers, then keeps cursors inside their lists.
    pub(crate) fn on_tick(&mut self) {
        if self.last_tick.elapsed() >= self.tick_rate {
            self.last_tick = Instant::now();
        }

        let was_open = self.console.wizard().is_open();
        let had_agents = self.console.registry().len();
        self.console.tick(Instant::now());

        if was_open && !self.console.wizard().is_open() {
            self.wizard_view = Default::default();
            self.overlay = None;
            self.status_message = String::from("Agent wizard closed");
        }
        if self.console.registry().len() > had_agents {
            self.status_message = format!(
                "{} agent(s) ready for article generation",
                self.console.registry().len()
            );
        }
        if let Some(error) = self.console.article_error() {
            self.status_message = error.to_string();
        } else if self.console.tracker().is_pending(OperationKind::CreateArticles) {
            self.status_message = String::from("Generating articles...");
        }

        let visible = self.visible_row_count();
        self.wizard_view.clamp(visible);
        let agents = self.console.registry().len();
        if self.home_cursor >= agents {
            self.home_cursor = agents.saturating_sub(1);
        }
    }
}
