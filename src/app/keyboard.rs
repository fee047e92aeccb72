use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use agent_console::wizard::WizardStep;

use super::{App, OverlayState};

impl App {
    /// The main entry point for handling keyboard events.
    ///
    /// Routes the key to the upload prompt, the wizard, the article view or
    /// the home list, whichever is on top.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Ctrl+Q quits from anywhere.
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Overlays capture all input.
        if self.overlay.is_some() {
            self.handle_overlay_key(key);
            return;
        }

        if self.console.wizard().is_open() {
            self.handle_wizard_key(key);
        } else if self.console.viewing().is_some() {
            self.handle_article_key(key);
        } else {
            self.handle_home_key(key);
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let Some(OverlayState::UploadPrompt(prompt)) = self.overlay.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.overlay = None,
            KeyCode::Enter => {
                let value = prompt.value.clone();
                self.overlay = None;
                if !value.trim().is_empty() {
                    self.submit_upload(&value);
                }
            }
            KeyCode::Backspace => {
                prompt.value.pop();
            }
            KeyCode::Char(ch) => prompt.value.push(ch),
            _ => {}
        }
    }

    fn handle_wizard_key(&mut self, key: KeyEvent) {
        if self.wizard_view.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.wizard_view.searching = false,
                KeyCode::Backspace => {
                    self.wizard_view.query.pop();
                    self.wizard_view.cursor = 0;
                }
                KeyCode::Char(ch) => {
                    self.wizard_view.query.push(ch);
                    self.wizard_view.cursor = 0;
                }
                _ => {}
            }
            return;
        }

        let rows = self.visible_row_count();
        let step = self.console.wizard().current_step();
        match key.code {
            KeyCode::Esc => self.back_or_cancel(),
            KeyCode::Up => self.wizard_view.move_cursor(-1, rows),
            KeyCode::Down => self.wizard_view.move_cursor(1, rows),
            KeyCode::Enter => self.confirm_wizard_row(),
            KeyCode::Right => {
                if step == WizardStep::ConnectDataSource {
                    self.finish_wizard();
                } else {
                    self.advance_wizard();
                }
            }
            KeyCode::Left => {
                if self.console.wizard().can_go_back() {
                    self.back_or_cancel();
                }
            }
            KeyCode::Char('/') => self.wizard_view.searching = true,
            KeyCode::Tab => self.cycle_filter(),
            KeyCode::Char('u') if step == WizardStep::ConnectDataSource => self.prompt_upload(),
            KeyCode::Char('d') if step == WizardStep::ConnectDataSource => {
                self.disconnect_highlighted()
            }
            KeyCode::Char('t') if step == WizardStep::ConnectDataSource => self.test_highlighted(),
            KeyCode::Char('p') if step == WizardStep::ConnectDataSource => {
                self.preview_highlighted()
            }
            KeyCode::Char('x') if step == WizardStep::ConnectDataSource => {
                self.console.dismiss_upload_error()
            }
            _ => {}
        }
    }

    fn handle_article_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.console.close_articles();
                self.article_scroll = 0;
            }
            KeyCode::Up => self.article_scroll = self.article_scroll.saturating_sub(1),
            KeyCode::Down => self.article_scroll = self.article_scroll.saturating_add(1),
            KeyCode::PageUp => self.article_scroll = self.article_scroll.saturating_sub(10),
            KeyCode::PageDown => self.article_scroll = self.article_scroll.saturating_add(10),
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let agents = self.console.registry().len();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('n') => self.open_wizard(),
            KeyCode::Up if agents > 0 => {
                self.home_cursor = (self.home_cursor + agents - 1) % agents;
            }
            KeyCode::Down if agents > 0 => {
                self.home_cursor = (self.home_cursor + 1) % agents;
            }
            KeyCode::Char('g') => self.generate_highlighted(),
            KeyCode::Char('v') | KeyCode::Enter => self.view_highlighted(),
            KeyCode::Esc => self.console.dismiss_article_error(),
            _ => {}
        }
    }
}
