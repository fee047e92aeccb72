mod app;
mod event;
mod tui;
mod ui;

use std::env;

use anyhow::{Context, Result};
use app::App;
use crossterm::event::{Event as CrosstermEvent, EventStream};
use event::Event;
use futures_util::StreamExt;
use log::{error, info};
use tui::{init, restore};
use ui::render;

use agent_console::config::ConsoleSettings;
use agent_console::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let root = env::current_dir().context("Failed to resolve the working directory")?;
    let settings = ConsoleSettings::load(&root)?;
    logging::init(&root, &settings)?;
    info!("Agent console starting against {}", settings.base_url);

    let mut app = App::new(&settings, root);
    let mut tui = init().context("Failed to initialise the terminal")?;
    let outcome = run(&mut tui, &mut app, &settings).await;
    restore().context("Failed to restore the terminal")?;

    if let Err(err) = &outcome {
        error!("Agent console stopped: {:#}", err);
    }
    info!("Agent console exiting");
    outcome
}

async fn run(tui: &mut tui::Tui, app: &mut App, settings: &ConsoleSettings) -> Result<()> {
    let mut stream = EventStream::new();
    let mut interval = tokio::time::interval(settings.tick_rate());

    while !app.should_quit {
        tui.draw(|frame| render(frame, app))?;

        let event = tokio::select! {
            _ = interval.tick() => Event::Tick,
            maybe_event = stream.next() => {
                match maybe_event {
                    Some(Ok(CrosstermEvent::Key(key))) => Event::Key(key),
                    Some(Ok(CrosstermEvent::Resize(_, _))) => Event::Resize,
                    // Mouse, focus and paste events are not used.
                    Some(Ok(_)) => continue,
                    // If the event stream ends or errors, we'll break the loop
                    Some(Err(_)) | None => break,
                }
            }
        };

        app.handle_event(event);
    }
    Ok(())
}
