use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::block::{Position, Title};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use agent_console::model::DataSourcePreview;
use agent_console::tracker::OperationKind;
use agent_console::wizard::WizardStep;

use crate::app::{App, InputPromptState, OverlayState};

mod theme;
use theme::*;

fn cell_width(text: &str) -> u16 {
    UnicodeWidthStr::width(text).min(u16::MAX as usize) as u16
}

pub fn render(f: &mut Frame<'_>, app: &mut App) {
    let size = f.size();
    if size.width < 80 || size.height < 24 {
        let block = Paragraph::new("Terminal too small. Resize to at least 80x24.")
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("Agent Console")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(FG_PRIMARY).bg(MENU_BG)),
            )
            .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(size);

    render_header(f, app, vertical[0]);
    if app.console.viewing().is_some() {
        render_articles(f, app, vertical[1]);
    } else {
        render_home(f, app, vertical[1]);
    }
    render_status_bar(f, app, vertical[2]);

    if app.console.wizard().is_open() {
        render_wizard(f, app);
    }
    if let Some(OverlayState::UploadPrompt(state)) = app.overlay.as_ref() {
        render_input_prompt_overlay(f, state);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let title = " Agent Console ";
    let backend = format!("{} ", app.backend_url);
    let gap = area
        .width
        .saturating_sub(cell_width(title) + cell_width(&backend)) as usize;
    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
        Span::styled(backend, Style::default().fg(BAR_TEXT)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(BAR_BG)),
        area,
    );
}

fn render_home(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Completed Agents ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .style(Style::default().bg(BG_PANEL));

    let agents = app.console.registry().as_slice();
    if agents.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from("No agents have been set up yet."),
            Line::from(""),
            Line::from(Span::styled(
                "Press n to connect an agent instance to a data source.",
                Style::default().fg(FG_DIM),
            )),
        ])
        .alignment(Alignment::Center)
        .style(Style::default().fg(FG_PRIMARY))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = agents
        .iter()
        .map(|agent| {
            let generating = app.console.is_generating(agent.id());
            let articles = match (agent.has_articles, app.console.articles(agent.id())) {
                (_, Some(cached)) => format!("{} article(s)", cached.len()),
                (true, None) => String::from("articles ready"),
                (false, None) if generating => String::from("generating..."),
                (false, None) => String::from("no articles yet"),
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<32}", agent.name()),
                    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  source {}  ", agent.datasource_id),
                    Style::default().fg(FG_DIM),
                ),
                Span::styled(articles, Style::default().fg(STEP_DONE)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block.title(Title::from(" g generate · v view · n new agent ").position(Position::Bottom)))
        .highlight_style(
            Style::default()
                .fg(MENU_HIGHLIGHT_TEXT)
                .bg(MENU_HIGHLIGHT_BG),
        );
    let mut state = ListState::default().with_selected(Some(app.home_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_articles(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(agent_id) = app.console.viewing() else {
        return;
    };
    let name = app
        .console
        .registry()
        .get(agent_id)
        .map(|agent| agent.name().to_string())
        .unwrap_or_else(|| agent_id.to_string());
    let block = Block::default()
        .title(format!(" Articles · {} ", name))
        .title(Title::from(" Esc back · ↑/↓ scroll ").position(Position::Bottom))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_FOCUS))
        .style(Style::default().bg(BG_PANEL));

    let mut lines: Vec<Line> = Vec::new();
    match app.console.articles(agent_id) {
        None if app
            .console
            .tracker()
            .is_pending_for(OperationKind::FetchArticles, &agent_id.to_string()) =>
        {
            lines.push(Line::from("Loading articles..."));
        }
        None => {
            lines.push(Line::from(Span::styled(
                app.console.article_error().unwrap_or("No articles loaded."),
                Style::default().fg(BANNER_ERROR),
            )));
        }
        Some([]) => lines.push(Line::from("No articles yet. Press g on the home screen.")),
        Some(articles) => {
            for article in articles {
                lines.push(Line::from(Span::styled(
                    article.title.clone(),
                    Style::default().fg(STEP_CURRENT).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    article.created_at.clone(),
                    Style::default().fg(FG_DIM),
                )));
                for paragraph in article.content.lines() {
                    lines.push(Line::from(paragraph.to_string()));
                }
                lines.push(Line::from(""));
            }
        }
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.article_scroll, 0))
        .style(Style::default().fg(FG_PRIMARY))
        .block(block);
    f.render_widget(body, area);
}

fn render_wizard(f: &mut Frame<'_>, app: &App) {
    let area = centered_rect(80, 85, f.size());
    f.render_widget(Clear, area);
    let wizard = app.console.wizard();
    let block = Block::default()
        .title(Span::styled(
            " Create New Agent ",
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MENU_BORDER))
        .style(Style::default().bg(MENU_BG));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

    render_stepper(f, wizard.current_step(), chunks[0]);
    let subtitle = match wizard.current_step() {
        WizardStep::SelectOrganization => String::from("Choose the organization this agent will serve."),
        WizardStep::SelectAgentInstance => format!(
            "Pick an agent instance of {}.",
            wizard
                .selected_organization()
                .map(|org| org.name.as_str())
                .unwrap_or("the organization")
        ),
        WizardStep::ConnectDataSource => {
            String::from("Connect the data source the agent will analyse.")
        }
    };
    f.render_widget(
        Paragraph::new(subtitle).style(Style::default().fg(FG_PRIMARY).bg(MENU_BG)),
        chunks[1],
    );
    render_search_line(f, app, chunks[2]);

    match wizard.current_step() {
        WizardStep::SelectOrganization => render_organization_list(f, app, chunks[3]),
        WizardStep::SelectAgentInstance => render_instance_list(f, app, chunks[3]),
        WizardStep::ConnectDataSource => render_source_list(f, app, chunks[3]),
    }
    render_wizard_details(f, app, chunks[4]);
    render_banners(f, app, chunks[5]);

    let hint = match wizard.current_step() {
        WizardStep::SelectOrganization => "Enter select · / search · Esc cancel",
        WizardStep::SelectAgentInstance => "Enter select · / search · Tab category · Esc back",
        WizardStep::ConnectDataSource => {
            "Enter connect/finish · u upload · d disconnect · t test · p preview · Tab type · Esc back"
        }
    };
    f.render_widget(
        Paragraph::new(hint).style(Style::default().fg(FG_DIM).bg(MENU_BG)),
        chunks[6],
    );
}

fn render_stepper(f: &mut Frame<'_>, current: WizardStep, area: Rect) {
    let mut spans = Vec::new();
    for (index, step) in WizardStep::ALL.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" ── ", Style::default().fg(FG_DIM)));
        }
        let (marker, color) = if *step < current {
            ("✓", STEP_DONE)
        } else if *step == current {
            ("●", STEP_CURRENT)
        } else {
            ("○", FG_DIM)
        };
        spans.push(Span::styled(
            format!("{} {}. {}", marker, step.number(), step.title()),
            Style::default().fg(color).add_modifier(if *step == current {
                Modifier::BOLD
            } else {
                Modifier::empty()
            }),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(MENU_BG)),
        area,
    );
}

fn render_search_line(f: &mut Frame<'_>, app: &App, area: Rect) {
    let view = &app.wizard_view;
    let mut spans = vec![Span::styled("Search: ", Style::default().fg(FG_DIM))];
    if view.query.is_empty() && !view.searching {
        spans.push(Span::styled("(press /)", Style::default().fg(FG_DIM)));
    } else {
        spans.push(Span::styled(
            view.query.clone(),
            Style::default().fg(Color::White),
        ));
    }
    if view.searching {
        spans.push(Span::styled(" ▍", Style::default().fg(BORDER_FOCUS)));
    }
    let filter = match app.console.wizard().current_step() {
        WizardStep::SelectOrganization => None,
        WizardStep::SelectAgentInstance => Some(view.category.label().to_string()),
        WizardStep::ConnectDataSource => Some(
            view.source_type
                .map(|kind| kind.label().to_string())
                .unwrap_or_else(|| String::from("All Types")),
        ),
    };
    if let Some(filter) = filter {
        spans.push(Span::styled(
            format!("   Filter: {}", filter),
            Style::default().fg(FG_PRIMARY),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(MENU_BG)),
        area,
    );
}

fn list_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(BORDER_IDLE))
        .style(Style::default().bg(MENU_BG))
}

fn render_rows(f: &mut Frame<'_>, app: &App, area: Rect, title: &str, items: Vec<ListItem>, empty: &str) {
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(empty)
                .style(Style::default().fg(FG_DIM))
                .block(list_block(title)),
            area,
        );
        return;
    }
    let list = List::new(items)
        .block(list_block(title))
        .highlight_style(
            Style::default()
                .fg(MENU_HIGHLIGHT_TEXT)
                .bg(MENU_HIGHLIGHT_BG),
        );
    let mut state = ListState::default().with_selected(Some(app.wizard_view.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn loading_or(app: &App, kind: OperationKind, empty: &'static str) -> &'static str {
    if app.console.tracker().is_pending(kind) {
        "Loading..."
    } else {
        empty
    }
}

fn render_organization_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let selected = app.console.wizard().selected_organization().map(|org| org.id);
    let items: Vec<ListItem> = app
        .visible_organizations()
        .into_iter()
        .map(|org| {
            let marker = if selected == Some(org.id) { "● " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(STEP_CURRENT)),
                Span::styled(org.name.clone(), Style::default().fg(FG_PRIMARY)),
                Span::styled(
                    format!("  [{}]", org.kind_label()),
                    Style::default().fg(FG_DIM),
                ),
            ]))
        })
        .collect();
    let empty = loading_or(app, OperationKind::FetchOrganizations, "No organizations found.");
    render_rows(f, app, area, " Organizations ", items, empty);
}

fn render_instance_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let selected = app.console.wizard().selected_agent_instance().map(|i| i.id);
    let items: Vec<ListItem> = app
        .visible_agent_instances()
        .into_iter()
        .map(|instance| {
            let marker = if selected == Some(instance.id) { "● " } else { "  " };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(STEP_CURRENT)),
                    Span::styled(instance.name.clone(), Style::default().fg(FG_PRIMARY)),
                    Span::styled(
                        format!("  agent #{}", instance.agent_id),
                        Style::default().fg(FG_DIM),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "    {} · {} · {} articles",
                        instance.configuration.summary(),
                        instance.configuration.tone_label(),
                        instance.configuration.article_count_or_default()
                    ),
                    Style::default().fg(FG_DIM),
                )),
            ])
        })
        .collect();
    let empty = loading_or(
        app,
        OperationKind::FetchAgentInstances,
        "No agent instances for this organization.",
    );
    render_rows(f, app, area, " Agent Instances ", items, empty);
}

fn render_source_list(f: &mut Frame<'_>, app: &App, area: Rect) {
    let wizard = app.console.wizard();
    let items: Vec<ListItem> = app
        .visible_data_sources()
        .into_iter()
        .map(|source| {
            let mut spans = vec![
                Span::styled(source.name.clone(), Style::default().fg(FG_PRIMARY)),
                Span::styled(
                    format!("  [{}]", source.source_type.label()),
                    Style::default().fg(FG_DIM),
                ),
            ];
            if wizard.is_connected(&source.id) {
                spans.push(Span::styled(
                    "  connected",
                    Style::default().fg(BADGE_CONNECTED).add_modifier(Modifier::BOLD),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    let empty = loading_or(app, OperationKind::FetchDataSources, "No data sources. Press u to upload a CSV.");
    render_rows(f, app, area, " Data Sources ", items, empty);
}

fn render_wizard_details(f: &mut Frame<'_>, app: &App, area: Rect) {
    let wizard = app.console.wizard();
    let mut lines: Vec<Line> = Vec::new();
    match wizard.current_step() {
        WizardStep::SelectOrganization | WizardStep::SelectAgentInstance => {
            if let Some(org) = wizard.selected_organization() {
                lines.push(Line::from(format!("Organization: {}", org.name)));
            }
            if let Some(instance) = wizard.selected_agent_instance() {
                lines.push(Line::from(format!("Agent instance: {}", instance.name)));
            }
        }
        WizardStep::ConnectDataSource => {
            let connected = wizard
                .connected_data_sources()
                .first()
                .map(|source| source.name.clone())
                .unwrap_or_else(|| String::from("none"));
            lines.push(Line::from(format!("Connected: {}", connected)));
            if let Some(source) = app.visible_data_sources().get(app.wizard_view.cursor) {
                let catalog = app.console.catalog();
                if let Some(check) = catalog.last_check(&source.id) {
                    lines.push(Line::from(format!(
                        "Test: {} ({} rows)",
                        check.status, check.row_count
                    )));
                }
                if let Some(preview) = catalog.last_preview(&source.id) {
                    lines.extend(preview_lines(preview, 3));
                }
            }
            let upload = wizard.upload();
            if upload.uploading {
                lines.push(Line::from(Span::styled(
                    "Uploading...",
                    Style::default().fg(STEP_CURRENT),
                )));
            }
            if let Some(notice) = upload.notice.as_deref() {
                lines.push(Line::from(Span::styled(
                    notice.to_string(),
                    Style::default().fg(BANNER_SUCCESS),
                )));
            }
            if let Some(error) = upload.error.as_deref() {
                lines.push(Line::from(Span::styled(
                    format!("{} (x to dismiss)", error),
                    Style::default().fg(BANNER_ERROR),
                )));
            }
        }
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(FG_PRIMARY).bg(MENU_BG)),
        area,
    );
}

fn preview_lines(preview: &DataSourcePreview, limit: usize) -> Vec<Line<'static>> {
    preview
        .iter()
        .take(limit)
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .map(|(column, value)| match value {
                    serde_json::Value::String(text) => format!("{}={}", column, text),
                    other => format!("{}={}", column, other),
                })
                .collect();
            Line::from(Span::styled(
                cells.join("  "),
                Style::default().fg(FG_DIM),
            ))
        })
        .collect()
}

fn render_banners(f: &mut Frame<'_>, app: &App, area: Rect) {
    let wizard = app.console.wizard();
    let line = if wizard.loading() {
        Line::from(Span::styled(
            "Completing setup...",
            Style::default().fg(STEP_CURRENT),
        ))
    } else if let Some(error) = wizard.error() {
        Line::from(Span::styled(error.to_string(), Style::default().fg(BANNER_ERROR)))
    } else if let Some(success) = wizard.success() {
        Line::from(Span::styled(
            success.to_string(),
            Style::default().fg(BANNER_SUCCESS),
        ))
    } else {
        Line::from("")
    };
    f.render_widget(
        Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(MENU_BG)),
        area,
    );
}

fn render_status_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    f.render_widget(Clear, area);
    let pending = OperationKind::ALL
        .iter()
        .filter(|kind| app.console.tracker().is_pending(**kind))
        .count();
    let right = if pending > 0 {
        format!("[{} request(s) in flight] ", pending)
    } else {
        String::from("[idle] ")
    };
    let left = format!(" {}", app.status_message);
    let gap = area
        .width
        .saturating_sub(cell_width(&left) + cell_width(&right)) as usize;
    let paragraph = Paragraph::new(Line::from(vec![
        Span::raw(left),
        Span::raw(" ".repeat(gap)),
        Span::raw(right),
    ]))
    .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
    .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn render_input_prompt_overlay(f: &mut Frame<'_>, state: &InputPromptState) {
    let area = centered_rect(60, 30, f.size());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(
            state.title.as_str(),
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MENU_BORDER))
        .style(Style::default().bg(MENU_BG));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let placeholder =
        Paragraph::new(state.placeholder.as_str()).style(Style::default().fg(FG_DIM).bg(MENU_BG));
    f.render_widget(placeholder, chunks[0]);

    let mut input_spans = vec![Span::styled("> ", Style::default().fg(FG_PRIMARY))];
    if state.value.is_empty() {
        input_spans.push(Span::styled("(empty)", Style::default().fg(FG_DIM)));
    } else {
        input_spans.push(Span::styled(
            state.value.as_str(),
            Style::default().fg(Color::White),
        ));
    }
    input_spans.push(Span::styled(" ▍", Style::default().fg(BORDER_FOCUS)));
    let input = Paragraph::new(Line::from(input_spans))
        .style(Style::default().bg(MENU_BG))
        .alignment(Alignment::Left);
    f.render_widget(input, chunks[1]);

    let hint = Paragraph::new("Enter upload · Esc cancel · .csv up to 10MB")
        .style(Style::default().fg(FG_DIM).bg(MENU_BG));
    f.render_widget(hint, chunks[2]);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1])[1]
}
