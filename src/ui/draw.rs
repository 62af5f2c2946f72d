use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use footprint::dispatch::Outcome;
use footprint::dom::{Document, ElementId, OverlayQuery};
use footprint::keybindings::ShortcutAction;
use footprint::routes;

use super::{
    app::{page_title, App},
    help,
    theme::Theme,
};

const APP_TITLE: &str = concat!("FOOTPRINT v", env!("CARGO_PKG_VERSION"));

/// Cut `s` so it fits in `max` terminal columns.
pub fn truncate_to_width(s: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max {
            break;
        }
        width += w;
        out.push(ch);
    }
    out
}

pub fn draw(frame: &mut Frame, app: &App) {
    let theme = Theme::default();
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.palette.bg)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(1), // status
            Constraint::Min(3),    // page
            Constraint::Length(1), // live region
            Constraint::Length(1), // footer
        ])
        .split(area);

    draw_header(frame, app, chunks[0], &theme);
    draw_status(frame, app, chunks[1], &theme);
    draw_page(frame, app, chunks[2], &theme);
    draw_live_region(frame, app, chunks[3], &theme);
    draw_footer(frame, app, chunks[4], &theme);
    draw_dialogs(frame, app, chunks[2], &theme);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(format!(" {} ", APP_TITLE), Style::default().fg(theme.palette.fg_strong).add_modifier(Modifier::BOLD)),
        Span::styled("│ ", Style::default().fg(theme.palette.fg_dim)),
        Span::styled(page_title(app.route()).to_string(), Style::default().fg(theme.palette.fg)),
        Span::styled("  ", Style::default()),
        Span::styled(app.route().to_string(), Style::default().fg(theme.palette.accent)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.palette.bg_alt)), area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status = app.session.status();
    let (mode, mode_color) = if status.shortcuts_enabled {
        (format!("shortcuts on ({})", status.shortcut_count), theme.palette.positive)
    } else {
        ("shortcuts off (narrow viewport)".to_string(), theme.palette.highlight)
    };
    let dim = Style::default().fg(theme.palette.fg_dim);
    let value = Style::default().fg(theme.palette.fg);

    let line = Line::from(vec![
        Span::styled(format!(" {}", mode), Style::default().fg(mode_color)),
        Span::styled(" │ ", dim),
        Span::styled(if app.authenticated { "signed in" } else { "signed out" }, value),
        Span::styled(" │ ", dim),
        Span::styled(if app.tour_active { "tour running" } else { "no tour" }, value),
        Span::styled(" │ company: ", dim),
        Span::styled(if app.company_selected() { "selected" } else { "none" }, value),
        Span::styled(" │ focus: ", dim),
        Span::styled(app.focus_label(), Style::default().fg(theme.palette.accent)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_page(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let block = Block::default()
        .title(format!(" {} ", page_title(app.route())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.palette.fg_dim));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let focused = app.doc.focused();
    let focus_style = |id: ElementId| {
        if focused == Some(id) {
            Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.palette.fg)
        }
    };

    let menu_state = if app.menu_expanded() { "▴ open" } else { "▾" };
    let box_width = (inner.width as usize).saturating_sub(12).max(8);
    let value = app.search_value();
    let shown = if value.is_empty() {
        Span::styled(truncate_to_width("Search companies and products", box_width), Style::default().fg(theme.palette.fg_dim))
    } else {
        Span::styled(truncate_to_width(value, box_width), focus_style(app.search))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(" [Account menu ", focus_style(app.menu_toggle)),
            Span::styled(menu_state, focus_style(app.menu_toggle)),
            Span::styled("]", focus_style(app.menu_toggle)),
        ]),
        Line::from(vec![Span::styled(" Search: [", focus_style(app.search)), shown, Span::styled("]", focus_style(app.search))]),
        Line::from(""),
    ];

    if app.route().starts_with("/accessibility") {
        lines.extend(help::build_help_content(app.session.dispatcher().keybindings(), theme));
    } else {
        let hint = match app.route() {
            r if r.starts_with(routes::NEW_PRODUCT) => "Product form",
            r if r.starts_with(routes::NEW_COMPANY) => "Company onboarding form",
            _ => "Press Shift+? for keyboard shortcuts",
        };
        lines.push(Line::from(Span::styled(format!(" {}", hint), Style::default().fg(theme.palette.fg_dim))));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_dialogs(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.doc.focused();
    for (i, dialog) in app.doc.open_dialogs().into_iter().enumerate() {
        let offset = (i as u16).saturating_mul(2);
        let width = area.width.saturating_sub(4).min(44);
        let height = 5;
        if width < 20 || area.height < height + offset {
            break;
        }
        let x = area.x + (area.width.saturating_sub(width)) / 2 + offset;
        let y = area.y + (area.height.saturating_sub(height)) / 2 + offset / 2;
        let rect = Rect::new(x.min(area.right().saturating_sub(width)), y, width, height);

        let title = app
            .doc
            .get(dialog)
            .and_then(|el| el.aria_label.clone())
            .unwrap_or_else(|| "Dialog".to_string());
        let buttons: Vec<Span> = app
            .doc
            .descendants(dialog)
            .into_iter()
            .filter_map(|id| {
                let el = app.doc.get(id)?;
                let label = el.aria_label.clone()?;
                let style = if focused == Some(id) {
                    Style::default().fg(theme.palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.palette.fg)
                };
                Some(Span::styled(format!(" [{}] ", label), style))
            })
            .collect();

        let block = Block::default()
            .title(format!(" {} ", title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.palette.accent));
        frame.render_widget(Clear, rect);
        frame.render_widget(Paragraph::new(vec![Line::from(""), Line::from(buttons)]).block(block), rect);
    }
}

fn draw_live_region(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(" live: ", Style::default().fg(theme.palette.fg_dim)),
        Span::styled(app.announcement().to_string(), Style::default().fg(theme.palette.positive)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let kb = app.session.dispatcher().keybindings();
    let key = Style::default().fg(theme.palette.shortcut);
    let desc = Style::default().fg(theme.palette.fg_dim);

    let mut spans = Vec::new();
    for action in ShortcutAction::ALL {
        let label = match action {
            ShortcutAction::FocusSearch => "search",
            ShortcutAction::ShowHelp => "help",
            ShortcutAction::CreateNew => "new",
            ShortcutAction::EscapeCascade => "close",
        };
        spans.push(Span::styled(format!(" {}", kb.first_key(action)), key));
        spans.push(Span::styled(format!(" {} ", label), desc));
    }
    let outcome = match app.last_outcome {
        None => String::new(),
        Some(Outcome::Handled(action)) => format!("│ {}", action.description()),
        Some(Outcome::Disabled) => "│ shortcuts disabled".to_string(),
        Some(Outcome::TourActive) => "│ tour owns Escape".to_string(),
        Some(Outcome::InInputField) => "│ typing".to_string(),
        Some(Outcome::Unbound) => String::new(),
    };
    spans.push(Span::styled(outcome, Style::default().fg(theme.palette.fg)));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(theme.palette.bg_alt)), area);
}
