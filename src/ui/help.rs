//! Keyboard shortcuts help, shown when the page is on the accessibility route.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use footprint::keybindings::{GuardPolicy, Keybindings};

use super::theme::Theme;

/// Build the help content as styled lines
pub fn build_help_content(keybindings: &Keybindings, theme: &Theme) -> Vec<Line<'static>> {
    let section_style = Style::default()
        .fg(theme.palette.fg_strong)
        .add_modifier(Modifier::BOLD);
    let decorator_style = Style::default().fg(theme.palette.fg_dim);
    let key_style = Style::default().fg(theme.palette.shortcut);
    let desc_style = Style::default().fg(theme.palette.fg);
    let hint_style = Style::default().fg(theme.palette.fg_dim);

    let section = |title: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled("── ".to_string(), decorator_style),
            Span::styled(title.to_string(), section_style),
            Span::styled(" ──".to_string(), decorator_style),
        ])
    };

    let key_line = |key: &str, desc: &str| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("  {:16}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let mut lines = vec![section("Keyboard shortcuts")];
    for row in keybindings.command_table() {
        let keys = if row.keys.is_empty() {
            "(unbound)".to_string()
        } else {
            row.keys.join(" / ")
        };
        let mut desc = row.action.description().to_string();
        if row.guard_policy == GuardPolicy::AlwaysAllowed {
            desc.push_str(" (also while typing)");
        }
        lines.push(key_line(&keys, &desc));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Shortcuts are off on viewports narrower than 768px.".to_string(),
        hint_style,
    )));
    lines.push(Line::from(""));

    lines.push(section("Terminal host"));
    lines.push(key_line("Tab", "Move focus"));
    lines.push(key_line("Enter", "Activate focused button"));
    lines.push(key_line("F2", "Open an energy record dialog"));
    lines.push(key_line("F3", "Toggle the account menu"));
    lines.push(key_line("F4", "Start/stop the guided tour"));
    lines.push(key_line("F5", "Sign in/out"));
    lines.push(key_line("F6", "Select/clear company"));
    lines.push(key_line("F7", "Back"));
    lines.push(key_line("Ctrl+C", "Quit"));
    lines
}
