use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{render_divider, render_header, Theme};
use crate::app::App;
use crate::templates;

const HELP: &[(&str, &[(&str, &str)])] = &[
    (
        "LIST",
        &[
            ("j/k", "navigate"),
            ("gg / G", "top / bottom"),
            ("Enter / l", "open note"),
            ("n", "new note"),
            ("N", "new note with template"),
            ("t", "today's daily note"),
            ("/", "fuzzy search"),
            ("d", "delete (with confirm)"),
            ("@", "vault-wide AI"),
            ("r", "refresh"),
            ("q", "quit"),
        ],
    ),
    (
        "VIEWER",
        &[
            ("j/k", "scroll"),
            ("gg / G", "top / bottom"),
            ("{ / }", "prev / next paragraph"),
            ("d/u", "half-page down/up"),
            ("ctrl+f/b", "page down/up"),
            ("e", "open in $EDITOR"),
            ("A", "ask AI about note"),
            ("L", "links panel (wiki-links)"),
            ("q / h / Esc", "back to list"),
        ],
    ),
    (
        "SEARCH",
        &[("type", "filter"), ("Enter", "open"), ("ctrl+n/p", "navigate results"), ("Esc", "cancel")],
    ),
    (
        "AI PANEL / VAULT AI",
        &[("type", "your question"), ("Enter", "send to Gemini"), ("Esc", "back")],
    ),
    (
        "LINKS PANEL",
        &[("j/k", "navigate"), ("Enter", "open linked note"), ("Esc / q", "back to viewer")],
    ),
];

fn hint(text: &str) -> Line<'static> {
    Line::from(Span::styled(format!("  {}", text), Style::default().fg(Theme::MUTED)))
}

pub fn render_title_prompt(f: &mut Frame, app: &App, subtitle: &str) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .split(f.area());

    render_header(f, chunks[0], subtitle);
    render_divider(f, chunks[1]);
    f.render_widget(Paragraph::new(hint("Note title:")), chunks[3]);

    let input = Line::from(vec![
        Span::styled("  › ", Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(app.title_input.value().to_string(), Style::default().fg(Theme::TEXT)),
    ]);
    f.render_widget(Paragraph::new(input), chunks[4]);
    f.set_cursor_position((chunks[4].x + 4 + app.title_input.cursor_offset() as u16, chunks[4].y));

    if let Some(status) = &app.status {
        let style = Style::default().fg(if status.is_error { Theme::ERROR } else { Theme::SUCCESS });
        f.render_widget(Paragraph::new(Span::styled(format!("  {}", status.text), style)), chunks[6]);
    } else {
        f.render_widget(Paragraph::new(hint("Enter to create and open in $EDITOR · Esc to cancel")), chunks[6]);
    }
}

pub fn render_template_picker(f: &mut Frame, cursor: usize) {
    let mut lines = Vec::new();
    for (i, name) in templates::NAMES.iter().enumerate() {
        if i == cursor {
            lines.push(Line::from(Span::styled(
                format!("  ▸ {}", name),
                Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::from(Span::styled(format!("    {}", name), Style::default().fg(Theme::TEXT))));
        }
    }
    lines.push(Line::default());
    lines.push(hint("j/k navigate · Enter select · Esc cancel"));

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).split(f.area());
    render_header(f, chunks[0], "new note, choose template");
    render_divider(f, chunks[1]);
    f.render_widget(Paragraph::new(lines), chunks[2]);
}

pub fn render_confirm_delete(f: &mut Frame, title: &str) {
    let lines = vec![
        Line::default(),
        Line::from(Span::styled(
            format!("  Delete \"{}\"?", title),
            Style::default().fg(Theme::ERROR).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("  y / Enter", Style::default().fg(Theme::TEXT)),
            Span::styled(" yes   ", Style::default().fg(Theme::MUTED)),
            Span::styled("any other key", Style::default().fg(Theme::TEXT)),
            Span::styled(" cancel", Style::default().fg(Theme::MUTED)),
        ]),
    ];

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).split(f.area());
    render_header(f, chunks[0], "delete");
    render_divider(f, chunks[1]);
    f.render_widget(Paragraph::new(lines), chunks[2]);
}

pub fn render_help(f: &mut Frame) {
    let mut lines = Vec::new();
    for (section, keys) in HELP {
        lines.push(Line::from(Span::styled(
            format!("  {}", section),
            Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("    {:<13}", key), Style::default().fg(Theme::PRIMARY)),
                Span::styled(action.to_string(), Style::default().fg(Theme::TEXT)),
            ]));
        }
        lines.push(Line::default());
    }
    lines.push(hint("q / Esc / ? to close"));

    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)]).split(f.area());
    render_header(f, chunks[0], "help");
    render_divider(f, chunks[1]);
    f.render_widget(Paragraph::new(lines), chunks[2]);
}
