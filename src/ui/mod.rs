mod ai_panel;
mod dialogs;
mod list;
mod status_bar;
mod viewer;

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

pub(crate) struct Theme;

impl Theme {
    pub const PRIMARY: Color = Color::Rgb(134, 188, 122);
    pub const ACCENT: Color = Color::Rgb(180, 142, 210);
    pub const TEXT: Color = Color::Rgb(220, 220, 210);
    pub const MUTED: Color = Color::Rgb(120, 124, 130);
    pub const DIVIDER: Color = Color::Rgb(70, 74, 80);
    pub const TAG: Color = Color::Rgb(110, 170, 200);
    pub const LINK: Color = Color::Rgb(230, 190, 110);
    pub const CODE: Color = Color::Rgb(150, 200, 180);
    pub const ERROR: Color = Color::Rgb(224, 108, 117);
    pub const SUCCESS: Color = Color::Rgb(152, 195, 121);
}

pub fn render(f: &mut Frame, app: &App) {
    match &app.view {
        View::List => list::render_list(f, app),
        View::Search => list::render_search(f, app),
        View::Viewer => viewer::render_viewer(f, app),
        View::Links(panel) => viewer::render_links(f, app, panel),
        View::AiPanel => ai_panel::render_note_ai(f, app),
        View::VaultAi => ai_panel::render_vault_ai(f, app),
        View::NewNote => dialogs::render_title_prompt(f, app, "new note"),
        View::TemplateTitle { template } => {
            let name = crate::templates::NAMES.get(*template).copied().unwrap_or("default");
            dialogs::render_title_prompt(f, app, &format!("new note, {} template", name))
        }
        View::TemplatePicker { cursor } => dialogs::render_template_picker(f, *cursor),
        View::ConfirmDelete { title, .. } => dialogs::render_confirm_delete(f, title),
        View::Help { .. } => dialogs::render_help(f),
    }
}

/// Header, divider, body, divider, footer. The body gets `body_height` rows.
pub(crate) fn frame_areas(area: Rect, body_height: u16) -> [Rect; 5] {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(body_height),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3], chunks[4]]
}

pub(crate) fn render_header(f: &mut Frame, area: Rect, subtitle: &str) {
    let line = Line::from(vec![
        Span::styled("grove", Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD)),
        Span::styled("  ›  ", Style::default().fg(Theme::DIVIDER)),
        Span::styled(subtitle.to_string(), Style::default().fg(Theme::MUTED)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

pub(crate) fn render_divider(f: &mut Frame, area: Rect) {
    let rule = "─".repeat(area.width as usize);
    f.render_widget(Paragraph::new(Span::styled(rule, Style::default().fg(Theme::DIVIDER))), area);
}

/// `s` cut to `max` characters (at least 4), ending in `…` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    let max = max.max(4);
    if s.chars().count() <= max {
        return s.to_string();
    }
    let head: String = s.chars().take(max - 1).collect();
    format!("{}…", head)
}

/// Compact age of `t` as seen from `now`.
pub fn human_time(t: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(t);
    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h", age.num_hours())
    } else if age.num_days() < 7 {
        format!("{}d", age.num_days())
    } else if age.num_days() < 30 {
        format!("{}w", age.num_weeks())
    } else {
        t.with_timezone(&Local).format("%b %-d").to_string()
    }
}

/// First line of `body` that is neither blank nor a heading.
pub fn note_preview(body: &str, max: usize) -> String {
    body.lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| truncate(l, max))
        .unwrap_or_default()
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}
