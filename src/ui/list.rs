use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::status_bar::render_status_bar;
use super::{human_time, note_preview, render_divider, render_header, truncate, Theme};
use crate::app::App;

const LIST_HINTS: &str = "j/k · Enter · n/N new · t daily · / search · d del · @ AI · ? help · q";
const SEARCH_HINTS: &str = "type to search · Enter open · ctrl+n/p navigate · Esc cancel";

pub fn render_list(f: &mut Frame, app: &App) {
    let page = app.page_height() as u16;
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(page),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_header(f, chunks[0], &format!("{} notes", app.notes.len()));
    render_divider(f, chunks[1]);

    if app.filtered.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "  no notes yet. Press n to create one, t for today's daily note",
            Style::default().fg(Theme::MUTED),
        ));
        f.render_widget(empty, chunks[2]);
    } else {
        render_rows(f, app, chunks[2]);
    }

    let width = chunks[3].width as usize;
    let preview = app
        .selected_note()
        .map(|n| note_preview(&n.body, width.saturating_sub(4)))
        .unwrap_or_default();
    f.render_widget(
        Paragraph::new(Span::styled(format!("  {}", preview), Style::default().fg(Theme::MUTED))),
        chunks[3],
    );

    render_divider(f, chunks[4]);
    render_status_bar(f, app, chunks[5], LIST_HINTS, "");
}

pub fn render_search(f: &mut Frame, app: &App) {
    let page = app.page_height() as u16;
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(page),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_header(f, chunks[0], "search");
    render_divider(f, chunks[1]);

    let query = app.search_input.value();
    let input = Line::from(vec![
        Span::styled("  / ", Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(query.to_string(), Style::default().fg(Theme::TEXT)),
    ]);
    f.render_widget(Paragraph::new(input), chunks[2]);
    f.set_cursor_position((
        chunks[2].x + 4 + app.search_input.cursor_offset() as u16,
        chunks[2].y,
    ));

    if app.filtered.is_empty() {
        let msg = if query.is_empty() {
            "  no notes yet. Press Esc, then n to create one"
        } else {
            "  no results"
        };
        f.render_widget(Paragraph::new(Span::styled(msg, Style::default().fg(Theme::MUTED))), chunks[3]);
    } else {
        render_rows(f, app, chunks[3]);
    }

    render_divider(f, chunks[4]);
    let stats = format!("{}/{}", app.filtered.len(), app.notes.len());
    render_status_bar(f, app, chunks[5], SEARCH_HINTS, &stats);
}

fn render_rows(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width as usize;
    let now = Utc::now();
    let end = (app.list_offset + area.height as usize).min(app.filtered.len());

    let lines: Vec<Line> = (app.list_offset..end)
        .filter_map(|row| app.notes.get(app.filtered[row]).map(|note| (row, note)))
        .map(|(row, note)| {
            let age = human_time(note.updated, now);
            let title = truncate(&note.title, width.saturating_sub(age.len() + 6).max(10));
            let pad = width.saturating_sub(4 + title.width() + age.len()).max(1);

            let (marker, title_style) = if row == app.cursor {
                ("  ▸ ", Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD))
            } else {
                ("    ", Style::default().fg(Theme::TEXT))
            };
            Line::from(vec![
                Span::styled(marker, title_style),
                Span::styled(title, title_style),
                Span::raw(" ".repeat(pad)),
                Span::styled(age, Style::default().fg(Theme::MUTED)),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), area);
}
