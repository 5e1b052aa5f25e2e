use ratatui::{
    layout::{Constraint, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::status_bar::render_status_bar;
use super::{render_divider, truncate, Theme};
use crate::app::{App, Conversation};

pub fn render_note_ai(f: &mut Frame, app: &App) {
    let title = app
        .current
        .as_ref()
        .map(|n| truncate(&n.title, 60))
        .unwrap_or_default();
    render_panel(
        f,
        app,
        &app.note_ai,
        &format!("{}  [ AI ]", title),
        "Ask anything about this note...",
        "Enter submit · Esc back to note",
    );
}

pub fn render_vault_ai(f: &mut Frame, app: &App) {
    render_panel(
        f,
        app,
        &app.vault_ai,
        &format!("grove  [ vault AI ]  {} notes", app.notes.len()),
        "Ask anything about your vault...",
        "Enter submit · Esc back",
    );
}

fn render_panel(f: &mut Frame, app: &App, conversation: &Conversation, title: &str, placeholder: &str, hints: &str) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(f.area());

    f.render_widget(
        Paragraph::new(Span::styled(
            format!("  {}", title),
            Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD),
        )),
        chunks[0],
    );
    render_divider(f, chunks[1]);

    let inner_height = chunks[2].height.saturating_sub(2) as usize;
    let inner_width = chunks[2].width.saturating_sub(4) as usize;
    let lines = conversation_lines(conversation, placeholder, inner_width);
    let skip = lines.len().saturating_sub(inner_height);
    let history = Paragraph::new(lines.into_iter().skip(skip).collect::<Vec<_>>()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Theme::DIVIDER)),
    );
    f.render_widget(history, chunks[2]);

    let border = if conversation.loading { Theme::DIVIDER } else { Theme::ACCENT };
    let input = Paragraph::new(Span::styled(
        conversation.input.value().to_string(),
        Style::default().fg(Theme::TEXT),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(input, chunks[3]);
    if !conversation.loading {
        f.set_cursor_position((
            chunks[3].x + 1 + conversation.input.cursor_offset() as u16,
            chunks[3].y + 1,
        ));
    }

    render_divider(f, chunks[4]);
    let hints = if conversation.loading {
        "waiting for Gemini..."
    } else if !app.ai_available() {
        "no Gemini API key: set ai_key or GEMINI_API_KEY · Esc back"
    } else {
        hints
    };
    render_status_bar(f, app, chunks[5], hints, "");
}

/// The tail of this is what fits in the panel, so newest content goes last.
fn conversation_lines(conversation: &Conversation, placeholder: &str, width: usize) -> Vec<Line<'static>> {
    let muted = Style::default().fg(Theme::MUTED);
    if conversation.entries.is_empty() && !conversation.loading && conversation.error.is_none() {
        return vec![Line::from(Span::styled(format!("  {}", placeholder), muted))];
    }

    let mut lines = Vec::new();
    for entry in &conversation.entries {
        lines.push(Line::from(vec![
            Span::styled("  Q: ", Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD)),
            Span::styled(entry.question.clone(), Style::default().fg(Theme::TEXT)),
        ]));
        if let Some(answer) = &entry.answer {
            for line in answer.lines() {
                for chunk in wrap(line, width.saturating_sub(2)) {
                    lines.push(Line::from(Span::raw(format!("  {}", chunk))));
                }
            }
        }
        lines.push(Line::default());
    }
    if conversation.loading {
        lines.push(Line::from(Span::styled("  thinking...", muted)));
    }
    if let Some(error) = &conversation.error {
        lines.push(Line::from(Span::styled(
            format!("  error: {}", error),
            Style::default().fg(Theme::ERROR),
        )));
    }
    lines
}

fn wrap(line: &str, width: usize) -> Vec<String> {
    if width == 0 || line.chars().count() <= width {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}
