use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::Theme;
use crate::app::App;

/// Bottom line: the pending status message if there is one, otherwise the
/// key hints for the current view. `stats` is right-aligned.
pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect, hints: &str, stats: &str) {
    let left = match &app.status {
        Some(status) => {
            let color = if status.is_error { Theme::ERROR } else { Theme::SUCCESS };
            Span::styled(
                format!("  {}", status.text),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )
        }
        None => Span::styled(format!("  {}", hints), Style::default().fg(Theme::MUTED)),
    };

    let right = Span::styled(format!("{}  ", stats), Style::default().fg(Theme::MUTED));

    let padding = (area.width as usize).saturating_sub(left.content.width() + right.content.width());
    let line = Line::from(vec![left, Span::raw(" ".repeat(padding)), right]);

    f.render_widget(Paragraph::new(line), area);
}
