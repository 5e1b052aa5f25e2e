use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::status_bar::render_status_bar;
use super::{frame_areas, render_divider, render_header, truncate, word_count, Theme};
use crate::app::{tag_line, App, LinksPanel};
use crate::links;

const VIEWER_HINTS: &str = "j/k  gg/G  {/}  d/u  e edit  A AI  L links  q back";
const LINKS_HINTS: &str = "j/k navigate · Enter open · Esc back to viewer";

pub fn render_viewer(f: &mut Frame, app: &App) {
    let Some(note) = &app.current else {
        return;
    };
    let [header, top, body, bottom, footer] = frame_areas(f.area(), app.page_height() as u16);

    let title = truncate(&note.title, (header.width as usize).saturating_sub(36));
    let header_line = Line::from(vec![
        Span::styled(format!("  {}", title), Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD)),
        Span::styled("  [e]edit  [A]AI  [L]links  [q]back", Style::default().fg(Theme::MUTED)),
    ]);
    f.render_widget(Paragraph::new(header_line), header);
    render_divider(f, top);

    let tags = (!note.tags.is_empty()).then(|| tag_line(&note.tags));
    let lines: Vec<Line> = styled_lines(&app.viewer_lines, tags.as_deref())
        .into_iter()
        .skip(app.scroll)
        .take(body.height as usize)
        .collect();
    f.render_widget(Paragraph::new(lines), body);

    render_divider(f, bottom);
    let position = app
        .current_position()
        .map(|(pos, total)| format!("({}/{})  ", pos, total))
        .unwrap_or_default();
    let stats = format!("{}{} words  {}%", position, word_count(&note.body), app.scroll_percent());
    render_status_bar(f, app, footer, VIEWER_HINTS, &stats);
}

/// Style every line of the note. Fence state has to be tracked from the top,
/// so this runs over the whole note rather than the visible window.
fn styled_lines(lines: &[String], tag_line: Option<&str>) -> Vec<Line<'static>> {
    let code_style = Style::default().fg(Theme::CODE);
    let mut in_code = false;
    lines
        .iter()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code = !in_code;
                return Line::from(Span::styled(line.clone(), code_style.add_modifier(Modifier::DIM)));
            }
            if in_code {
                return Line::from(Span::styled(line.clone(), code_style));
            }
            styled_line(line, tag_line == Some(line.as_str()))
        })
        .collect()
}

/// Headings bold, list markers and quotes tinted, `[[links]]` highlighted,
/// the tag line in its own color.
fn styled_line(line: &str, is_tag_line: bool) -> Line<'static> {
    if is_tag_line {
        return Line::from(Span::styled(line.to_string(), Style::default().fg(Theme::TAG)));
    }
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return Line::from(Span::styled(
            line.to_string(),
            Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans = Vec::new();
    let mut text_style = Style::default().fg(Theme::TEXT);
    let mut rest = line;
    if let Some(marker_len) = list_marker_len(trimmed) {
        let end = line.len() - trimmed.len() + marker_len;
        spans.push(Span::styled(line[..end].to_string(), Style::default().fg(Theme::ACCENT)));
        rest = &line[end..];
    } else if trimmed.starts_with('>') {
        text_style = Style::default().fg(Theme::MUTED).add_modifier(Modifier::ITALIC);
    }

    let link_style = Style::default().fg(Theme::LINK).add_modifier(Modifier::UNDERLINED);
    while let Some(start) = rest.find("[[") {
        let Some(len) = rest[start + 2..].find("]]") else {
            break;
        };
        let end = start + 2 + len + 2;
        if start > 0 {
            spans.push(Span::styled(rest[..start].to_string(), text_style));
        }
        spans.push(Span::styled(rest[start..end].to_string(), link_style));
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        spans.push(Span::styled(rest.to_string(), text_style));
    }
    Line::from(spans)
}

/// Byte length of a `- `, `* `, `+ ` or `1. ` marker, including its space.
fn list_marker_len(trimmed: &str) -> Option<usize> {
    if ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m)) {
        return Some(2);
    }
    let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
    (digits > 0 && trimmed[digits..].starts_with(". ")).then_some(digits + 2)
}

pub fn render_links(f: &mut Frame, app: &App, panel: &LinksPanel) {
    let Some(note) = &app.current else {
        return;
    };
    let [header, top, body, bottom, footer] = frame_areas(f.area(), app.page_height() as u16);

    render_header(f, header, &format!("links: {}", note.title));
    render_divider(f, top);

    let selected = Style::default().fg(Theme::PRIMARY).add_modifier(Modifier::BOLD);
    let section = Style::default().fg(Theme::ACCENT).add_modifier(Modifier::BOLD);
    let row = |idx: usize, label: String, style: Style| {
        if idx == panel.cursor {
            Line::from(Span::styled(format!("  ▸ {}", label), selected))
        } else {
            Line::from(Span::styled(format!("    {}", label), style))
        }
    };

    let mut lines = vec![Line::from(Span::styled("  → outgoing links", section))];
    if panel.outgoing.is_empty() {
        lines.push(Line::from(Span::styled("    (none)", Style::default().fg(Theme::MUTED))));
    }
    for (i, target) in panel.outgoing.iter().enumerate() {
        let found = links::resolve(target, &app.notes).is_some();
        let (label, style) = if found {
            (format!("[[{}]]", target), Style::default().fg(Theme::TEXT))
        } else {
            (format!("[[{}]] (not found)", target), Style::default().fg(Theme::MUTED))
        };
        lines.push(row(i, label, style));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("  ← backlinks", section)));
    if panel.backlinks.is_empty() {
        lines.push(Line::from(Span::styled("    (none)", Style::default().fg(Theme::MUTED))));
    }
    for (i, (_, title)) in panel.backlinks.iter().enumerate() {
        lines.push(row(panel.outgoing.len() + i, title.clone(), Style::default().fg(Theme::TEXT)));
    }

    f.render_widget(Paragraph::new(lines), body);
    render_divider(f, bottom);
    let stats = if panel.is_empty() {
        "no links".to_string()
    } else {
        format!("{} out  {} back", panel.outgoing.len(), panel.backlinks.len())
    };
    render_status_bar(f, app, footer, LINKS_HINTS, &stats);
}
