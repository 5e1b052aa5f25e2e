use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::notes::Note;

/// The lines the viewer shows for `note`, wrapped to `width` columns. A tag
/// line and a blank separator come first when the note has tags.
pub fn layout(note: &Note, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    if !note.tags.is_empty() {
        lines.push(tag_line(&note.tags));
        lines.push(String::new());
    }
    for line in note.body.lines() {
        wrap_line(line, width, &mut lines);
    }
    lines
}

pub fn tag_line(tags: &[String]) -> String {
    format!("tags: #{}", tags.join(" #"))
}

fn wrap_line(line: &str, width: usize, out: &mut Vec<String>) {
    if width == 0 || line.width() <= width {
        out.push(line.to_string());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0;
    for word in line.split(' ') {
        let word_width = word.width();
        let sep = usize::from(!current.is_empty());
        if current_width + sep + word_width <= width {
            if sep == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += sep + word_width;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
            current_width = 0;
        }
        // words wider than the viewer are split by character
        for c in word.chars() {
            let char_width = c.width().unwrap_or(0);
            if current_width + char_width > width && !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            current.push(c);
            current_width += char_width;
        }
    }
    out.push(current);
}

/// Start of the next (`forward`) or current/previous paragraph from line
/// `from`. Paragraphs are runs of non-blank lines.
pub fn jump_paragraph(lines: &[String], from: usize, forward: bool) -> usize {
    if lines.is_empty() {
        return 0;
    }
    let blank = |i: usize| lines[i].trim().is_empty();
    let mut i = from.min(lines.len() - 1);

    if forward {
        while i < lines.len() && blank(i) {
            i += 1;
        }
        while i < lines.len() && !blank(i) {
            i += 1;
        }
        while i < lines.len() && blank(i) {
            i += 1;
        }
        i.min(lines.len() - 1)
    } else {
        i = i.saturating_sub(1);
        while i > 0 && blank(i) {
            i -= 1;
        }
        while i > 0 && !blank(i - 1) {
            i -= 1;
        }
        i
    }
}
