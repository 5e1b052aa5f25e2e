//! Wiki-links (`[[Title]]`) derived from note bodies.
//!
//! Nothing here is cached: links and backlinks are recomputed from the
//! current note snapshot every time the links panel opens.

use crate::notes::Note;

/// Link targets in first-seen order, trimmed, without empties or duplicates.
pub fn extract_links(body: &str) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    let mut search_start = 0;

    while let Some(start_pos) = body[search_start..].find("[[") {
        let abs_start = search_start + start_pos;
        let after_brackets = &body[abs_start + 2..];

        let Some(end_pos) = after_brackets.find("]]") else {
            break;
        };

        let raw_content = &after_brackets[..end_pos];
        if let Some(bracket) = raw_content.find(['[', ']']) {
            // `[[a [[b]]` or `[[a]b]]`: targets hold no brackets, rescan from there
            search_start = abs_start + 2 + bracket;
            continue;
        }

        let target = raw_content.trim();
        if !target.is_empty() && !links.iter().any(|l| l == target) {
            links.push(target.to_string());
        }
        search_start = abs_start + 2 + end_pos + 2;
    }

    links
}

/// Link targets name titles; matching ignores case and surrounding whitespace.
pub fn title_matches(target: &str, title: &str) -> bool {
    target.trim().to_lowercase() == title.trim().to_lowercase()
}

/// Notes whose bodies link to `title`, in the order given. A note never
/// counts as its own backlink.
pub fn backlinks<'a>(title: &str, notes: &'a [Note]) -> Vec<&'a Note> {
    notes
        .iter()
        .filter(|n| !title_matches(title, &n.title))
        .filter(|n| extract_links(&n.body).iter().any(|l| title_matches(l, title)))
        .collect()
}

/// First note whose title a link target points at.
pub fn resolve<'a>(target: &str, notes: &'a [Note]) -> Option<&'a Note> {
    notes.iter().find(|n| title_matches(target, &n.title))
}
