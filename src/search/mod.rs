//! Fuzzy note search. Nothing is indexed ahead of time; every query scores
//! the whole snapshot again.

use crate::notes::Note;

/// Indices into `notes`, best match first. Equal scores keep the order of
/// `notes`; a blank query returns every index unchanged.
pub fn search(query: &str, notes: &[Note]) -> Vec<usize> {
    if query.trim().is_empty() {
        return (0..notes.len()).collect();
    }

    let mut scored: Vec<(usize, i32)> = notes
        .iter()
        .enumerate()
        .filter_map(|(i, note)| fuzzy_match(&note.haystack(), query).map(|score| (i, score)))
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(i, _)| i).collect()
}

/// fuzzy matching algorithm that scores matches based on:
/// - exact match: highest score
/// - prefix match: high score
/// - substring match: medium score, earlier is better
/// - in-order characters: points per hit, bonuses for consecutive hits and
///   word starts
/// returns None if no match, Some(score) if matched
pub fn fuzzy_match(text: &str, query: &str) -> Option<i32> {
    if query.is_empty() {
        return Some(0);
    }
    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    if text_lower == query_lower {
        return Some(1000);
    }

    if text_lower.starts_with(&query_lower) {
        return Some(900 + (100 - text.chars().count().min(100) as i32));
    }

    if let Some(pos) = text_lower.find(&query_lower) {
        let char_pos = text_lower[..pos].chars().count().min(50) as i32;
        return Some(500 + (50 - char_pos));
    }

    let text_chars: Vec<char> = text_lower.chars().collect();
    let query_chars: Vec<char> = query_lower.chars().collect();

    let mut text_idx = 0;
    let mut query_idx = 0;
    let mut score: i32 = 0;
    let mut prev_matched = false;
    let mut consecutive_bonus = 0;

    while text_idx < text_chars.len() && query_idx < query_chars.len() {
        if text_chars[text_idx] == query_chars[query_idx] {
            score += (100 - text_idx.min(100) as i32).max(1);
            if prev_matched {
                consecutive_bonus += 20;
            }

            if text_idx == 0 || matches!(text_chars.get(text_idx - 1), Some(' ' | '_' | '-' | '\n')) {
                score += 30;
            }

            prev_matched = true;
            query_idx += 1;
        } else {
            prev_matched = false;
        }
        text_idx += 1;
    }

    if query_idx == query_chars.len() {
        // stay below every substring hit
        Some((score + consecutive_bonus).min(499))
    } else {
        None
    }
}
