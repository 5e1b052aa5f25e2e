use chrono::{DateTime, SecondsFormat, Utc};

/// Metadata parsed from the `---` delimited header at the top of a note.
///
/// Parsing is lenient: unknown keys are ignored, a value that can't be
/// understood is treated as absent, and a missing or unclosed header means
/// the whole input is body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Frontmatter {
    /// Parse the header from `content` and return it with the remaining body.
    /// Blank lines between the closing delimiter and the body are dropped.
    pub fn parse(content: &str) -> (Self, String) {
        let content = content.replace("\r\n", "\n");
        let mut segments = content.split_inclusive('\n');

        match segments.next() {
            Some(first) if is_delimiter(first) => {}
            _ => return (Self::default(), content),
        }

        let mut offset = content.find('\n').map_or(content.len(), |i| i + 1);
        let mut header_lines = Vec::new();
        let mut closed = false;

        for segment in segments {
            offset += segment.len();
            if is_delimiter(segment) {
                closed = true;
                break;
            }
            header_lines.push(segment.trim_end_matches('\n'));
        }

        if !closed {
            return (Self::default(), content);
        }

        let mut fm = Self::default();
        for line in header_lines {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim() {
                "title" if !value.is_empty() => fm.title = Some(value.to_string()),
                "tags" => fm.tags = parse_tags(value),
                "created" => fm.created = parse_timestamp(value),
                "updated" => fm.updated = parse_timestamp(value),
                _ => {}
            }
        }

        let body = content[offset..].trim_start_matches('\n').to_string();
        (fm, body)
    }

    /// Serialize the header, including the blank line that separates it from
    /// the body.
    pub fn build(title: &str, tags: &[String], created: DateTime<Utc>, updated: DateTime<Utc>) -> String {
        let tags = tags.iter().map(|t| quote_tag(t)).collect::<Vec<_>>().join(", ");
        format!(
            "---\ntitle: {}\ntags: [{}]\ncreated: {}\nupdated: {}\n---\n\n",
            title,
            tags,
            created.to_rfc3339_opts(SecondsFormat::Secs, true),
            updated.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }
}

fn is_delimiter(segment: &str) -> bool {
    segment.trim_end_matches('\n').trim_end() == "---"
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// `[a, "b", 'c']`. Items are split on commas outside quotes; quoted items
/// are decoded as YAML scalars so escapes survive, bare items are kept
/// verbatim (`!important` and `&ref` are tags here, not YAML syntax).
pub fn parse_tags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let inner = raw.strip_prefix('[').unwrap_or(raw);
    let inner = inner.strip_suffix(']').unwrap_or(inner);

    split_items(inner)
        .into_iter()
        .map(|item| unquote(item.trim()))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Split on top-level commas. A quote only opens at the start of an item.
fn split_items(inner: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut item_start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in inner.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == ',' => {
                items.push(&inner[item_start..i]);
                item_start = i + 1;
            }
            None if (c == '"' || c == '\'') && inner[item_start..i].trim().is_empty() => quote = Some(c),
            None => {}
        }
    }
    items.push(&inner[item_start..]);
    items
}

fn unquote(item: &str) -> String {
    let quoted = item.len() >= 2
        && ((item.starts_with('"') && item.ends_with('"')) || (item.starts_with('\'') && item.ends_with('\'')));
    if !quoted {
        return item.to_string();
    }
    serde_yaml::from_str::<String>(item).unwrap_or_else(|_| item[1..item.len() - 1].to_string())
}

fn quote_tag(tag: &str) -> String {
    let needs_quotes = tag.is_empty()
        || tag.trim() != tag
        || tag.starts_with(|c: char| matches!(c, '!' | '&' | '*' | '%' | '@' | '`' | '|' | '>' | '-' | '?'))
        || tag.chars().any(|c| matches!(c, ',' | '[' | ']' | '{' | '}' | '"' | '\'' | ':' | '#'));
    if needs_quotes {
        serde_json::to_string(tag).unwrap_or_else(|_| tag.to_string())
    } else {
        tag.to_string()
    }
}
