use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::frontmatter::Frontmatter;

#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// File stem; never changes after creation even if the title does
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Content after the header
    pub body: String,
    /// Full file content as last read or written
    pub raw: String,
    pub path: PathBuf,
}

impl Note {
    /// Build a note from stored text. Missing metadata falls back to the id
    /// (title) and to `modified` (timestamps).
    pub fn from_raw(id: &str, path: PathBuf, raw: String, modified: DateTime<Utc>) -> Self {
        let (fm, body) = Frontmatter::parse(&raw);

        Self {
            id: id.to_string(),
            title: fm.title.unwrap_or_else(|| id.to_string()),
            tags: fm.tags,
            created: fm.created.unwrap_or(modified),
            updated: fm.updated.unwrap_or(modified),
            body,
            raw,
            path,
        }
    }

    pub fn build(&self) -> String {
        Frontmatter::build(&self.title, &self.tags, self.created, self.updated) + &self.body
    }

    /// `title tags body`, the text search and AI prompts look at
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.title, self.tags.join(" "), self.body)
    }
}
