use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use tracing::{debug, info, warn};

use super::note::Note;
use crate::error::{Error, Result};

pub const NOTE_EXTENSION: &str = "md";

/// One markdown file per note in a single flat directory.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, NOTE_EXTENSION))
    }

    /// Every note, newest `updated` first. Files that can't be read are
    /// skipped so one bad entry doesn't hide the rest.
    pub fn load_all(&self) -> Result<Vec<Note>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let mut notes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() || path.extension().map_or(true, |ext| ext != NOTE_EXTENSION) {
                continue;
            }
            match self.load_file(&path) {
                Ok(note) => notes.push(note),
                Err(e) => warn!("skipping {}: {}", path.display(), e),
            }
        }

        notes.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(notes)
    }

    pub fn load(&self, id: &str) -> Result<Note> {
        self.load_file(&self.path_for(id))
    }

    fn load_file(&self, path: &Path) -> Result<Note> {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let raw = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(id.clone()),
            _ => Error::io(path, e),
        })?;

        let modified = fs::metadata(path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Note::from_raw(&id, path.to_path_buf(), raw, modified))
    }

    /// Refresh `updated` and overwrite the note's file. `created` is left alone.
    pub fn save(&self, note: &mut Note) -> Result<()> {
        note.updated = now();
        note.raw = note.build();
        fs::write(&note.path, &note.raw).map_err(|e| Error::io(&note.path, e))?;
        debug!("saved {}", note.id);
        Ok(())
    }

    /// The title is stored on one header line, so it is trimmed and any line
    /// breaks become spaces.
    pub fn create(&self, title: &str, tags: &[String]) -> Result<Note> {
        let title = normalize_title(title);
        let title = title.as_str();
        let base = slugify(title);
        let mut id = base.clone();
        let mut n = 2;
        while self.path_for(&id).exists() {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.create_with_id(&id, title, tags)
    }

    fn create_with_id(&self, id: &str, title: &str, tags: &[String]) -> Result<Note> {
        let now = now();
        let mut note = Note {
            id: id.to_string(),
            title: title.to_string(),
            tags: tags.to_vec(),
            created: now,
            updated: now,
            body: String::new(),
            raw: String::new(),
            path: self.path_for(id),
        };
        self.save(&mut note)?;
        info!("created note {}", note.id);
        Ok(note)
    }

    pub fn create_daily(&self) -> Result<Note> {
        self.create_daily_for(Local::now().date_naive())
    }

    /// Today's note for `date`; returns the existing one untouched if it's
    /// already there.
    pub fn create_daily_for(&self, date: NaiveDate) -> Result<Note> {
        let id = daily_id(date);
        if self.path_for(&id).exists() {
            return self.load(&id);
        }
        let date = date.format("%Y-%m-%d").to_string();
        self.create_with_id(&id, &format!("Daily {}", date), &["daily".to_string()])
    }

    /// Append `- HH:MM text` to the daily note for `at`'s date.
    pub fn append_to_daily(&self, text: &str, at: NaiveDateTime) -> Result<Note> {
        let mut note = self.create_daily_for(at.date())?;
        if !note.body.is_empty() && !note.body.ends_with('\n') {
            note.body.push('\n');
        }
        note.body.push_str(&format!("- {} {}\n", at.format("%H:%M"), text));
        self.save(&mut note)?;
        Ok(note)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.path_for(id);
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::NotFound(id.to_string()),
            _ => Error::io(&path, e),
        })?;
        info!("deleted note {}", id);
        Ok(())
    }
}

// Second precision so timestamps survive the RFC 3339 header unchanged.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

fn normalize_title(title: &str) -> String {
    title.replace(['\r', '\n'], " ").trim().to_string()
}

pub fn daily_id(date: NaiveDate) -> String {
    format!("daily-{}", date.format("%Y-%m-%d"))
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        format!("note-{}", Utc::now().timestamp())
    } else {
        slug
    }
}
