use std::io;
use std::path::PathBuf;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use super::viewer;
use crate::ai::{AiRequest, AiResponse, AiScope, NoteContext};
use crate::config::Config;
use crate::editor::input::LineInput;
use crate::error::{Error, Result};
use crate::links;
use crate::notes::{Note, Store};
use crate::search;
use crate::templates;

/// Rows taken by headers, dividers, preview and status around the list or
/// the viewer body.
const CHROME_HEIGHT: u16 = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    List,
    Viewer,
    Search,
    NewNote,
    TemplatePicker { cursor: usize },
    /// `template` indexes `templates::NAMES`
    TemplateTitle { template: usize },
    AiPanel,
    ConfirmDelete { id: String, title: String },
    Help { prev: Box<View> },
    Links(LinksPanel),
    VaultAi,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinksPanel {
    /// Targets of `[[...]]` links in the open note
    pub outgoing: Vec<String>,
    /// `(id, title)` of notes linking to the open note
    pub backlinks: Vec<(String, String)>,
    pub cursor: usize,
}

enum LinkTarget {
    Title(String),
    Id(String),
}

impl LinksPanel {
    pub fn len(&self) -> usize {
        self.outgoing.len() + self.backlinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn target(&self) -> Option<LinkTarget> {
        match self.outgoing.get(self.cursor) {
            Some(title) => Some(LinkTarget::Title(title.clone())),
            None => self
                .backlinks
                .get(self.cursor - self.outgoing.len())
                .map(|(id, _)| LinkTarget::Id(id.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub question: String,
    /// `None` until the answer arrives
    pub answer: Option<String>,
}

/// Question/answer history for one AI scope.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    pub entries: Vec<Exchange>,
    pub loading: bool,
    pub error: Option<String>,
    pub input: LineInput,
}

impl Conversation {
    /// Take the typed question and mark the scope busy. `None` if there is
    /// nothing to ask or an answer is still pending.
    fn begin(&mut self) -> Option<String> {
        let question = self.input.value().trim().to_string();
        if question.is_empty() || self.loading {
            return None;
        }
        self.loading = true;
        self.error = None;
        self.entries.push(Exchange { question: question.clone(), answer: None });
        self.input.clear();
        Some(question)
    }

    fn finish(&mut self, result: Result<String>) {
        self.loading = false;
        match result {
            Ok(answer) => {
                if let Some(last) = self.entries.last_mut() {
                    last.answer = Some(answer);
                }
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

/// What the event loop has to do after a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    OpenEditor { id: String, path: PathBuf },
    Ask(AiRequest),
}

pub struct App {
    store: Store,
    ai_available: bool,
    pub view: View,
    pub notes: Vec<Note>,
    /// Indices into `notes` for the list, in display order
    pub filtered: Vec<usize>,
    pub cursor: usize,
    pub list_offset: usize,
    pub current: Option<Note>,
    pub viewer_lines: Vec<String>,
    pub scroll: usize,
    pub search_input: LineInput,
    pub title_input: LineInput,
    pub note_ai: Conversation,
    pub vault_ai: Conversation,
    pub status: Option<Status>,
    last_key: Option<char>,
    width: u16,
    height: u16,
}

impl App {
    pub fn new(config: &Config, store: Store) -> Self {
        let mut app = Self {
            store,
            ai_available: config.has_ai_key(),
            view: View::List,
            notes: Vec::new(),
            filtered: Vec::new(),
            cursor: 0,
            list_offset: 0,
            current: None,
            viewer_lines: Vec::new(),
            scroll: 0,
            search_input: LineInput::new(),
            title_input: LineInput::new(),
            note_ai: Conversation::default(),
            vault_ai: Conversation::default(),
            status: None,
            last_key: None,
            width: 80,
            height: 24,
        };
        app.reload();
        app
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        if let Some(note) = &self.current {
            self.viewer_lines = viewer::layout(note, self.text_width());
        }
        self.scroll = self.scroll.min(self.max_scroll());
        self.ensure_visible();
    }

    /// Visible rows in the list and in the viewer.
    pub fn page_height(&self) -> usize {
        self.height.saturating_sub(CHROME_HEIGHT).max(1) as usize
    }

    fn text_width(&self) -> usize {
        self.width.saturating_sub(4) as usize
    }

    pub fn max_scroll(&self) -> usize {
        self.viewer_lines.len().saturating_sub(self.page_height())
    }

    pub fn scroll_percent(&self) -> usize {
        match self.max_scroll() {
            0 => 100,
            max => self.scroll * 100 / max,
        }
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.filtered.get(self.cursor).and_then(|&i| self.notes.get(i))
    }

    /// 1-based position of the open note in the list, with the list length.
    pub fn current_position(&self) -> Option<(usize, usize)> {
        let current = self.current.as_ref()?;
        self.filtered
            .iter()
            .position(|&i| self.notes[i].id == current.id)
            .map(|pos| (pos + 1, self.filtered.len()))
    }

    pub fn ai_available(&self) -> bool {
        self.ai_available
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(Status { text, is_error: true });
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(Status { text, is_error: false });
    }

    /// Re-read every note and reset the list filter.
    pub fn reload(&mut self) {
        match self.store.load_all() {
            Ok(notes) => self.notes = notes,
            Err(e) => {
                warn!("failed to load notes: {}", e);
                self.set_error(format!("error loading notes: {}", e));
            }
        }
        self.filtered = (0..self.notes.len()).collect();
        self.cursor = self.cursor.min(self.filtered.len().saturating_sub(1));
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let height = self.page_height();
        if self.cursor < self.list_offset {
            self.list_offset = self.cursor;
        }
        if self.cursor >= self.list_offset + height {
            self.list_offset = self.cursor + 1 - height;
        }
    }

    fn select_note(&mut self, id: &str) {
        if let Some(pos) = self.filtered.iter().position(|&i| self.notes[i].id == id) {
            self.cursor = pos;
            self.ensure_visible();
        }
    }

    /// Load `id` fresh from disk and show it.
    pub fn open_note(&mut self, id: &str) {
        match self.store.load(id) {
            Ok(note) => {
                self.viewer_lines = viewer::layout(&note, self.text_width());
                self.current = Some(note);
                self.scroll = 0;
                self.note_ai = Conversation::default();
                self.view = View::Viewer;
            }
            Err(e) => self.set_error(format!("error: {}", e)),
        }
    }

    /// The editor returned. Everything is reloaded since the file (or any
    /// other) may have changed underneath us.
    pub fn editor_closed(&mut self, id: &str, outcome: io::Result<()>) {
        self.last_key = None;
        if let Err(e) = outcome {
            warn!("editor failed: {}", e);
            self.set_error(format!("editor: {}", e));
        }

        self.reload();
        if self.notes.iter().any(|n| n.id == id) {
            self.select_note(id);
            self.open_note(id);
        } else {
            self.current = None;
            self.view = View::List;
        }
    }

    pub fn handle_ai_response(&mut self, response: AiResponse) {
        debug!(scope = ?response.scope, ok = response.result.is_ok(), "AI response");
        let conversation = match response.scope {
            AiScope::Note => &mut self.note_ai,
            AiScope::Vault => &mut self.vault_ai,
        };
        conversation.finish(response.result);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Effect {
        self.status = None;
        let prev = self.last_key.take();

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Effect::Quit;
        }

        match self.view {
            View::List => self.handle_list(key, prev),
            View::Viewer => self.handle_viewer(key, prev),
            View::Search => self.handle_search(key),
            View::NewNote => self.handle_new_note(key),
            View::TemplatePicker { .. } => self.handle_template_picker(key),
            View::TemplateTitle { .. } => self.handle_template_title(key),
            View::AiPanel => self.handle_ai_panel(key),
            View::ConfirmDelete { .. } => self.handle_confirm_delete(key),
            View::Help { .. } => self.handle_help(key),
            View::Links(_) => self.handle_links(key),
            View::VaultAi => self.handle_vault_ai(key),
        }
    }

    fn handle_list(&mut self, key: KeyEvent, prev: Option<char>) -> Effect {
        match key.code {
            KeyCode::Char('q') => return Effect::Quit,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.cursor + 1 < self.filtered.len() {
                    self.cursor += 1;
                    self.ensure_visible();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.ensure_visible();
                }
            }
            KeyCode::Char('g') => {
                if prev == Some('g') {
                    self.cursor = 0;
                    self.list_offset = 0;
                } else {
                    self.last_key = Some('g');
                }
            }
            KeyCode::Char('G') => {
                if !self.filtered.is_empty() {
                    self.cursor = self.filtered.len() - 1;
                    self.ensure_visible();
                }
            }
            KeyCode::Enter | KeyCode::Char('l') => {
                if let Some(id) = self.selected_note().map(|n| n.id.clone()) {
                    self.open_note(&id);
                }
            }
            KeyCode::Char('n') => {
                self.title_input.clear();
                self.view = View::NewNote;
            }
            KeyCode::Char('N') => self.view = View::TemplatePicker { cursor: 0 },
            KeyCode::Char('t') => match self.store.create_daily() {
                Ok(note) => return Effect::OpenEditor { id: note.id, path: note.path },
                Err(e) => self.set_error(format!("error: {}", e)),
            },
            KeyCode::Char('/') => {
                self.search_input.clear();
                self.filtered = (0..self.notes.len()).collect();
                self.cursor = 0;
                self.list_offset = 0;
                self.view = View::Search;
            }
            KeyCode::Char('d') => {
                if let Some(note) = self.selected_note() {
                    self.view = View::ConfirmDelete {
                        id: note.id.clone(),
                        title: note.title.clone(),
                    };
                }
            }
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('@') => {
                if !self.ai_available {
                    self.set_error(Error::ConfigurationMissing.to_string());
                } else {
                    self.vault_ai.input.clear();
                    self.vault_ai.error = None;
                    self.view = View::VaultAi;
                }
            }
            KeyCode::Char('?') => self.view = View::Help { prev: Box::new(View::List) },
            _ => {}
        }
        Effect::None
    }

    fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll as isize + delta;
        self.scroll = target.clamp(0, self.max_scroll() as isize) as usize;
    }

    fn handle_viewer(&mut self, key: KeyEvent, prev: Option<char>) -> Effect {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let page = self.page_height() as isize;
        let half = (page / 2).max(1);

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('h') | KeyCode::Esc => self.view = View::List,
            KeyCode::Char('e') => {
                if let Some(note) = &self.current {
                    return Effect::OpenEditor {
                        id: note.id.clone(),
                        path: note.path.clone(),
                    };
                }
            }
            KeyCode::Char('A') | KeyCode::Char('a') => {
                if !self.ai_available {
                    self.set_error(Error::ConfigurationMissing.to_string());
                } else {
                    self.note_ai.input.clear();
                    self.note_ai.error = None;
                    self.view = View::AiPanel;
                }
            }
            KeyCode::Char('L') => self.open_links_panel(),
            KeyCode::Char('g') => {
                if prev == Some('g') {
                    self.scroll = 0;
                } else {
                    self.last_key = Some('g');
                }
            }
            KeyCode::Char('G') => self.scroll = self.max_scroll(),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::Char('d') => self.scroll_by(half),
            KeyCode::Char('u') => self.scroll_by(-half),
            KeyCode::Char('f') if ctrl => self.scroll_by(page),
            KeyCode::Char('b') if ctrl => self.scroll_by(-page),
            KeyCode::PageDown => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::Char('}') => {
                self.scroll = viewer::jump_paragraph(&self.viewer_lines, self.scroll, true).min(self.max_scroll());
            }
            KeyCode::Char('{') => {
                self.scroll = viewer::jump_paragraph(&self.viewer_lines, self.scroll, false).min(self.max_scroll());
            }
            KeyCode::Char('?') => self.view = View::Help { prev: Box::new(View::Viewer) },
            _ => {}
        }
        Effect::None
    }

    fn handle_search(&mut self, key: KeyEvent) -> Effect {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.filtered = (0..self.notes.len()).collect();
                self.cursor = 0;
                self.list_offset = 0;
                self.view = View::List;
            }
            KeyCode::Enter => {
                if let Some(id) = self.selected_note().map(|n| n.id.clone()) {
                    self.open_note(&id);
                }
            }
            KeyCode::Down => self.search_move(1),
            KeyCode::Char('n') if ctrl => self.search_move(1),
            KeyCode::Up => self.search_move(-1),
            KeyCode::Char('p') if ctrl => self.search_move(-1),
            _ => {
                if self.search_input.handle_key(key) {
                    self.filtered = search::search(self.search_input.value(), &self.notes);
                    self.cursor = 0;
                    self.list_offset = 0;
                }
            }
        }
        Effect::None
    }

    fn search_move(&mut self, delta: isize) {
        let last = self.filtered.len().saturating_sub(1) as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
        self.ensure_visible();
    }

    fn create_note(&mut self, title: &str, template: Option<&str>) -> Effect {
        let mut note = match self.store.create(title, &[]) {
            Ok(note) => note,
            Err(e) => {
                self.set_error(format!("error: {}", e));
                return Effect::None;
            }
        };

        if let Some(template) = template {
            let date = Local::now().format("%Y-%m-%d").to_string();
            note.body = templates::render(template, &note.title, &date);
            if let Err(e) = self.store.save(&mut note) {
                self.set_error(format!("save error: {}", e));
                return Effect::None;
            }
        }

        Effect::OpenEditor { id: note.id, path: note.path }
    }

    fn handle_new_note(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Esc => self.view = View::List,
            KeyCode::Enter => {
                let title = self.title_input.value().trim().to_string();
                self.view = View::List;
                if !title.is_empty() {
                    return self.create_note(&title, None);
                }
            }
            _ => {
                self.title_input.handle_key(key);
            }
        }
        Effect::None
    }

    fn handle_template_picker(&mut self, key: KeyEvent) -> Effect {
        let View::TemplatePicker { cursor } = &mut self.view else {
            return Effect::None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.view = View::List,
            KeyCode::Char('j') | KeyCode::Down => {
                if *cursor + 1 < templates::NAMES.len() {
                    *cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => *cursor = cursor.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('l') => {
                let template = *cursor;
                self.title_input.clear();
                self.view = View::TemplateTitle { template };
            }
            _ => {}
        }
        Effect::None
    }

    fn handle_template_title(&mut self, key: KeyEvent) -> Effect {
        let View::TemplateTitle { template } = self.view else {
            return Effect::None;
        };
        match key.code {
            KeyCode::Esc => self.view = View::TemplatePicker { cursor: template },
            KeyCode::Enter => {
                let title = self.title_input.value().trim().to_string();
                self.view = View::List;
                if !title.is_empty() {
                    let name = templates::NAMES.get(template).copied().unwrap_or("default");
                    return self.create_note(&title, Some(name));
                }
            }
            _ => {
                self.title_input.handle_key(key);
            }
        }
        Effect::None
    }

    fn handle_ai_panel(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Esc => {
                if !self.note_ai.loading {
                    self.view = View::Viewer;
                }
            }
            KeyCode::Enter => {
                let Some(note) = &self.current else {
                    return Effect::None;
                };
                let (title, body) = (note.title.clone(), note.body.clone());
                if let Some(question) = self.note_ai.begin() {
                    return Effect::Ask(AiRequest::Note { title, body, question });
                }
            }
            _ => {
                if !self.note_ai.loading {
                    self.note_ai.input.handle_key(key);
                }
            }
        }
        Effect::None
    }

    fn handle_vault_ai(&mut self, key: KeyEvent) -> Effect {
        match key.code {
            KeyCode::Esc => {
                if !self.vault_ai.loading {
                    self.view = View::List;
                }
            }
            KeyCode::Enter => {
                if let Some(question) = self.vault_ai.begin() {
                    let notes = self.notes.iter().map(NoteContext::from).collect();
                    return Effect::Ask(AiRequest::Vault { notes, question });
                }
            }
            _ => {
                if !self.vault_ai.loading {
                    self.vault_ai.input.handle_key(key);
                }
            }
        }
        Effect::None
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent) -> Effect {
        let View::ConfirmDelete { id, title } = std::mem::replace(&mut self.view, View::List) else {
            return Effect::None;
        };
        if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter) {
            match self.store.delete(&id) {
                Ok(()) => self.set_info(format!("deleted {}", title)),
                Err(e) => self.set_error(format!("delete failed: {}", e)),
            }
            self.reload();
        }
        Effect::None
    }

    fn handle_help(&mut self, key: KeyEvent) -> Effect {
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?')) {
            if let View::Help { prev } = std::mem::replace(&mut self.view, View::List) {
                self.view = *prev;
            }
        }
        Effect::None
    }

    fn open_links_panel(&mut self) {
        let Some(note) = &self.current else {
            return;
        };
        let panel = LinksPanel {
            outgoing: links::extract_links(&note.body),
            backlinks: links::backlinks(&note.title, &self.notes)
                .into_iter()
                .map(|n| (n.id.clone(), n.title.clone()))
                .collect(),
            cursor: 0,
        };
        self.view = View::Links(panel);
    }

    fn handle_links(&mut self, key: KeyEvent) -> Effect {
        let View::Links(panel) = &mut self.view else {
            return Effect::None;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('h') => self.view = View::Viewer,
            KeyCode::Char('j') | KeyCode::Down => {
                if panel.cursor + 1 < panel.len() {
                    panel.cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => panel.cursor = panel.cursor.saturating_sub(1),
            KeyCode::Enter | KeyCode::Char('l') => match panel.target() {
                Some(LinkTarget::Title(title)) => {
                    match links::resolve(&title, &self.notes).map(|n| n.id.clone()) {
                        Some(id) => self.open_note(&id),
                        None => {
                            self.set_error(format!("note not found: {}", title));
                            self.view = View::Viewer;
                        }
                    }
                }
                Some(LinkTarget::Id(id)) => self.open_note(&id),
                None => {}
            },
            _ => {}
        }
        Effect::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn press(app: &mut App, c: char) -> Effect {
        app.handle_key(key(KeyCode::Char(c)))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, c);
        }
    }

    /// Note `n` is updated on day `n`, so a higher `n` sorts earlier.
    fn write_note(dir: &Path, id: &str, title: &str, body: &str, day: u32) {
        let ts = format!("2024-01-{:02}T00:00:00Z", day);
        let content = format!("---\ntitle: {title}\ntags: []\ncreated: {ts}\nupdated: {ts}\n---\n\n{body}");
        fs::write(dir.join(format!("{id}.md")), content).unwrap();
    }

    /// An app over `count` notes, listed as `note-0` .. `note-{count-1}`.
    fn app_with_notes(count: usize, ai: bool) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        for i in 0..count {
            let day = (count - i) as u32;
            write_note(dir.path(), &format!("note-{i}"), &format!("Note {i}"), "body", day);
        }
        let store = Store::open(dir.path()).unwrap();
        let mut app = App::new(&config(ai), store);
        app.set_size(80, 16);
        (dir, app)
    }

    fn config(ai: bool) -> Config {
        Config {
            ai_key: if ai { "test-key".to_string() } else { String::new() },
            ..Config::default()
        }
    }

    fn selected_id(app: &App) -> String {
        app.selected_note().unwrap().id.clone()
    }

    #[test]
    fn test_initial_load_orders_newest_first() {
        let (_dir, app) = app_with_notes(3, false);
        assert_eq!(app.view, View::List);
        assert_eq!(app.filtered.len(), 3);
        assert_eq!(selected_id(&app), "note-0");
    }

    #[test]
    fn test_gg_jumps_to_top() {
        let (_dir, mut app) = app_with_notes(5, false);
        press(&mut app, 'G');
        assert_eq!(app.cursor, 4);
        press(&mut app, 'g');
        assert_eq!(app.cursor, 4);
        press(&mut app, 'g');
        assert_eq!(app.cursor, 0);
        assert_eq!(app.list_offset, 0);
    }

    #[test]
    fn test_lone_g_is_forgotten() {
        let (_dir, mut app) = app_with_notes(5, false);
        press(&mut app, 'G');
        press(&mut app, 'g');
        press(&mut app, 'k');
        assert_eq!(app.cursor, 3);

        press(&mut app, 'g');
        assert_eq!(app.cursor, 3);
        press(&mut app, 'g');
        assert_eq!(app.cursor, 0);

        // a third g starts a new sequence
        press(&mut app, 'j');
        press(&mut app, 'g');
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_list_window_follows_cursor() {
        let (_dir, mut app) = app_with_notes(6, false);
        app.set_size(80, 9);
        assert_eq!(app.page_height(), 3);

        for _ in 0..4 {
            press(&mut app, 'j');
        }
        assert_eq!(app.cursor, 4);
        assert_eq!(app.list_offset, 2);

        for _ in 0..3 {
            press(&mut app, 'k');
        }
        assert_eq!(app.cursor, 1);
        assert_eq!(app.list_offset, 1);

        for _ in 0..10 {
            press(&mut app, 'j');
        }
        assert_eq!(app.cursor, 5);
        assert_eq!(app.list_offset, 3);
    }

    #[test]
    fn test_delete_confirmed() {
        let (dir, mut app) = app_with_notes(3, false);
        press(&mut app, 'j');
        press(&mut app, 'd');
        assert_eq!(
            app.view,
            View::ConfirmDelete { id: "note-1".into(), title: "Note 1".into() }
        );

        press(&mut app, 'y');
        assert_eq!(app.view, View::List);
        assert_eq!(app.notes.len(), 2);
        assert!(!dir.path().join("note-1.md").exists());
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert_eq!(status.text, "deleted Note 1");
    }

    #[test]
    fn test_delete_confirmed_with_enter() {
        let (_dir, mut app) = app_with_notes(2, false);
        press(&mut app, 'd');
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.notes.len(), 1);
    }

    #[test]
    fn test_delete_cancelled_by_any_other_key() {
        for cancel in ['d', 'n', 'x'] {
            let (dir, mut app) = app_with_notes(2, false);
            press(&mut app, 'd');
            press(&mut app, cancel);
            assert_eq!(app.view, View::List);
            assert_eq!(app.notes.len(), 2);
            assert!(dir.path().join("note-0.md").exists());
        }

        let (_dir, mut app) = app_with_notes(2, false);
        press(&mut app, 'd');
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert_eq!(app.notes.len(), 2);
    }

    #[test]
    fn test_delete_on_empty_list_does_nothing() {
        let (_dir, mut app) = app_with_notes(0, false);
        press(&mut app, 'd');
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn test_open_note_reads_fresh_copy() {
        let (dir, mut app) = app_with_notes(1, false);
        write_note(dir.path(), "note-0", "Note 0", "edited outside", 1);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::Viewer);
        assert_eq!(app.current.as_ref().unwrap().body, "edited outside");
        assert_eq!(app.current_position(), Some((1, 1)));
    }

    #[test]
    fn test_viewer_back_keys() {
        for back in [key(KeyCode::Char('q')), key(KeyCode::Char('h')), key(KeyCode::Esc)] {
            let (_dir, mut app) = app_with_notes(1, false);
            press(&mut app, 'l');
            assert_eq!(app.view, View::Viewer);
            app.handle_key(back);
            assert_eq!(app.view, View::List);
        }
    }

    #[test]
    fn test_viewer_scrolling() {
        let dir = TempDir::new().unwrap();
        let body = (1..=50).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        write_note(dir.path(), "long", "Long", &body, 1);
        let mut app = App::new(&config(false), Store::open(dir.path()).unwrap());
        app.set_size(80, 16);
        press(&mut app, 'l');

        assert_eq!(app.viewer_lines.len(), 50);
        assert_eq!(app.max_scroll(), 40);

        press(&mut app, 'j');
        assert_eq!(app.scroll, 1);
        press(&mut app, 'k');
        press(&mut app, 'k');
        assert_eq!(app.scroll, 0);

        press(&mut app, 'G');
        assert_eq!(app.scroll, 40);
        assert_eq!(app.scroll_percent(), 100);
        press(&mut app, 'g');
        press(&mut app, 'g');
        assert_eq!(app.scroll, 0);

        press(&mut app, 'd');
        assert_eq!(app.scroll, 5);
        app.handle_key(ctrl('d'));
        assert_eq!(app.scroll, 10);
        press(&mut app, 'u');
        assert_eq!(app.scroll, 5);
        app.handle_key(ctrl('f'));
        assert_eq!(app.scroll, 15);
        app.handle_key(ctrl('b'));
        assert_eq!(app.scroll, 5);
        app.handle_key(key(KeyCode::PageDown));
        assert_eq!(app.scroll, 15);
        app.handle_key(ctrl('u'));
        assert_eq!(app.scroll, 10);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::PageDown));
        }
        assert_eq!(app.scroll, 40);
    }

    #[test]
    fn test_viewer_paragraph_jumps() {
        let dir = TempDir::new().unwrap();
        write_note(dir.path(), "p", "P", "a\nb\n\nc\nd\n\ne", 1);
        let mut app = App::new(&config(false), Store::open(dir.path()).unwrap());
        app.set_size(80, 9);
        press(&mut app, 'l');
        assert_eq!(app.max_scroll(), 4);

        press(&mut app, '}');
        assert_eq!(app.scroll, 3);
        press(&mut app, '}');
        assert_eq!(app.scroll, 4);
        press(&mut app, '{');
        assert_eq!(app.scroll, 3);
        press(&mut app, '{');
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_search_filters_and_escape_restores() {
        let dir = TempDir::new().unwrap();
        write_note(dir.path(), "groceries", "Groceries", "milk and eggs", 3);
        write_note(dir.path(), "standup", "Standup", "talked about the deploy", 2);
        write_note(dir.path(), "deploy", "Deploy checklist", "steps", 1);
        let mut app = App::new(&config(false), Store::open(dir.path()).unwrap());

        press(&mut app, '/');
        assert_eq!(app.view, View::Search);
        type_text(&mut app, "deploy");
        assert_eq!(app.filtered.len(), 2);
        assert_eq!(selected_id(&app), "deploy");

        app.handle_key(ctrl('n'));
        assert_eq!(selected_id(&app), "standup");
        app.handle_key(key(KeyCode::Down));
        assert_eq!(selected_id(&app), "standup");
        app.handle_key(ctrl('p'));
        assert_eq!(selected_id(&app), "deploy");

        app.handle_key(key(KeyCode::Backspace));
        assert_eq!(app.search_input.value(), "deplo");

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert_eq!(app.filtered.len(), 3);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_search_enter_opens_match() {
        let (_dir, mut app) = app_with_notes(3, false);
        press(&mut app, '/');
        type_text(&mut app, "Note 2");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::Viewer);
        assert_eq!(app.current.as_ref().unwrap().id, "note-2");
    }

    #[test]
    fn test_search_typing_j_and_k_filters() {
        let (_dir, mut app) = app_with_notes(2, false);
        press(&mut app, '/');
        press(&mut app, 'j');
        assert_eq!(app.view, View::Search);
        assert_eq!(app.search_input.value(), "j");
    }

    #[test]
    fn test_new_note_opens_editor_then_viewer() {
        let (dir, mut app) = app_with_notes(1, false);
        press(&mut app, 'n');
        assert_eq!(app.view, View::NewNote);
        type_text(&mut app, "Fresh Idea");

        let effect = app.handle_key(key(KeyCode::Enter));
        let Effect::OpenEditor { id, path } = effect else {
            panic!("expected editor, got {:?}", effect);
        };
        assert_eq!(id, "fresh-idea");
        assert_eq!(path, dir.path().join("fresh-idea.md"));

        app.editor_closed(&id, Ok(()));
        assert_eq!(app.view, View::Viewer);
        assert_eq!(app.current.as_ref().unwrap().title, "Fresh Idea");
        assert_eq!(app.notes.len(), 2);
        assert_eq!(selected_id(&app), "fresh-idea");
    }

    #[test]
    fn test_new_note_blank_title_returns_to_list() {
        let (dir, mut app) = app_with_notes(0, false);
        press(&mut app, 'n');
        type_text(&mut app, "   ");
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Effect::None);
        assert_eq!(app.view, View::List);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);

        press(&mut app, 'n');
        type_text(&mut app, "draft");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_editor_closed_falls_back_to_list() {
        let (dir, mut app) = app_with_notes(2, false);
        press(&mut app, 'l');
        let Effect::OpenEditor { id, .. } = press(&mut app, 'e') else {
            panic!("expected editor");
        };
        fs::remove_file(dir.path().join(format!("{id}.md"))).unwrap();

        app.editor_closed(&id, Ok(()));
        assert_eq!(app.view, View::List);
        assert!(app.current.is_none());
        assert_eq!(app.notes.len(), 1);
    }

    #[test]
    fn test_editor_failure_is_reported() {
        let (_dir, mut app) = app_with_notes(1, false);
        press(&mut app, 'l');
        app.editor_closed("note-0", Err(io::Error::new(io::ErrorKind::NotFound, "no such editor")));

        assert_eq!(app.view, View::Viewer);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.starts_with("editor:"));
    }

    #[test]
    fn test_editor_closed_clears_pending_g() {
        let (_dir, mut app) = app_with_notes(3, false);
        press(&mut app, 'G');
        press(&mut app, 'g');
        app.editor_closed("missing", Ok(()));
        press(&mut app, 'g');
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn test_daily_note_key() {
        let (_dir, mut app) = app_with_notes(0, false);
        let Effect::OpenEditor { id, .. } = press(&mut app, 't') else {
            panic!("expected editor");
        };
        assert!(id.starts_with("daily-"));
        let Effect::OpenEditor { id: again, .. } = press(&mut app, 't') else {
            panic!("expected editor");
        };
        assert_eq!(id, again);
    }

    #[test]
    fn test_template_flow() {
        let (_dir, mut app) = app_with_notes(0, false);
        press(&mut app, 'N');
        assert_eq!(app.view, View::TemplatePicker { cursor: 0 });
        press(&mut app, 'j');
        press(&mut app, 'l');
        assert_eq!(app.view, View::TemplateTitle { template: 1 });

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::TemplatePicker { cursor: 1 });
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Sprint Sync");

        let Effect::OpenEditor { path, .. } = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected editor");
        };
        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("## Sprint Sync"));
        assert!(raw.contains("## Agenda"));
    }

    #[test]
    fn test_template_picker_bounds_and_cancel() {
        let (_dir, mut app) = app_with_notes(0, false);
        press(&mut app, 'N');
        press(&mut app, 'k');
        assert_eq!(app.view, View::TemplatePicker { cursor: 0 });
        for _ in 0..10 {
            press(&mut app, 'j');
        }
        assert_eq!(app.view, View::TemplatePicker { cursor: templates::NAMES.len() - 1 });
        press(&mut app, 'q');
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn test_ai_without_credential_stays_put() {
        let (_dir, mut app) = app_with_notes(1, false);
        press(&mut app, '@');
        assert_eq!(app.view, View::List);
        assert!(app.status.as_ref().unwrap().is_error);

        press(&mut app, 'l');
        press(&mut app, 'A');
        assert_eq!(app.view, View::Viewer);
        assert!(app.status.as_ref().unwrap().text.contains("API key"));
    }

    #[test]
    fn test_note_ai_loading_guard_and_completion() {
        let (_dir, mut app) = app_with_notes(1, true);
        press(&mut app, 'l');
        press(&mut app, 'A');
        assert_eq!(app.view, View::AiPanel);

        // empty question is not sent
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Effect::None);

        type_text(&mut app, "why?");
        let effect = app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            effect,
            Effect::Ask(AiRequest::Note {
                title: "Note 0".into(),
                body: "body".into(),
                question: "why?".into(),
            })
        );
        assert!(app.note_ai.loading);
        assert_eq!(app.note_ai.entries.len(), 1);

        // typing and sending are ignored while loading
        type_text(&mut app, "again");
        assert_eq!(app.note_ai.input.value(), "");
        assert_eq!(app.handle_key(key(KeyCode::Enter)), Effect::None);
        assert_eq!(app.note_ai.entries.len(), 1);

        // escape is ignored while loading
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::AiPanel);

        app.handle_ai_response(AiResponse { scope: AiScope::Note, result: Ok("because".into()) });
        assert!(!app.note_ai.loading);
        assert_eq!(app.note_ai.entries[0].answer.as_deref(), Some("because"));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::Viewer);
    }

    #[test]
    fn test_ai_error_is_recorded() {
        let (_dir, mut app) = app_with_notes(1, true);
        press(&mut app, '@');
        assert_eq!(app.view, View::VaultAi);
        type_text(&mut app, "summary?");
        let Effect::Ask(request) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected ask");
        };
        assert_eq!(request.scope(), AiScope::Vault);

        app.handle_ai_response(AiResponse {
            scope: AiScope::Vault,
            result: Err(Error::Network("timed out".into())),
        });
        assert!(!app.vault_ai.loading);
        assert_eq!(app.vault_ai.entries[0].answer, None);
        assert_eq!(app.vault_ai.error.as_deref(), Some("network error: timed out"));

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::List);
    }

    #[test]
    fn test_vault_request_carries_every_note() {
        let (_dir, mut app) = app_with_notes(3, true);
        press(&mut app, '@');
        type_text(&mut app, "q");
        let Effect::Ask(AiRequest::Vault { notes, question }) = app.handle_key(key(KeyCode::Enter)) else {
            panic!("expected vault ask");
        };
        assert_eq!(question, "q");
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn test_scopes_are_independent() {
        let (_dir, mut app) = app_with_notes(1, true);
        press(&mut app, '@');
        type_text(&mut app, "vault question");
        app.handle_key(key(KeyCode::Enter));
        assert!(app.vault_ai.loading);

        app.handle_ai_response(AiResponse { scope: AiScope::Note, result: Ok("stray".into()) });
        assert!(app.vault_ai.loading);
        assert_eq!(app.vault_ai.entries[0].answer, None);
    }

    #[test]
    fn test_links_panel() {
        let dir = TempDir::new().unwrap();
        write_note(dir.path(), "a", "A", "see [[B]] and [[Missing]]", 3);
        write_note(dir.path(), "b", "B", "plain", 2);
        write_note(dir.path(), "c", "C", "back to [[a]]", 1);
        let mut app = App::new(&config(false), Store::open(dir.path()).unwrap());

        press(&mut app, 'l');
        press(&mut app, 'L');
        let View::Links(panel) = &app.view else {
            panic!("expected links panel");
        };
        assert_eq!(panel.outgoing, vec!["B", "Missing"]);
        assert_eq!(panel.backlinks, vec![("c".to_string(), "C".to_string())]);

        press(&mut app, 'j');
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.view, View::Viewer);
        assert_eq!(app.status.as_ref().unwrap().text, "note not found: Missing");
        assert_eq!(app.current.as_ref().unwrap().id, "a");

        press(&mut app, 'L');
        press(&mut app, 'l');
        assert_eq!(app.current.as_ref().unwrap().id, "b");

        press(&mut app, 'h');
        press(&mut app, 'k');
        press(&mut app, 'k');
        press(&mut app, 'l');
        press(&mut app, 'L');
        for _ in 0..5 {
            press(&mut app, 'j');
        }
        press(&mut app, 'l');
        assert_eq!(app.current.as_ref().unwrap().id, "c");

        press(&mut app, 'L');
        press(&mut app, 'q');
        assert_eq!(app.view, View::Viewer);
    }

    #[test]
    fn test_help_returns_to_previous_view() {
        let (_dir, mut app) = app_with_notes(1, false);
        press(&mut app, '?');
        assert_eq!(app.view, View::Help { prev: Box::new(View::List) });
        press(&mut app, 'j');
        assert!(matches!(app.view, View::Help { .. }));
        press(&mut app, '?');
        assert_eq!(app.view, View::List);

        press(&mut app, 'l');
        press(&mut app, '?');
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.view, View::Viewer);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (_dir, mut app) = app_with_notes(1, false);
        press(&mut app, '/');
        assert_eq!(app.handle_key(ctrl('c')), Effect::Quit);
        assert_eq!(press(&mut app, 'q'), Effect::None);
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(press(&mut app, 'q'), Effect::Quit);
    }

    #[test]
    fn test_status_cleared_by_next_key() {
        let (_dir, mut app) = app_with_notes(1, false);
        press(&mut app, '@');
        assert!(app.status.is_some());
        press(&mut app, 'j');
        assert!(app.status.is_none());
    }

    #[test]
    fn test_reload_picks_up_external_files() {
        let (dir, mut app) = app_with_notes(1, false);
        write_note(dir.path(), "outside", "Outside", "", 9);
        press(&mut app, 'r');
        assert_eq!(app.notes.len(), 2);
        assert_eq!(app.notes[0].id, "outside");
    }
}
