//! Gemini `generateContent` client.
//!
//! Two kinds of question: about a single note (bounded note context plus a
//! system preamble) and about the whole vault (every note concatenated,
//! bodies cut short when the vault is large). Both fail fast with
//! [`Error::ConfigurationMissing`] when no key is configured.

mod worker;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::notes::Note;

pub use worker::{AiRequest, AiResponse, AiScope, AiWorker};

const API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const NOTE_CONTEXT_LIMIT: usize = 4000;
pub const VAULT_TRUNCATE_ABOVE: usize = 20;
pub const VAULT_BODY_LIMIT: usize = 500;

const NOTE_SYSTEM_PROMPT: &str = "You are a helpful assistant embedded in grove, a terminal note-taking app.
You help the user think through their notes, ask clarifying questions, and surface unstated assumptions.
Be concise. Push back when reasoning has gaps. Ask one probing question when useful.";

/// Sends a JSON body and returns the response body, whatever the status.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, body: &str) -> Result<String>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("grove/", env!("CARGO_PKG_VERSION")))
            .build();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> Result<String> {
        let response = match self
            .agent
            .post(url)
            .set("Content-Type", "application/json")
            .send_string(body)
        {
            Ok(response) => response,
            // The API explains 4xx/5xx in the body's `error` object.
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(Error::Network(e.to_string())),
        };
        response
            .into_string()
            .map_err(|e| Error::Network(e.to_string()))
    }
}

/// The slice of a note that goes into a vault-wide prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteContext {
    pub title: String,
    pub tags: Vec<String>,
    pub body: String,
}

impl From<&Note> for NoteContext {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            tags: note.tags.clone(),
            body: note.body.clone(),
        }
    }
}

pub struct Gateway {
    key: String,
    model: String,
    transport: Box<dyn Transport>,
}

impl Gateway {
    pub fn new(config: &Config) -> Self {
        Self::with_transport(&config.ai_key, &config.ai_model, Box::new(UreqTransport::new()))
    }

    pub fn with_transport(key: &str, model: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            key: key.trim().to_string(),
            model: model.to_string(),
            transport,
        }
    }

    pub fn available(&self) -> bool {
        !self.key.is_empty()
    }

    pub fn ask_about_note(&self, title: &str, body: &str, question: &str) -> Result<String> {
        if !self.available() {
            return Err(Error::ConfigurationMissing);
        }
        self.generate(note_prompt(title, body, question), Some(NOTE_SYSTEM_PROMPT))
    }

    pub fn ask_vault(&self, notes: &[NoteContext], question: &str) -> Result<String> {
        if !self.available() {
            return Err(Error::ConfigurationMissing);
        }
        self.generate(vault_prompt(notes, question), None)
    }

    fn generate(&self, prompt: String, system: Option<&str>) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: system.map(|text| Content {
                role: None,
                parts: vec![Part { text: text.to_string() }],
            }),
        };
        let body = serde_json::to_string(&request).map_err(|e| Error::Service(e.to_string()))?;

        debug!(model = %self.model, bytes = body.len(), "sending generateContent request");
        let url = format!("{}/{}:generateContent?key={}", API_URL, self.model, self.key);
        let raw = self.transport.post_json(&url, &body)?;

        parse_response(&raw)
    }
}

pub fn note_prompt(title: &str, body: &str, question: &str) -> String {
    let context = format!("Note: {}\n\n{}", title, body);
    let context = match truncate_chars(&context, NOTE_CONTEXT_LIMIT) {
        Some(head) => format!("{}\n... (truncated)", head),
        None => context,
    };
    format!("Context from my note:\n\n{}\n\nQuestion: {}", context, question)
}

pub fn vault_prompt(notes: &[NoteContext], question: &str) -> String {
    let truncate = notes.len() > VAULT_TRUNCATE_ABOVE;

    let mut block = String::new();
    for (i, note) in notes.iter().enumerate() {
        let body = match truncate_chars(&note.body, VAULT_BODY_LIMIT) {
            Some(head) if truncate => format!("{}...", head),
            _ => note.body.clone(),
        };
        let tags = if note.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", note.tags.join(", "))
        };
        block.push_str(&format!("--- Note {}: {}{} ---\n{}\n\n", i + 1, note.title, tags, body));
    }

    format!(
        "You are a personal knowledge assistant. Answer based on the user's notes vault. \
         Be specific and cite which note titles you're drawing from.\n\nNOTES:\n{}\nQUESTION: {}",
        block, question
    )
}

/// The first `max` characters of `s`, or `None` if `s` already fits.
fn truncate_chars(s: &str, max: usize) -> Option<&str> {
    s.char_indices().nth(max).map(|(idx, _)| &s[..idx])
}

fn parse_response(raw: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(raw)
        .map_err(|e| Error::Service(format!("parse error: {}\nraw: {}", e, raw)))?;

    if let Some(error) = response.error {
        return Err(Error::Service(error.message));
    }

    let candidate = response.candidates.into_iter().next().ok_or(Error::EmptyResponse)?;
    Ok(candidate
        .content
        .parts
        .into_iter()
        .map(|p| p.text)
        .collect::<String>())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
