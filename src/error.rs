use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("note not found: {0}")]
    NotFound(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no Gemini API key configured (check ~/.config/pairy/config.json or set GEMINI_API_KEY)")]
    ConfigurationMissing,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Service(String),

    #[error("no response from API")]
    EmptyResponse,

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }
}
