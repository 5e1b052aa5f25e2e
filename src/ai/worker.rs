//! Off-thread AI requests.
//!
//! Each question runs on its own short-lived thread so a slow vault query
//! never holds up a note question. Answers come back over a channel that the
//! event loop drains once per iteration; nothing here touches session state.

use std::io;
use std::panic;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use super::{Gateway, NoteContext};
use crate::error::{Error, Result};

/// Which conversation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiScope {
    Note,
    Vault,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AiRequest {
    Note { title: String, body: String, question: String },
    Vault { notes: Vec<NoteContext>, question: String },
}

impl AiRequest {
    pub fn scope(&self) -> AiScope {
        match self {
            AiRequest::Note { .. } => AiScope::Note,
            AiRequest::Vault { .. } => AiScope::Vault,
        }
    }
}

#[derive(Debug)]
pub struct AiResponse {
    pub scope: AiScope,
    pub result: Result<String>,
}

pub struct AiWorker {
    gateway: Arc<Gateway>,
    result_sender: Sender<AiResponse>,
    result_receiver: Receiver<AiResponse>,
}

impl AiWorker {
    pub fn new(gateway: Gateway) -> Self {
        let (result_sender, result_receiver) = mpsc::channel();
        Self {
            gateway: Arc::new(gateway),
            result_sender,
            result_receiver,
        }
    }

    pub fn dispatch(&self, request: AiRequest) -> io::Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let sender = self.result_sender.clone();
        let scope = request.scope();
        debug!(?scope, "dispatching AI request");

        thread::Builder::new()
            .name("ai-request".into())
            .spawn(move || {
                let result = panic::catch_unwind(panic::AssertUnwindSafe(|| run(&gateway, request)))
                    .unwrap_or_else(|_| Err(Error::Service("request thread panicked".to_string())));
                if let Err(e) = &result {
                    warn!(?scope, "AI request failed: {}", e);
                }
                let _ = sender.send(AiResponse { scope, result });
            })?;
        Ok(())
    }

    #[inline]
    pub fn try_recv(&self) -> Option<AiResponse> {
        match self.result_receiver.try_recv() {
            Ok(response) => Some(response),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn run(gateway: &Gateway, request: AiRequest) -> Result<String> {
    match request {
        AiRequest::Note { title, body, question } => gateway.ask_about_note(&title, &body, &question),
        AiRequest::Vault { notes, question } => gateway.ask_vault(&notes, &question),
    }
}
