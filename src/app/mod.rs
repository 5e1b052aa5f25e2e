mod state;
mod viewer;
pub mod welcome_notes;

pub use state::{App, Conversation, Effect, LinksPanel, View};
#[cfg(test)]
pub use state::Exchange;
pub use viewer::tag_line;
