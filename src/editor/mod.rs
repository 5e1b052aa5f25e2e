//! External editor handoff and the single-line inputs used by prompts.

pub mod input;

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use tracing::info;

const FALLBACK_EDITOR: &str = "vi";

/// Split an editor setting like `code --wait` into program and arguments.
pub fn split_command(command: &str) -> (String, Vec<String>) {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .map(|p| shellexpand::tilde(p).to_string())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
    (program, parts.map(str::to_string).collect())
}

/// Run the editor on `path` and wait for it to exit. The caller owns the
/// terminal and must hand it over before calling this.
pub fn launch(command: &str, path: &Path) -> io::Result<ExitStatus> {
    let (program, args) = split_command(command);
    info!("launching {} on {}", program, path.display());
    Command::new(&program).args(&args).arg(path).status()
}

/// `launch`, with a non-zero exit reported as an error.
pub fn run(command: &str, path: &Path) -> io::Result<()> {
    let status = launch(command, path)?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("editor exited with {}", status)))
    }
}
