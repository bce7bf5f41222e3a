//! Two-step delete confirmation, held as explicit per-session state.
//!
//! Destructive commands stage the target first and only act once the same
//! session confirms it. The state lives in the caller's stack frame, never in
//! process-wide globals, and transitions only through `request`, `confirm`,
//! and `cancel`.

use crate::core::error;
use colored::Colorize;
use std::io::{self, BufRead, Write};

#[derive(Debug, Default)]
pub struct DeleteConfirmation {
    pending: Option<String>,
}

impl DeleteConfirmation {
    /// Stage an id for deletion, replacing any previously staged id.
    pub fn request(&mut self, id: &str) {
        self.pending = Some(id.to_string());
    }

    /// Consume the staged id. Returns `None` when nothing was staged.
    pub fn confirm(&mut self) -> Option<String> {
        self.pending.take()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }
}

/// Drive the request/confirm/cancel cycle against an interactive prompt.
/// `assume_yes` confirms immediately (the `--yes` scripting path).
pub fn confirm_delete(
    label: &str,
    id: &str,
    assume_yes: bool,
) -> Result<bool, error::DrillbookError> {
    let mut session = DeleteConfirmation::default();
    session.request(id);

    if assume_yes {
        return Ok(session.confirm().is_some());
    }

    print!(
        "{} delete {} {}? [y/N] ",
        "▸".bright_yellow(),
        label,
        id.bright_white().bold()
    );
    io::stdout().flush().map_err(error::DrillbookError::IoError)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(error::DrillbookError::IoError)?;

    if line.trim().eq_ignore_ascii_case("y") {
        Ok(session.confirm().is_some())
    } else {
        session.cancel();
        Ok(false)
    }
}
