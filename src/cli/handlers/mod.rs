//! Command handlers for the CLI.

mod init;
mod notes;
mod protect;
mod search;
mod tree;


use anyhow::{Context as _, Result, bail};
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::output::Output;
use crate::domain::{BranchId, NoteId};
use crate::notebook::{Notebook, NotebookOptions};

// Re-export public items
pub use init::{handle_completions, handle_init};
pub use notes::{handle_new, handle_show};
pub use protect::{handle_passwd, handle_protect};
pub use search::{handle_erase, handle_reindex, handle_search};
pub use tree::{handle_clone, handle_mv, handle_rm, handle_tree};

// ===========================================
// Shared Utilities
// ===========================================

/// Where the notebook lives and how to open it.
#[derive(Debug, Clone)]
pub struct Context {
    pub db: PathBuf,
    pub options: NotebookOptions,
    pub password: Option<String>,
}

impl Context {
    /// Opens the notebook, creating it if needed.
    pub(crate) fn create(&self) -> Result<Notebook> {
        Notebook::open(&self.db, self.options.clone())
            .with_context(|| format!("failed to open notebook at {}", self.db.display()))
    }

    /// Opens an existing notebook.
    pub(crate) fn open(&self) -> Result<Notebook> {
        if !self.db.exists() {
            bail!(
                "no notebook at {}; run `grove init` first",
                self.db.display()
            );
        }
        self.create()
    }

    /// Opens an existing notebook and unlocks it when a password was given.
    ///
    /// With `required`, a missing password is an error.
    pub(crate) fn open_unlocked(&self, required: bool) -> Result<Notebook> {
        let notebook = self.open()?;
        match self.password.as_deref() {
            Some(password) => {
                notebook
                    .unlock(password)
                    .with_context(|| "failed to unlock protected notes")?;
            }
            None if required => {
                bail!("this command needs the password: pass --password or set GROVE_PASSWORD")
            }
            None => {}
        }
        Ok(notebook)
    }
}

pub(crate) fn parse_note_id(s: &str) -> Result<NoteId> {
    s.trim()
        .parse()
        .with_context(|| format!("invalid note id: {}", s))
}

pub(crate) fn parse_branch_id(s: &str) -> Result<BranchId> {
    s.trim()
        .parse()
        .with_context(|| format!("invalid branch id: {}", s))
}

/// Prints `data` wrapped in an [`Output`] envelope.
pub(crate) fn print_json<T: Serialize>(data: T) -> Result<()> {
    let json = serde_json::to_string_pretty(&Output::new(data))?;
    println!("{}", json);
    Ok(())
}

/// Applies queued index work before the process exits.
pub(crate) fn finish(notebook: Notebook) {
    let flushed = notebook.flush_fulltext();
    log::debug!("flushed {} fulltext job(s)", flushed);
    notebook.close();
}

/// Truncates a string to a maximum display width, adding ellipsis if needed.
pub(crate) fn truncate_str(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}
