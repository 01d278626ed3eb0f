//! New and show command handlers.

use anyhow::{Context as _, Result, bail};
use serde::Serialize;

use super::{Context, finish, parse_note_id, print_json};
use crate::cli::output::{NoteView, OutputFormat};
use crate::cli::{NewArgs, ShowArgs};
use crate::domain::{Branch, Label, NoteId, PROTECTED_PLACEHOLDER};
use crate::notebook::NewNoteOptions;

#[derive(Debug, Serialize)]
struct CreatedListing {
    note: NoteView,
    branch: Branch,
}

pub fn handle_new(args: &NewArgs, ctx: &Context) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("title cannot be empty");
    }
    let parent = match &args.parent {
        Some(parent) => parse_note_id(parent)?,
        None => NoteId::root(),
    };

    let notebook = ctx.open_unlocked(args.protected)?;
    let options = NewNoteOptions {
        note_type: args.note_type,
        mime: args.mime.clone(),
        protected: args.protected,
        prefix: args.prefix.clone(),
    };
    let (note, branch) = notebook
        .create_note(&parent, title, args.content.as_bytes(), options)
        .with_context(|| format!("failed to create note under {}", parent))?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("Created note {} (branch {})", note.id(), branch.branch_id);
            Ok(())
        }
        OutputFormat::Json => print_json(CreatedListing {
            note: NoteView::from_note(&note, false),
            branch,
        }),
    }
}

#[derive(Debug, Serialize)]
struct ShowListing {
    note: NoteView,
    parents: Vec<Branch>,
    labels: Vec<Label>,
}

pub fn handle_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let id = parse_note_id(&args.note)?;
    let notebook = ctx.open_unlocked(false)?;

    let note = notebook
        .get_note(&id)?
        .with_context(|| format!("note not found: {}", id))?;
    let parents = notebook.parents(&id)?;
    let labels = notebook.labels(&id)?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("# {}", note.title());
            println!();
            println!(
                "ID: {}  Type: {}  Created: {}  Modified: {}",
                note.id(),
                note.note_type(),
                note.created().format("%Y-%m-%d"),
                note.modified().format("%Y-%m-%d")
            );
            if note.is_deleted() {
                println!("Deleted");
            }
            if !parents.is_empty() {
                let ids: Vec<_> = parents.iter().map(|b| b.parent_note_id.to_string()).collect();
                println!("Parents: {}", ids.join(", "));
            }
            if !labels.is_empty() {
                let labels: Vec<_> = labels
                    .iter()
                    .map(|l| {
                        if l.value.is_empty() {
                            l.name.to_string()
                        } else {
                            format!("{}={}", l.name, l.value)
                        }
                    })
                    .collect();
                println!("Labels: {}", labels.join(", "));
            }
            println!();

            if !note.is_content_available() {
                println!("{} pass --password to read this note", PROTECTED_PLACEHOLDER);
            } else {
                let content = note.content_text();
                if !content.is_empty() {
                    println!("{}", content);
                }
            }
            Ok(())
        }
        OutputFormat::Json => print_json(ShowListing {
            note: NoteView::from_note(&note, true),
            parents,
            labels,
        }),
    }
}
