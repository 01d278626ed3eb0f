//! Tree, clone, mv and rm command handlers.

use anyhow::{Context as _, Result, bail};
use serde::Serialize;

use super::{Context, finish, parse_branch_id, parse_note_id, print_json, truncate_str};
use crate::cli::output::{OutputFormat, TreeNode};
use crate::cli::{CloneArgs, MvArgs, RmArgs, TreeArgs};
use crate::domain::{Branch, NoteId};
use crate::notebook::Notebook;

/// Titles longer than this are cut in the human tree view.
const MAX_TITLE_WIDTH: usize = 60;

pub fn handle_tree(args: &TreeArgs, ctx: &Context) -> Result<()> {
    let start = match &args.note {
        Some(note) => parse_note_id(note)?,
        None => NoteId::root(),
    };
    let notebook = ctx.open_unlocked(false)?;
    let note = notebook
        .get_note(&start)?
        .with_context(|| format!("note not found: {}", start))?;
    let nodes = collect_children(&notebook, &start, args.depth.unwrap_or(usize::MAX))?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("{} ({})", note.title(), note.id());
            let mut out = String::new();
            render_tree(&nodes, "", &mut out);
            print!("{}", out);
            Ok(())
        }
        OutputFormat::Json => print_json(nodes),
    }
}

/// Children of `parent`, recursively, down to `depth` levels.
pub(crate) fn collect_children(
    notebook: &Notebook,
    parent: &NoteId,
    depth: usize,
) -> Result<Vec<TreeNode>> {
    if depth == 0 {
        return Ok(Vec::new());
    }
    let mut nodes = Vec::new();
    for (branch, note) in notebook.children_notes(parent)? {
        let mut node = TreeNode::new(&branch, &note);
        node.children = collect_children(notebook, note.id(), depth - 1)?;
        nodes.push(node);
    }
    Ok(nodes)
}

/// Draws nodes with box-drawing guides, one line per branch.
pub(crate) fn render_tree(nodes: &[TreeNode], indent: &str, out: &mut String) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (guide, next_indent) = if last {
            ("└── ", format!("{}    ", indent))
        } else {
            ("├── ", format!("{}│   ", indent))
        };

        let title = truncate_str(&node.title, MAX_TITLE_WIDTH);
        let label = match &node.prefix {
            Some(prefix) => format!("{} - {}", prefix, title),
            None => title,
        };
        out.push_str(&format!(
            "{}{}{} [{}]\n",
            indent, guide, label, node.branch_id
        ));
        render_tree(&node.children, &next_indent, out);
    }
}

pub fn handle_clone(args: &CloneArgs, ctx: &Context) -> Result<()> {
    let note_id = parse_note_id(&args.note)?;
    let notebook = ctx.open()?;
    let prefix = args.prefix.as_deref();

    let branch = match (&args.parent, &args.after) {
        (_, Some(after)) => {
            let after = parse_branch_id(after)?;
            notebook
                .clone_after(&note_id, &after, prefix)
                .with_context(|| format!("failed to clone {} after branch {}", note_id, after))?
        }
        (Some(parent), None) => {
            let parent = parse_note_id(parent)?;
            notebook
                .clone_note(&note_id, &parent, prefix)
                .with_context(|| format!("failed to clone {} into {}", note_id, parent))?
        }
        (None, None) => bail!("one of --parent or --after is required"),
    };
    finish(notebook);
    print_branch(&branch, "Cloned", args.format)
}

pub fn handle_mv(args: &MvArgs, ctx: &Context) -> Result<()> {
    let branch_id = parse_branch_id(&args.branch)?;
    let notebook = ctx.open()?;

    let branch = if let Some(to) = &args.to {
        let parent = parse_note_id(to)?;
        notebook.move_to_parent(&branch_id, &parent)
    } else if let Some(before) = &args.before {
        notebook.move_before(&branch_id, &parse_branch_id(before)?)
    } else if let Some(after) = &args.after {
        notebook.move_after(&branch_id, &parse_branch_id(after)?)
    } else {
        bail!("one of --to, --before or --after is required")
    }
    .with_context(|| format!("failed to move branch {}", branch_id))?;

    finish(notebook);
    print_branch(&branch, "Moved", args.format)
}

fn print_branch(branch: &Branch, verb: &str, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {
            println!(
                "{} note {} into {} (branch {}, position {})",
                verb, branch.note_id, branch.parent_note_id, branch.branch_id, branch.position
            );
            Ok(())
        }
        OutputFormat::Json => print_json(branch),
    }
}

#[derive(Debug, Serialize)]
struct RemovedListing {
    branch_deleted: bool,
    deleted_note_ids: Vec<NoteId>,
}

pub fn handle_rm(args: &RmArgs, ctx: &Context) -> Result<()> {
    let branch_id = parse_branch_id(&args.branch)?;
    let notebook = ctx.open()?;
    let outcome = notebook
        .delete_branch(&branch_id, args.cascade)
        .with_context(|| format!("failed to delete branch {}", branch_id))?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            if !outcome.branch_deleted {
                println!("Branch {} was already deleted", branch_id);
            } else if outcome.deleted_note_ids.is_empty() {
                println!("Deleted branch {}", branch_id);
            } else {
                println!(
                    "Deleted branch {} and {} note(s)",
                    branch_id,
                    outcome.deleted_note_ids.len()
                );
                for id in &outcome.deleted_note_ids {
                    println!("  {}", id);
                }
            }
            Ok(())
        }
        OutputFormat::Json => print_json(RemovedListing {
            branch_deleted: outcome.branch_deleted,
            deleted_note_ids: outcome.deleted_note_ids,
        }),
    }
}
