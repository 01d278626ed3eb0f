//! Search, reindex and erase command handlers.

use anyhow::{Context as _, Result};
use chrono::{Duration, Utc};

use super::{Context, finish, print_json, truncate_str};
use crate::cli::output::{OutputFormat, SearchListing};
use crate::cli::{EraseArgs, ReindexArgs, SearchArgs};

pub fn handle_search(args: &SearchArgs, ctx: &Context) -> Result<()> {
    let notebook = ctx.open_unlocked(false)?;
    let hits = notebook
        .search(&args.query, args.limit)
        .with_context(|| format!("search failed for query: {}", args.query))?;

    let mut results = Vec::with_capacity(hits.len());
    for id in hits {
        let title = match notebook.get_note(&id)? {
            Some(note) => note.title().to_string(),
            None => continue,
        };
        results.push(SearchListing {
            id: id.to_string(),
            title,
        });
    }
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No matching notes found.");
            } else {
                for result in &results {
                    println!("{} {}", result.id, truncate_str(&result.title, 60));
                }
            }
            Ok(())
        }
        OutputFormat::Json => print_json(results),
    }
}

pub fn handle_reindex(args: &ReindexArgs, ctx: &Context) -> Result<()> {
    let notebook = ctx.open()?;
    let stats = notebook
        .reindex_all()
        .with_context(|| "failed to rebuild fulltext index")?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("Indexed {} notes, skipped {}", stats.indexed, stats.skipped);
            Ok(())
        }
        OutputFormat::Json => print_json(stats),
    }
}

pub fn handle_erase(args: &EraseArgs, ctx: &Context) -> Result<()> {
    let notebook = ctx.open()?;
    let before = Utc::now() - Duration::days(i64::from(args.older_than_days));
    let erased = notebook
        .erase_deleted(before)
        .with_context(|| "failed to erase deleted notes")?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("Erased {} deleted note(s)", erased.len());
            Ok(())
        }
        OutputFormat::Json => print_json(erased),
    }
}
