//! Init and completions command handlers.

use anyhow::{Context as _, Result};
use clap::CommandFactory;
use serde::Serialize;

use super::{Context, finish, print_json};
use crate::cli::output::OutputFormat;
use crate::cli::{Cli, CompletionsArgs, InitArgs};

#[derive(Debug, Serialize)]
struct InitListing {
    db: String,
    password_set: bool,
}

pub fn handle_init(args: &InitArgs, ctx: &Context) -> Result<()> {
    let notebook = ctx.create()?;

    if let Some(password) = ctx.password.as_deref()
        && !notebook.has_password()?
    {
        notebook
            .set_password(password)
            .with_context(|| "failed to set password")?;
    }

    let listing = InitListing {
        db: ctx.db.display().to_string(),
        password_set: notebook.has_password()?,
    };
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            println!("Initialized notebook at {}", listing.db);
            if listing.password_set {
                println!("Protected notes are enabled");
            }
            Ok(())
        }
        OutputFormat::Json => print_json(listing),
    }
}

pub fn handle_completions(args: &CompletionsArgs) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(args.shell, &mut command, "grove", &mut std::io::stdout());
    Ok(())
}
