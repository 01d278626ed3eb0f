//! Protect and passwd command handlers.

use anyhow::{Context as _, Result, bail};
use serde::Serialize;

use super::{Context, finish, parse_note_id, print_json};
use crate::cli::output::OutputFormat;
use crate::cli::{PasswdArgs, ProtectArgs};
use crate::domain::NoteId;

#[derive(Debug, Serialize)]
struct ProtectListing {
    protected: bool,
    changed: Vec<NoteId>,
}

pub fn handle_protect(args: &ProtectArgs, ctx: &Context) -> Result<()> {
    let id = parse_note_id(&args.note)?;
    let protected = !args.off;
    let notebook = ctx.open_unlocked(true)?;

    let changed = if args.recursive {
        notebook.protect_subtree(&id, protected)
    } else {
        let was = notebook
            .get_note(&id)?
            .with_context(|| format!("note not found: {}", id))?
            .is_protected();
        notebook
            .set_protected(&id, protected)
            .map(|_| if was == protected { Vec::new() } else { vec![id.clone()] })
    }
    .with_context(|| format!("failed to change protection of {}", id))?;
    finish(notebook);

    match args.format {
        OutputFormat::Human => {
            let verb = if protected { "Protected" } else { "Unprotected" };
            println!("{} {} note(s)", verb, changed.len());
            Ok(())
        }
        OutputFormat::Json => print_json(ProtectListing { protected, changed }),
    }
}

pub fn handle_passwd(args: &PasswdArgs, ctx: &Context) -> Result<()> {
    if args.new.is_empty() {
        bail!("password cannot be empty");
    }
    let notebook = ctx.open()?;

    if notebook.has_password()? {
        let Some(old) = ctx.password.as_deref() else {
            bail!("the current password is needed: pass --password or set GROVE_PASSWORD");
        };
        notebook
            .change_password(old, &args.new)
            .with_context(|| "failed to change password")?;
        println!("Password changed");
    } else {
        notebook
            .set_password(&args.new)
            .with_context(|| "failed to set password")?;
        println!("Password set");
    }
    finish(notebook);
    Ok(())
}
