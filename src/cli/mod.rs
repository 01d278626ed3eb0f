//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::domain::NoteType;
use output::OutputFormat;

/// grove - a note tree with protected notes and fulltext search
#[derive(Parser, Debug)]
#[command(name = "grove", version, about, long_about = None)]
pub struct Cli {
    /// Notebook database file (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub db: Option<PathBuf>,

    /// Password for protected notes
    #[arg(long, global = true, env = "GROVE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the notebook database, optionally setting the password
    Init(InitArgs),

    /// Create a new note
    New(NewArgs),

    /// Show a note
    Show(ShowArgs),

    /// Print the note tree
    Tree(TreeArgs),

    /// Place an existing note under another parent as well
    Clone(CloneArgs),

    /// Move a branch to another parent or position
    Mv(MvArgs),

    /// Delete a branch
    Rm(RmArgs),

    /// Search note titles and text
    Search(SearchArgs),

    /// Protect or unprotect notes
    Protect(ProtectArgs),

    /// Set or change the password
    Passwd(PasswdArgs),

    /// Rebuild the fulltext index
    Reindex(ReindexArgs),

    /// Permanently remove deleted notes
    Erase(EraseArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `init` command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `new` command
#[derive(Parser, Debug)]
pub struct NewArgs {
    /// Title of the new note
    pub title: String,

    /// Parent note id (defaults to root)
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Note content
    #[arg(short, long, default_value = "")]
    pub content: String,

    /// Note type
    #[arg(short = 't', long = "type", default_value = "text")]
    pub note_type: NoteType,

    /// Mime type (defaults to the type's usual mime)
    #[arg(long)]
    pub mime: Option<String>,

    /// Branch prefix shown before the title
    #[arg(long)]
    pub prefix: Option<String>,

    /// Encrypt the note (needs the password)
    #[arg(long)]
    pub protected: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Note id
    pub note: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `tree` command
#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Note to start from (defaults to root)
    pub note: Option<String>,

    /// Maximum depth to print
    #[arg(long)]
    pub depth: Option<usize>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `clone` command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["parent", "after"])))]
pub struct CloneArgs {
    /// Note id to clone
    pub note: String,

    /// New parent note id; the clone goes last
    #[arg(long)]
    pub parent: Option<String>,

    /// Branch id to place the clone right after
    #[arg(long)]
    pub after: Option<String>,

    /// Branch prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `mv` command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["to", "before", "after"])))]
pub struct MvArgs {
    /// Branch id to move
    pub branch: String,

    /// New parent note id; the branch goes last
    #[arg(long)]
    pub to: Option<String>,

    /// Sibling branch id to move before
    #[arg(long)]
    pub before: Option<String>,

    /// Sibling branch id to move after
    #[arg(long)]
    pub after: Option<String>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `rm` command
#[derive(Parser, Debug)]
pub struct RmArgs {
    /// Branch id to delete
    pub branch: String,

    /// Also delete the note and its orphaned subtree if this is the last placement
    #[arg(short = 'r', long)]
    pub cascade: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `search` command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Maximum number of results
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `protect` command
#[derive(Parser, Debug)]
pub struct ProtectArgs {
    /// Note id
    pub note: String,

    /// Remove protection instead
    #[arg(long)]
    pub off: bool,

    /// Apply to every note below as well
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `passwd` command
#[derive(Parser, Debug)]
pub struct PasswdArgs {
    /// The new password. The current one is taken from --password.
    #[arg(long, env = "GROVE_NEW_PASSWORD", hide_env_values = true)]
    pub new: String,
}

/// Arguments for the `reindex` command
#[derive(Parser, Debug)]
pub struct ReindexArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `erase` command
#[derive(Parser, Debug)]
pub struct EraseArgs {
    /// Only erase notes deleted at least this many days ago
    #[arg(long, default_value_t = 0)]
    pub older_than_days: u32,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,
}

/// Arguments for the `completions` command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for (bash, zsh, fish)
    #[arg(value_enum)]
    pub shell: Shell,
}
