//! grove - a note tree with protected notes and fulltext search

pub mod cli;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod fulltext;
pub mod infra;
pub mod notebook;
pub mod store;
pub mod tree;

pub use error::{Error, Result};
pub use notebook::{NewNoteOptions, Notebook, NotebookOptions};

use clap::Parser;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        Context, handle_clone, handle_completions, handle_erase, handle_init, handle_mv,
        handle_new, handle_passwd, handle_protect, handle_reindex, handle_rm, handle_search,
        handle_show, handle_tree,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load()?;
    let ctx = Context {
        db: config.db_path(cli.db.as_ref()),
        options: config.notebook_options(),
        password: cli.password.clone(),
    };

    match &cli.command {
        Command::Init(args) => handle_init(args, &ctx),
        Command::New(args) => handle_new(args, &ctx),
        Command::Show(args) => handle_show(args, &ctx),
        Command::Tree(args) => handle_tree(args, &ctx),
        Command::Clone(args) => handle_clone(args, &ctx),
        Command::Mv(args) => handle_mv(args, &ctx),
        Command::Rm(args) => handle_rm(args, &ctx),
        Command::Search(args) => handle_search(args, &ctx),
        Command::Protect(args) => handle_protect(args, &ctx),
        Command::Passwd(args) => handle_passwd(args, &ctx),
        Command::Reindex(args) => handle_reindex(args, &ctx),
        Command::Erase(args) => handle_erase(args, &ctx),
        Command::Completions(args) => handle_completions(args),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from warnings.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}
