//! hashpath CLI
//!
//! Query and reshape nested YAML and JSON documents with path expressions.

mod cli_bin;

use clap::Parser;
use cli_bin::{args::*, commands::*};
use hashpath::{HashPathError, MalformedPath};
use log::error;
use std::process;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(err) = run(cli) {
        error!("{:#}", err);
        eprintln!("error: {:#}", err);
        process::exit(exit_code(&err));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Get(args) => get_command(args),
        Commands::Extract(args) => extract_command(args),
        Commands::Check(args) => check_command(args),
        Commands::Insert(args) => insert_command(args),
        Commands::Remove(args) => remove_command(args),
        Commands::Flatten(args) => flatten_command(args),
        Commands::Expand(args) => expand_command(args),
        Commands::Merge(args) => merge_command(args),
        Commands::Sort(args) => sort_command(args),
        Commands::Contains(args) => contains_command(args),
        Commands::Diff(args) => diff_command(args),
        Commands::Combine(args) => combine_command(args),
        Commands::Filter(args) => filter_command(args),
        Commands::Parse(args) => parse_command(args),
    }
}

fn init_logging(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Map the first library error in the chain to a process exit code
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<HashPathError>() {
            return err.severity().exit_code();
        }
        if cause.downcast_ref::<MalformedPath>().is_some() {
            return 2;
        }
    }
    1
}
