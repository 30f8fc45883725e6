use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use fixity::cli::{Cli, Commands};
use fixity::output::{self, Verbosity};
use fixity::{FixityContext, commands, logging};
use std::io;
use std::process;

/// Exit status for failures other than a verification outcome.
const EXIT_FAILURE: i32 = 1;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            output::error(&format!("Error: {e:#}"));
            process::exit(EXIT_FAILURE);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else if cli.verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    };
    output::set_verbosity(verbosity);
    logging::init(verbosity);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(0);
    }

    let mut ctx = FixityContext::new(cli.store)?;

    match cli.command {
        Commands::Add { paths } => commands::add::execute(&ctx, &paths)?,
        Commands::Update { paths } => commands::update::execute(&ctx, &paths)?,
        Commands::Check { paths, all } => return commands::check::execute(&ctx, &paths, all),
        Commands::List => commands::list::execute(&ctx)?,
        Commands::Config { key, value, list } => {
            commands::config::execute(&mut ctx, key.as_deref(), value, list)?;
        }
        Commands::Completion { .. } => {}
    }

    Ok(0)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
