// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge: build agent, job queue and CIS scanner

mod commands;
mod config;
mod env;
mod exit_error;
mod lifecycle;
mod logging;
mod notifier;
mod output;

use clap::{Parser, Subcommand};

use commands::cis::CisArgs;
use commands::job::JobArgs;
use commands::script::ScriptArgs;
use commands::Context;
use exit_error::{ExitError, EXIT_FAILED};

#[derive(Parser)]
#[command(name = "forge", version, about = "Build agent and continuous integration scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the build agent until interrupted
    Run,
    /// Build script tools
    Script(ScriptArgs),
    /// Job queue management
    Job(JobArgs),
    /// Continuous integration scanner
    Cis(CisArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        match err.downcast_ref::<ExitError>() {
            Some(exit) => {
                eprintln!("{}", exit.message);
                std::process::exit(exit.code);
            }
            None => {
                eprintln!("error: {:#}", err);
                std::process::exit(EXIT_FAILED);
            }
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::load()?;

    // The agent keeps a rolling file log; one-shot commands log to stderr.
    let _guard = match cli.command {
        Commands::Run => Some(logging::init_with_file(&ctx.paths.logs)?),
        _ => {
            logging::init_stderr();
            None
        }
    };

    match cli.command {
        Commands::Run => commands::run::handle(&ctx).await,
        Commands::Script(args) => commands::script::handle(args.command, &ctx),
        Commands::Job(args) => commands::job::handle(args.command, &ctx),
        Commands::Cis(args) => commands::cis::handle(args.command, &ctx).await,
    }
}
