// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! beluga CLI - CommonJS-style module runtime

use beluga::{Runtime, VERSION};
use clap::Parser;
use owo_colors::OwoColorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "beluga",
    about = "CommonJS-style module runtime",
    version = VERSION,
    author = "Pegasus Heavy Industries"
)]
struct Cli {
    /// Program file or package directory to execute
    program: Option<PathBuf>,

    /// Require this module id as the program instead of a path
    #[arg(long)]
    main: Option<String>,

    /// Evaluate source from the command line
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Require a module before the program runs (repeatable)
    #[arg(short = 'r', long = "require")]
    preload: Vec<String>,

    /// Prepend a directory to the module search paths (repeatable)
    #[arg(short = 'I', long = "include")]
    include: Vec<PathBuf>,

    /// Installation prefix the stdlib/lib search paths derive from
    #[arg(long, env = "BELUGA_PREFIX")]
    prefix: Option<PathBuf>,

    /// Enable loader tracing
    #[arg(long)]
    verbose: bool,

    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("beluga=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("beluga=warn")
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let prefix = match cli.prefix {
        Some(prefix) => prefix,
        None => std::env::current_dir()?,
    };

    let mut args = Vec::new();
    if let Some(program) = &cli.program {
        args.push(program.display().to_string());
    }
    args.extend(cli.args.clone());

    let runtime = Runtime::new(prefix, args);
    runtime.loader().set_trace(cli.verbose);

    // search-path prepends take effect before anything is required
    for dir in cli.include {
        runtime.include(dir);
    }
    for id in &cli.preload {
        runtime.require(id)?;
    }
    if let Some(source) = &cli.eval {
        runtime.eval(source)?;
    }

    if let Some(id) = &cli.main {
        runtime.require(id)?;
    } else if let Some(program) = &cli.program {
        runtime.run_program(program)?;
    }

    runtime.finish()?;
    Ok(())
}
