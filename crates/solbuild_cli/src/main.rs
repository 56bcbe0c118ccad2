//! solbuild CLI: the command-line front end of the incremental Solidity
//! build orchestrator.
//!
//! Provides `solbuild compile` to bring artifacts up to date and
//! `solbuild versions` to list the compilers the catalog knows about.

#![warn(missing_docs)]

mod compile;
mod pipeline;
mod versions;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use semver::Version;

/// solbuild: incremental, multi-version Solidity builds.
#[derive(Parser, Debug)]
#[command(name = "solbuild", version, about = "Incremental Solidity build orchestrator")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `solbuild.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile every stale unit and write its artifact.
    Compile(CompileArgs),
    /// List the compiler versions available for selection.
    Versions,
}

/// Arguments for the `solbuild compile` subcommand.
#[derive(Parser, Debug)]
pub struct CompileArgs {
    /// Units to build (names or paths). Defaults to the configured units,
    /// or every unit under the source directory.
    pub units: Vec<String>,

    /// Compile everything with this version instead of selecting one per
    /// unit from its pragma.
    #[arg(long)]
    pub compiler_version: Option<Version>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    init_tracing(&global);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: cannot start async runtime: {e}");
            process::exit(1);
        }
    };

    let result = runtime.block_on(async {
        match cli.command {
            Command::Compile(ref args) => compile::run(args, &global).await,
            Command::Versions => versions::run(&global).await,
        }
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr `tracing` subscriber.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` applies, falling back
/// to warnings only.
fn init_tracing(global: &GlobalArgs) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if global.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(global.color)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}
