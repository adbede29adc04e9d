//! trapweave CLI Binary
//!
//! Synthesizes the registration units that let a runtime intercept every
//! eligible declaration of a Go module.
//!
//! # Usage
//!
//! ```bash
//! # Instrument a module in place
//! trapweave instrument ./pkg --module-path example.com/app/pkg
//!
//! # Include package-level variables and constants, write units elsewhere
//! trapweave instrument ./pkg -m example.com/app/pkg --var-trap --out build/pkg
//!
//! # Show what would be registered
//! trapweave inspect ./pkg -m example.com/app/pkg
//!
//! # Verify the runtime entry point signature
//! trapweave check-contract
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tw_cli::{
    cli::CliConfig,
    commands::{
        self, check_contract::CheckContractArgs, inspect::InspectArgs, instrument::InstrumentArgs,
    },
    diagnostics::{render_cli_error, setup_error_reporting},
    Result,
};

#[derive(Parser)]
#[command(
    name = "trapweave",
    version = env!("CARGO_PKG_VERSION"),
    about = "trapweave: compile-time registration weaver for Go modules",
    long_about = r#"
trapweave is a compile-time registration weaver. It augments a parsed Go module with
synthesized units that register every eligible function, method, variable and constant
with a runtime interception registry.

EXAMPLES:
    trapweave instrument ./pkg -m example.com/app/pkg     # Write units next to the sources
    trapweave inspect ./pkg -m example.com/app/pkg        # Print descriptors as JSON
    trapweave check-contract                              # Verify the runtime contract
    "#
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Explicit log level; wins over -v, -q and RUST_LOG
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Path to trapweave.toml (defaults to ./trapweave.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run as if started in this directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize registration units for a module
    Instrument(InstrumentArgs),

    /// Print the descriptors a module would register
    Inspect(InspectArgs),

    /// Verify the registration entry point signature
    CheckContract(CheckContractArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_error_reporting()?;
    setup_logging(log_filter(cli.verbose, cli.quiet, cli.log), cli.log_format);

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)?;
    }

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Instrument(args) => commands::instrument_command(args, &config),
        Commands::Inspect(args) => commands::inspect_command(args, &config),
        Commands::CheckContract(args) => commands::check_contract_command(args, &config),
    });

    if let Err(err) = result {
        if !render_cli_error(&err) {
            error!("{err}");
        }
        debug!(?err, "command failed");
        std::process::exit(1);
    }
    debug!("done");
    Ok(())
}

/// Weaving runs inside `go build`, so the default stays at warnings unless
/// asked otherwise.
fn log_filter(verbose: u8, quiet: bool, level: Option<LogLevel>) -> EnvFilter {
    let default = match (level, quiet, verbose) {
        (Some(level), _, _) => return EnvFilter::default().add_directive(LevelFilter::from(level).into()),
        (None, true, _) => LevelFilter::ERROR,
        (None, false, 0) => LevelFilter::WARN,
        (None, false, 1) => LevelFilter::INFO,
        (None, false, 2) => LevelFilter::DEBUG,
        (None, false, _) => LevelFilter::TRACE,
    };
    if verbose == 0 && !quiet {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::default().add_directive(default.into())
}

fn setup_logging(filter: EnvFilter, log_format: LogFormat) {
    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime());

    let registry = tracing_subscriber::registry().with(filter);
    match log_format {
        LogFormat::Pretty => registry.with(formatter).init(),
        LogFormat::Json => registry.with(formatter.json().flatten_event(true)).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_level_wins() {
        let filter = log_filter(3, true, Some(LogLevel::Error));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(log_filter(1, false, None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(5, false, None).max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(log_filter(2, true, None).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
