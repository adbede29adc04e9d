//! Diagnostic and error reporting utilities

use crate::{CliError, Result};
use miette::Diagnostic;
use thiserror::Error;
use tw_weaver::WeaveError;

/// Set up enhanced error reporting with miette
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| CliError::Config(format!("Failed to setup error reporting: {}", e)))?;

    Ok(())
}

/// Build-time invariant violations, rendered with remediation hints.
#[derive(Error, Debug, Diagnostic)]
pub enum TrapweaveError {
    #[error("Registration entry point signature drifted")]
    #[diagnostic(
        code(trapweave::contract_drift),
        help("expected `{expected}`, the runtime declares `{generated}`; regenerate the runtime contract and rebuild")
    )]
    ContractDrift { expected: String, generated: String },

    #[error("Invalid batch size {size}")]
    #[diagnostic(
        code(trapweave::invalid_batch_size),
        help("pass --batch-size with a value of at least 1, or fix `batch_size` in trapweave.toml")
    )]
    InvalidBatchSize { size: usize },

    #[error("Unsupported receiver on `{func}`")]
    #[diagnostic(
        code(trapweave::unsupported_receiver),
        help("receivers must be `T`, `*T`, `T[...]` or `*T[...]`; found `{ty}`")
    )]
    UnsupportedReceiver { func: String, ty: String },
}

impl TrapweaveError {
    pub fn from_weave(error: &WeaveError) -> Option<Self> {
        match error {
            WeaveError::ContractDrift { expected, generated } => Some(Self::ContractDrift {
                expected: expected.clone(),
                generated: generated.clone(),
            }),
            WeaveError::InvalidBatchSize(size) => Some(Self::InvalidBatchSize { size: *size }),
            WeaveError::UnsupportedReceiver { func, ty } => Some(Self::UnsupportedReceiver {
                func: func.clone(),
                ty: ty.clone(),
            }),
            WeaveError::Pipeline(_) => None,
        }
    }
}

/// Print a rich report for errors that have one. Returns whether anything was printed.
pub fn render_cli_error(error: &CliError) -> bool {
    let CliError::Weave(weave) = error else {
        return false;
    };
    match TrapweaveError::from_weave(weave) {
        Some(diagnostic) => {
            print_diagnostic(diagnostic);
            true
        }
        None => false,
    }
}

/// Pretty print diagnostics with context
pub fn print_diagnostic(error: TrapweaveError) {
    eprintln!("{:?}", miette::Report::new(error));
}
