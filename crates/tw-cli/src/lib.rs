//! trapweave CLI library
//!
//! Reads a Go module directory, runs the registration weaver over it and
//! writes the synthesized units next to (or away from) the sources.

pub mod cli;
pub mod commands;
pub mod diagnostics;
pub mod source;

// CLI-specific error handling
pub mod error {
    use thiserror::Error;
    use tw_weaver::WeaveError;

    #[derive(Error, Debug)]
    pub enum CliError {
        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Invalid input: {0}")]
        InvalidInput(String),

        #[error("Parse error: {0}")]
        Parse(String),

        #[error("Patch error: {0}")]
        Patch(String),

        #[error(transparent)]
        Weave(#[from] WeaveError),

        #[error("Serialization error: {0}")]
        Json(#[from] serde_json::Error),
    }

    pub type Result<T> = std::result::Result<T, CliError>;
}

pub use error::{CliError, Result};
