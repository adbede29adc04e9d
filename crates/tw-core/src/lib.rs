//! Core model shared by the trapweave crates: parsed declarations, positions,
//! synthesized compilation units, diagnostics and environment configuration.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frontend;
pub mod span;
pub mod unit;

pub use frontend::{FrontendResult, LanguageFrontend};

// Alias for error types
pub type Error = crate::error::Error;
pub type Result<T> = crate::error::Result<T>;
