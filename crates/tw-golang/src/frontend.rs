//! Go frontend backed by tree-sitter-go.

use std::path::Path;

use tw_core::error::{Error as CoreError, Result as CoreResult};
use tw_core::frontend::{FrontendResult, LanguageFrontend};

use crate::parser::GoParser;

/// Canonical identifier for the Go frontend.
pub const GOLANG: &str = "go";

/// Frontend that converts Go source code into the declaration model.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoFrontend;

impl GoFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageFrontend for GoFrontend {
    fn language(&self) -> &'static str {
        GOLANG
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse(&self, source: &str, name: &str, path: Option<&Path>) -> CoreResult<FrontendResult> {
        let mut parser = GoParser::new()?;
        let parsed = parser.parse_str(source, name).map_err(|err| {
            let origin = path.map(|path| path.display().to_string()).unwrap_or_else(|| name.to_string());
            CoreError::Generic(format!("Go source {origin}: {err}"))
        })?;

        Ok(FrontendResult {
            file: parsed.file,
            diagnostics: parsed.diagnostics,
        })
    }
}
