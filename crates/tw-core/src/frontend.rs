use crate::ast::SourceFile;
use crate::diagnostics::Diagnostic;
use crate::error::Result;
use std::path::Path;

/// Result produced by a language frontend for one source file.
#[derive(Debug, Clone)]
pub struct FrontendResult {
    pub file: SourceFile,
    /// Non-fatal findings, such as syntax the frontend skipped.
    pub diagnostics: Vec<Diagnostic>,
}

/// Trait implemented by every source-language frontend.
pub trait LanguageFrontend: Send + Sync {
    fn language(&self) -> &'static str;
    fn extensions(&self) -> &'static [&'static str];
    /// `name` is the file name recorded in the declaration model.
    fn parse(&self, source: &str, name: &str, path: Option<&Path>) -> Result<FrontendResult>;

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}
