use crate::span::Pos;
use std::fmt::{Display, Formatter};

/// Runtime configuration for emitting diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticDisplayOptions {
    /// Also print info-level diagnostics.
    pub verbose_info: bool,
}

impl DiagnosticDisplayOptions {
    pub fn new(verbose_info: bool) -> Self {
        Self { verbose_info }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub file: Option<String>,
    pub pos: Option<Pos>,
}

impl Diagnostic {
    fn with_level(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            file: None,
            pos: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_level(DiagnosticLevel::Info, message)
    }

    pub fn with_location(mut self, file: impl Into<String>, pos: Pos) -> Self {
        self.file = Some(file.into());
        self.pos = Some(pos);
        self
    }

    fn location(&self) -> Option<String> {
        match (&self.file, self.pos) {
            (Some(file), Some(pos)) => Some(format!("{file}:{pos}")),
            (Some(file), None) => Some(file.clone()),
            (None, Some(pos)) => Some(pos.to_string()),
            (None, None) => None,
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

pub struct DiagnosticManager;

impl DiagnosticManager {
    /// Print diagnostics to stderr. `context` is the header tag, normally the
    /// pipeline stage name.
    pub fn emit(diagnostics: &[Diagnostic], context: Option<&str>, options: &DiagnosticDisplayOptions) {
        let context = context.unwrap_or("weave");
        for diagnostic in diagnostics {
            for line in render(diagnostic, context, options) {
                eprintln!("{line}");
            }
        }
    }
}

/// Lines printed for one diagnostic; info is hidden unless verbose.
fn render(diagnostic: &Diagnostic, context: &str, options: &DiagnosticDisplayOptions) -> Vec<String> {
    let prefix = match diagnostic.level {
        DiagnosticLevel::Info if !options.verbose_info => return Vec::new(),
        DiagnosticLevel::Info => "info:",
        DiagnosticLevel::Warning => "warning:",
        DiagnosticLevel::Error => "error:",
    };

    let mut lines = vec![format!("{prefix} [{context}] {diagnostic}")];
    if let Some(location) = diagnostic.location() {
        lines.push(format!("   at {location}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn info_is_hidden_unless_verbose() {
        let diag = Diagnostic::info("module skipped");
        assert!(render(&diag, "gate", &DiagnosticDisplayOptions::new(false)).is_empty());
        assert_eq!(
            render(&diag, "gate", &DiagnosticDisplayOptions::new(true)),
            vec!["info: [gate] module skipped".to_string()]
        );
    }

    #[test]
    fn location_is_rendered() {
        let diag = Diagnostic::warning("generic receiver").with_location("list.go", Pos::new(12, 1));
        let lines = render(&diag, "extract", &DiagnosticDisplayOptions::default());
        assert_eq!(
            lines,
            vec![
                "warning: [extract] generic receiver".to_string(),
                "   at list.go:12:1".to_string(),
            ]
        );
    }
}
