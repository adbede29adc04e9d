use crate::config::PipelineOptions;
use std::error::Error;
use std::fmt;
use tw_core::diagnostics::{Diagnostic, DiagnosticDisplayOptions, DiagnosticManager};

/// Diagnostics collected across a pipeline run. Stages push into `items`;
/// the pipeline flushes them under the stage name after each stage.
#[derive(Debug, Default, Clone)]
pub struct PipelineDiagnostics {
    pub items: Vec<Diagnostic>,
    emitted: Vec<(&'static str, Diagnostic)>,
}

impl PipelineDiagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub(crate) fn emit_stage(&mut self, stage: &'static str, options: &PipelineOptions) {
        if self.items.is_empty() {
            return;
        }
        let opts = DiagnosticDisplayOptions::new(options.debug.verbose);
        DiagnosticManager::emit(&self.items, Some(stage), &opts);
        self.emitted
            .extend(self.items.drain(..).map(|diagnostic| (stage, diagnostic)));
    }

    /// Every diagnostic seen so far, flushed or pending.
    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.emitted
            .iter()
            .map(|(_, diagnostic)| diagnostic)
            .chain(self.items.iter())
    }

    pub fn for_stage<'a>(&'a self, stage: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.emitted
            .iter()
            .filter(move |(name, _)| *name == stage)
            .map(|(_, diagnostic)| diagnostic)
    }
}

/// Failure of one stage. `stage` names the outermost stage that reported it.
#[derive(Debug)]
pub struct PipelineError {
    pub stage: &'static str,
    pub message: String,
}

impl PipelineError {
    pub fn new(stage: &'static str, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
        }
    }

    pub(crate) fn attributed_to(self, stage: &'static str) -> Self {
        Self { stage, ..self }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

impl Error for PipelineError {}
