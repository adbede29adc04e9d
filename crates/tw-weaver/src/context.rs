//! Per-module weaving state.
//!
//! Nothing here is process-global: each module gets its own [`ModuleContext`],
//! and a host that reuses a [`WeaveSession`] across modules clears it in
//! between.

use std::cell::OnceCell;

use tracing::debug;
use tw_core::ast::SourceFile;
use tw_core::config::WeaveEnv;
use tw_core::span::Pos;
use tw_pipeline::PipelineOptions;

use crate::descriptor::Descriptor;
use crate::eligibility::{declares_register_func, has_skip_marker, module_skip_reason, SkipReason};
use crate::position::PositionIndex;

#[derive(Debug, Clone)]
pub struct ModuleContext {
    module_path: String,
    options: PipelineOptions,
    skip: OnceCell<Option<SkipReason>>,
}

impl ModuleContext {
    pub fn new(module_path: impl Into<String>, options: PipelineOptions) -> Self {
        Self {
            module_path: module_path.into(),
            options,
            skip: OnceCell::new(),
        }
    }

    /// Like [`ModuleContext::new`], resolving `main` through the main-module override.
    pub fn with_env(module_path: &str, options: PipelineOptions, env: &WeaveEnv) -> Self {
        Self::new(env.effective_module_path(module_path), options)
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn std_mode(&self) -> bool {
        self.options.std_mode
    }

    pub fn var_trap(&self) -> bool {
        self.options.var_trap
    }

    /// Whether the whole module is left alone, decided on first call and
    /// memoized for the lifetime of the context.
    pub fn skip_reason(&self, files: &[SourceFile]) -> Option<&SkipReason> {
        self.skip
            .get_or_init(|| {
                let reason = module_skip_reason(&self.module_path, self.options.std_mode)
                    .or_else(|| has_skip_marker(files).then_some(SkipReason::SkipMarker))
                    .or_else(|| declares_register_func(files).then_some(SkipReason::VolatileModule));
                if let Some(reason) = &reason {
                    debug!(module = %self.module_path, %reason, "module skipped");
                }
                reason
            })
            .as_ref()
    }

    pub fn is_skipped(&self, files: &[SourceFile]) -> bool {
        self.skip_reason(files).is_some()
    }
}

/// Results of the most recent module, kept for position lookups and dumps.
#[derive(Debug, Default)]
pub struct WeaveSession {
    files: Vec<SourceFile>,
    descriptors: Vec<Descriptor>,
    positions: OnceCell<PositionIndex>,
}

impl WeaveSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, files: Vec<SourceFile>, descriptors: Vec<Descriptor>) {
        self.files = files;
        self.descriptors = descriptors;
        self.positions = OnceCell::new();
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn take_files(&mut self) -> Vec<SourceFile> {
        std::mem::take(&mut self.files)
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn position_index(&self) -> &PositionIndex {
        self.positions
            .get_or_init(|| PositionIndex::build(&self.descriptors))
    }

    pub fn descriptor_at(&self, file_name: &str, pos: Pos) -> Option<&Descriptor> {
        let index = self.position_index().lookup(file_name, pos)?;
        self.descriptors.get(index)
    }

    /// Also drops the position index, which points into the descriptors.
    pub fn clear_descriptors(&mut self) {
        self.descriptors.clear();
        self.clear_position_index();
    }

    pub fn clear_position_index(&mut self) {
        self.positions = OnceCell::new();
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn reset(&mut self) {
        self.clear_descriptors();
        self.clear_files();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{REGISTER_FUNC, SKIP_TRAP_CONST};
    use crate::descriptor::{DeclShape, Origin};
    use tw_core::ast::{Decl, FuncDecl, ValueDecl};

    fn files_with(decls: Vec<Decl>) -> Vec<SourceFile> {
        vec![SourceFile::new("a.go", "demo").with_decls(decls)]
    }

    #[test]
    fn skip_decision_is_memoized() {
        let ctx = ModuleContext::new("example.com/app", PipelineOptions::default());
        assert!(!ctx.is_skipped(&files_with(Vec::new())));
        // a later marker does not change the decision already taken
        let marked = files_with(vec![Decl::Const(ValueDecl::new([SKIP_TRAP_CONST]))]);
        assert!(!ctx.is_skipped(&marked));

        let fresh = ModuleContext::new("example.com/app", PipelineOptions::default());
        assert_eq!(fresh.skip_reason(&marked), Some(&SkipReason::SkipMarker));
    }

    #[test]
    fn path_policy_wins_over_file_markers() {
        let ctx = ModuleContext::new("internal/abi", PipelineOptions::default());
        let marked = files_with(vec![Decl::Const(ValueDecl::new([SKIP_TRAP_CONST]))]);
        assert_eq!(ctx.skip_reason(&marked), Some(&SkipReason::ReservedPrefix("internal/")));
    }

    #[test]
    fn volatile_module_is_skipped() {
        let ctx = ModuleContext::new("example.com/app", PipelineOptions::default());
        let files = files_with(vec![Decl::Func(FuncDecl::new(REGISTER_FUNC))]);
        assert_eq!(ctx.skip_reason(&files), Some(&SkipReason::VolatileModule));
    }

    #[test]
    fn main_is_resolved_through_env() {
        let env = WeaveEnv {
            main_module: Some("example.com/cmd/tool".to_string()),
            ..WeaveEnv::default()
        };
        let ctx = ModuleContext::with_env("main", PipelineOptions::default(), &env);
        assert_eq!(ctx.module_path(), "example.com/cmd/tool");
    }

    #[test]
    fn session_clears_between_modules() {
        let mut session = WeaveSession::new();
        let descriptor = Descriptor::new(
            "Run",
            DeclShape::Function,
            Origin {
                file_index: 0,
                file_name: "a.go".to_string(),
                line: 3,
                col: 1,
            },
        );
        session.record(files_with(Vec::new()), vec![descriptor]);
        assert_eq!(
            session.descriptor_at("a.go", Pos::new(3, 1)).map(|d| d.name.as_str()),
            Some("Run")
        );

        session.clear_descriptors();
        assert!(session.descriptors().is_empty());
        assert!(session.descriptor_at("a.go", Pos::new(3, 1)).is_none());
        assert_eq!(session.files().len(), 1);

        session.reset();
        assert!(session.files().is_empty());
        assert!(session.position_index().is_empty());
    }
}
