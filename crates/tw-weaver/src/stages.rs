//! Weaving stages, run in order over one module's [`WeaveState`].

use tracing::{debug, info};
use tw_core::ast::SourceFile;
use tw_core::diagnostics::Diagnostic;
use tw_core::unit::SyntheticUnit;
use tw_pipeline::{PipelineDiagnostics, PipelineError, PipelineStage};

use crate::context::ModuleContext;
use crate::descriptor::Descriptor;
use crate::eligibility::{is_declaration_allowed, SkipReason};
use crate::extract::extract;
use crate::helper::helper_unit;
use crate::synth::{count_by_kind, synthesize};
use crate::trap_pair::detect_trap_pairs;

pub const STAGE_GATE: &str = "gate";
pub const STAGE_EXTRACT: &str = "extract";
pub const STAGE_TRAP_PAIR: &str = "trap-pair";
pub const STAGE_FILTER: &str = "filter";
pub const STAGE_SYNTHESIZE: &str = "synthesize";

#[derive(Debug)]
pub struct WeaveState {
    pub context: ModuleContext,
    pub files: Vec<SourceFile>,
    pub descriptors: Vec<Descriptor>,
    pub skipped: Option<SkipReason>,
    /// Helper unit first, then the batches in order.
    pub units: Vec<SyntheticUnit>,
}

impl WeaveState {
    pub fn new(context: ModuleContext, files: Vec<SourceFile>) -> Self {
        Self {
            context,
            files,
            descriptors: Vec::new(),
            skipped: None,
            units: Vec::new(),
        }
    }

    pub fn package_name(&self) -> &str {
        self.files.first().map(|file| file.package.as_str()).unwrap_or("")
    }
}

/// Module-level gate; every later stage passes a skipped module through.
pub struct GateStage;

impl PipelineStage for GateStage {
    type SrcCtx = WeaveState;
    type DstCtx = WeaveState;

    fn name(&self) -> &'static str {
        STAGE_GATE
    }

    fn run(&self, mut state: WeaveState, diagnostics: &mut PipelineDiagnostics) -> Result<WeaveState, PipelineError> {
        state.skipped = state.context.skip_reason(&state.files).cloned();
        if let Some(reason) = &state.skipped {
            diagnostics.push(Diagnostic::info(format!(
                "module `{}` left uninstrumented: {}",
                state.context.module_path(),
                reason
            )));
        }
        Ok(state)
    }
}

pub struct ExtractStage;

impl PipelineStage for ExtractStage {
    type SrcCtx = WeaveState;
    type DstCtx = WeaveState;

    fn name(&self) -> &'static str {
        STAGE_EXTRACT
    }

    fn run(&self, mut state: WeaveState, _diagnostics: &mut PipelineDiagnostics) -> Result<WeaveState, PipelineError> {
        if state.skipped.is_some() {
            return Ok(state);
        }
        let var_trap = state.context.var_trap();
        state.descriptors =
            extract(&mut state.files, var_trap).map_err(|err| PipelineError::new(STAGE_EXTRACT, err.to_string()))?;
        debug!(
            module = state.context.module_path(),
            descriptors = state.descriptors.len(),
            "declarations extracted"
        );
        Ok(state)
    }
}

pub struct TrapPairStage;

impl PipelineStage for TrapPairStage {
    type SrcCtx = WeaveState;
    type DstCtx = WeaveState;

    fn name(&self) -> &'static str {
        STAGE_TRAP_PAIR
    }

    fn run(&self, mut state: WeaveState, diagnostics: &mut PipelineDiagnostics) -> Result<WeaveState, PipelineError> {
        if state.skipped.is_some() {
            return Ok(state);
        }
        let pairs = detect_trap_pairs(&mut state.descriptors);
        if pairs > 0 {
            diagnostics.push(Diagnostic::info(format!("{pairs} trap pair(s) detected")));
        }
        Ok(state)
    }
}

/// Per-declaration eligibility. Optionally logs every surviving descriptor.
pub struct FilterStage {
    pub print_descriptors: bool,
}

impl PipelineStage for FilterStage {
    type SrcCtx = WeaveState;
    type DstCtx = WeaveState;

    fn name(&self) -> &'static str {
        STAGE_FILTER
    }

    fn run(&self, mut state: WeaveState, _diagnostics: &mut PipelineDiagnostics) -> Result<WeaveState, PipelineError> {
        if state.skipped.is_some() {
            return Ok(state);
        }
        let module_path = state.context.module_path().to_string();
        let std_mode = state.context.std_mode();
        let before = state.descriptors.len();
        state
            .descriptors
            .retain(|descriptor| is_declaration_allowed(&module_path, std_mode, &descriptor.identity_name()));
        if state.descriptors.len() != before {
            debug!(
                module = %module_path,
                dropped = before - state.descriptors.len(),
                "declarations filtered"
            );
        }
        if self.print_descriptors {
            for descriptor in &state.descriptors {
                info!(
                    module = %module_path,
                    file = %descriptor.origin.file_name,
                    line = descriptor.origin.line,
                    kind = descriptor.kind().tag(),
                    identity = %descriptor.identity_name(),
                    trap_pair = descriptor.follows_trap_marker,
                    "descriptor"
                );
            }
        }
        Ok(state)
    }
}

pub struct SynthesizeStage {
    pub batch_size: usize,
}

impl PipelineStage for SynthesizeStage {
    type SrcCtx = WeaveState;
    type DstCtx = WeaveState;

    fn name(&self) -> &'static str {
        STAGE_SYNTHESIZE
    }

    fn run(&self, mut state: WeaveState, diagnostics: &mut PipelineDiagnostics) -> Result<WeaveState, PipelineError> {
        if state.skipped.is_some() {
            return Ok(state);
        }
        let package = state.package_name().to_string();
        let module_path = state.context.module_path().to_string();
        let batches = synthesize(&package, &state.descriptors, self.batch_size)
            .map_err(|err| PipelineError::new(STAGE_SYNTHESIZE, err.to_string()))?;

        let [funcs, vars, var_ptrs, consts] = count_by_kind(&state.descriptors);
        diagnostics.push(Diagnostic::info(format!(
            "{} registration unit(s): {funcs} func, {vars} var, {var_ptrs} var-ptr, {consts} const",
            batches.len()
        )));

        state.units.push(helper_unit(&package, &module_path));
        state.units.extend(batches);
        Ok(state)
    }
}
