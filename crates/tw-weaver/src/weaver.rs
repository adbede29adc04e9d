use tracing::{debug, info};
use tw_core::ast::SourceFile;
use tw_core::config::WeaveEnv;
use tw_core::unit::SyntheticUnit;
use tw_pipeline::{Pipeline, PipelineBuilder, PipelineDiagnostics, PipelineOptions};

use crate::context::{ModuleContext, WeaveSession};
use crate::contract;
use crate::eligibility::SkipReason;
use crate::error::{Result, WeaveError};
use crate::stages::{ExtractStage, FilterStage, GateStage, SynthesizeStage, TrapPairStage, WeaveState};
use crate::version::{patch_versions, ConstPatch, VersionStamp};

/// What weaving one module produced.
#[derive(Debug)]
pub struct WeaveOutput {
    /// Effective module path the records are attributed to.
    pub module_path: String,
    pub skipped: Option<SkipReason>,
    /// Helper unit first, then the registration batches. Empty when skipped.
    pub units: Vec<SyntheticUnit>,
    pub patches: Vec<ConstPatch>,
    pub diagnostics: PipelineDiagnostics,
}

impl WeaveOutput {
    pub fn batch_units(&self) -> &[SyntheticUnit] {
        self.units.get(1..).unwrap_or(&[])
    }
}

pub struct Weaver {
    options: PipelineOptions,
    env: WeaveEnv,
    pipeline: Pipeline<WeaveState, WeaveState>,
}

impl Weaver {
    /// Verifies the runtime contract and the batch size before anything is woven.
    pub fn new(options: PipelineOptions, env: WeaveEnv) -> Result<Self> {
        contract::verify()?;
        if options.batch_size == 0 {
            return Err(WeaveError::InvalidBatchSize(options.batch_size));
        }
        let pipeline = PipelineBuilder::new()
            .add_stage(GateStage)
            .add_stage(ExtractStage)
            .add_stage(TrapPairStage)
            .add_stage(FilterStage {
                print_descriptors: options.debug.print_descriptors,
            })
            .add_stage(SynthesizeStage {
                batch_size: options.batch_size,
            })
            .build();
        Ok(Self { options, env, pipeline })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    pub fn env(&self) -> &WeaveEnv {
        &self.env
    }

    /// Weave one module. The session is overwritten with this module's files
    /// (after rewriting) and surviving descriptors.
    pub fn weave(&self, module_path: &str, files: Vec<SourceFile>, session: &mut WeaveSession) -> Result<WeaveOutput> {
        session.reset();
        let context = ModuleContext::with_env(module_path, self.options.clone(), &self.env);
        let module_path = context.module_path().to_string();

        let mut files = files;
        let stamp = VersionStamp::from_env(&self.env);
        let patches = patch_versions(&module_path, &mut files, stamp.as_ref());

        let mut diagnostics = PipelineDiagnostics::default();
        let state = self
            .pipeline
            .run(WeaveState::new(context, files), &mut diagnostics, &self.options)?;

        if let Some(reason) = &state.skipped {
            debug!(module = %module_path, %reason, "no units synthesized");
        } else {
            info!(
                module = %module_path,
                descriptors = state.descriptors.len(),
                units = state.units.len(),
                "module woven"
            );
        }

        let WeaveState {
            files,
            descriptors,
            skipped,
            units,
            ..
        } = state;
        session.record(files, descriptors);
        Ok(WeaveOutput {
            module_path,
            skipped,
            units,
            patches,
            diagnostics,
        })
    }
}
