use crate::config::PipelineOptions;
use crate::error::{PipelineDiagnostics, PipelineError};
use std::marker::PhantomData;
use std::time::Instant;
use tracing::{debug, debug_span};

/// One step of a pipeline, turning `SrcCtx` into `DstCtx`.
pub trait PipelineStage: Send + Sync {
    type SrcCtx;
    type DstCtx;

    fn name(&self) -> &'static str;
    fn run(
        &self,
        context: Self::SrcCtx,
        diagnostics: &mut PipelineDiagnostics,
    ) -> Result<Self::DstCtx, PipelineError>;
}

type RunFn<Src, Dst> =
    dyn Fn(Src, &mut PipelineDiagnostics, &PipelineOptions) -> Result<Dst, PipelineError> + Send + Sync;

/// Stages composed into a single callable, in insertion order.
pub struct Pipeline<Src, Dst> {
    stages: Vec<&'static str>,
    run: Box<RunFn<Src, Dst>>,
}

impl<Src, Dst> Pipeline<Src, Dst> {
    pub fn run(
        &self,
        context: Src,
        diagnostics: &mut PipelineDiagnostics,
        options: &PipelineOptions,
    ) -> Result<Dst, PipelineError> {
        (self.run)(context, diagnostics, options)
    }

    pub fn stage_names(&self) -> &[&'static str] {
        &self.stages
    }
}

impl<Src, Dst> std::fmt::Debug for Pipeline<Src, Dst> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("stages", &self.stages).finish()
    }
}

pub struct PipelineBuilder<Src, Dst> {
    pipeline: Pipeline<Src, Dst>,
    _marker: PhantomData<(Src, Dst)>,
}

impl<Src> PipelineBuilder<Src, Src> {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline {
                stages: Vec::new(),
                run: Box::new(|context, _, _| Ok(context)),
            },
            _marker: PhantomData,
        }
    }
}

impl<Src> Default for PipelineBuilder<Src, Src> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Src, Mid> PipelineBuilder<Src, Mid> {
    pub fn add_stage<Next, S>(self, stage: S) -> PipelineBuilder<Src, Next>
    where
        S: PipelineStage<SrcCtx = Mid, DstCtx = Next> + 'static,
        Src: 'static,
        Mid: 'static,
        Next: 'static,
    {
        let name = stage.name();
        let Pipeline { mut stages, run: previous } = self.pipeline;
        stages.push(name);

        let run = move |context: Src,
                        diagnostics: &mut PipelineDiagnostics,
                        options: &PipelineOptions| {
            let mid = previous(context, diagnostics, options)?;
            let _span = debug_span!("stage", name).entered();
            let started = Instant::now();
            let result = stage.run(mid, diagnostics);
            debug!(elapsed_us = started.elapsed().as_micros() as u64, ok = result.is_ok(), "stage finished");
            diagnostics.emit_stage(name, options);
            result.map_err(|err| err.attributed_to(name))
        };

        PipelineBuilder {
            pipeline: Pipeline {
                stages,
                run: Box::new(run),
            },
            _marker: PhantomData,
        }
    }

    pub fn build(self) -> Pipeline<Src, Mid> {
        self.pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tw_core::diagnostics::Diagnostic;

    struct AddOne;

    impl PipelineStage for AddOne {
        type SrcCtx = u32;
        type DstCtx = u32;

        fn name(&self) -> &'static str {
            "add-one"
        }

        fn run(&self, context: u32, diagnostics: &mut PipelineDiagnostics) -> Result<u32, PipelineError> {
            diagnostics.push(Diagnostic::info(format!("saw {context}")));
            Ok(context + 1)
        }
    }

    struct Render;

    impl PipelineStage for Render {
        type SrcCtx = u32;
        type DstCtx = String;

        fn name(&self) -> &'static str {
            "render"
        }

        fn run(&self, context: u32, diagnostics: &mut PipelineDiagnostics) -> Result<String, PipelineError> {
            if context > 10 {
                diagnostics.push(Diagnostic::error("value out of range"));
                return Err(PipelineError::new("inner", "too large"));
            }
            Ok(context.to_string())
        }
    }

    #[test]
    fn stages_run_in_order() {
        let pipeline = PipelineBuilder::new()
            .add_stage(AddOne)
            .add_stage(AddOne)
            .add_stage(Render)
            .build();
        assert_eq!(pipeline.stage_names(), ["add-one", "add-one", "render"]);

        let mut diagnostics = PipelineDiagnostics::default();
        let out = pipeline
            .run(1, &mut diagnostics, &PipelineOptions::default())
            .expect("pipeline succeeds");
        assert_eq!(out, "3");
        assert_eq!(diagnostics.all().count(), 2);
        assert_eq!(diagnostics.for_stage("add-one").count(), 2);
        assert!(diagnostics.items.is_empty());
    }

    #[test]
    fn errors_are_attributed_to_the_failing_stage() {
        let pipeline = PipelineBuilder::new().add_stage(Render).build();
        let mut diagnostics = PipelineDiagnostics::default();
        let err = pipeline
            .run(11, &mut diagnostics, &PipelineOptions::default())
            .expect_err("pipeline fails");
        assert_eq!(err.stage, "render");
        assert_eq!(err.to_string(), "[render] too large");
        assert_eq!(diagnostics.for_stage("render").count(), 1);
    }
}
