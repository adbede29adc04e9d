use thiserror::Error;
use tw_pipeline::PipelineError;

/// Invariant violations that abort weaving. Policy exclusions are not errors;
/// see [`crate::eligibility::SkipReason`].
#[derive(Error, Debug)]
pub enum WeaveError {
    #[error("invalid batch size {0}: must be positive")]
    InvalidBatchSize(usize),
    #[error(
        "registration entry point signature changed: expected `{expected}`, generated `{generated}`; regenerate the runtime contract"
    )]
    ContractDrift { expected: String, generated: String },
    #[error("receiver of `{func}` has unsupported type `{ty}`")]
    UnsupportedReceiver { func: String, ty: String },
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

pub type Result<T> = std::result::Result<T, WeaveError>;
