//! Compile-time registration weaver.
//!
//! Given a parsed module, decides whether it may be instrumented, extracts a
//! descriptor per declaration and synthesizes the units that register every
//! descriptor with the runtime at initialization time.

pub mod batch;
pub mod consts;
pub mod context;
pub mod contract;
mod contract_gen;
pub mod descriptor;
pub mod dump;
pub mod eligibility;
pub mod error;
pub mod extract;
pub mod helper;
pub mod position;
pub mod receiver;
pub mod stages;
pub mod synth;
pub mod trap_pair;
pub mod version;
pub mod weaver;

pub use context::{ModuleContext, WeaveSession};
pub use descriptor::{DeclKind, DeclShape, Descriptor, Origin, Receiver};
pub use eligibility::{is_declaration_allowed, is_module_skipped, SkipReason};
pub use error::{Result, WeaveError};
pub use position::PositionIndex;
pub use version::{ConstPatch, VersionStamp};
pub use weaver::{WeaveOutput, Weaver};
