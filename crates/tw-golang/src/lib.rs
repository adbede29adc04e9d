//! Go language support for trapweave.

pub mod emitter;
pub mod frontend;
pub mod parser;
pub mod splice;

pub use emitter::GoEmitter;
pub use frontend::GoFrontend;
pub use parser::GoParser;
pub use splice::{splice, TextEdit};
