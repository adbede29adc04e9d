/// Registration statements per synthesized initializer.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Configuration for one weaving invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// The module is compiled as part of the standard library.
    pub std_mode: bool,
    /// Instrument package-level variables and constants.
    pub var_trap: bool,
    /// Maximum registration statements per synthesized unit.
    pub batch_size: usize,
    /// Debug options
    pub debug: DebugOptions,
}

/// Debug options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOptions {
    /// Print the extracted descriptors
    pub print_descriptors: bool,
    /// Enable verbose output
    pub verbose: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            std_mode: false,
            var_trap: false,
            batch_size: DEFAULT_BATCH_SIZE,
            debug: DebugOptions::default(),
        }
    }
}
