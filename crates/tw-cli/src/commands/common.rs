//! Arguments and helpers shared by the module-level commands.

use clap::Args;
use std::path::PathBuf;
use tw_core::config::WeaveEnv;
use tw_core::diagnostics::{DiagnosticDisplayOptions, DiagnosticManager};
use tw_pipeline::{DebugOptions, PipelineOptions};
use tw_weaver::{WeaveOutput, WeaveSession, Weaver};

use crate::cli::CliConfig;
use crate::source::{load_module, ModuleSources};
use crate::Result;

/// Module selection and weaving switches.
#[derive(Debug, Clone, Args)]
pub struct ModuleArgs {
    /// Directory holding the module's Go files
    pub dir: PathBuf,
    /// Import path the module is compiled under
    #[arg(long, short = 'm')]
    pub module_path: String,
    /// Compile as a standard-library module
    #[arg(long = "std")]
    pub std_mode: bool,
    /// Instrument package-level variables and constants
    #[arg(long)]
    pub var_trap: bool,
    /// Registration statements per synthesized unit
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl ModuleArgs {
    /// Command-line switches win over the configuration file.
    pub fn pipeline_options(&self, config: &CliConfig, verbose: bool) -> PipelineOptions {
        PipelineOptions {
            std_mode: self.std_mode || config.weave.std_mode,
            var_trap: self.var_trap || config.weave.var_trap,
            batch_size: self.batch_size.unwrap_or(config.weave.batch_size),
            debug: DebugOptions {
                print_descriptors: config.weave.print_descriptors,
                verbose,
            },
        }
    }
}

/// A woven module together with what it was read from.
pub struct WovenModule {
    pub module: ModuleSources,
    pub output: WeaveOutput,
    pub session: WeaveSession,
}

/// Load the module directory and weave it with the process environment.
pub fn weave_module(args: &ModuleArgs, config: &CliConfig, env: WeaveEnv) -> Result<WovenModule> {
    let options = args.pipeline_options(config, tracing::enabled!(tracing::Level::DEBUG));
    let weaver = Weaver::new(options, env)?;

    let mut module = load_module(&args.dir)?;
    if !module.diagnostics.is_empty() {
        let display = DiagnosticDisplayOptions::new(weaver.options().debug.verbose);
        DiagnosticManager::emit(&module.diagnostics, Some("parse"), &display);
    }

    let files = std::mem::take(&mut module.files);
    let mut session = WeaveSession::new();
    let output = weaver.weave(&args.module_path, files, &mut session)?;
    module.files = session.take_files();
    Ok(WovenModule {
        module,
        output,
        session,
    })
}
