//! Descriptor inspection command implementation

use crate::commands::common::{weave_module, ModuleArgs};
use crate::{cli::CliConfig, Result};
use clap::Args;
use tw_core::config::WeaveEnv;
use tw_weaver::dump::descriptors_json;

/// Arguments for the inspect command
#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub module: ModuleArgs,
}

/// Print the descriptors that would be registered, as JSON
pub fn inspect_command(args: InspectArgs, config: &CliConfig) -> Result<()> {
    let woven = weave_module(&args.module, config, WeaveEnv::global().clone())?;
    if let Some(reason) = &woven.output.skipped {
        eprintln!("module {} skipped: {}", woven.output.module_path, reason);
    }
    println!("{}", descriptors_json(woven.session.descriptors())?);
    Ok(())
}
