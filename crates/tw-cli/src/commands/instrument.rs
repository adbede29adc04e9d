//! Module instrumentation command implementation

use crate::commands::common::{weave_module, ModuleArgs};
use crate::source::is_synthesized;
use crate::{cli::CliConfig, CliError, Result};
use clap::Args;
use console::style;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tw_core::config::WeaveEnv;
use tw_golang::{splice, GoEmitter, TextEdit};
use tw_weaver::dump::{descriptors_json, dump_path};
use tw_weaver::ConstPatch;

/// Arguments for the instrument command
#[derive(Debug, Clone, Args)]
pub struct InstrumentArgs {
    #[command(flatten)]
    pub module: ModuleArgs,
    /// Directory receiving the synthesized units (defaults to the module directory)
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
    /// Directory receiving the descriptor dump (overrides XGO_COMPILE_PKG_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

/// Execute the instrument command
pub fn instrument_command(args: InstrumentArgs, config: &CliConfig) -> Result<()> {
    let mut env = WeaveEnv::global().clone();
    if let Some(dir) = args.data_dir.clone().or_else(|| config.output.data_dir.clone()) {
        env.compile_data_dir = Some(dir);
    }
    let data_dir = env.compile_data_dir.clone();

    let woven = weave_module(&args.module, config, env)?;
    let out_dir = args
        .out
        .clone()
        .or_else(|| config.output.out_dir.clone())
        .unwrap_or_else(|| args.module.dir.clone());
    fs::create_dir_all(&out_dir)?;
    remove_stale_units(&out_dir)?;

    for unit in &woven.output.units {
        let path = out_dir.join(&unit.name);
        fs::write(&path, GoEmitter::render(unit))?;
        info!(unit = %path.display(), "unit written");
    }

    for (file_index, edits) in group_patches(&woven.output.patches) {
        let (Some(file), Some(source)) = (
            woven.module.files.get(file_index),
            woven.module.sources.get(file_index),
        ) else {
            continue;
        };
        let patched = splice(source, &edits).map_err(|err| CliError::Patch(format!("{}: {}", file.name, err)))?;
        let path = out_dir.join(&file.name);
        fs::write(&path, patched)?;
        info!(file = %path.display(), constants = edits.len(), "version constants patched");
    }

    if let Some(dir) = &data_dir {
        write_dump(dir, &woven.output.module_path, woven.session.descriptors())?;
    }

    match &woven.output.skipped {
        Some(reason) => println!(
            "{} {} skipped: {}",
            style("○").yellow(),
            woven.output.module_path,
            reason
        ),
        None => println!(
            "{} {}: {} declaration(s), {} unit(s) written to {}",
            style("✓").green(),
            woven.output.module_path,
            woven.session.descriptors().len(),
            woven.output.units.len(),
            out_dir.display()
        ),
    }
    Ok(())
}

fn group_patches(patches: &[ConstPatch]) -> BTreeMap<usize, Vec<TextEdit>> {
    let mut grouped: BTreeMap<usize, Vec<TextEdit>> = BTreeMap::new();
    for patch in patches {
        grouped.entry(patch.file_index).or_default().push(patch.text_edit());
    }
    grouped
}

fn remove_stale_units(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let stale = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_synthesized);
        if stale && path.is_file() {
            debug!(file = %path.display(), "removing previous unit");
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn write_dump(dir: &Path, module_path: &str, descriptors: &[tw_weaver::Descriptor]) -> Result<()> {
    fs::create_dir_all(dir)?;
    let path = dump_path(dir, module_path);
    fs::write(&path, descriptors_json(descriptors)?)?;
    info!(dump = %path.display(), descriptors = descriptors.len(), "descriptors dumped");
    Ok(())
}
