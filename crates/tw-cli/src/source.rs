//! Loading a Go module directory into the declaration model.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tw_core::ast::SourceFile;
use tw_core::diagnostics::Diagnostic;
use tw_core::frontend::LanguageFrontend;
use tw_golang::GoFrontend;
use tw_weaver::consts::{BATCH_UNIT_BASE, HELPER_UNIT_NAME};

use crate::{CliError, Result};

/// A module as read from disk. `sources[i]` is the text of `files[i]`.
#[derive(Debug)]
pub struct ModuleSources {
    pub dir: PathBuf,
    pub files: Vec<SourceFile>,
    pub sources: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Files the Go compiler would build for the module, sorted by name. Test
/// files and previously synthesized units are left out.
pub fn module_file_names(dir: &Path, frontend: &dyn LanguageFrontend) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "Module directory does not exist: {}",
            dir.display()
        )));
    }
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !frontend.accepts(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if name.ends_with("_test.go") || is_synthesized(name) {
            debug!(file = name, "skipping");
            continue;
        }
        paths.push(path);
    }
    paths.sort();
    Ok(paths)
}

pub fn is_synthesized(name: &str) -> bool {
    name == HELPER_UNIT_NAME || name.starts_with(BATCH_UNIT_BASE)
}

pub fn load_module(dir: &Path) -> Result<ModuleSources> {
    let frontend = GoFrontend::new();
    let paths = module_file_names(dir, &frontend)?;
    if paths.is_empty() {
        warn!(dir = %dir.display(), "no Go files found");
    }

    let mut module = ModuleSources {
        dir: dir.to_path_buf(),
        files: Vec::with_capacity(paths.len()),
        sources: Vec::with_capacity(paths.len()),
        diagnostics: Vec::new(),
    };
    for path in paths {
        let source = fs::read_to_string(&path)?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let parsed = frontend
            .parse(&source, &name, Some(&path))
            .map_err(|err| CliError::Parse(err.to_string()))?;
        module.diagnostics.extend(parsed.diagnostics);
        module.files.push(parsed.file);
        module.sources.push(source);
    }
    check_single_package(&module.files)?;
    Ok(module)
}

fn check_single_package(files: &[SourceFile]) -> Result<()> {
    let Some(first) = files.first() else {
        return Ok(());
    };
    if let Some(other) = files.iter().find(|file| file.package != first.package) {
        return Err(CliError::InvalidInput(format!(
            "found packages {} ({}) and {} ({})",
            first.package, first.name, other.package, other.name
        )));
    }
    Ok(())
}
