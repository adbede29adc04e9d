use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::debug;

pub const ENV_MAIN_MODULE: &str = "XGO_MAIN_MODULE";
pub const ENV_COMPILE_PKG_DATA_DIR: &str = "XGO_COMPILE_PKG_DATA_DIR";
pub const ENV_TOOLCHAIN_VERSION: &str = "XGO_TOOLCHAIN_VERSION";
pub const ENV_TOOLCHAIN_REVISION: &str = "XGO_TOOLCHAIN_REVISION";
pub const ENV_TOOLCHAIN_VERSION_NUMBER: &str = "XGO_TOOLCHAIN_VERSION_NUMBER";

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|val| !val.trim().is_empty())
}

/// Snapshot of the environment inputs the weaver reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeaveEnv {
    /// Replaces the module path `main` when set.
    pub main_module: Option<String>,
    pub compile_data_dir: Option<PathBuf>,
    pub toolchain_version: Option<String>,
    pub toolchain_revision: Option<String>,
    /// Raw text; validated by the version patcher.
    pub toolchain_version_number: Option<String>,
}

impl WeaveEnv {
    pub fn from_env() -> Self {
        Self {
            main_module: env_non_empty(ENV_MAIN_MODULE),
            compile_data_dir: env_non_empty(ENV_COMPILE_PKG_DATA_DIR).map(PathBuf::from),
            toolchain_version: env_non_empty(ENV_TOOLCHAIN_VERSION),
            toolchain_revision: env_non_empty(ENV_TOOLCHAIN_REVISION),
            toolchain_version_number: env_non_empty(ENV_TOOLCHAIN_VERSION_NUMBER),
        }
    }

    /// Process-wide snapshot, read once.
    pub fn global() -> &'static WeaveEnv {
        static ENV: OnceLock<WeaveEnv> = OnceLock::new();
        ENV.get_or_init(|| {
            let env = WeaveEnv::from_env();
            debug!(?env, "weave environment");
            env
        })
    }

    /// Module path used for attribution: `main` is replaced by the main-module override.
    pub fn effective_module_path<'a>(&'a self, module_path: &'a str) -> &'a str {
        match (&self.main_module, module_path) {
            (Some(main), "main") => main.as_str(),
            _ => module_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_override_only_applies_to_main() {
        let env = WeaveEnv {
            main_module: Some("example.com/app".to_string()),
            ..WeaveEnv::default()
        };
        assert_eq!(env.effective_module_path("main"), "example.com/app");
        assert_eq!(env.effective_module_path("example.com/lib"), "example.com/lib");
        assert_eq!(WeaveEnv::default().effective_module_path("main"), "main");
    }
}
