//! Runtime contract check command implementation

use crate::{cli::CliConfig, Result};
use clap::Args;
use console::style;
use tw_weaver::consts::REGISTER_FUNC;
use tw_weaver::contract::{self, EXPECTED_REGISTER_FUNC_SIGNATURE};

/// Arguments for the check-contract command
#[derive(Debug, Clone, Args)]
pub struct CheckContractArgs {}

/// Execute the check-contract command
pub fn check_contract_command(_args: CheckContractArgs, _config: &CliConfig) -> Result<()> {
    contract::verify()?;
    println!(
        "{} {} {}",
        style("✓").green(),
        REGISTER_FUNC,
        EXPECTED_REGISTER_FUNC_SIGNATURE
    );
    Ok(())
}
