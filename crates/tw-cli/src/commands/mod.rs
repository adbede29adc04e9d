//! Command implementations for the trapweave CLI

pub mod check_contract;
pub mod common;
pub mod inspect;
pub mod instrument;

// Re-export command functions
pub use check_contract::check_contract_command;
pub use inspect::inspect_command;
pub use instrument::instrument_command;
