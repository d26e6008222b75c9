//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(config: &CliConfig) -> Result<(), CliError>`
//! - Wire adapters through `bootstrap`, then drive the supervisor
//! - Report on the terminal; exit codes come from the returned `CliError`

pub mod probe;
pub mod run;
