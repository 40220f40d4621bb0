//! Shell completion generation.

use crate::cli::Cli;
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::Shell;

/// Generate completions for the given shell on stdout.
///
/// # Errors
///
/// Infallible in practice; kept uniform with the other commands.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "recall", &mut std::io::stdout());
    Ok(())
}
