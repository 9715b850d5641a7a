//! `srm completions <shell>` – generate shell completions.

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;

pub fn run_completions(shell: Shell) -> Result<()> {
    let mut cmd = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut cmd, "srm", &mut std::io::stdout());
    Ok(())
}
