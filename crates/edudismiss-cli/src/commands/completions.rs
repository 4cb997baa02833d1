use std::fs::File;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::Cli;
use crate::error::CliError;

/// Print the completion script for `shell`, or write it to `output_path`.
pub fn run_completions(shell: Shell, output_path: Option<&Path>) -> Result<(), CliError> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    match output_path {
        Some(path) => {
            clap_complete::generate(shell, &mut command, name, &mut File::create(path)?);
            println!("{}", path.display());
        }
        None => clap_complete::generate(shell, &mut command, name, &mut io::stdout()),
    }
    Ok(())
}
