mod flood;
mod key;
mod utils;

use crate::cli::{Cli, Commands, GlobalOptions};
use cutout::MaskResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> MaskResult<()> {
    let Cli { global, command } = cli;
    dispatch(&global, command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(global: &GlobalOptions, command: Commands) -> MaskResult<()> {
    match command {
        Commands::Key(cmd) => key::run(global, cmd),
        Commands::Flood(cmd) => flood::run(global, cmd),
    }
}
