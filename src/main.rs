use clap::error::ErrorKind;
use clap::Parser;

use crate::cli::Cli;
use gltf_rework::run;

mod cli;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            if matches!(
                error.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) {
                error.exit()
            }

            error.print().ok();
            std::process::exit(gltf_rework::ERROR_BAD_ARGUMENTS);
        }
    };

    std::process::exit(run(cli.into()));
}
