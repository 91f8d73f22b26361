//! Command-line tool for Skout BIT archives: list, extract, repack.

mod commands;
mod error;
mod palettes;
mod sink;

use argh::FromArgs;
use commands::extract::{handle_extract_command, ExtractCmd};
use commands::list::{handle_list_command, ListCmd};
use commands::repack::{handle_repack_command, RepackRawCmd};
use std::process::ExitCode;

#[derive(FromArgs, Debug)]
/// Tools for the Skout BIT archive format.
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Commands {
    List(ListCmd),
    Extract(ExtractCmd),
    RepackRaw(RepackRawCmd),
}

fn main() -> ExitCode {
    let cli: Cli = argh::from_env();

    let result = match &cli.command {
        Commands::List(cmd) => handle_list_command(cmd),
        Commands::Extract(cmd) => handle_extract_command(cmd),
        Commands::RepackRaw(cmd) => handle_repack_command(cmd),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
