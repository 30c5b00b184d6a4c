use std::process::ExitCode;

use colored::Colorize;
use union_input::cli::{CommandLineInterface, init_logging};

fn main() -> ExitCode {
    init_logging();
    match CommandLineInterface::load().run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
