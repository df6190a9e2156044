//! jobdeps CLI Application
//!
//! Prints an execution order for a list of jobs, or reports a circular
//! dependency.

// CLI binary needs to output to stdout - this is intentional
#![allow(clippy::print_stdout)]

use jobdeps::cli::{self, Cli, CliError, EXIT_ERROR, render_error};
use jobdeps::tracing::init_tracing;

fn main() {
    let cli = cli::parse();

    let exit_code = match run_main(&cli) {
        Ok(code) => code,
        Err(err) => {
            render_error(err, cli.json);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

fn run_main(cli: &Cli) -> Result<i32, CliError> {
    init_tracing(cli.tracing_config())?;

    let outcome = jobdeps::run(cli)?;
    let rendered = if cli.json {
        outcome.to_json()?
    } else {
        outcome.to_text()
    };
    println!("{rendered}");

    Ok(outcome.exit_code())
}
