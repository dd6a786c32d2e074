//! sitekit: move identity platform site settings around.
//!
//! # Usage
//!
//! ```text
//! sitekit [--userKey KEY] [--userSecret SECRET] [--partnerId ID]
//!         [--task export|import|copy|validate] [--settings schema,screensets,policies]
//!         [--sourceApiKey API_KEY | --sourceFile FILE] [--destinationApiKeys A,B]
//!         [--apiDomain DOMAIN] [--proxy URL] [--timeout SECS] [--workDir DIR]
//!         [--json] [--verbose] [--state TOKEN]
//! ```
//!
//! Whatever is not supplied is asked for on the terminal.

mod args;
mod prompt;
mod render;
mod session;

use std::process::ExitCode;

use clap::Parser;

use args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match session::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            render::print_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so results on stdout stay clean. `RUST_LOG` wins
/// unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
