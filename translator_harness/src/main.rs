//! `translator-harness` entry-point: resolve configuration, optionally start
//! the mock backend, and run translation checks.

use std::io::Write;

use clap::Parser;
use color_eyre::eyre::eyre;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use translator_harness::cli::{Cli, Completion, execute};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();
    let mut context = cli.context();
    let completion = {
        let mut stdout = std::io::stdout().lock();
        let completion = execute(&cli, &mut context, &mut stdout)?;
        stdout.flush()?;
        completion
    };
    match completion {
        Completion::Finished => Ok(()),
        Completion::Failed(count) => Err(eyre!("{count} check(s) failed")),
        Completion::Serving => loop {
            // The mock server runs on its own thread; park until killed.
            std::thread::park();
        },
    }
}

/// Logs to stderr so reports on stdout stay machine-readable.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();
}
