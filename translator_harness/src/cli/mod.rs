//! Command-line front end for running translator checks outside a test
//! suite.
//!
//! Global flags act as runtime overrides and therefore beat both the
//! environment and the configuration file.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigResolver, RuntimeOverrides};
use crate::context::HarnessContext;
use crate::error::{HarnessError, StepError};
use crate::executor::ScenarioOutcome;
use crate::mock::{MockBackend, MockSettings, MockStatus};

/// Acceptance checks for the translation endpoint.
#[derive(Debug, Parser)]
#[command(name = "translator-harness", version, about)]
pub struct Cli {
    /// Use the mock backend (`true`, case-insensitive) or the real service.
    #[arg(long, global = true, value_name = "BOOL")]
    pub use_mock: Option<String>,
    /// Base address of the real translator.
    #[arg(long, global = true, value_name = "URL")]
    pub real_url: Option<String>,
    /// Configuration file to read instead of the bundled one.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
    /// Action to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of [`Cli`].
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the resolved configuration.
    Config,
    /// Start the mock backend and keep it running.
    ServeMock,
    /// Request a translation and check the response.
    Check(CheckArgs),
}

/// Arguments for [`Command::Check`].
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Text to translate.
    #[arg(long)]
    pub query: String,
    /// Target locale.
    #[arg(long)]
    pub locale: String,
    /// Expected status, checked without following redirects.
    #[arg(long, value_name = "CODE")]
    pub expect_status: Option<u16>,
    /// Expected body, checked after following redirects.
    #[arg(long, value_name = "TEXT")]
    pub expect_body: Option<String>,
}

/// How a command finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The command ran to completion and every check passed.
    Finished,
    /// This many checks failed.
    Failed(usize),
    /// The mock backend is running; the caller should keep the process alive.
    Serving,
}

/// Outcome of one check run by [`Command::Check`].
#[derive(Debug)]
pub struct CheckResult {
    /// Name of the check.
    pub check: &'static str,
    /// Captured response, or why the check failed.
    pub result: Result<ScenarioOutcome, StepError>,
}

impl Cli {
    /// Builds the resolver described by the global flags.
    #[must_use]
    pub fn resolver(&self) -> ConfigResolver {
        let resolver = self
            .config
            .clone()
            .map_or_else(ConfigResolver::standard, |path| {
                ConfigResolver::with_config_path(path)
            });
        let overrides = RuntimeOverrides::from_parts(self.use_mock.clone(), self.real_url.clone());
        if overrides.is_empty() {
            resolver
        } else {
            resolver.with_overrides(overrides)
        }
    }

    /// Builds a harness context for this invocation.
    #[must_use]
    pub fn context(&self) -> HarnessContext {
        HarnessContext::new(self.resolver(), MockBackend::new(MockSettings::default()))
    }
}

/// Runs `cli` against `context`, writing a human-readable report to `out`.
///
/// # Errors
///
/// Returns [`HarnessError::Mock`] when the mock backend cannot start and
/// [`HarnessError::Report`] when the report cannot be written.
pub fn execute(
    cli: &Cli,
    context: &mut HarnessContext,
    out: &mut impl Write,
) -> Result<Completion, HarnessError> {
    match &cli.command {
        Command::Config => {
            let config = context.configuration();
            writeln!(out, "mockEnabled = {}", config.mock_enabled())?;
            writeln!(out, "baseUri = {}", config.base_uri())?;
            Ok(Completion::Finished)
        }
        Command::ServeMock => match context.before_scenario()? {
            MockStatus::Disabled => {
                writeln!(out, "mocking is disabled; nothing to serve")?;
                Ok(Completion::Finished)
            }
            MockStatus::Started | MockStatus::Reused => {
                writeln!(out, "mock backend listening at {}", context.base_uri())?;
                Ok(Completion::Serving)
            }
        },
        Command::Check(args) => {
            context.before_scenario()?;
            let results = run_checks(context, args);
            let mut failures = 0;
            for CheckResult { check, result } in &results {
                match result {
                    Ok(outcome) => writeln!(
                        out,
                        "PASS {check}: status {} body {:?}",
                        outcome.status, outcome.body
                    )?,
                    Err(err) => {
                        failures += 1;
                        writeln!(out, "FAIL {check}: {err}")?;
                    }
                }
            }
            Ok(if failures == 0 {
                Completion::Finished
            } else {
                Completion::Failed(failures)
            })
        }
    }
}

/// Runs the checks requested by `args`. Without expectations, the body
/// check runs unasserted and reports what the endpoint returned.
#[must_use]
pub fn run_checks(context: &HarnessContext, args: &CheckArgs) -> Vec<CheckResult> {
    let mut results = Vec::new();
    if let Some(expected) = args.expect_status {
        let mut executor = context.status_checks();
        let requested = executor
            .request_translation(&args.query, &args.locale)
            .map(ScenarioOutcome::clone);
        let result = requested.and_then(|outcome| executor.assert_status(expected).map(|()| outcome));
        results.push(CheckResult {
            check: "status check",
            result,
        });
    }
    if args.expect_body.is_some() || args.expect_status.is_none() {
        let mut executor = context.body_checks();
        let requested = executor
            .translate(&args.query, &args.locale)
            .map(ScenarioOutcome::clone);
        let result = match &args.expect_body {
            Some(expected) => {
                requested.and_then(|outcome| executor.assert_body(expected).map(|()| outcome))
            }
            None => requested,
        };
        results.push(CheckResult {
            check: "body check",
            result,
        });
    }
    results
}
