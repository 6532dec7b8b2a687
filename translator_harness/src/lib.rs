//! Acceptance-test harness for a translation HTTP endpoint.
//!
//! The same scenarios run against either an in-process mock backend that
//! replays canned fixtures or a deployed translator, selected by layered
//! configuration:
//!
//! - [`config`] resolves whether to mock and which address to target;
//! - [`mock`] starts, reuses and stops the fixture-backed mock server;
//! - [`executor`] issues translation requests and checks their outcome;
//! - [`context`] ties these together for one test run.
//!
//! ```rust,no_run
//! use translator_harness::HarnessContext;
//!
//! # fn main() -> Result<(), translator_harness::HarnessError> {
//! let mut context = HarnessContext::from_environment();
//! context.before_scenario()?;
//! let mut step = context.body_checks();
//! step.translate("hello", "es")?;
//! step.assert_body("hola")?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod mock;

#[cfg(test)]
pub mod test_support;

pub use config::{ConfigResolver, RunConfiguration, RuntimeOverrides};
pub use context::HarnessContext;
pub use error::{ConfigFileError, FixtureError, HarnessError, MockError, Result, StepError};
pub use executor::{BodyCheckExecutor, RedirectPolicy, ScenarioOutcome, StatusCheckExecutor};
pub use mock::{MockBackend, MockSettings, MockStatus};
