//! The test-run context shared by every scenario in a process.
//!
//! A [`HarnessContext`] couples the configuration resolver with the mock
//! backend it controls. Test suites hold one context for the whole run (for
//! example behind a process-wide mutex) and call
//! [`HarnessContext::before_scenario`] ahead of each scenario; executors are
//! created fresh per scenario so no response leaks between scenarios.

use crate::config::{ConfigResolver, RunConfiguration};
use crate::error::MockError;
use crate::executor::{BodyCheckExecutor, StatusCheckExecutor};
use crate::mock::{MockBackend, MockSettings, MockStatus};

/// Resolver plus mock backend for one harness run.
#[derive(Debug)]
pub struct HarnessContext {
    resolver: ConfigResolver,
    mock: MockBackend,
}

impl HarnessContext {
    /// Builds a context from explicit parts.
    #[must_use]
    pub const fn new(resolver: ConfigResolver, mock: MockBackend) -> Self {
        Self { resolver, mock }
    }

    /// Standard resolver and default mock settings (fixed port, bundled
    /// fixtures).
    #[must_use]
    pub fn from_environment() -> Self {
        Self::new(
            ConfigResolver::standard(),
            MockBackend::new(MockSettings::default()),
        )
    }

    /// The resolved configuration.
    #[must_use]
    pub fn configuration(&self) -> &RunConfiguration {
        self.resolver.resolve()
    }

    /// Origin that scenarios target.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.resolver.base_uri()
    }

    /// Pre-scenario hook: ensures the mock backend when mocking is enabled.
    ///
    /// # Errors
    ///
    /// Propagates [`MockError`]; a failed start aborts the run.
    pub fn before_scenario(&mut self) -> Result<MockStatus, MockError> {
        let config = self.resolver.resolve();
        self.mock.ensure_started(config)
    }

    /// Fresh status-check executor for a new scenario.
    #[must_use]
    pub fn status_checks(&self) -> StatusCheckExecutor {
        StatusCheckExecutor::new(self.base_uri())
    }

    /// Fresh body-check executor for a new scenario.
    #[must_use]
    pub fn body_checks(&self) -> BodyCheckExecutor {
        BodyCheckExecutor::new(self.base_uri())
    }

    /// The mock backend controlled by this context.
    #[must_use]
    pub const fn mock(&self) -> &MockBackend {
        &self.mock
    }

    /// Stops the mock backend, if running. Returns `true` if one was.
    pub fn shutdown(&mut self) -> bool {
        self.mock.stop()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::{Result, ensure};
    use rstest::rstest;

    use super::HarnessContext;
    use crate::config::{BuiltinDefaults, ConfigResolver, RuntimeOverrides};
    use crate::mock::{MockBackend, MockSettings, MockStatus};

    fn context_with(overrides: RuntimeOverrides) -> HarnessContext {
        let resolver = ConfigResolver::new(vec![Box::new(overrides), Box::new(BuiltinDefaults)]);
        HarnessContext::new(resolver, MockBackend::new(MockSettings::default().with_port(0)))
    }

    #[rstest]
    fn real_backend_mode_skips_the_mock() -> Result<()> {
        let mut context = context_with(
            RuntimeOverrides::new()
                .with_use_mock("false")
                .with_real_url("http://example.test:9000"),
        );
        let status = context.before_scenario()?;
        ensure!(status == MockStatus::Disabled, "unexpected status {status:?}");
        ensure!(context.base_uri() == "http://example.test:9000", "unexpected base uri");
        ensure!(context.mock().server().is_none(), "no server should be tracked");
        Ok(())
    }

    #[rstest]
    fn mock_mode_starts_once_per_context() -> Result<()> {
        let mut context = context_with(RuntimeOverrides::new());
        let first = context.before_scenario()?;
        let second = context.before_scenario()?;
        ensure!(first == MockStatus::Started, "first hook returned {first:?}");
        ensure!(second == MockStatus::Reused, "second hook returned {second:?}");
        ensure!(context.base_uri() == "http://localhost:8080", "unexpected base uri");
        ensure!(context.shutdown(), "shutdown should stop the running server");
        Ok(())
    }
}
