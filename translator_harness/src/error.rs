//! Error types for the translator acceptance harness.
//!
//! Failures fall into four families. Configuration file problems are
//! recovered locally and only ever logged, so [`ConfigFileError`] never
//! reaches callers of the resolver. Mock start-up failures abort the run.
//! Connectivity failures and assertion mismatches are both reported per
//! step through [`StepError`], but as distinct variants so a refused
//! connection is never mistaken for a status or body mismatch.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Problems reading the persisted configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// No file exists at the configured resource path.
    #[error("configuration file '{path}' was not found")]
    Missing {
        /// Path that was probed.
        path: Utf8PathBuf,
    },
    /// The file exists but could not be read.
    #[error("configuration file '{path}' could not be read: {source}")]
    Read {
        /// Path of the unreadable file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file could not be deserialised.
    #[error("configuration file '{path}' could not be parsed: {source}")]
    Parse {
        /// Path of the offending file.
        path: Utf8PathBuf,
        /// Underlying error reported by `figment`.
        #[source]
        source: Box<figment::Error>,
    },
}

/// Problems loading mock fixtures from disk.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A mapping file or the mappings directory could not be read.
    #[error("failed to read fixture '{path}': {source}")]
    Read {
        /// Path that failed to load.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A mapping file is not a valid stub mapping.
    #[error("invalid stub mapping in '{path}': {source}")]
    Parse {
        /// Path of the malformed mapping.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A mapping parsed but describes a response that cannot be served.
    #[error("unusable stub mapping in '{path}': {message}")]
    Invalid {
        /// Path of the offending mapping.
        path: Utf8PathBuf,
        /// What is wrong with it.
        message: String,
    },
    /// A mapping referenced a body file that could not be read.
    #[error("failed to read response body file '{path}': {source}")]
    BodyFile {
        /// Resolved body file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failures starting the mock backend. These are fatal to the run.
#[derive(Debug, Error)]
pub enum MockError {
    /// The fixed mock port could not be bound.
    #[error("failed to bind mock backend to {address}: {source}")]
    Bind {
        /// Address the mock server attempted to listen on.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Fixtures could not be loaded into the mock server.
    #[error(transparent)]
    Fixture(#[from] FixtureError),
}

/// Failures raised while executing a scenario step.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StepError {
    /// The request never produced an HTTP response.
    #[error("could not reach the translator at {url}: {reason}")]
    Connectivity {
        /// URL the step attempted to call.
        url: String,
        /// Human-readable transport failure.
        reason: String,
    },
    /// The response status did not match the expectation.
    #[error("expected response status {expected}, got {actual}")]
    StatusMismatch {
        /// Status the scenario expected.
        expected: u16,
        /// Status the endpoint returned.
        actual: u16,
    },
    /// The response body did not match the expectation.
    #[error("expected response body {expected:?}, got {actual:?}")]
    BodyMismatch {
        /// Body the scenario expected.
        expected: String,
        /// Body the endpoint returned.
        actual: String,
    },
    /// An assertion step ran before any request was issued.
    #[error("no response has been captured for the {step} step")]
    NoResponse {
        /// Name of the assertion that found nothing to check.
        step: &'static str,
    },
}

impl StepError {
    /// Returns `true` when the failure is a transport problem rather than an
    /// assertion mismatch.
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

/// Top-level error for harness entry points.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The mock backend could not be started.
    #[error("mock backend start-up failed: {0}")]
    Mock(#[from] MockError),
    /// A scenario step failed.
    #[error(transparent)]
    Step(#[from] StepError),
    /// A report could not be written.
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

/// Convenience alias for harness results.
pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

