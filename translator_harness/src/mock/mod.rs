//! Lifecycle of the in-process mock translator.
//!
//! [`MockBackend`] owns at most one running [`MockServerHandle`]. Its
//! [`MockBackend::ensure_started`] operation is the pre-scenario hook: it is
//! a no-op when mocking is disabled, reuses a server that is still
//! listening, and otherwise binds a fresh server on the fixed port and loads
//! the fixture tree into it.
//!
//! The port is fixed because step executors target a fixed base address, so
//! a bind failure is fatal rather than retried on another port. Separate
//! processes running scenarios concurrently therefore need separate ports.

pub mod fixtures;

use std::fmt;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use mockito::ServerOpts;
use tracing::{debug, info, warn};

use crate::config::{MOCK_PORT, RunConfiguration};
use crate::error::MockError;

/// Fixture tree location, relative to the crate root.
pub const FIXTURES_DIR: &str = "tests/resources";

const LIVENESS_TIMEOUT: Duration = Duration::from_millis(250);

/// Returns the absolute path of the default fixture tree.
#[must_use]
pub fn default_fixtures_dir() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(FIXTURES_DIR)
}

/// Where and what the mock backend serves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockSettings {
    host: &'static str,
    port: u16,
    fixtures_dir: Utf8PathBuf,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1",
            port: MOCK_PORT,
            fixtures_dir: default_fixtures_dir(),
        }
    }
}

impl MockSettings {
    /// Listens on `port` instead of the fixed default. Port `0` asks the
    /// operating system for an ephemeral port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Serves fixtures from `dir` instead of the default tree.
    #[must_use]
    pub fn with_fixtures_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Configured port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Root of the fixture tree.
    #[must_use]
    pub fn fixtures_dir(&self) -> &Utf8Path {
        &self.fixtures_dir
    }

    fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Result of a [`MockBackend::ensure_started`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockStatus {
    /// Mocking is disabled; nothing was started.
    Disabled,
    /// A new server was bound and loaded with fixtures.
    Started,
    /// The tracked server was still listening and has been reused.
    Reused,
}

/// A running mock server and the stubs registered with it.
///
/// Dropping the handle drops the server.
pub struct MockServerHandle {
    server: mockito::Server,
    address: SocketAddr,
    stubs: Vec<mockito::Mock>,
}

impl MockServerHandle {
    /// Loads fixtures and binds a mock server according to `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`MockError::Fixture`] when the fixture tree is unusable and
    /// [`MockError::Bind`] when the port is already taken.
    ///
    /// # Panics
    ///
    /// mockito panics if the port is taken by another process after the
    /// pre-bind probe succeeded and before the server binds it.
    pub fn start(settings: &MockSettings) -> Result<Self, MockError> {
        let mappings = fixtures::load_mappings(&settings.fixtures_dir)?;
        if settings.port != 0 {
            probe_port(settings)?;
        }
        let mut server = mockito::Server::new_with_opts(ServerOpts {
            host: settings.host,
            port: settings.port,
            ..ServerOpts::default()
        });
        let stubs = mappings
            .iter()
            .map(|mapping| mapping.register(&mut server))
            .collect();
        let address = server.socket_address();
        Ok(Self {
            server,
            address,
            stubs,
        })
    }

    /// Socket address the server is bound to.
    #[must_use]
    pub const fn address(&self) -> SocketAddr {
        self.address
    }

    /// Base URL of the server, e.g. `http://127.0.0.1:8080`.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Number of stubs registered from the fixture tree.
    #[must_use]
    pub fn stub_count(&self) -> usize {
        self.stubs.len()
    }

    /// Returns `true` while the server accepts TCP connections.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        TcpStream::connect_timeout(&self.address, LIVENESS_TIMEOUT).is_ok()
    }
}

impl fmt::Debug for MockServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockServerHandle")
            .field("address", &self.address)
            .field("stubs", &self.stubs.len())
            .finish_non_exhaustive()
    }
}

/// Binds and releases the configured address so an occupied port surfaces
/// as an error instead of a panic inside the server thread.
///
/// The probe cannot reserve the port: another process that binds it between
/// this check and [`mockito::Server::new_with_opts`] still makes mockito
/// panic. Call this immediately before starting the server to keep that
/// window small.
fn probe_port(settings: &MockSettings) -> Result<(), MockError> {
    let address = settings.address();
    TcpListener::bind(address.as_str())
        .map(drop)
        .map_err(|source| MockError::Bind { address, source })
}

/// Starts, reuses and stops the process's mock server.
#[derive(Debug, Default)]
pub struct MockBackend {
    settings: MockSettings,
    server: Option<MockServerHandle>,
}

impl MockBackend {
    /// Creates a backend that has not started a server yet.
    #[must_use]
    pub const fn new(settings: MockSettings) -> Self {
        Self {
            settings,
            server: None,
        }
    }

    /// Ensures a listening mock server exists when `config` enables mocking.
    ///
    /// Idempotent: once a server is running, later calls reuse it.
    ///
    /// # Errors
    ///
    /// Propagates [`MockError`] when a new server cannot be started.
    pub fn ensure_started(&mut self, config: &RunConfiguration) -> Result<MockStatus, MockError> {
        if !config.mock_enabled() {
            info!(
                base_uri = config.base_uri(),
                "mocking disabled; using the real translator endpoint"
            );
            return Ok(MockStatus::Disabled);
        }
        if let Some(server) = &self.server {
            if server.is_listening() {
                debug!(address = %server.address(), "reusing running mock backend");
                return Ok(MockStatus::Reused);
            }
            warn!(address = %server.address(), "mock backend stopped listening; restarting");
        }
        self.server = None;
        let handle = MockServerHandle::start(&self.settings)?;
        info!(
            address = %handle.address(),
            stubs = handle.stub_count(),
            fixtures = %self.settings.fixtures_dir,
            "mock backend started"
        );
        self.server = Some(handle);
        Ok(MockStatus::Started)
    }

    /// Drops the tracked server. Returns `true` if one was running.
    pub fn stop(&mut self) -> bool {
        let stopped = self.server.take();
        if let Some(server) = &stopped {
            info!(address = %server.address(), "mock backend stopped");
        }
        stopped.is_some()
    }

    /// The tracked server, if one has been started.
    #[must_use]
    pub const fn server(&self) -> Option<&MockServerHandle> {
        self.server.as_ref()
    }

    /// Settings used when starting a server.
    #[must_use]
    pub const fn settings(&self) -> &MockSettings {
        &self.settings
    }
}
