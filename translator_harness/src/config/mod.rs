//! Layered resolution of the harness run configuration.
//!
//! Two values decide where scenarios send their requests: whether the mock
//! backend is in use, and the address of the real translator when it is not.
//! Each value is looked up in an ordered list of [`ConfigSource`]s and the
//! first source with a non-blank answer wins. The standard order is
//! environment overrides, then the persisted configuration file, then the
//! built-in defaults; callers may prepend explicit [`RuntimeOverrides`].
//!
//! Sources that cannot answer (a missing or corrupt file, an unset variable)
//! are skipped with a diagnostic log entry rather than an error, so a broken
//! configuration file always degrades to the defaults.

mod sources;

use std::fmt;
use std::sync::OnceLock;

use camino::Utf8PathBuf;
use tracing::{debug, info};

pub use sources::{BuiltinDefaults, ConfigFile, ConfigSource, EnvOverrides, RuntimeOverrides};

/// Fixed port the mock backend listens on.
pub const MOCK_PORT: u16 = 8080;

/// Base address used by every step while mocking is enabled.
pub const MOCK_BASE_URI: &str = "http://localhost:8080";

/// Real translator address used when no source supplies one.
pub const DEFAULT_REAL_URL: &str = "http://localhost:8081";

/// Prefix for environment variable overrides (`TRANSLATOR_USE_MOCK`,
/// `TRANSLATOR_REAL_URL`).
pub const ENV_PREFIX: &str = "TRANSLATOR_";

/// Location of the persisted configuration file, relative to the crate root.
pub const CONFIG_FILE: &str = "tests/resources/config.toml";

/// Returns the absolute path of the persisted configuration file.
#[must_use]
pub fn default_config_path() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(CONFIG_FILE)
}

/// Configuration keys understood by the resolver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// Boolean-like flag selecting the mock backend.
    UseMock,
    /// Base address of the deployed translator.
    RealUrl,
}

impl ConfigKey {
    /// Property name used in the configuration file.
    #[must_use]
    pub const fn property(self) -> &'static str {
        match self {
            Self::UseMock => "useMock",
            Self::RealUrl => "realUrl",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.property())
    }
}

/// Interprets a boolean-like flag. Only `true`, ignoring ASCII case and
/// surrounding whitespace, enables the flag.
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Effective configuration for one harness run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfiguration {
    mock_enabled: bool,
    base_uri: String,
}

impl RunConfiguration {
    /// Configuration targeting the local mock backend.
    #[must_use]
    pub fn mocked() -> Self {
        Self {
            mock_enabled: true,
            base_uri: MOCK_BASE_URI.to_owned(),
        }
    }

    /// Configuration targeting a deployed translator at `base_uri`.
    #[must_use]
    pub fn real(base_uri: impl Into<String>) -> Self {
        Self {
            mock_enabled: false,
            base_uri: base_uri.into(),
        }
    }

    /// Whether scenarios run against the mock backend.
    #[must_use]
    pub const fn mock_enabled(&self) -> bool {
        self.mock_enabled
    }

    /// Origin that step executors send requests to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }
}

/// Resolves [`RunConfiguration`] from an ordered list of sources.
///
/// Resolution happens once, on first access, and the result is cached for
/// the lifetime of the resolver.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
    resolved: OnceLock<RunConfiguration>,
}

impl ConfigResolver {
    /// Builds a resolver that consults `sources` in order.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn ConfigSource>>) -> Self {
        Self {
            sources,
            resolved: OnceLock::new(),
        }
    }

    /// Environment overrides, the default configuration file, then defaults.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_config_path(default_config_path())
    }

    /// Like [`Self::standard`] but reads the configuration file at `path`.
    #[must_use]
    pub fn with_config_path(path: impl Into<Utf8PathBuf>) -> Self {
        Self::new(vec![
            Box::new(EnvOverrides::new()),
            Box::new(ConfigFile::new(path)),
            Box::new(BuiltinDefaults),
        ])
    }

    /// Places `overrides` ahead of every other source.
    ///
    /// Any previously cached resolution is discarded.
    #[must_use]
    pub fn with_overrides(mut self, overrides: RuntimeOverrides) -> Self {
        self.sources.insert(0, Box::new(overrides));
        self.resolved = OnceLock::new();
        self
    }

    /// Returns the effective configuration, resolving it on first use.
    #[must_use]
    pub fn resolve(&self) -> &RunConfiguration {
        self.resolved.get_or_init(|| self.compute())
    }

    /// Whether scenarios should run against the mock backend.
    #[must_use]
    pub fn is_mock_enabled(&self) -> bool {
        self.resolve().mock_enabled()
    }

    /// Origin that step executors should target.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        self.resolve().base_uri()
    }

    fn compute(&self) -> RunConfiguration {
        let mock_enabled = self
            .lookup(ConfigKey::UseMock)
            .is_none_or(|value| parse_flag(&value));
        if mock_enabled {
            return RunConfiguration::mocked();
        }
        let real_url = self
            .lookup(ConfigKey::RealUrl)
            .unwrap_or_else(|| DEFAULT_REAL_URL.to_owned());
        RunConfiguration::real(real_url)
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        for source in &self.sources {
            let candidate = source
                .lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty());
            if let Some(value) = candidate {
                info!(source = source.name(), %key, %value, "configuration value resolved");
                return Some(value);
            }
            debug!(source = source.name(), %key, "no value from source; trying the next one");
        }
        None
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|source| source.name()).collect();
        f.debug_struct("ConfigResolver")
            .field("sources", &names)
            .field("resolved", &self.resolved.get())
            .finish()
    }
}
