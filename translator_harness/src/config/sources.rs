//! Configuration sources consulted by [`super::ConfigResolver`].

use std::sync::OnceLock;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::warn;

use super::{ConfigKey, DEFAULT_REAL_URL, ENV_PREFIX};
use crate::error::ConfigFileError;

/// A named provider of optional configuration values.
pub trait ConfigSource: Send + Sync {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Returns the raw value for `key`, or `None` when this source is silent.
    fn lookup(&self, key: ConfigKey) -> Option<String>;
}

/// A scalar as `figment` presents it. Environment values such as `0` or
/// `2.5` arrive as numbers, so every scalar is read back as text and the
/// flag check decides what it means.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Other(IgnoredAny),
}

impl RawValue {
    fn into_text(self, origin: &str, key: ConfigKey) -> Option<String> {
        match self {
            Self::Bool(flag) => Some(flag.to_string()),
            Self::Text(text) => Some(text),
            Self::Unsigned(number) => Some(number.to_string()),
            Self::Signed(number) => Some(number.to_string()),
            Self::Float(number) => Some(number.to_string()),
            Self::Other(_) => {
                warn!(source = origin, %key, "ignoring value that is not a scalar");
                None
            }
        }
    }
}

/// Explicit overrides supplied at run time, for example from command-line
/// flags. These take precedence over every other source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeOverrides {
    use_mock: Option<String>,
    real_url: Option<String>,
}

impl RuntimeOverrides {
    /// Creates an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds overrides from optional values.
    #[must_use]
    pub const fn from_parts(use_mock: Option<String>, real_url: Option<String>) -> Self {
        Self { use_mock, real_url }
    }

    /// Overrides the mock flag.
    #[must_use]
    pub fn with_use_mock(mut self, value: impl Into<String>) -> Self {
        self.use_mock = Some(value.into());
        self
    }

    /// Overrides the real translator address.
    #[must_use]
    pub fn with_real_url(mut self, value: impl Into<String>) -> Self {
        self.real_url = Some(value.into());
        self
    }

    /// Returns `true` when no override has been supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.use_mock.is_none() && self.real_url.is_none()
    }
}

impl ConfigSource for RuntimeOverrides {
    fn name(&self) -> &str {
        "runtime overrides"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::UseMock => self.use_mock.clone(),
            ConfigKey::RealUrl => self.real_url.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct EnvLayer {
    use_mock: Option<RawValue>,
    real_url: Option<RawValue>,
}

/// Overrides read from `TRANSLATOR_USE_MOCK` and `TRANSLATOR_REAL_URL`.
///
/// The environment is read on the first lookup and cached.
#[derive(Debug, Default)]
pub struct EnvOverrides {
    layer: OnceLock<EnvLayer>,
}

impl EnvOverrides {
    /// Creates a source that reads the process environment lazily.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn layer(&self) -> &EnvLayer {
        self.layer.get_or_init(|| {
            Figment::from(Env::prefixed(ENV_PREFIX).only(&["use_mock", "real_url"]))
                .extract()
                .unwrap_or_else(|err| {
                    warn!(error = %err, "ignoring malformed environment overrides");
                    EnvLayer::default()
                })
        })
    }
}

impl ConfigSource for EnvOverrides {
    fn name(&self) -> &str {
        "environment"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        let layer = self.layer();
        let value = match key {
            ConfigKey::UseMock => layer.use_mock.clone(),
            ConfigKey::RealUrl => layer.real_url.clone(),
        }?;
        value.into_text(self.name(), key)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileLayer {
    #[serde(rename = "useMock")]
    use_mock: Option<RawValue>,
    #[serde(rename = "realUrl")]
    real_url: Option<RawValue>,
}

/// Properties persisted in a TOML file at a fixed resource path.
///
/// The file is read at most once, on the first lookup. A missing or corrupt
/// file is logged as a warning and then behaves as an empty source.
#[derive(Debug)]
pub struct ConfigFile {
    path: Utf8PathBuf,
    layer: OnceLock<FileLayer>,
}

impl ConfigFile {
    /// Creates a source backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            layer: OnceLock::new(),
        }
    }

    /// Path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn layer(&self) -> &FileLayer {
        self.layer.get_or_init(|| {
            load_file_layer(&self.path).unwrap_or_else(|err| {
                warn!(error = %err, "configuration file unavailable; falling back to the next source");
                FileLayer::default()
            })
        })
    }
}

fn load_file_layer(path: &Utf8Path) -> Result<FileLayer, ConfigFileError> {
    if !path.is_file() {
        return Err(ConfigFileError::Missing {
            path: path.to_owned(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_owned(),
        source,
    })?;
    Figment::from(Toml::string(&contents))
        .extract()
        .map_err(|err| ConfigFileError::Parse {
            path: path.to_owned(),
            source: Box::new(err),
        })
}

impl ConfigSource for ConfigFile {
    fn name(&self) -> &str {
        "configuration file"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        let layer = self.layer();
        let value = match key {
            ConfigKey::UseMock => layer.use_mock.clone(),
            ConfigKey::RealUrl => layer.real_url.clone(),
        }?;
        value.into_text(self.name(), key)
    }
}

/// Compiled-in defaults: mocking enabled, real translator on port 8081.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinDefaults;

impl ConfigSource for BuiltinDefaults {
    fn name(&self) -> &str {
        "defaults"
    }

    fn lookup(&self, key: ConfigKey) -> Option<String> {
        let value = match key {
            ConfigKey::UseMock => "true",
            ConfigKey::RealUrl => DEFAULT_REAL_URL,
        };
        Some(value.to_owned())
    }
}
