//! Stub mappings replayed by the mock backend.
//!
//! Fixtures follow the WireMock directory convention: mapping files live
//! under `mappings/` and response bodies referenced by `bodyFileName` live
//! under `__files/`. Each mapping file holds either a single mapping or an
//! object with a `mappings` array.
//!
//! ```json
//! {
//!   "request": {
//!     "method": "GET",
//!     "urlPath": "/",
//!     "queryParameters": {
//!       "query": { "equalTo": "hello" },
//!       "locale": { "equalTo": "es" }
//!     }
//!   },
//!   "response": { "status": 200, "body": "hola" }
//! }
//! ```

use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};
use mockito::Matcher;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::FixtureError;

/// Directory holding mapping files, relative to the fixtures root.
pub const MAPPINGS_DIR: &str = "mappings";

/// Directory holding response body files, relative to the fixtures root.
pub const FILES_DIR: &str = "__files";

/// One canned request/response pairing.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct StubMapping {
    /// Request the stub answers.
    pub request: RequestPattern,
    /// Response the stub replays.
    pub response: ResponseDefinition,
}

/// Request matching rules.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestPattern {
    /// HTTP method, `GET` when omitted.
    #[serde(default = "default_method")]
    pub method: String,
    /// Exact request path. Any path matches when omitted.
    #[serde(default)]
    pub url_path: Option<String>,
    /// Query parameters that must be present with the given values.
    #[serde(default)]
    pub query_parameters: BTreeMap<String, ValuePattern>,
}

/// Exact-value matcher for a single query parameter.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValuePattern {
    /// Required value.
    pub equal_to: String,
}

/// Canned response.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDefinition {
    /// Status code, `200` when omitted.
    #[serde(default = "default_status")]
    pub status: u16,
    /// Inline body.
    #[serde(default)]
    pub body: Option<String>,
    /// Body file under `__files/`, used when `body` is absent.
    #[serde(default)]
    pub body_file_name: Option<String>,
    /// Response headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct MappingList {
    mappings: Vec<StubMapping>,
}

fn default_method() -> String {
    "GET".to_owned()
}

const fn default_status() -> u16 {
    200
}

/// Loads every mapping under `<root>/mappings`, in file name order.
///
/// Body files are read eagerly so that a broken fixture tree fails before
/// the server starts. A missing `mappings` directory yields no stubs.
///
/// # Errors
///
/// Returns a [`FixtureError`] if a mapping or body file cannot be read, or a
/// mapping is malformed.
pub fn load_mappings(root: &Utf8Path) -> Result<Vec<StubMapping>, FixtureError> {
    let dir = root.join(MAPPINGS_DIR);
    if !dir.is_dir() {
        warn!(path = %dir, "no fixture mappings directory; mock backend will serve no stubs");
        return Ok(Vec::new());
    }
    let files_dir = root.join(FILES_DIR);
    let mut stubs = Vec::new();
    for path in mapping_files(&dir)? {
        for mut stub in parse_mapping_file(&path)? {
            stub.validate(&path)?;
            stub.response.inline_body_file(&files_dir)?;
            stubs.push(stub);
        }
    }
    debug!(root = %root, count = stubs.len(), "fixture mappings loaded");
    Ok(stubs)
}

fn mapping_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, FixtureError> {
    let read_error = |source| FixtureError::Read {
        path: dir.to_owned(),
        source,
    };
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8().map_err(read_error)? {
        let path = entry.map_err(read_error)?.into_path();
        if path.is_file() && path.extension() == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_mapping_file(path: &Utf8Path) -> Result<Vec<StubMapping>, FixtureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_owned(),
        source,
    })?;
    let parse_error = |source| FixtureError::Parse {
        path: path.to_owned(),
        source,
    };
    let value: serde_json::Value = serde_json::from_str(&text).map_err(parse_error)?;
    if value.get("mappings").is_some() {
        let list: MappingList = serde_json::from_value(value).map_err(parse_error)?;
        Ok(list.mappings)
    } else {
        let stub: StubMapping = serde_json::from_value(value).map_err(parse_error)?;
        Ok(vec![stub])
    }
}

impl StubMapping {
    fn validate(&mut self, path: &Utf8Path) -> Result<(), FixtureError> {
        self.request.method = self.request.method.trim().to_ascii_uppercase();
        let invalid = |message: String| FixtureError::Invalid {
            path: path.to_owned(),
            message,
        };
        if !(100..=599).contains(&self.response.status) {
            return Err(invalid(format!(
                "status {} is not a valid HTTP status",
                self.response.status
            )));
        }
        for (name, value) in &self.response.headers {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(invalid(format!("header name {name:?} is not a valid token")));
            }
            if value.chars().any(char::is_control) {
                return Err(invalid(format!("header {name} has control characters")));
            }
        }
        Ok(())
    }

    /// Registers this stub with `server`. The returned mock must be kept
    /// alive for as long as the stub should be served.
    pub fn register(&self, server: &mut mockito::Server) -> mockito::Mock {
        let path = self
            .request
            .url_path
            .as_deref()
            .map_or(Matcher::Any, path_matcher);
        let mut mock = server.mock(&self.request.method, path);
        if !self.request.query_parameters.is_empty() {
            let params = self
                .request
                .query_parameters
                .iter()
                .map(|(name, pattern)| Matcher::UrlEncoded(name.clone(), pattern.equal_to.clone()))
                .collect();
            mock = mock.match_query(Matcher::AllOf(params));
        }
        mock = mock.with_status(usize::from(self.response.status));
        for (name, value) in &self.response.headers {
            mock = mock.with_header(name.as_str(), value);
        }
        if let Some(body) = &self.response.body {
            mock = mock.with_body(body);
        }
        mock.create()
    }
}

impl ResponseDefinition {
    fn inline_body_file(&mut self, files_dir: &Utf8Path) -> Result<(), FixtureError> {
        if self.body.is_some() {
            return Ok(());
        }
        let Some(name) = self.body_file_name.take() else {
            return Ok(());
        };
        let path = files_dir.join(name);
        let body = std::fs::read_to_string(&path)
            .map_err(|source| FixtureError::BodyFile { path, source })?;
        self.body = Some(body);
        Ok(())
    }
}

/// Matches `path` exactly, with or without a trailing query string.
fn path_matcher(path: &str) -> Matcher {
    Matcher::Regex(format!(r"^{}(\?.*)?$", regex::escape(path)))
}

const fn is_token_byte(byte: u8) -> bool {
    matches!(byte,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
        | b'`' | b'|' | b'~')
        || byte.is_ascii_alphanumeric()
}
