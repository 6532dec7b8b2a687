//! Scenario step executors for the translation endpoint.
//!
//! Both executor families issue `GET /?query=<q>&locale=<l>` against the
//! resolved base address and keep the last response for a later assertion
//! step. They differ only in how redirects are observed:
//! [`StatusCheckExecutor`] preserves a `3xx` response as-is, while
//! [`BodyCheckExecutor`] follows redirects to the final content. Keep them
//! separate; collapsing the two would hide redirect responses from status
//! checks.

use std::fmt;

use tracing::debug;

use crate::error::StepError;

/// How a client treats `3xx` responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Follow redirects and report the final response.
    Follow,
    /// Report the redirect response itself.
    Preserve,
}

/// Status and body of the last response captured in a scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioOutcome {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// Issues translation requests against one base address.
#[derive(Clone)]
pub struct TranslationClient {
    base_uri: String,
    policy: RedirectPolicy,
    agent: ureq::Agent,
}

impl TranslationClient {
    /// Builds a client for `base_uri` with the given redirect policy.
    #[must_use]
    pub fn new(base_uri: impl Into<String>, policy: RedirectPolicy) -> Self {
        let builder = ureq::Agent::config_builder().http_status_as_error(false);
        let config = match policy {
            RedirectPolicy::Follow => builder.build(),
            RedirectPolicy::Preserve => builder
                .max_redirects(0)
                .max_redirects_will_error(false)
                .build(),
        };
        Self {
            base_uri: base_uri.into(),
            policy,
            agent: ureq::Agent::new_with_config(config),
        }
    }

    /// Base address requests are sent to.
    #[must_use]
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Redirect policy of this client.
    #[must_use]
    pub const fn policy(&self) -> RedirectPolicy {
        self.policy
    }

    /// Root URL of the translation endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/", self.base_uri.trim_end_matches('/'))
    }

    /// Requests a translation of `query` into `locale`.
    ///
    /// Any HTTP status, including `4xx`, `5xx` and (under
    /// [`RedirectPolicy::Preserve`]) `3xx`, is returned as an outcome.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Connectivity`] when no response is received or
    /// the body cannot be read.
    pub fn translate(&self, query: &str, locale: &str) -> Result<ScenarioOutcome, StepError> {
        let url = self.endpoint();
        let connectivity = |err: ureq::Error| StepError::Connectivity {
            url: url.clone(),
            reason: err.to_string(),
        };
        let mut response = self
            .agent
            .get(&url)
            .query("query", query)
            .query("locale", locale)
            .call()
            .map_err(connectivity)?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(connectivity)?;
        debug!(%url, query, locale, status, policy = ?self.policy, "translation response received");
        Ok(ScenarioOutcome { status, body })
    }
}

impl fmt::Debug for TranslationClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationClient")
            .field("base_uri", &self.base_uri)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Backs the "request translation" and "response status" steps.
///
/// Redirects are not followed, so a `302` is observable.
#[derive(Clone, Debug)]
pub struct StatusCheckExecutor {
    client: TranslationClient,
    outcome: Option<ScenarioOutcome>,
}

impl StatusCheckExecutor {
    /// Creates an executor targeting `base_uri`.
    #[must_use]
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            client: TranslationClient::new(base_uri, RedirectPolicy::Preserve),
            outcome: None,
        }
    }

    /// `When I request translation of "<q>" to "<l>"`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Connectivity`] when the endpoint is unreachable.
    /// The previous outcome is cleared either way.
    pub fn request_translation(
        &mut self,
        query: &str,
        locale: &str,
    ) -> Result<&ScenarioOutcome, StepError> {
        self.outcome = None;
        let outcome = self.client.translate(query, locale)?;
        Ok(self.outcome.insert(outcome))
    }

    /// `Then the response status should be <code>`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::StatusMismatch`] on a different status and
    /// [`StepError::NoResponse`] when no request has been made.
    pub fn assert_status(&self, expected: u16) -> Result<(), StepError> {
        let outcome = self
            .outcome
            .as_ref()
            .ok_or(StepError::NoResponse { step: "status" })?;
        if outcome.status == expected {
            Ok(())
        } else {
            Err(StepError::StatusMismatch {
                expected,
                actual: outcome.status,
            })
        }
    }

    /// The last captured response.
    #[must_use]
    pub const fn outcome(&self) -> Option<&ScenarioOutcome> {
        self.outcome.as_ref()
    }
}

/// Backs the "translate" and "response should be" steps.
///
/// Redirects are followed, so assertions see the final content.
#[derive(Clone, Debug)]
pub struct BodyCheckExecutor {
    client: TranslationClient,
    outcome: Option<ScenarioOutcome>,
}

impl BodyCheckExecutor {
    /// Creates an executor targeting `base_uri`.
    #[must_use]
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            client: TranslationClient::new(base_uri, RedirectPolicy::Follow),
            outcome: None,
        }
    }

    /// `When I translate "<q>" to "<l>"`.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::Connectivity`] when the endpoint is unreachable.
    /// The previous outcome is cleared either way.
    pub fn translate(&mut self, query: &str, locale: &str) -> Result<&ScenarioOutcome, StepError> {
        self.outcome = None;
        let outcome = self.client.translate(query, locale)?;
        Ok(self.outcome.insert(outcome))
    }

    /// `Then the response should be "<text>"`: exact match on the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`StepError::BodyMismatch`] on a different body and
    /// [`StepError::NoResponse`] when no request has been made.
    pub fn assert_body(&self, expected: &str) -> Result<(), StepError> {
        let outcome = self
            .outcome
            .as_ref()
            .ok_or(StepError::NoResponse { step: "body" })?;
        if outcome.body == expected {
            Ok(())
        } else {
            Err(StepError::BodyMismatch {
                expected: expected.to_owned(),
                actual: outcome.body.clone(),
            })
        }
    }

    /// The last captured response.
    #[must_use]
    pub const fn outcome(&self) -> Option<&ScenarioOutcome> {
        self.outcome.as_ref()
    }
}
