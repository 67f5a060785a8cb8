use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::retry::{Attempt, Clock, RetryPolicy, SystemClock};

use super::Session;

/// Status/body pair returned by an HTTP backend.
///
/// Error *statuses* are ordinary responses here; only transport-level
/// failures surface as [`ConnectionError`].
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    pub fn is_client_error(&self) -> bool {
        (400..=499).contains(&self.status)
    }

    /// Terminal statuses end a retry loop: success and client errors will
    /// not change on resubmission, server errors might.
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_client_error()
    }
}

/// Transport-level failure: the request never produced an HTTP status.
#[derive(Debug, Clone, Error)]
#[error("Connection failed: {0}")]
pub struct ConnectionError(pub String);

/// Minimal HTTP seam so the protocol logic can run against a scripted
/// backend in tests. `bearer` is the full `Authorization` header value, or
/// `None` for the unauthenticated token exchange.
pub trait HttpBackend: Send + Sync {
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, ConnectionError>;

    fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, ConnectionError>;
}

/// Production backend over a blocking `ureq` agent. One agent (and its
/// connection pool) lives for the whole run.
pub struct UreqBackend {
    agent: ureq::Agent,
    user_agent: String,
}

impl UreqBackend {
    pub fn new() -> Self {
        Self {
            agent: ureq::agent(),
            user_agent: format!("gene-report/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    fn finish(result: Result<ureq::Response, ureq::Error>) -> Result<HttpResponse, ConnectionError> {
        match result {
            Ok(response) => Self::into_response(response),
            // ureq reports non-2xx statuses as errors; fold them back into
            // plain responses so retry/terminal classification stays in one
            // place.
            Err(ureq::Error::Status(_, response)) => Self::into_response(response),
            Err(ureq::Error::Transport(err)) => Err(ConnectionError(err.to_string())),
        }
    }

    fn into_response(response: ureq::Response) -> Result<HttpResponse, ConnectionError> {
        let status = response.status();
        let text = response.into_string().map_err(|e| ConnectionError(e.to_string()))?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::Null)
        };
        Ok(HttpResponse { status, body })
    }
}

impl Default for UreqBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpBackend for UreqBackend {
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, ConnectionError> {
        let mut request = self.agent.post(url).set("User-Agent", &self.user_agent);
        if let Some(token) = bearer {
            request = request.set("Authorization", token);
        }
        Self::finish(request.send_json(body.clone()))
    }

    fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, ConnectionError> {
        let mut request = self.agent.get(url).set("User-Agent", &self.user_agent);
        if let Some(token) = bearer {
            request = request.set("Authorization", token);
        }
        Self::finish(request.call())
    }
}

/// Issues authenticated requests, retrying POSTs on non-terminal statuses.
pub struct Transport {
    backend: Box<dyn HttpBackend>,
    retry: RetryPolicy,
    clock: Box<dyn Clock>,
}

impl Transport {
    pub fn new(backend: Box<dyn HttpBackend>, retry: RetryPolicy, clock: Box<dyn Clock>) -> Self {
        Self { backend, retry, clock }
    }

    /// Transport wired for production use: `ureq`, the default API retry
    /// schedule, and real sleeps.
    pub fn production() -> Self {
        Self::new(Box::new(UreqBackend::new()), RetryPolicy::api_default(), Box::new(SystemClock))
    }

    pub(crate) fn backend(&self) -> &dyn HttpBackend {
        self.backend.as_ref()
    }

    pub(crate) fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// POST with the bounded retry schedule. Success and client-error
    /// statuses are terminal; server errors are retried after the fixed
    /// delay. Returns `Ok(None)` when every attempt was non-terminal; the
    /// caller must signal the delivery failure.
    pub fn post_with_retry(
        &self,
        session: &Session,
        url: &str,
        body: &Value,
    ) -> Result<Option<HttpResponse>, ConnectionError> {
        self.retry.run(self.clock.as_ref(), || {
            let response = self.backend.post_json(url, Some(session.bearer()), body)?;
            if response.is_terminal() {
                Ok(Attempt::Done(response))
            } else {
                debug!("POST {url} returned status {}; retrying", response.status);
                Ok(Attempt::Retry)
            }
        })
    }

    /// Single authenticated GET. No retry here: callers that poll (the
    /// report poller) run their own bounded loop around this.
    pub fn get(&self, session: &Session, url: &str) -> Result<HttpResponse, ConnectionError> {
        self.backend.get(url, Some(session.bearer()))
    }
}
