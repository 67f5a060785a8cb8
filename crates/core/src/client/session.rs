use chrono::{DateTime, Utc};
use log::debug;
use serde_json::{json, Value};

use crate::config::ClientConfig;

use super::{ClientError, HttpBackend};

/// Bearer credential for one run.
///
/// Acquired exactly once, before the first authenticated request, and never
/// refreshed mid-run: if a long job outlives the token, polling fails with
/// the service's status instead of silently re-authenticating.
#[derive(Debug, Clone)]
pub struct Session {
    bearer: String,
    acquired_at: DateTime<Utc>,
}

impl Session {
    /// Exchange the configured API key for a bearer token.
    ///
    /// A non-success status fails with [`ClientError::Authentication`], as
    /// does a success response that carries no token.
    pub fn acquire(backend: &dyn HttpBackend, config: &ClientConfig) -> Result<Self, ClientError> {
        let body = json!({ "api_key": config.api_key });
        let response = backend.post_json(&config.access_token_url(), None, &body)?;
        if !response.is_success() {
            return Err(ClientError::Authentication { status: response.status });
        }

        let token = response
            .body
            .get("result")
            .and_then(Value::as_str)
            .ok_or(ClientError::Authentication { status: response.status })?;

        debug!("Acquired access token for {}", config.base_url);
        Ok(Self { bearer: format!("Bearer {token}"), acquired_at: Utc::now() })
    }

    /// Full `Authorization` header value.
    pub fn bearer(&self) -> &str {
        &self.bearer
    }

    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }
}
