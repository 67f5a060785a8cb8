use log::{debug, warn};
use serde_json::{json, Value};

use crate::config::ClientConfig;
use crate::model::{FunctionRange, GeneReport};
use crate::retry::Attempt;

use super::{ClientError, HttpResponse, Session, Transport};

/// Hard cap on the number of function ranges submitted per report.
pub const FUNCTIONS_LIMIT: usize = 10_000;

/// Reduced inventory size used when the full-size submission dies at the
/// transport level (large payloads can kill the connection outright).
pub const FUNCTIONS_FALLBACK_LIMIT: usize = 1_000;

/// Opaque reference to an asynchronous report job, consumed once by `poll`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle(String);

impl JobHandle {
    pub fn new(result_url: impl Into<String>) -> Self {
        Self(result_url.into())
    }

    /// Service-relative result URL, resolved against the API root when
    /// polled.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Outcome of a successful submission: the job to poll plus whether the
/// inventory was truncated or resubmitted at reduced size.
#[derive(Debug, Clone)]
pub struct Submission {
    pub handle: JobHandle,
    pub is_partial: bool,
}

/// Client for the gene report API. Holds the one session and transport for
/// the run; all calls are synchronous.
pub struct GeneClient<'a> {
    config: &'a ClientConfig,
    transport: Transport,
    session: Session,
}

impl<'a> GeneClient<'a> {
    /// Acquire a session and return a ready client. This is the only place
    /// a credential is created; every later request reuses it.
    pub fn connect(config: &'a ClientConfig, transport: Transport) -> Result<Self, ClientError> {
        let session = Session::acquire(transport.backend(), config)?;
        Ok(Self { config, transport, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submit the function-range inventory for the binary identified by
    /// `sha256` and return the job handle to poll.
    ///
    /// The inventory is truncated to [`FUNCTIONS_LIMIT`] entries. If the
    /// full-size POST fails at the transport level, it is resubmitted exactly
    /// once with the first [`FUNCTIONS_FALLBACK_LIMIT`] entries; either
    /// reduction marks the submission partial.
    pub fn submit(
        &self,
        sha256: &str,
        ranges: &[FunctionRange],
    ) -> Result<Submission, ClientError> {
        let mut is_partial = ranges.len() > FUNCTIONS_LIMIT;
        let capped = &ranges[..ranges.len().min(FUNCTIONS_LIMIT)];
        let url = self.config.report_url(sha256);

        let outcome = match self.transport.post_with_retry(
            &self.session,
            &url,
            &Self::payload(capped),
        ) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    "Submission of {} ranges failed to connect ({err}); \
                     resubmitting the first {FUNCTIONS_FALLBACK_LIMIT}",
                    capped.len()
                );
                is_partial = true;
                let reduced = &ranges[..ranges.len().min(FUNCTIONS_FALLBACK_LIMIT)];
                self.transport.post_with_retry(&self.session, &url, &Self::payload(reduced))?
            }
        };

        let response = outcome.ok_or_else(|| ClientError::SubmissionFailed {
            reason: "no terminal response after retries".to_string(),
        })?;

        match response.status {
            201 => {
                let result_url = response
                    .body
                    .get("result_url")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ClientError::SubmissionFailed {
                        reason: "response carried no result_url".to_string(),
                    })?;
                debug!("Report job created at {result_url}");
                Ok(Submission { handle: JobHandle::new(result_url), is_partial })
            }
            404 => Err(ClientError::NotYetAnalyzed(sha256.to_string())),
            409 => Err(ClientError::UnsupportedFileType),
            status => {
                Err(ClientError::SubmissionFailed { reason: format!("status {status}") })
            }
        }
    }

    /// Poll the job until the computed report is ready.
    ///
    /// A 202 means the job is still running: sleep the fixed delay and try
    /// again, up to the bounded attempt count. Exhausting the schedule while
    /// still pending is a [`ClientError::PollTimeout`]; any other non-success
    /// status fails with [`ClientError::ReportFailed`].
    pub fn poll(&self, handle: &JobHandle) -> Result<GeneReport, ClientError> {
        let url = self.config.job_url(handle.as_str());

        let outcome = self.transport.retry().run(self.transport.clock(), || -> Result<Attempt<HttpResponse>, ClientError> {
            let response = self.transport.get(&self.session, &url)?;
            if response.status == 202 {
                debug!("Report job still pending");
                Ok(Attempt::Retry)
            } else {
                Ok(Attempt::Done(response))
            }
        })?;

        let response = outcome.ok_or(ClientError::PollTimeout)?;
        if !response.is_success() {
            return Err(ClientError::ReportFailed { status: response.status });
        }

        Ok(Self::parse_report(&response.body))
    }

    fn payload(ranges: &[FunctionRange]) -> Value {
        json!({ "functions_data": ranges })
    }

    /// Presence checks only: a body without a parsable `result` payload
    /// degrades to an empty report, which the correlator rejects later.
    fn parse_report(body: &Value) -> GeneReport {
        match body.get("result") {
            Some(result) => serde_json::from_value(result.clone()).unwrap_or_else(|err| {
                warn!("Report payload was not parsable ({err}); treating as empty");
                GeneReport::default()
            }),
            None => {
                warn!("Report body carried no result payload; treating as empty");
                GeneReport::default()
            }
        }
    }
}
