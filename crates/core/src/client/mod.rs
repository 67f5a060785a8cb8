//! Cloud client: session handling, resilient transport, and the gene report
//! submit/poll protocol.

mod api;
mod session;
mod transport;

pub use api::{GeneClient, JobHandle, Submission, FUNCTIONS_FALLBACK_LIMIT, FUNCTIONS_LIMIT};
pub use session::Session;
pub use transport::{ConnectionError, HttpBackend, HttpResponse, Transport, UreqBackend};

use thiserror::Error;

/// Error type for cloud client operations.
///
/// Per-entry correlation misses are deliberately *not* represented here;
/// they are a degraded-field outcome handled by the correlator.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The credential exchange was rejected by the service.
    #[error("Failed to authenticate with the gene analysis service (status {status})")]
    Authentication { status: u16 },

    /// Transport-level failure (DNS, TLS, refused or dropped connection),
    /// distinct from an HTTP error status.
    #[error("Failed to connect to the gene analysis service")]
    Connection(#[from] ConnectionError),

    /// The binary has not been processed by the cloud service yet; the
    /// sha256 is carried so the user can submit the file first.
    #[error("File has not been analyzed yet; analyze it on the service first. sha256: {0}")]
    NotYetAnalyzed(String),

    /// The service cannot produce a gene report for this file type.
    #[error("File type is not supported for gene reports")]
    UnsupportedFileType,

    /// Submission ended without a usable job handle.
    #[error("Failed to create the gene report: {reason}")]
    SubmissionFailed { reason: String },

    /// The job stayed pending through every poll attempt.
    #[error("Timed out waiting for the gene report to complete")]
    PollTimeout,

    /// A poll attempt ended with a terminal non-success status.
    #[error("Fetching the gene report failed with status {status}")]
    ReportFailed { status: u16 },
}
