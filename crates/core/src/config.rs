use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default production endpoint of the gene analysis service.
pub const DEFAULT_BASE_URL: &str = "https://analyze.genelab.io";

/// Default export destination, relative to the working directory.
pub const DEFAULT_EXPORT_FILE: &str = "genes.json";

/// Client configuration, constructed once per run and threaded into every
/// component that talks to the service or writes the artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API key exchanged for a bearer token on first network use.
    pub api_key: String,
    /// Service base URL (without the `/api` suffix).
    pub base_url: String,
    /// Where the exported gene report is written.
    pub export_path: PathBuf,
}

impl ClientConfig {
    /// Create a configuration with the production base URL and default
    /// export destination.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_export_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = path.into();
        self
    }

    /// Root of the versioned API namespace.
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url.trim_end_matches('/'))
    }

    /// Endpoint exchanging an API key for a bearer token.
    pub fn access_token_url(&self) -> String {
        format!("{}/v2-0/get-access-token", self.api_url())
    }

    /// Endpoint creating a gene report job for the binary identified by
    /// `sha256`.
    pub fn report_url(&self, sha256: &str) -> String {
        format!("{}/v1-2/files/{}/community-ida-plugin-report", self.api_url(), sha256)
    }

    /// Resolve a job's `result_url` (service-relative) against the API root.
    pub fn job_url(&self, result_url: &str) -> String {
        format!("{}{}", self.api_url(), result_url)
    }
}
