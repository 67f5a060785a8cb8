//! End-to-end retrieval run: authenticate, submit, poll, correlate.
//!
//! One run walks the states INIT → AUTHENTICATED → SUBMITTED → POLLING and
//! ends COMPLETE (handing the map to the exporter) or FAILED (the error
//! aborts the rest of the pipeline). There are no backward transitions.

use anyhow::{Context, Result};
use log::info;

use crate::client::{GeneClient, Transport};
use crate::config::ClientConfig;
use crate::correlate::correlate;
use crate::model::{CorrelationMap, FunctionTable};

/// Correlated results plus the partial-result disclosure flag for the
/// exporter.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub map: CorrelationMap,
    pub is_partial: bool,
}

/// Fetch and correlate the gene report for one binary.
///
/// `sha256` identifies the binary to the cloud service; `table` and
/// `image_base` come from the local disassembly session. The caller decides
/// what to do with the outcome (typically [`crate::export::export`]).
pub fn fetch_genes(
    config: &ClientConfig,
    transport: Transport,
    sha256: &str,
    table: &FunctionTable,
    image_base: u64,
) -> Result<RunOutcome> {
    let client = GeneClient::connect(config, transport)
        .context("Failed to open an authenticated session")?;

    let ranges = table.ranges(image_base);
    info!("Submitting {} function ranges for {sha256}", ranges.len());
    let submission =
        client.submit(sha256, &ranges).context("Failed to submit the function inventory")?;

    let report =
        client.poll(&submission.handle).context("Failed to retrieve the computed report")?;
    info!("Report ready with {} function entries", report.functions.len());

    let map = correlate(&report, image_base, table)
        .context("Failed to correlate the report onto local functions")?;

    Ok(RunOutcome { map, is_partial: submission.is_partial })
}
