//! Correlates cloud-reported relative offsets back onto the local function
//! table.
//!
//! Two phases per report: projection, where every relative address becomes
//! `image_base + offset`, then enrichment, where each absolute address is
//! resolved against the local function table independently per entry.

use log::warn;
use thiserror::Error;

use crate::model::{format_address, CorrelationMap, FunctionRecord, FunctionTable, GeneReport};

/// Error type for report correlation.
#[derive(Debug, Error)]
pub enum CorrelateError {
    /// The completed report carried no function entries at all.
    #[error("No genes were extracted from the file")]
    NoGenesExtracted,
}

/// Build the correlated map for a report.
///
/// An address that resolves to a local function is rewritten to that
/// function's entry point and picks up its name. A resolution miss is a
/// per-entry degraded outcome: the record keeps the computed absolute
/// address and an empty name, and the rest of the report is unaffected.
pub fn correlate(
    report: &GeneReport,
    image_base: u64,
    table: &FunctionTable,
) -> Result<CorrelationMap, CorrelateError> {
    if report.functions.is_empty() {
        return Err(CorrelateError::NoGenesExtracted);
    }

    let mut map = CorrelationMap::new();
    for (key, gene) in &report.functions {
        // Report keys are relative addresses as decimal strings.
        let relative = match key.parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Skipping gene with unparsable address key {key:?}");
                continue;
            }
        };

        let absolute = image_base + relative;
        let mut record = FunctionRecord {
            relative_address: relative,
            function_address: absolute,
            function_name: String::new(),
            software_type: gene.software_type.clone(),
            code_reuse: gene.code_reuse.clone(),
        };

        match table.resolve(absolute) {
            Some(local) => {
                record.function_address = local.start;
                record.function_name = local.name.clone();
            }
            None => {
                warn!("Address {} maps to no known function", format_address(absolute));
            }
        }

        map.insert(format_address(absolute), record);
    }

    Ok(map)
}
