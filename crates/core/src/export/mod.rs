//! Serializes a correlated gene map to the report artifact on disk.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Serialize;
use thiserror::Error;

use crate::model::{format_address, CorrelationMap};

/// Error type for artifact export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to serialize gene report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write gene report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize)]
struct Artifact<'a> {
    partial_result: bool,
    genes: Vec<ArtifactEntry<'a>>,
}

/// One exported gene. Optional fields are omitted (and logged) rather than
/// failing the whole export.
#[derive(Debug, Serialize)]
struct ArtifactEntry<'a> {
    function_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_name: Option<&'a str>,
    software_type: String,
    code_reuse: &'a [String],
}

/// Render the artifact document. Deterministic: the same map and flag
/// always produce byte-identical output.
pub fn render(map: &CorrelationMap, is_partial: bool) -> Result<String, ExportError> {
    let mut genes = Vec::with_capacity(map.len());
    for (key, record) in map {
        let function_name = if record.function_name.is_empty() {
            warn!("Gene at {key} has no resolved function name; omitting the field");
            None
        } else {
            Some(record.function_name.as_str())
        };

        genes.push(ArtifactEntry {
            function_address: format_address(record.function_address),
            function_name,
            software_type: record.software_type.join(","),
            code_reuse: &record.code_reuse,
        });
    }

    let artifact = Artifact { partial_result: is_partial, genes };
    let mut out = serde_json::to_string_pretty(&artifact)?;
    out.push('\n');
    Ok(out)
}

/// Write the artifact to `path`, disclosing a partial result set in the log.
pub fn export(map: &CorrelationMap, is_partial: bool, path: &Path) -> Result<(), ExportError> {
    if is_partial {
        warn!("The exported result set is partial: the submitted function inventory was reduced");
    }

    let document = render(map, is_partial)?;
    fs::write(path, document)
        .map_err(|source| ExportError::Io { path: path.to_path_buf(), source })
}
