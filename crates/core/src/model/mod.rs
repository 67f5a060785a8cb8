//! Core data model: local function inventories, cloud gene reports, and the
//! correlated result map.
//!
//! Addresses come in two flavors and the types keep them apart:
//! - *relative* offsets, measured from the binary's image base (what the
//!   cloud service speaks);
//! - *absolute* addresses, as assigned by the local disassembly session.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One function's span relative to the image base. `end_address` is
/// exclusive (computed as max address + 1 by the disassembly host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRange {
    pub start_address: u64,
    pub end_address: u64,
}

/// A function known to the local disassembly session, in absolute addresses.
/// `end` is exclusive, matching [`FunctionRange`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalFunction {
    pub start: u64,
    pub end: u64,
    pub name: String,
}

/// Lookup table over the local functions supplied by the disassembly host.
///
/// Resolution answers "which function contains this absolute address", the
/// same question the host answers with its function manager.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: Vec<LocalFunction>,
}

impl FunctionTable {
    /// Build a table from host-supplied functions. Entries are sorted by
    /// start address so resolution can binary-search.
    pub fn new(mut functions: Vec<LocalFunction>) -> Self {
        functions.sort_by_key(|f| f.start);
        Self { functions }
    }

    /// Find the function containing `address`, if any.
    pub fn resolve(&self, address: u64) -> Option<&LocalFunction> {
        let idx = self.functions.partition_point(|f| f.start <= address);
        if idx == 0 {
            return None;
        }
        let candidate = &self.functions[idx - 1];
        (address < candidate.end).then_some(candidate)
    }

    /// Project every function into image-base-relative [`FunctionRange`]s,
    /// the form the cloud submission endpoint expects.
    pub fn ranges(&self, image_base: u64) -> Vec<FunctionRange> {
        self.functions
            .iter()
            .map(|f| FunctionRange {
                start_address: f.start.saturating_sub(image_base),
                end_address: f.end.saturating_sub(image_base),
            })
            .collect()
    }

    /// Functions in start-address order.
    pub fn functions(&self) -> &[LocalFunction] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Cloud-side gene record for a single function.
///
/// Only presence is checked; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    #[serde(default)]
    pub software_type: Vec<String>,
    #[serde(default)]
    pub code_reuse: Vec<String>,
}

/// Parsed body of a completed report job. Keys of `functions` are relative
/// addresses encoded as decimal strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneReport {
    #[serde(default)]
    pub functions: HashMap<String, GeneRecord>,
}

/// One correlated function after projection onto absolute addresses and
/// enrichment against the local function table.
///
/// `function_name` is empty when the address did not resolve to a known
/// local function; in that case `function_address` keeps the computed
/// absolute address instead of a function entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub relative_address: u64,
    pub function_address: u64,
    pub function_name: String,
    pub software_type: Vec<String>,
    pub code_reuse: Vec<String>,
}

/// Correlated results keyed by the absolute address formatted as `0x…` hex.
/// A `BTreeMap` keeps iteration (and therefore export) deterministic.
pub type CorrelationMap = BTreeMap<String, FunctionRecord>;

/// Format an absolute address the way the correlation map keys it.
pub fn format_address(address: u64) -> String {
    format!("{address:#x}")
}
