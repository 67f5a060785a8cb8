use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use gene_core::client::FUNCTIONS_LIMIT;
use gene_core::model::{FunctionTable, LocalFunction};
use serde::Deserialize;

use crate::parse_address;

/// Address as the disassembly host may export it: a plain integer or a
/// `0x`-prefixed hex string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Address {
    Int(u64),
    Text(String),
}

impl Address {
    fn value(&self) -> Result<u64> {
        match self {
            Address::Int(value) => Ok(*value),
            Address::Text(text) => parse_address(text),
        }
    }
}

/// One function exported by the disassembly host. `end` is exclusive.
#[derive(Debug, Deserialize)]
struct InventoryEntry {
    start: Address,
    end: Address,
    #[serde(default)]
    name: Option<String>,
}

/// Load a host-exported function inventory (JSON array of
/// `{start, end, name}`) into a [`FunctionTable`].
pub fn load_inventory(path: &Path) -> Result<FunctionTable> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read function inventory at {}", path.display()))?;
    let entries: Vec<InventoryEntry> =
        serde_json::from_str(&raw).context("Failed to parse function inventory JSON")?;

    let mut functions = Vec::with_capacity(entries.len());
    for (idx, entry) in entries.iter().enumerate() {
        let start = entry
            .start
            .value()
            .with_context(|| format!("Invalid start address in inventory entry {idx}"))?;
        let end = entry
            .end
            .value()
            .with_context(|| format!("Invalid end address in inventory entry {idx}"))?;
        if end <= start {
            bail!("Inventory entry {idx} has end {end:#x} <= start {start:#x}");
        }
        functions.push(LocalFunction {
            start,
            end,
            name: entry.name.clone().unwrap_or_default(),
        });
    }

    Ok(FunctionTable::new(functions))
}

/// Validate and summarize a function inventory without any network use.
pub fn inventory_command(path: &str) -> Result<()> {
    let table = load_inventory(Path::new(path))?;

    println!("Function inventory: {path}");
    println!("  Functions: {}", table.len());
    if let (Some(first), Some(last)) = (table.functions().first(), table.functions().last()) {
        println!("  Span: {:#x}..{:#x}", first.start, last.end);
    }
    if table.len() > FUNCTIONS_LIMIT {
        println!(
            "  Note: only the first {FUNCTIONS_LIMIT} functions are submitted; the report will be partial"
        );
    }

    Ok(())
}
