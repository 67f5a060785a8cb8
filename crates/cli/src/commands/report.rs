use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use gene_core::client::Transport;
use gene_core::config::ClientConfig;
use gene_core::export;
use gene_core::run::fetch_genes;
use log::info;

use crate::commands::load_inventory;
use crate::{parse_address, sha256_file};

/// Flags accepted by the `report` command; unset values fall back to the
/// `GENE_API_KEY` / `GENE_BASE_URL` / `GENE_EXPORT_PATH` environment.
#[derive(Debug, Default, Clone)]
pub struct ReportOptions {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub output: Option<String>,
}

/// Fetch, correlate, and export the gene report for one binary.
pub fn report_command(
    binary: &str,
    inventory: &str,
    image_base: &str,
    options: ReportOptions,
) -> Result<()> {
    let api_key = options.api_key.or_else(|| env::var("GENE_API_KEY").ok());
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        bail!("Please set GENE_API_KEY in your environment or pass --api-key");
    };

    let mut config = ClientConfig::new(api_key);
    if let Some(base_url) = options.base_url.or_else(|| env::var("GENE_BASE_URL").ok()) {
        config = config.with_base_url(base_url);
    }
    if let Some(output) = options.output.or_else(|| env::var("GENE_EXPORT_PATH").ok()) {
        config = config.with_export_path(PathBuf::from(output));
    }

    let image_base = parse_address(image_base).context("Failed to parse --image-base")?;

    let binary_path = Path::new(binary);
    let metadata = fs::metadata(binary_path)
        .with_context(|| format!("Failed to open binary at {}", binary_path.display()))?;
    let sha256 = sha256_file(binary_path)?;

    println!("Binary: {} ({} bytes)", binary_path.display(), metadata.len());
    println!("  sha256: {sha256}");
    println!("  image base: {image_base:#x}");

    let table = load_inventory(Path::new(inventory))?;
    if table.is_empty() {
        bail!("Function inventory at {inventory} contains no functions");
    }
    println!("  local functions: {}", table.len());

    info!("Fetching the gene report from {}", config.base_url);
    let outcome = fetch_genes(&config, Transport::production(), &sha256, &table, image_base)?;

    export::export(&outcome.map, outcome.is_partial, &config.export_path)
        .context("Failed to write the gene report artifact")?;

    println!("Exported {} correlated genes to {}", outcome.map.len(), config.export_path.display());
    if outcome.is_partial {
        println!("The result is partial: the submitted function inventory was reduced");
    }

    Ok(())
}

/// Print the SHA-256 the cloud service identifies a binary by.
pub fn hash_command(path: &str) -> Result<()> {
    let sha256 = sha256_file(Path::new(path))?;
    println!("{sha256}");
    Ok(())
}
